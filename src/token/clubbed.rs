//! Clubbed short-flag expansion: `-abc` → `-a -b -c`.

use std::collections::HashSet;

use crate::error::TokenError;
use crate::model::Command;

use super::transforms::TransformContext;
use super::{Token, TokenCollection, TokenType};

const NAME: &str = "expand-clubbed-flags";

/// Expand multi-character short-option tokens when every character names a
/// short flag that takes no value. Command resolution has not happened yet,
/// so "takes no value" is answered against the union of implicit-boolean
/// short aliases across the whole tree.
pub fn expand_clubbed_flags(
    ctx: &TransformContext<'_>,
    tokens: &TokenCollection,
) -> Result<TokenCollection, TokenError> {
    let flags = collect_flag_shorts(ctx.root);

    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match clubbed_chars(token, &flags) {
            Some(chars) => {
                for c in chars {
                    out.push(token.derived(format!("-{c}"), TokenType::Option, NAME));
                }
            }
            None => out.push(token.clone()),
        }
    }
    Ok(TokenCollection::new(out))
}

/// The characters of a clubbed token, or `None` when the token is not an
/// expandable cluster.
fn clubbed_chars(token: &Token, flags: &HashSet<char>) -> Option<Vec<char>> {
    if token.token_type() != TokenType::Option {
        return None;
    }
    let raw = token.raw();
    let body = raw.strip_prefix('-')?;
    if body.starts_with('-') || body.chars().count() < 2 {
        return None;
    }
    let chars: Vec<char> = body.chars().collect();
    if chars.iter().all(|c| flags.contains(c)) {
        Some(chars)
    } else {
        None
    }
}

/// Short aliases of options that accept no value, across the whole tree.
fn collect_flag_shorts(command: &Command) -> HashSet<char> {
    let mut set = HashSet::new();
    collect_into(command, &mut set);
    set
}

fn collect_into(command: &Command, set: &mut HashSet<char>) {
    for option in command.options() {
        if option.is_flag() {
            if let Some(short) = option.get_short() {
                set.insert(short);
            }
        }
    }
    for sub in command.subcommands() {
        collect_into(sub, set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arity, BooleanMode, OptionDef};
    use crate::token::{tokenize, SOURCE_ARGV};

    fn root() -> Command {
        Command::build("root")
            .option(OptionDef::flag("alpha", 'a'))
            .option(OptionDef::flag("beta", 'b'))
            .option(
                OptionDef::new("count", "int")
                    .short('c')
                    .arity(Arity::exactly(1))
                    .boolean_mode(BooleanMode::Explicit),
            )
            .finish()
            .unwrap()
    }

    fn expand(args: &[&str]) -> TokenCollection {
        let root = root();
        let ctx = TransformContext { root: &root };
        expand_clubbed_flags(&ctx, &tokenize(args, SOURCE_ARGV)).unwrap()
    }

    #[test]
    fn expands_known_flag_cluster() {
        let out = expand(&["-ab"]);
        assert_eq!(out.render(), "-a -b");
        assert_eq!(out.get(0).unwrap().provenance()[0].raw, "-ab");
    }

    #[test]
    fn leaves_cluster_with_value_option() {
        // `-c` requires a value, so `-ac` cannot be a flag cluster.
        let out = expand(&["-ac"]);
        assert_eq!(out.render(), "-ac");
    }

    #[test]
    fn leaves_unknown_characters() {
        let out = expand(&["-ax"]);
        assert_eq!(out.render(), "-ax");
    }

    #[test]
    fn leaves_long_options_and_values() {
        let out = expand(&["--ab", "ab"]);
        assert_eq!(out.render(), "--ab ab");
    }

    #[test]
    fn single_short_flag_untouched() {
        let out = expand(&["-a"]);
        assert_eq!(out.render(), "-a");
        assert_eq!(out.get(0).unwrap().provenance().len(), 1);
    }
}
