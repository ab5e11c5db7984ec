//! Option-assignment splitting: `--opt=val` / `--opt:val` → `--opt val`.

use crate::error::TokenError;

use super::transforms::TransformContext;
use super::{TokenCollection, TokenType};

const NAME: &str = "split-option-assignments";

/// Split option tokens that carry an inline assignment. The value half may
/// be empty (`--opt=`) and may itself contain further separators
/// (`-p:C:\tmp` keeps `C:\tmp` intact).
pub fn split_option_assignments(
    _ctx: &TransformContext<'_>,
    tokens: &TokenCollection,
) -> Result<TokenCollection, TokenError> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.token_type() != TokenType::Option {
            out.push(token.clone());
            continue;
        }
        match split_at_assignment(token.raw()) {
            Some((name, value)) => {
                out.push(token.derived(name, TokenType::Option, NAME));
                out.push(token.derived(value, TokenType::Value, NAME));
            }
            None => out.push(token.clone()),
        }
    }
    Ok(TokenCollection::new(out))
}

fn split_at_assignment(raw: &str) -> Option<(&str, &str)> {
    let body_start = raw.len() - raw.trim_start_matches('-').len();
    let split = raw[body_start..].find(['=', ':'])? + body_start;
    // `--=x` has no alias to assign to; leave it alone.
    if split == body_start {
        return None;
    }
    Some((&raw[..split], &raw[split + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Command;
    use crate::token::{tokenize, SOURCE_ARGV};

    fn split(args: &[&str]) -> TokenCollection {
        let root = Command::build("root").finish().unwrap();
        let ctx = TransformContext { root: &root };
        split_option_assignments(&ctx, &tokenize(args, SOURCE_ARGV)).unwrap()
    }

    #[test]
    fn splits_equals_assignment() {
        let out = split(&["--opt=val"]);
        assert_eq!(out.render(), "--opt val");
        assert_eq!(out.get(0).unwrap().token_type(), TokenType::Option);
        assert_eq!(out.get(1).unwrap().token_type(), TokenType::Value);
    }

    #[test]
    fn splits_colon_assignment() {
        let out = split(&["--opt:val"]);
        assert_eq!(out.render(), "--opt val");
    }

    #[test]
    fn value_keeps_later_separators() {
        let out = split(&["-p:C:\\tmp"]);
        assert_eq!(out.get(0).unwrap().raw(), "-p");
        assert_eq!(out.get(1).unwrap().raw(), "C:\\tmp");
    }

    #[test]
    fn empty_value_preserved() {
        let out = split(&["--opt="]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(1).unwrap().raw(), "");
    }

    #[test]
    fn plain_values_untouched() {
        // A value token with colons is someone's data, not an assignment.
        let out = split(&["one:two:three", "--plain"]);
        assert_eq!(out.render(), "one:two:three --plain");
    }

    #[test]
    fn both_halves_trace_to_original() {
        let out = split(&["--opt=val"]);
        assert!(out.get(0).unwrap().passed_through(NAME));
        assert_eq!(out.get(1).unwrap().provenance()[0].raw, "--opt=val");
    }
}
