//! Named, ordered token transformations with snapshot recording.
//!
//! Each transformation sees the output of the previous one and produces a
//! whole new collection. The run records a before/after snapshot per
//! transformation, including an explicit "no changes" entry, so diagnostic
//! output is reproducible bit for bit.

use crate::error::TokenError;
use crate::model::Command;

use super::assignments::split_option_assignments;
use super::clubbed::expand_clubbed_flags;
use super::response_files::expand_response_files;
use super::TokenCollection;

/// Read-only state available to transformations.
pub struct TransformContext<'a> {
    /// Root of the command tree; resolution has not happened yet, so
    /// transformations that need schema knowledge consult the whole tree.
    pub root: &'a Command,
}

/// One named rewrite of the token stream.
pub struct TokenTransformation {
    name: &'static str,
    order: i32,
    apply: fn(&TransformContext<'_>, &TokenCollection) -> Result<TokenCollection, TokenError>,
}

impl TokenTransformation {
    pub fn new(
        name: &'static str,
        order: i32,
        apply: fn(&TransformContext<'_>, &TokenCollection) -> Result<TokenCollection, TokenError>,
    ) -> Self {
        Self { name, order, apply }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }
}

/// The stock sequence: response files first (their content feeds the later
/// passes), then clubbed flags, then option assignments.
pub fn default_transformations() -> Vec<TokenTransformation> {
    vec![
        TokenTransformation::new("expand-response-files", 10, expand_response_files),
        TokenTransformation::new("expand-clubbed-flags", 20, expand_clubbed_flags),
        TokenTransformation::new("split-option-assignments", 30, split_option_assignments),
    ]
}

/// Snapshot of one transformation's effect on the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationRecord {
    pub name: &'static str,
    pub changed: bool,
    pub before: String,
    pub after: String,
}

/// Ordered log of every transformation applied during one run.
#[derive(Debug, Clone, Default)]
pub struct TransformationLog {
    records: Vec<TransformationRecord>,
}

impl TransformationLog {
    pub fn records(&self) -> &[TransformationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&mut self, name: &'static str, before: String, after: String) {
        self.records.push(TransformationRecord {
            name,
            changed: before != after,
            before,
            after,
        });
    }
}

/// Run `transformations` over `tokens` in ascending order, recording each
/// pass into `log`.
pub fn apply_transformations(
    ctx: &TransformContext<'_>,
    tokens: TokenCollection,
    transformations: &[TokenTransformation],
    log: &mut TransformationLog,
) -> Result<TokenCollection, TokenError> {
    let mut ordered: Vec<&TokenTransformation> = transformations.iter().collect();
    ordered.sort_by_key(|t| t.order);

    let mut current = tokens;
    for transformation in ordered {
        let before = current.render();
        let next = (transformation.apply)(ctx, &current)?;
        let after = next.render();
        if before != after {
            tracing::debug!(
                transformation = transformation.name,
                %before,
                %after,
                "token stream rewritten"
            );
        }
        log.record(transformation.name, before, after);
        current = next;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arity, BooleanMode, Command, OptionDef};
    use crate::token::{tokenize, SOURCE_ARGV};

    fn tree_with_flags() -> Command {
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

    #[test]
    fn unchanged_stream_records_no_change() {
        let root = tree_with_flags();
        let ctx = TransformContext { root: &root };
        let tokens = tokenize(&["add", "2", "3"], SOURCE_ARGV);
        let mut log = TransformationLog::default();

        let out =
            apply_transformations(&ctx, tokens.clone(), &default_transformations(), &mut log)
                .unwrap();

        assert_eq!(out, tokens);
        assert_eq!(log.records().len(), 3);
        assert!(log.records().iter().all(|r| !r.changed));
        assert!(log.records().iter().all(|r| r.before == r.after));
    }

    #[test]
    fn passes_run_in_order_field_order() {
        let root = tree_with_flags();
        let ctx = TransformContext { root: &root };
        let tokens = tokenize(&["-ab"], SOURCE_ARGV);
        let mut log = TransformationLog::default();

        apply_transformations(&ctx, tokens, &default_transformations(), &mut log).unwrap();

        let names: Vec<&str> = log.records().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "expand-response-files",
                "expand-clubbed-flags",
                "split-option-assignments"
            ]
        );
    }

    #[test]
    fn clubbed_then_changed_flag_recorded() {
        let root = tree_with_flags();
        let ctx = TransformContext { root: &root };
        let tokens = tokenize(&["-ab"], SOURCE_ARGV);
        let mut log = TransformationLog::default();

        let out =
            apply_transformations(&ctx, tokens, &default_transformations(), &mut log).unwrap();

        assert_eq!(out.render(), "-a -b");
        let clubbed = &log.records()[1];
        assert!(clubbed.changed);
        assert_eq!(clubbed.before, "-ab");
        assert_eq!(clubbed.after, "-a -b");
    }
}
