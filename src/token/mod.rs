//! Token model: typed tokens with a full transformation trace.
//!
//! Every token carries an append-only provenance chain recording each raw
//! form it passed through, so a bound value can be traced back to the exact
//! argument the user typed (`@file → -ab → -a`). Transformations never
//! mutate tokens in place; they derive new tokens from old ones.

mod assignments;
mod clubbed;
mod response_files;
mod tokenizer;
mod transforms;

pub use tokenizer::{split_line, token_type_of, tokenize, SOURCE_ARGV};
pub use transforms::{
    apply_transformations, default_transformations, TokenTransformation, TransformContext,
    TransformationLog, TransformationRecord,
};

use std::fmt;

/// What a token means to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Bracketed leading token (`[parse]`) switching the run into an
    /// alternate mode.
    Directive,
    /// `-x` / `--name` forms.
    Option,
    /// Anything positional.
    Value,
    /// The `--` end-of-options marker.
    Separator,
}

/// One step in a token's history: which source produced which raw form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceEntry {
    /// Where the form came from: the input source or a transformation name.
    pub source: String,
    /// The raw text at that step.
    pub raw: String,
}

/// An immutable token. Derive new ones via [`Token::derived`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    token_type: TokenType,
    provenance: Vec<ProvenanceEntry>,
}

impl Token {
    /// A fresh token from an input source (argv, a response file, ...).
    pub fn new(raw: impl Into<String>, token_type: TokenType, source: &str) -> Self {
        let raw = raw.into();
        let provenance = vec![ProvenanceEntry {
            source: source.to_string(),
            raw: raw.clone(),
        }];
        Self {
            raw,
            token_type,
            provenance,
        }
    }

    /// A token produced from `self` by a transformation, keeping the chain.
    pub fn derived(&self, raw: impl Into<String>, token_type: TokenType, transform: &str) -> Self {
        let raw = raw.into();
        let mut provenance = self.provenance.clone();
        provenance.push(ProvenanceEntry {
            source: transform.to_string(),
            raw: raw.clone(),
        });
        Self {
            raw,
            token_type,
            provenance,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn provenance(&self) -> &[ProvenanceEntry] {
        &self.provenance
    }

    /// Whether any step of this token's history was produced by `source`.
    pub fn passed_through(&self, source: &str) -> bool {
        self.provenance.iter().any(|e| e.source == source)
    }

    /// The option alias without its dash prefix, for `Option` tokens.
    pub fn option_alias(&self) -> Option<&str> {
        if self.token_type != TokenType::Option {
            return None;
        }
        Some(self.raw.trim_start_matches('-'))
    }

    /// Render the history newest-first: `-a (from -ab, from @args.txt)`.
    pub fn trace(&self) -> String {
        let mut out = self.raw.clone();
        for entry in self.provenance.iter().rev().skip(1) {
            out.push_str(&format!(" (from {})", entry.raw));
        }
        out
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// An ordered token stream. Transformations replace the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCollection {
    tokens: Vec<Token>,
}

impl TokenCollection {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw forms joined with spaces, for snapshots and diagnostics.
    pub fn render(&self) -> String {
        let raws: Vec<&str> = self.tokens.iter().map(|t| t.raw.as_str()).collect();
        raws.join(" ")
    }
}

impl<'a> IntoIterator for &'a TokenCollection {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_seeds_provenance() {
        let token = Token::new("--verbose", TokenType::Option, SOURCE_ARGV);
        assert_eq!(token.provenance().len(), 1);
        assert_eq!(token.provenance()[0].source, SOURCE_ARGV);
        assert_eq!(token.provenance()[0].raw, "--verbose");
    }

    #[test]
    fn derived_token_appends_to_chain() {
        let parent = Token::new("-ab", TokenType::Option, SOURCE_ARGV);
        let child = parent.derived("-a", TokenType::Option, "expand-clubbed-flags");

        assert_eq!(child.raw(), "-a");
        assert_eq!(child.provenance().len(), 2);
        assert_eq!(child.provenance()[0].raw, "-ab");
        assert_eq!(child.provenance()[1].source, "expand-clubbed-flags");
        // The parent is untouched.
        assert_eq!(parent.provenance().len(), 1);
    }

    #[test]
    fn trace_renders_newest_first() {
        let root = Token::new("@args.txt", TokenType::Value, SOURCE_ARGV);
        let mid = root.derived("-ab", TokenType::Option, "expand-response-files");
        let leaf = mid.derived("-a", TokenType::Option, "expand-clubbed-flags");
        assert_eq!(leaf.trace(), "-a (from -ab) (from @args.txt)");
    }

    #[test]
    fn option_alias_strips_dashes() {
        let long = Token::new("--dry-run", TokenType::Option, SOURCE_ARGV);
        assert_eq!(long.option_alias(), Some("dry-run"));
        let value = Token::new("plain", TokenType::Value, SOURCE_ARGV);
        assert_eq!(value.option_alias(), None);
    }

    #[test]
    fn render_joins_raw_forms() {
        let tokens = TokenCollection::new(vec![
            Token::new("add", TokenType::Value, SOURCE_ARGV),
            Token::new("--force", TokenType::Option, SOURCE_ARGV),
        ]);
        assert_eq!(tokens.render(), "add --force");
    }
}
