//! Response-file expansion: a `@path` value is replaced by the file's
//! tokenized contents, in place and recursively.

use std::path::Path;

use crate::error::TokenError;

use super::tokenizer::{split_line, token_type_of};
use super::transforms::TransformContext;
use super::{Token, TokenCollection, TokenType};

const NAME: &str = "expand-response-files";

/// Nested response files referencing further response files are expanded up
/// to this depth, after which the run reports a token error.
const MAX_NESTING: usize = 10;

pub fn expand_response_files(
    _ctx: &TransformContext<'_>,
    tokens: &TokenCollection,
) -> Result<TokenCollection, TokenError> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        expand_token(token, 0, &mut out)?;
    }
    Ok(TokenCollection::new(out))
}

fn expand_token(token: &Token, depth: usize, out: &mut Vec<Token>) -> Result<(), TokenError> {
    let path = match reference_path(token) {
        Some(path) => path,
        None => {
            out.push(token.clone());
            return Ok(());
        }
    };
    if depth >= MAX_NESTING {
        return Err(TokenError::ResponseFileNesting {
            path: path.to_string(),
            limit: MAX_NESTING,
        });
    }

    let content =
        std::fs::read_to_string(Path::new(path)).map_err(|source| TokenError::ResponseFileRead {
            path: path.to_string(),
            source,
        })?;
    tracing::debug!(path, "expanding response file");

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for word in split_line(line) {
            let derived = token.derived(&word, token_type_of(&word), NAME);
            expand_token(&derived, depth + 1, out)?;
        }
    }
    Ok(())
}

/// The path of a `@file` reference, for value tokens only.
fn reference_path(token: &Token) -> Option<&str> {
    if token.token_type() != TokenType::Value {
        return None;
    }
    let path = token.raw().strip_prefix('@')?;
    if path.is_empty() {
        return None;
    }
    Some(path)
}
