//! Bracketed leading directives: `[parse]`, `[time]`, `[name:opt;key=val]`.
//!
//! Directives switch a run into a diagnostic or alternate mode. They are
//! recognized and stripped before normal tokenization; everything after the
//! first non-directive argument is ordinary input.

mod report;

pub(crate) use report::render_parse_report;

use crate::error::TokenError;

/// One parsed directive with its optional `;`-separated options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    name: String,
    options: Vec<(String, Option<String>)>,
}

impl Directive {
    /// Parse a `[name]` / `[name:opt1;opt2=val]` form. Returns `None` for
    /// arguments that are not bracketed at all.
    pub fn parse(raw: &str) -> Option<Result<Directive, TokenError>> {
        let body = raw.strip_prefix('[')?.strip_suffix(']')?;
        let (name, opts) = match body.split_once(':') {
            Some((name, opts)) => (name, Some(opts)),
            None => (body, None),
        };
        if name.trim().is_empty() {
            return Some(Err(TokenError::MalformedDirective {
                raw: raw.to_string(),
            }));
        }
        let options = opts
            .map(|opts| {
                opts.split(';')
                    .filter(|o| !o.is_empty())
                    .map(|o| match o.split_once('=') {
                        Some((key, value)) => (key.to_string(), Some(value.to_string())),
                        None => (o.to_string(), None),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(Ok(Directive {
            name: name.to_string(),
            options,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option(&self, key: &str) -> Option<Option<&str>> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }
}

/// The directives extracted from one run's input.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    items: Vec<Directive>,
}

impl DirectiveSet {
    pub fn has(&self, name: &str) -> bool {
        self.items.iter().any(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.items.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split leading directives off the raw argument list.
pub fn extract_directives(args: &[String]) -> Result<(DirectiveSet, Vec<String>), TokenError> {
    let mut items = Vec::new();
    let mut rest = args.iter();
    let mut remaining: Vec<String> = Vec::new();
    for arg in rest.by_ref() {
        match Directive::parse(arg) {
            Some(Ok(directive)) => items.push(directive),
            Some(Err(err)) => return Err(err),
            None => {
                remaining.push(arg.clone());
                break;
            }
        }
    }
    remaining.extend(rest.cloned());
    Ok((DirectiveSet { items }, remaining))
}
