//! Raw argument strings to typed tokens.

use super::{Token, TokenCollection, TokenType};

/// Source label for tokens taken straight from the process argument vector.
pub const SOURCE_ARGV: &str = "argv";

/// Classify one raw argument.
///
/// Directives are only recognized by the caller while scanning leading
/// tokens; here a bracketed form is typed by shape alone.
pub fn token_type_of(raw: &str) -> TokenType {
    if raw == "--" {
        return TokenType::Separator;
    }
    if raw.len() > 1 && raw.starts_with('[') && raw.ends_with(']') {
        return TokenType::Directive;
    }
    if let Some(rest) = raw.strip_prefix('-') {
        // A bare dash is the conventional stdin placeholder, and a leading
        // digit means a negative number, not an option.
        if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return TokenType::Value;
        }
        return TokenType::Option;
    }
    TokenType::Value
}

/// Turn raw arguments into a typed token collection.
///
/// `source` labels the first provenance entry of every token (`argv` for
/// process input, a file path for response-file content).
pub fn tokenize<S: AsRef<str>>(args: &[S], source: &str) -> TokenCollection {
    let tokens = args
        .iter()
        .map(|arg| {
            let raw = arg.as_ref();
            Token::new(raw, token_type_of(raw), source)
        })
        .collect();
    TokenCollection::new(tokens)
}

/// Split one line into words with shell-like quoting.
///
/// Single quotes preserve everything literally; double quotes allow
/// backslash escapes of `"` and `\`; an unquoted backslash escapes the next
/// character. Used for response-file lines, which arrive unsplit.
pub fn split_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '"' => {
                in_word = true;
                while let Some(inner) = chars.next() {
                    match inner {
                        '"' => break,
                        '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            current.push(chars.next().unwrap_or('\\'));
                        }
                        _ => current.push(inner),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_options() {
        assert_eq!(token_type_of("--verbose"), TokenType::Option);
        assert_eq!(token_type_of("-v"), TokenType::Option);
        assert_eq!(token_type_of("-ab"), TokenType::Option);
    }

    #[test]
    fn separator_and_values() {
        assert_eq!(token_type_of("--"), TokenType::Separator);
        assert_eq!(token_type_of("file.txt"), TokenType::Value);
        assert_eq!(token_type_of("-"), TokenType::Value);
    }

    #[test]
    fn negative_numbers_are_values() {
        assert_eq!(token_type_of("-2"), TokenType::Value);
        assert_eq!(token_type_of("-3.5"), TokenType::Value);
        assert_eq!(token_type_of("-.5"), TokenType::Value);
    }

    #[test]
    fn bracketed_form_is_directive() {
        assert_eq!(token_type_of("[parse]"), TokenType::Directive);
        assert_eq!(token_type_of("[time]"), TokenType::Directive);
        assert_eq!(token_type_of("[parse:verbose]"), TokenType::Directive);
    }

    #[test]
    fn tokenize_labels_source() {
        let tokens = tokenize(&["add", "--force"], SOURCE_ARGV);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.get(0).unwrap().token_type(), TokenType::Value);
        assert_eq!(tokens.get(1).unwrap().token_type(), TokenType::Option);
        assert_eq!(tokens.get(1).unwrap().provenance()[0].source, SOURCE_ARGV);
    }

    #[test]
    fn split_plain_words() {
        assert_eq!(split_line("a b  c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_single_quotes_literal() {
        assert_eq!(split_line("'a b' c"), vec!["a b", "c"]);
    }

    #[test]
    fn split_double_quotes_with_escape() {
        assert_eq!(split_line(r#"--msg "say \"hi\"""#), vec!["--msg", r#"say "hi""#]);
    }

    #[test]
    fn split_backslash_outside_quotes() {
        assert_eq!(split_line(r"a\ b"), vec!["a b"]);
    }

    #[test]
    fn split_empty_quoted_word() {
        assert_eq!(split_line("'' b"), vec!["", "b"]);
    }

    #[test]
    fn split_blank_line() {
        assert!(split_line("   ").is_empty());
    }
}
