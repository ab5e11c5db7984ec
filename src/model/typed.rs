//! Typed values and per-type string parsers.

use std::fmt;

use crate::error::ConfigError;

/// A value after binding.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Str(v) => f.write_str(v),
            TypedValue::Int(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl TypedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Parses raw strings into one value type. Implementations are registered
/// per type name; an argument naming an unregistered type is a
/// configuration error caught when the app is built.
pub trait ValueParser {
    fn type_name(&self) -> &str;
    fn parse(&self, raw: &str) -> Result<TypedValue, String>;
}

impl std::fmt::Debug for dyn ValueParser + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueParser")
            .field("type_name", &self.type_name())
            .finish()
    }
}

struct StringParser;

impl ValueParser for StringParser {
    fn type_name(&self) -> &str {
        "string"
    }

    fn parse(&self, raw: &str) -> Result<TypedValue, String> {
        Ok(TypedValue::Str(raw.to_string()))
    }
}

struct IntParser;

impl ValueParser for IntParser {
    fn type_name(&self) -> &str {
        "int"
    }

    fn parse(&self, raw: &str) -> Result<TypedValue, String> {
        raw.parse::<i64>()
            .map(TypedValue::Int)
            .map_err(|e| e.to_string())
    }
}

struct FloatParser;

impl ValueParser for FloatParser {
    fn type_name(&self) -> &str {
        "float"
    }

    fn parse(&self, raw: &str) -> Result<TypedValue, String> {
        raw.parse::<f64>()
            .map(TypedValue::Float)
            .map_err(|e| e.to_string())
    }
}

struct BoolParser;

impl ValueParser for BoolParser {
    fn type_name(&self) -> &str {
        "bool"
    }

    fn parse(&self, raw: &str) -> Result<TypedValue, String> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(TypedValue::Bool(true)),
            "false" | "no" | "0" | "off" => Ok(TypedValue::Bool(false)),
            _ => Err(format!("expected a boolean, got '{raw}'")),
        }
    }
}

/// Registry of value parsers, seeded with the built-in scalar types.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ValueParser>>,
}

impl ParserRegistry {
    pub fn with_builtins() -> Self {
        Self {
            parsers: vec![
                Box::new(StringParser),
                Box::new(IntParser),
                Box::new(FloatParser),
                Box::new(BoolParser),
            ],
        }
    }

    /// Register a custom parser. A later registration for the same type
    /// name wins over earlier ones.
    pub fn register(&mut self, parser: Box<dyn ValueParser>) {
        self.parsers.insert(0, parser);
    }

    pub fn find(&self, type_name: &str) -> Option<&dyn ValueParser> {
        self.parsers
            .iter()
            .find(|p| p.type_name() == type_name)
            .map(|p| p.as_ref())
    }

    pub fn require(&self, argument: &str, type_name: &str) -> Result<&dyn ValueParser, ConfigError> {
        self.find(type_name).ok_or_else(|| ConfigError::UnknownValueType {
            argument: argument.to_string(),
            type_name: type_name.to_string(),
        })
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
