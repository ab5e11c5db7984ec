//! Argument definitions: positional operands and named options.

use super::arity::Arity;

/// How a boolean argument consumes input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BooleanMode {
    /// Presence alone sets true; no value token is consumed.
    #[default]
    Implicit,
    /// The argument takes an explicit `true`/`false` value.
    Explicit,
}

/// Where a raw input value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The process argument vector.
    Argv,
    /// An interactive prompt supplied by the host.
    Prompt,
    /// Lines captured from piped stdin.
    PipedStream,
    /// Content expanded from a `@file` reference.
    ResponseFile,
    /// An environment variable.
    EnvVar,
    /// A host application settings file.
    AppSetting,
}

impl InputSource {
    pub fn label(&self) -> &'static str {
        match self {
            InputSource::Argv => "argv",
            InputSource::Prompt => "prompt",
            InputSource::PipedStream => "piped stdin",
            InputSource::ResponseFile => "response file",
            InputSource::EnvVar => "env var",
            InputSource::AppSetting => "app setting",
        }
    }
}

/// One batch of raw values from a single source. An argument may accumulate
/// several (command line plus piped stdin, say); binding concatenates them
/// in the order they arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub source: InputSource,
    pub values: Vec<String>,
}

impl InputValue {
    pub fn new(source: InputSource, values: Vec<String>) -> Self {
        Self { source, values }
    }

    pub fn single(source: InputSource, value: impl Into<String>) -> Self {
        Self::new(source, vec![value.into()])
    }
}

/// A default value with the label of whatever supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub label: &'static str,
    pub values: Vec<String>,
}

impl DefaultValue {
    /// A default declared on the argument itself.
    pub fn declared(value: impl Into<String>) -> Self {
        Self {
            label: "declared",
            values: vec![value.into()],
        }
    }
}

/// Fields shared by operands and options.
#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub(crate) name: String,
    pub(crate) value_type: String,
    pub(crate) arity: Arity,
    pub(crate) boolean_mode: BooleanMode,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) split_char: Option<char>,
    pub(crate) obscured: bool,
    pub(crate) env_key: Option<String>,
    pub(crate) setting_key: Option<String>,
    pub(crate) description: Option<String>,
}

impl ArgumentDef {
    fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            arity: Arity::exactly(1),
            boolean_mode: BooleanMode::default(),
            default: None,
            split_char: None,
            obscured: false,
            env_key: None,
            setting_key: None,
            description: None,
        }
    }
}

/// A positional argument.
#[derive(Debug, Clone)]
pub struct Operand {
    pub(crate) def: ArgumentDef,
}

impl Operand {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            def: ArgumentDef::new(name, value_type),
        }
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.def.arity = arity;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.def.default = Some(DefaultValue::declared(value));
        self
    }

    pub fn optional(mut self) -> Self {
        self.def.arity = Arity::zero_or_one();
        self
    }

    pub fn obscured(mut self) -> Self {
        self.def.obscured = true;
        self
    }

    pub fn env_key(mut self, key: impl Into<String>) -> Self {
        self.def.env_key = Some(key.into());
        self
    }

    pub fn setting_key(mut self, key: impl Into<String>) -> Self {
        self.def.setting_key = Some(key.into());
        self
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.def.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn value_type(&self) -> &str {
        &self.def.value_type
    }

    pub fn get_arity(&self) -> Arity {
        self.def.arity
    }
}

/// A named argument with long/short/symbol aliases.
#[derive(Debug, Clone)]
pub struct OptionDef {
    pub(crate) def: ArgumentDef,
    pub(crate) short: Option<char>,
    pub(crate) symbol: Option<char>,
    pub(crate) inherited: bool,
    pub(crate) interceptor: bool,
}

impl OptionDef {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            def: ArgumentDef::new(name, value_type),
            short: None,
            symbol: None,
            inherited: false,
            interceptor: false,
        }
    }

    /// A boolean flag: implicit mode, no value token consumed.
    pub fn flag(name: impl Into<String>, short: char) -> Self {
        let mut opt = Self::new(name, "bool");
        opt.def.arity = Arity::zero();
        opt.def.boolean_mode = BooleanMode::Implicit;
        opt.short = Some(short);
        opt
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// A one-character symbol alias such as `?`.
    pub fn symbol(mut self, symbol: char) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.def.arity = arity;
        self
    }

    pub fn boolean_mode(mut self, mode: BooleanMode) -> Self {
        self.def.boolean_mode = mode;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.def.default = Some(DefaultValue::declared(value));
        self
    }

    /// Usable from any executable descendant of the declaring command.
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Bound to the declaring command's interceptor rather than the target.
    pub fn for_interceptor(mut self) -> Self {
        self.interceptor = true;
        self
    }

    pub fn split(mut self, separator: char) -> Self {
        self.def.split_char = Some(separator);
        self
    }

    pub fn obscured(mut self) -> Self {
        self.def.obscured = true;
        self
    }

    pub fn env_key(mut self, key: impl Into<String>) -> Self {
        self.def.env_key = Some(key.into());
        self
    }

    pub fn setting_key(mut self, key: impl Into<String>) -> Self {
        self.def.setting_key = Some(key.into());
        self
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.def.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn value_type(&self) -> &str {
        &self.def.value_type
    }

    pub fn get_short(&self) -> Option<char> {
        self.short
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// A presence-only boolean: consumes no value token.
    pub fn is_flag(&self) -> bool {
        self.def.boolean_mode == BooleanMode::Implicit
            && (self.def.value_type == "bool" || self.def.arity == Arity::zero())
    }

    /// Whether `alias` (without dashes) names this option.
    pub fn matches_alias(&self, alias: &str) -> bool {
        if self.def.name == alias {
            return true;
        }
        let mut chars = alias.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.short == Some(c) || self.symbol == Some(c),
            _ => false,
        }
    }

    /// All alias spellings, for duplicate detection.
    pub fn aliases(&self) -> Vec<String> {
        let mut out = vec![self.def.name.clone()];
        if let Some(short) = self.short {
            out.push(short.to_string());
        }
        if let Some(symbol) = self.symbol {
            out.push(symbol.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_is_implicit_zero_arity() {
        let opt = OptionDef::flag("verbose", 'v');
        assert!(opt.is_flag());
        assert_eq!(opt.get_short(), Some('v'));
        assert_eq!(opt.def.arity, Arity::zero());
    }

    #[test]
    fn explicit_bool_is_not_a_flag() {
        let opt = OptionDef::new("enabled", "bool").boolean_mode(BooleanMode::Explicit);
        assert!(!opt.is_flag());
    }

    #[test]
    fn alias_matching() {
        let opt = OptionDef::new("output", "string").short('o').symbol('>');
        assert!(opt.matches_alias("output"));
        assert!(opt.matches_alias("o"));
        assert!(opt.matches_alias(">"));
        assert!(!opt.matches_alias("out"));
    }

    #[test]
    fn aliases_collects_all_spellings() {
        let opt = OptionDef::new("help", "bool").short('h').symbol('?');
        assert_eq!(opt.aliases(), vec!["help", "h", "?"]);
    }

    #[test]
    fn input_source_labels_are_distinct() {
        let sources = [
            InputSource::Argv,
            InputSource::Prompt,
            InputSource::PipedStream,
            InputSource::ResponseFile,
            InputSource::EnvVar,
            InputSource::AppSetting,
        ];
        let labels: std::collections::HashSet<&str> =
            sources.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), sources.len());
    }
}
