//! External default-value sources.
//!
//! Sources are consulted in registration order for arguments that received
//! no input; the first hit wins and tags the value with the source's label
//! for diagnostics. Declared defaults remain the final fallback.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::model::DefaultValue;
use crate::parse::{ArgRef, ParseResult};

/// Supplies default values for arguments that received no input.
pub trait DefaultSource {
    /// Distinct label shown in diagnostics (`env var`, `app setting`, ...).
    fn label(&self) -> &'static str;

    fn resolve(&self, arg: &ArgRef<'_>) -> Option<Vec<String>>;
}

/// Fill resolved defaults on every input-less binding.
pub fn apply_default_sources(result: &mut ParseResult<'_>, sources: &[Box<dyn DefaultSource>]) {
    for binding in result.bindings_mut() {
        if !binding.inputs.is_empty() || binding.resolved_default.is_some() {
            continue;
        }
        for source in sources {
            if let Some(values) = source.resolve(&binding.arg) {
                tracing::debug!(
                    argument = binding.arg.name(),
                    source = source.label(),
                    "default resolved"
                );
                binding.resolved_default = Some(DefaultValue {
                    label: source.label(),
                    values,
                });
                break;
            }
        }
    }
}

/// Environment variables, matched through each argument's declared env key.
pub struct EnvVarSource {
    vars: BTreeMap<String, String>,
}

impl EnvVarSource {
    /// Snapshot the process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// A fixed variable set, for tests and embedded hosts.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }
}

impl DefaultSource for EnvVarSource {
    fn label(&self) -> &'static str {
        "env var"
    }

    fn resolve(&self, arg: &ArgRef<'_>) -> Option<Vec<String>> {
        let key = arg.env_key()?;
        self.vars.get(key).map(|v| vec![v.clone()])
    }
}

/// One scalar or list value in a settings document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<SettingValue>),
}

impl SettingValue {
    fn into_strings(self) -> Vec<String> {
        match self {
            SettingValue::Bool(v) => vec![v.to_string()],
            SettingValue::Int(v) => vec![v.to_string()],
            SettingValue::Float(v) => vec![v.to_string()],
            SettingValue::Str(v) => vec![v],
            SettingValue::List(items) => items
                .into_iter()
                .flat_map(SettingValue::into_strings)
                .collect(),
        }
    }
}

/// Host application settings, a flat key→value document in JSON or TOML,
/// matched through each argument's declared setting key.
pub struct AppSettingsSource {
    settings: BTreeMap<String, Vec<String>>,
}

impl AppSettingsSource {
    pub fn from_json_str(content: &str) -> Result<Self, anyhow::Error> {
        let doc: BTreeMap<String, SettingValue> = serde_json::from_str(content)?;
        Ok(Self::from_doc(doc))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let doc: BTreeMap<String, SettingValue> = toml::from_str(content)?;
        Ok(Self::from_doc(doc))
    }

    pub fn from_toml_path(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn from_doc(doc: BTreeMap<String, SettingValue>) -> Self {
        Self {
            settings: doc
                .into_iter()
                .map(|(key, value)| (key, value.into_strings()))
                .collect(),
        }
    }
}

impl DefaultSource for AppSettingsSource {
    fn label(&self) -> &'static str {
        "app setting"
    }

    fn resolve(&self, arg: &ArgRef<'_>) -> Option<Vec<String>> {
        let key = arg.setting_key()?;
        self.settings.get(key).cloned()
    }
}

/// Answers prepared ahead of time, keyed by argument name. This is the
/// seam an interactive host uses to feed prompt responses into binding.
pub struct PresetSource {
    answers: BTreeMap<String, Vec<String>>,
}

impl PresetSource {
    pub fn new(answers: BTreeMap<String, Vec<String>>) -> Self {
        Self { answers }
    }
}

impl DefaultSource for PresetSource {
    fn label(&self) -> &'static str {
        "prompt"
    }

    fn resolve(&self, arg: &ArgRef<'_>) -> Option<Vec<String>> {
        self.answers.get(arg.name()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Command, Operand, OptionDef, ParserRegistry, TypedValue};
    use crate::parse::parse;
    use crate::token::{tokenize, SOURCE_ARGV};

    fn tree() -> Command {
        Command::build("serve")
            .executable("serve")
            .operand(Operand::new("root", "string").optional().setting_key("serve.root"))
            .option(OptionDef::new("port", "int").env_key("APP_PORT").default("8080"))
            .finish()
            .unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> Box<dyn DefaultSource> {
        Box::new(EnvVarSource::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn env_var_beats_declared_default() {
        let tree = tree();
        let mut result = parse(&tokenize::<&str>(&[], SOURCE_ARGV), &tree);
        apply_default_sources(&mut result, &[env(&[("APP_PORT", "9000")])]);
        let errors = crate::bind::bind(&mut result, &ParserRegistry::with_builtins()).unwrap();
        assert!(errors.is_empty());

        let port = result.binding("port").unwrap();
        assert_eq!(port.value(), Some(&[TypedValue::Int(9000)][..]));
        assert_eq!(port.default_label(), Some("env var"));
    }

    #[test]
    fn declared_default_when_no_source_matches() {
        let tree = tree();
        let mut result = parse(&tokenize::<&str>(&[], SOURCE_ARGV), &tree);
        apply_default_sources(&mut result, &[env(&[])]);
        let errors = crate::bind::bind(&mut result, &ParserRegistry::with_builtins()).unwrap();
        assert!(errors.is_empty());

        let port = result.binding("port").unwrap();
        assert_eq!(port.value(), Some(&[TypedValue::Int(8080)][..]));
        assert_eq!(port.default_label(), Some("declared"));
    }

    #[test]
    fn explicit_input_suppresses_sources() {
        let tree = tree();
        let mut result = parse(&tokenize(&["--port", "3000"], SOURCE_ARGV), &tree);
        apply_default_sources(&mut result, &[env(&[("APP_PORT", "9000")])]);
        let errors = crate::bind::bind(&mut result, &ParserRegistry::with_builtins()).unwrap();
        assert!(errors.is_empty());

        let port = result.binding("port").unwrap();
        assert_eq!(port.value(), Some(&[TypedValue::Int(3000)][..]));
        assert_eq!(port.default_label(), None);
    }

    #[test]
    fn first_matching_source_wins() {
        let tree = tree();
        let mut result = parse(&tokenize::<&str>(&[], SOURCE_ARGV), &tree);
        let sources = vec![
            env(&[("APP_PORT", "1111")]),
            env(&[("APP_PORT", "2222")]),
        ];
        apply_default_sources(&mut result, &sources);
        crate::bind::bind(&mut result, &ParserRegistry::with_builtins()).unwrap();
        assert_eq!(
            result.binding("port").unwrap().value(),
            Some(&[TypedValue::Int(1111)][..])
        );
    }

    #[test]
    fn json_settings_resolve_by_key() {
        let settings =
            AppSettingsSource::from_json_str(r#"{"serve.root": "/srv", "other": 1}"#).unwrap();
        let tree = tree();
        let mut result = parse(&tokenize::<&str>(&[], SOURCE_ARGV), &tree);
        apply_default_sources(&mut result, &[Box::new(settings)]);
        crate::bind::bind(&mut result, &ParserRegistry::with_builtins()).unwrap();

        let root = result.binding("root").unwrap();
        assert_eq!(root.value(), Some(&[TypedValue::Str("/srv".into())][..]));
        assert_eq!(root.default_label(), Some("app setting"));
    }

    #[test]
    fn toml_settings_support_lists() {
        let settings = AppSettingsSource::from_toml_str("key = [\"a\", \"b\"]\n").unwrap();
        let arg_values = settings.settings.get("key").unwrap();
        assert_eq!(arg_values, &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(settings.label(), "app setting");
    }

    #[test]
    fn preset_source_carries_prompt_label() {
        let mut answers = BTreeMap::new();
        answers.insert("root".to_string(), vec!["/tmp".to_string()]);
        let source = PresetSource::new(answers);

        let tree = tree();
        let mut result = parse(&tokenize::<&str>(&[], SOURCE_ARGV), &tree);
        apply_default_sources(&mut result, &[Box::new(source)]);
        crate::bind::bind(&mut result, &ParserRegistry::with_builtins()).unwrap();

        assert_eq!(result.binding("root").unwrap().default_label(), Some("prompt"));
    }
}
