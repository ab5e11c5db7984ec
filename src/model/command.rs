//! The command tree.

use super::argument::{Operand, OptionDef};

/// What happens to tokens after a `--` separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorStrategy {
    /// Remaining tokens are literal operand values, dashes and all.
    #[default]
    EndOfOptions,
    /// Remaining tokens are collected verbatim for the command's own use
    /// and never matched against operands.
    PassThru,
}

/// Identifies the unit that declares a command's handler; an interceptor
/// and a target with the same key share one resolved instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey(String);

impl HandlerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A node in the command tree. Owns its subcommands; the tree is read-only
/// for the duration of a run.
#[derive(Debug, Clone)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) executable: bool,
    pub(crate) has_interceptor: bool,
    pub(crate) ignore_unexpected_operands: bool,
    pub(crate) separator_strategy: SeparatorStrategy,
    pub(crate) handler: Option<HandlerKey>,
    pub(crate) operands: Vec<Operand>,
    pub(crate) options: Vec<OptionDef>,
    pub(crate) subcommands: Vec<Command>,
}

impl Command {
    /// Start building a command. Finish with
    /// [`CommandBuilder::finish`](super::builder::CommandBuilder::finish).
    pub fn build(name: impl Into<String>) -> super::builder::CommandBuilder {
        super::builder::CommandBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_executable(&self) -> bool {
        self.executable
    }

    pub fn intercepts(&self) -> bool {
        self.has_interceptor
    }

    pub fn separator_strategy(&self) -> SeparatorStrategy {
        self.separator_strategy
    }

    pub fn handler_key(&self) -> Option<&HandlerKey> {
        self.handler.as_ref()
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.name == name)
    }

    /// Match an alias (no dashes) against this command's own options.
    pub fn find_option(&self, alias: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.matches_alias(alias))
    }

    /// The trailing unbounded-arity operand, if declared.
    pub fn unbounded_operand(&self) -> Option<&Operand> {
        self.operands.iter().find(|o| o.def.arity.is_unbounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Arity;

    fn sample() -> Command {
        Command::build("root")
            .option(OptionDef::flag("verbose", 'v'))
            .subcommand(
                Command::build("add")
                    .executable("math")
                    .operand(Operand::new("x", "int"))
                    .operand(Operand::new("rest", "string").arity(Arity::zero_or_more()))
                    .finish()
                    .unwrap(),
            )
            .finish()
            .unwrap()
    }

    #[test]
    fn find_subcommand_by_name() {
        let root = sample();
        assert!(root.find_subcommand("add").is_some());
        assert!(root.find_subcommand("sub").is_none());
    }

    #[test]
    fn find_option_by_any_alias() {
        let root = sample();
        assert!(root.find_option("verbose").is_some());
        assert!(root.find_option("v").is_some());
        assert!(root.find_option("x").is_none());
    }

    #[test]
    fn unbounded_operand_lookup() {
        let root = sample();
        let add = root.find_subcommand("add").unwrap();
        assert_eq!(add.unbounded_operand().unwrap().name(), "rest");
        assert!(root.unbounded_operand().is_none());
    }
}
