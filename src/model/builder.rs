//! Command construction and tree validation.
//!
//! Alias collisions, operand-arity misdeclarations, and missing handlers
//! are configuration errors: they fail `finish()` or the app build, never a
//! parse.

use std::collections::HashSet;

use crate::error::ConfigError;

use super::argument::{Operand, OptionDef};
use super::command::{Command, HandlerKey, SeparatorStrategy};

/// Builder for one command node.
pub struct CommandBuilder {
    command: Command,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            command: Command {
                name: name.into(),
                description: None,
                executable: false,
                has_interceptor: false,
                ignore_unexpected_operands: false,
                separator_strategy: SeparatorStrategy::default(),
                handler: None,
                operands: Vec::new(),
                options: Vec::new(),
                subcommands: Vec::new(),
            },
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.command.description = Some(text.into());
        self
    }

    /// Mark executable, naming the handler unit that carries its method.
    pub fn executable(mut self, handler: impl Into<HandlerKey>) -> Self {
        self.command.executable = true;
        self.command.handler = Some(handler.into());
        self
    }

    /// Attach an interceptor that wraps descendants' execution.
    pub fn interceptor(mut self, handler: impl Into<HandlerKey>) -> Self {
        self.command.has_interceptor = true;
        if self.command.handler.is_none() {
            self.command.handler = Some(handler.into());
        }
        self
    }

    /// Collect surplus positional values instead of failing the parse.
    pub fn ignore_unexpected_operands(mut self) -> Self {
        self.command.ignore_unexpected_operands = true;
        self
    }

    pub fn separator_strategy(mut self, strategy: SeparatorStrategy) -> Self {
        self.command.separator_strategy = strategy;
        self
    }

    pub fn operand(mut self, operand: Operand) -> Self {
        self.command.operands.push(operand);
        self
    }

    pub fn option(mut self, option: OptionDef) -> Self {
        self.command.options.push(option);
        self
    }

    pub fn subcommand(mut self, command: Command) -> Self {
        self.command.subcommands.push(command);
        self
    }

    /// Validate this node's own declarations and produce the command.
    ///
    /// Cross-level rules (inherited-alias collisions, handler coverage) run
    /// in [`validate_tree`] once the whole tree exists.
    pub fn finish(self) -> Result<Command, ConfigError> {
        let command = self.command;

        if command.name.trim().is_empty() {
            return Err(ConfigError::EmptyName { kind: "command" });
        }
        for operand in &command.operands {
            if operand.def.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { kind: "operand" });
            }
        }
        for option in &command.options {
            if option.def.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { kind: "option" });
            }
        }

        check_own_aliases(&command, &HashSet::new())?;
        check_operand_arities(&command)?;
        Ok(command)
    }
}

/// Validate a whole tree: alias uniqueness including inherited options,
/// inherited options sitting on intercepting commands, and handler keys on
/// every executable or intercepting node.
pub fn validate_tree(root: &Command) -> Result<(), ConfigError> {
    validate_node(root, &[])
}

fn validate_node<'a>(
    command: &'a Command,
    inherited: &[&'a OptionDef],
) -> Result<(), ConfigError> {
    let inherited_aliases: HashSet<String> = inherited
        .iter()
        .flat_map(|o| o.aliases())
        .collect();
    check_own_aliases(command, &inherited_aliases)?;
    check_operand_arities(command)?;

    for option in &command.options {
        if option.inherited && !command.has_interceptor {
            return Err(ConfigError::InheritedWithoutInterceptor {
                command: command.name.clone(),
                option: option.def.name.clone(),
            });
        }
    }
    if (command.executable || command.has_interceptor) && command.handler.is_none() {
        return Err(ConfigError::MissingHandlerKey {
            command: command.name.clone(),
        });
    }

    let mut next: Vec<&OptionDef> = inherited.to_vec();
    next.extend(command.options.iter().filter(|o| o.inherited));
    for sub in &command.subcommands {
        validate_node(sub, &next)?;
    }
    Ok(())
}

/// Every alias of a command's own arguments must be unique, both among
/// themselves and against whatever the ancestors pass down.
fn check_own_aliases(command: &Command, inherited: &HashSet<String>) -> Result<(), ConfigError> {
    let mut seen: HashSet<String> = HashSet::new();
    let own = command
        .operands
        .iter()
        .map(|o| o.def.name.clone())
        .chain(command.options.iter().flat_map(|o| o.aliases()));
    for alias in own {
        if inherited.contains(&alias) || !seen.insert(alias.clone()) {
            return Err(ConfigError::DuplicateAlias {
                command: command.name.clone(),
                alias,
            });
        }
    }
    Ok(())
}

fn check_operand_arities(command: &Command) -> Result<(), ConfigError> {
    let unbounded: Vec<usize> = command
        .operands
        .iter()
        .enumerate()
        .filter(|(_, o)| o.def.arity.is_unbounded())
        .map(|(i, _)| i)
        .collect();
    if unbounded.len() > 1 {
        return Err(ConfigError::MultipleUnboundedOperands {
            command: command.name.clone(),
        });
    }
    if let Some(&index) = unbounded.first() {
        if index + 1 != command.operands.len() {
            return Err(ConfigError::UnboundedOperandNotLast {
                command: command.name.clone(),
                operand: command.operands[index].def.name.clone(),
            });
        }
    }
    Ok(())
}
