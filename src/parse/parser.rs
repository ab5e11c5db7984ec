//! Token stream to resolved command and raw argument assignments.
//!
//! The walk is greedy, depth-first, and leftmost: a value token matching a
//! subcommand name descends and never backtracks. The first value that
//! matches no subcommand ends descension for the rest of the input.

use crate::error::ParseError;
use crate::model::{Command, InputSource, InputValue, OptionDef, SeparatorStrategy};
use crate::token::{Token, TokenCollection, TokenType};

use super::result::{ArgRef, ArgumentBinding, InvocationStep, ParseResult, StepKind};

/// Resolve `tokens` against `root` and assign raw values.
///
/// User-input problems land in [`ParseResult::error`]; this function itself
/// never fails, so diagnostics can render whatever was understood.
pub fn parse<'a>(tokens: &TokenCollection, root: &'a Command) -> ParseResult<'a> {
    Walker::new(root).walk(tokens)
}

/// One matched option occurrence, waiting for binding assembly.
struct PendingInput<'a> {
    option: &'a OptionDef,
    input: InputValue,
    trace: String,
}

struct Walker<'a> {
    path: Vec<&'a Command>,
    descending: bool,
    after_separator: bool,
    separator_strategy: SeparatorStrategy,
    operand_idx: usize,
    operand_fill: usize,
    operand_assignments: Vec<(usize, Token)>,
    pending: Vec<PendingInput<'a>>,
    unrecognized: Vec<Token>,
    separated: Vec<Token>,
    error: Option<ParseError>,
}

impl<'a> Walker<'a> {
    fn new(root: &'a Command) -> Self {
        Self {
            path: vec![root],
            descending: true,
            after_separator: false,
            separator_strategy: SeparatorStrategy::default(),
            operand_idx: 0,
            operand_fill: 0,
            operand_assignments: Vec::new(),
            pending: Vec::new(),
            unrecognized: Vec::new(),
            separated: Vec::new(),
            error: None,
        }
    }

    fn current(&self) -> &'a Command {
        self.path.last().copied().expect("path starts at root")
    }

    fn walk(mut self, tokens: &TokenCollection) -> ParseResult<'a> {
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens.get(i).expect("index checked");
            i += 1;

            if self.after_separator {
                match self.separator_strategy {
                    SeparatorStrategy::PassThru => self.separated.push(token.clone()),
                    SeparatorStrategy::EndOfOptions => self.assign_positional(token),
                }
            } else {
                match token.token_type() {
                    TokenType::Separator => {
                        self.after_separator = true;
                        self.descending = false;
                        self.separator_strategy = self.current().separator_strategy();
                    }
                    TokenType::Option => i = self.consume_option(token, tokens, i),
                    TokenType::Value | TokenType::Directive => self.consume_value(token),
                }
            }

            if self.error.is_some() {
                // Sweep up whatever was not processed, offending token first.
                self.unrecognized.push(token.clone());
                while let Some(rest) = tokens.get(i) {
                    self.unrecognized.push(rest.clone());
                    i += 1;
                }
                break;
            }
        }
        self.finish()
    }

    /// Match an option token and consume its values. Returns the next
    /// unread token index.
    fn consume_option(&mut self, token: &Token, tokens: &TokenCollection, mut i: usize) -> usize {
        let alias = token.option_alias().unwrap_or_default();
        let Some(option) = self.find_visible_option(alias) else {
            self.error = Some(ParseError::UnrecognizedOption {
                alias: token.raw().to_string(),
                suggestion: self.suggest_option(alias),
            });
            return i;
        };

        if option.is_flag() {
            self.pending.push(PendingInput {
                option,
                input: InputValue::single(source_of(token), "true"),
                trace: token.trace(),
            });
            return i;
        }

        if option.def.arity.is_unbounded() {
            let mut values = Vec::new();
            let mut traces = Vec::new();
            while let Some(next) = tokens.get(i) {
                if next.token_type() != TokenType::Value {
                    break;
                }
                if self.descending && self.current().find_subcommand(next.raw()).is_some() {
                    break;
                }
                values.push(next.raw().to_string());
                traces.push(next.trace());
                i += 1;
            }
            let source = tokens
                .get(i.saturating_sub(1))
                .map(source_of)
                .unwrap_or(InputSource::Argv);
            self.pending.push(PendingInput {
                option,
                input: InputValue::new(source, values),
                trace: traces.join(" "),
            });
            return i;
        }

        match tokens.get(i) {
            Some(next) if next.token_type() == TokenType::Value => {
                self.pending.push(PendingInput {
                    option,
                    input: InputValue::single(source_of(next), next.raw()),
                    trace: next.trace(),
                });
                i + 1
            }
            _ => {
                self.error = Some(ParseError::MissingOptionValue {
                    alias: token.raw().to_string(),
                });
                i
            }
        }
    }

    /// A value token: subcommand descension while it is still open,
    /// positional assignment afterwards.
    fn consume_value(&mut self, token: &Token) {
        if self.descending {
            if let Some(sub) = self.current().find_subcommand(token.raw()) {
                tracing::debug!(command = %sub.name(), "descended into subcommand");
                self.path.push(sub);
                return;
            }
            self.descending = false;
        }
        self.assign_positional(token);
    }

    fn assign_positional(&mut self, token: &Token) {
        let target = self.current();
        loop {
            match target.operands().get(self.operand_idx) {
                Some(operand) if operand.def.arity.is_unbounded() => {
                    self.operand_assignments.push((self.operand_idx, token.clone()));
                    return;
                }
                Some(operand) => {
                    let max = operand.def.arity.max().unwrap_or(0);
                    if self.operand_fill < max {
                        self.operand_assignments.push((self.operand_idx, token.clone()));
                        self.operand_fill += 1;
                        if self.operand_fill == max {
                            self.operand_idx += 1;
                            self.operand_fill = 0;
                        }
                        return;
                    }
                    self.operand_idx += 1;
                    self.operand_fill = 0;
                }
                None => {
                    if target.ignore_unexpected_operands {
                        self.unrecognized.push(token.clone());
                    } else {
                        self.error = Some(ParseError::UnexpectedValue {
                            raw: token.raw().to_string(),
                            suggestion: suggest(
                                token.raw(),
                                target.subcommands().iter().map(|c| c.name().to_string()),
                            ),
                        });
                    }
                    return;
                }
            }
        }
    }

    /// The option set visible here: the current command's own options plus
    /// everything marked inherited on ancestors.
    fn find_visible_option(&self, alias: &str) -> Option<&'a OptionDef> {
        if let Some(option) = self.current().find_option(alias) {
            return Some(option);
        }
        self.path[..self.path.len() - 1]
            .iter()
            .rev()
            .flat_map(|c| c.options())
            .find(|o| o.is_inherited() && o.matches_alias(alias))
    }

    fn suggest_option(&self, alias: &str) -> Option<String> {
        let visible = self
            .current()
            .options()
            .iter()
            .chain(
                self.path[..self.path.len() - 1]
                    .iter()
                    .flat_map(|c| c.options())
                    .filter(|o| o.is_inherited()),
            )
            .map(|o| o.name().to_string());
        suggest(alias, visible).map(|name| {
            if name.chars().count() == 1 {
                format!("-{name}")
            } else {
                format!("--{name}")
            }
        })
    }

    fn finish(mut self) -> ParseResult<'a> {
        let target = self.current();
        if self.error.is_none() && !target.is_executable() {
            self.error = Some(ParseError::NotExecutable {
                command: target.name().to_string(),
            });
        }

        let mut steps = Vec::new();
        for &command in &self.path[..self.path.len() - 1] {
            if command.intercepts() {
                steps.push(InvocationStep {
                    command,
                    kind: StepKind::Interceptor,
                });
            }
        }
        steps.push(InvocationStep {
            command: target,
            kind: StepKind::Target,
        });

        let mut bindings: Vec<ArgumentBinding<'a>> = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            match step.kind {
                StepKind::Interceptor => {
                    for option in step.command.options() {
                        if option.interceptor || option.inherited {
                            bindings.push(ArgumentBinding::new(ArgRef::Option(option), Some(index)));
                        }
                    }
                }
                StepKind::Target => {
                    for operand in step.command.operands() {
                        bindings.push(ArgumentBinding::new(ArgRef::Operand(operand), Some(index)));
                    }
                    for option in step.command.options() {
                        bindings.push(ArgumentBinding::new(ArgRef::Option(option), Some(index)));
                    }
                }
            }
        }

        for (operand_idx, token) in std::mem::take(&mut self.operand_assignments) {
            let operand = &target.operands()[operand_idx];
            let binding = bindings
                .iter_mut()
                .find(|b| matches!(b.arg, ArgRef::Operand(o) if std::ptr::eq(o, operand)))
                .expect("target operands are pre-bound");
            binding.push_input(
                InputValue::single(source_of(&token), token.raw()),
                token.trace(),
            );
        }

        for pending in std::mem::take(&mut self.pending) {
            let existing = bindings
                .iter_mut()
                .find(|b| matches!(b.arg, ArgRef::Option(o) if std::ptr::eq(o, pending.option)));
            match existing {
                Some(binding) => binding.push_input(pending.input, pending.trace),
                None => {
                    // Matched on an ancestor that contributes no step; keep
                    // the value so binding and diagnostics still see it.
                    let mut binding = ArgumentBinding::new(ArgRef::Option(pending.option), None);
                    binding.push_input(pending.input, pending.trace);
                    bindings.push(binding);
                }
            }
        }

        tracing::debug!(
            target = %target.name(),
            steps = steps.len(),
            error = ?self.error,
            "parse finished"
        );

        ParseResult {
            target,
            path: self.path,
            steps,
            bindings,
            error: self.error,
            unrecognized: self.unrecognized,
            separated: self.separated,
        }
    }
}

fn source_of(token: &Token) -> InputSource {
    if token.passed_through("expand-response-files") {
        InputSource::ResponseFile
    } else {
        InputSource::Argv
    }
}

/// Closest candidate within a small edit distance, for "did you mean".
fn suggest(input: &str, candidates: impl Iterator<Item = String>) -> Option<String> {
    candidates
        .map(|c| (edit_distance(input, &c), c))
        .filter(|(d, _)| *d > 0 && *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
