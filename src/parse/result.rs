//! Parse output: the resolved command, its invocation steps, and per-run
//! argument state.

use crate::error::ParseError;
use crate::model::{
    Arity, BooleanMode, Command, DefaultValue, InputValue, Operand, OptionDef, TypedValue,
};
use crate::token::Token;

/// Which role a step plays in the invocation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// An ancestor's wrapping logic, outermost first.
    Interceptor,
    /// The resolved command itself. Exactly one per pipeline.
    Target,
}

/// A reference to either kind of argument definition.
#[derive(Debug, Clone, Copy)]
pub enum ArgRef<'a> {
    Operand(&'a Operand),
    Option(&'a OptionDef),
}

impl<'a> ArgRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ArgRef::Operand(o) => &o.def.name,
            ArgRef::Option(o) => &o.def.name,
        }
    }

    pub fn value_type(&self) -> &'a str {
        match self {
            ArgRef::Operand(o) => &o.def.value_type,
            ArgRef::Option(o) => &o.def.value_type,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            ArgRef::Operand(o) => o.def.arity,
            ArgRef::Option(o) => o.def.arity,
        }
    }

    pub fn split_char(&self) -> Option<char> {
        match self {
            ArgRef::Operand(o) => o.def.split_char,
            ArgRef::Option(o) => o.def.split_char,
        }
    }

    pub fn is_obscured(&self) -> bool {
        match self {
            ArgRef::Operand(o) => o.def.obscured,
            ArgRef::Option(o) => o.def.obscured,
        }
    }

    pub fn declared_default(&self) -> Option<&'a DefaultValue> {
        match self {
            ArgRef::Operand(o) => o.def.default.as_ref(),
            ArgRef::Option(o) => o.def.default.as_ref(),
        }
    }

    pub fn env_key(&self) -> Option<&'a str> {
        match self {
            ArgRef::Operand(o) => o.def.env_key.as_deref(),
            ArgRef::Option(o) => o.def.env_key.as_deref(),
        }
    }

    pub fn setting_key(&self) -> Option<&'a str> {
        match self {
            ArgRef::Operand(o) => o.def.setting_key.as_deref(),
            ArgRef::Option(o) => o.def.setting_key.as_deref(),
        }
    }

    /// Presence-only boolean flags are exempt from arity count checks.
    pub fn is_implicit_bool(&self) -> bool {
        match self {
            ArgRef::Operand(_) => false,
            ArgRef::Option(o) => o.is_flag(),
        }
    }

    pub fn boolean_mode(&self) -> BooleanMode {
        match self {
            ArgRef::Operand(o) => o.def.boolean_mode,
            ArgRef::Option(o) => o.def.boolean_mode,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ArgRef::Operand(_) => "operand",
            ArgRef::Option(_) => "option",
        }
    }
}

/// Per-run state of one argument: inputs collected by the parser, the
/// default that would apply, and the typed value once bound. Owned by the
/// run, never by the command tree.
#[derive(Debug)]
pub struct ArgumentBinding<'a> {
    pub(crate) arg: ArgRef<'a>,
    pub(crate) step: Option<usize>,
    pub(crate) inputs: Vec<InputValue>,
    pub(crate) traces: Vec<String>,
    pub(crate) resolved_default: Option<DefaultValue>,
    pub(crate) value: Option<Vec<TypedValue>>,
    pub(crate) default_label: Option<&'static str>,
}

impl<'a> ArgumentBinding<'a> {
    pub(crate) fn new(arg: ArgRef<'a>, step: Option<usize>) -> Self {
        Self {
            arg,
            step,
            inputs: Vec::new(),
            traces: Vec::new(),
            resolved_default: None,
            value: None,
            default_label: None,
        }
    }

    pub(crate) fn push_input(&mut self, input: InputValue, trace: String) {
        self.inputs.push(input);
        self.traces.push(trace);
    }

    pub fn arg(&self) -> &ArgRef<'a> {
        &self.arg
    }

    pub fn step(&self) -> Option<usize> {
        self.step
    }

    pub fn inputs(&self) -> &[InputValue] {
        &self.inputs
    }

    /// Raw-form traces aligned with [`Self::inputs`].
    pub fn traces(&self) -> &[String] {
        &self.traces
    }

    pub fn value(&self) -> Option<&[TypedValue]> {
        self.value.as_deref()
    }

    /// The source label of the default that produced the bound value, when
    /// no input was supplied.
    pub fn default_label(&self) -> Option<&'static str> {
        self.default_label
    }

    /// The default that applies to this argument: a provider-resolved one
    /// wins over the declared one.
    pub fn effective_default(&self) -> Option<&DefaultValue> {
        self.resolved_default
            .as_ref()
            .or_else(|| self.arg.declared_default())
    }
}

/// One step of the invocation pipeline, known from parse time on.
#[derive(Debug, Clone, Copy)]
pub struct InvocationStep<'a> {
    pub command: &'a Command,
    pub kind: StepKind,
}

/// Everything the parser learned from one token stream. Created once per
/// run; the binder fills the value slots of its bindings.
#[derive(Debug)]
pub struct ParseResult<'a> {
    pub(crate) target: &'a Command,
    pub(crate) path: Vec<&'a Command>,
    pub(crate) steps: Vec<InvocationStep<'a>>,
    pub(crate) bindings: Vec<ArgumentBinding<'a>>,
    pub(crate) error: Option<ParseError>,
    pub(crate) unrecognized: Vec<Token>,
    pub(crate) separated: Vec<Token>,
}

impl<'a> ParseResult<'a> {
    pub fn target(&self) -> &'a Command {
        self.target
    }

    /// Root-to-target command chain.
    pub fn path(&self) -> &[&'a Command] {
        &self.path
    }

    pub fn steps(&self) -> &[InvocationStep<'a>] {
        &self.steps
    }

    pub fn bindings(&self) -> &[ArgumentBinding<'a>] {
        &self.bindings
    }

    pub(crate) fn bindings_mut(&mut self) -> &mut [ArgumentBinding<'a>] {
        &mut self.bindings
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Surplus positional tokens collected under
    /// `ignore_unexpected_operands`, plus anything left after a parse error.
    pub fn unrecognized(&self) -> &[Token] {
        &self.unrecognized
    }

    /// Tokens after `--` under the pass-through strategy.
    pub fn separated(&self) -> &[Token] {
        &self.separated
    }

    /// Find a binding by argument name. Names are unique along one path,
    /// so this is unambiguous for a single parse.
    pub fn binding(&self, name: &str) -> Option<&ArgumentBinding<'a>> {
        self.bindings.iter().find(|b| b.arg.name() == name)
    }

    /// Append values from a non-argv source to the target's unbounded
    /// operand. Returns false when the target declares none.
    pub(crate) fn append_to_unbounded_operand(
        &mut self,
        source: crate::model::InputSource,
        values: Vec<String>,
    ) -> bool {
        let Some(operand) = self.target.unbounded_operand() else {
            return false;
        };
        let trace = values.join(" ");
        let binding = self
            .bindings
            .iter_mut()
            .find(|b| matches!(b.arg, ArgRef::Operand(o) if std::ptr::eq(o, operand)));
        match binding {
            Some(binding) => {
                binding.push_input(InputValue::new(source, values), trace);
                true
            }
            None => false,
        }
    }
}
