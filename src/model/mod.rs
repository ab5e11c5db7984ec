//! Command and argument data model.
//!
//! Host applications declare a tree of [`Command`] nodes carrying typed
//! [`Operand`]s and [`OptionDef`]s; the framework validates the tree once
//! at build time and treats it as read-only for every run.

mod argument;
mod arity;
pub(crate) mod builder;
mod command;
mod typed;

pub use argument::{
    ArgumentDef, BooleanMode, DefaultValue, InputSource, InputValue, Operand, OptionDef,
};
pub use arity::Arity;
pub use builder::{validate_tree, CommandBuilder};
pub use command::{Command, HandlerKey, SeparatorStrategy};
pub use typed::{ParserRegistry, TypedValue, ValueParser};
