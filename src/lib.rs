//! Turn a declared command tree into a working command-line interface.
//!
//! argflow tokenizes raw process arguments, resolves the target command
//! through nested subcommands, binds string tokens to typed values, and
//! drives execution through a staged middleware pipeline:
//!
//! ```text
//! args → tokenize → transform → resolve → bind → invoke → exit code
//! ```
//!
//! Hosts declare commands with [`Command::build`], register handlers and
//! middleware on an [`AppBuilder`], then call [`App::run`] per invocation.
//! Every token carries a provenance chain back to the exact input the user
//! typed; parse and binding problems are collected, not thrown, and map to
//! a distinct validation exit code.

mod app;
pub mod bind;
pub mod cancellation;
pub mod directive;
pub mod error;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod token;

pub use app::{App, AppBuilder};
pub use error::exit_code;
pub use model::{
    Arity, BooleanMode, Command, HandlerKey, Operand, OptionDef, SeparatorStrategy, TypedValue,
};
pub use pipeline::{CommandHandler, Invocation, NextStep, RunContext, Stage};
