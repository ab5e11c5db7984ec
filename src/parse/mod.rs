//! Command resolution: token stream in, parse result out.

mod parser;
mod result;

pub use parser::parse;
pub use result::{ArgRef, ArgumentBinding, InvocationStep, ParseResult, StepKind};
