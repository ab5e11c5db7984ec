//! Staged execution: middleware registration, the sorted chain, and the
//! onion-style invocation of interceptors and targets.

pub(crate) mod builtin;
mod chain;
mod context;
mod invoke;
mod stage;

pub(crate) use context::AppServices;
pub(crate) use invoke::dispose_created;

pub use chain::{Chain, Next};
pub use context::RunContext;
pub use invoke::{
    BoundParam, CommandHandler, FactoryResolver, InstanceResolver, Invocation, NextStep,
};
pub use stage::{Middleware, MiddlewareRegistry, Stage};
