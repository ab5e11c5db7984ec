//! Middleware registration against a `(stage, order)` key.

use std::fmt;
use std::sync::Arc;

use super::chain::{Chain, Next};
use super::context::RunContext;

/// The five fixed stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    PreTokenize,
    Tokenize,
    ParseInput,
    BindValues,
    Invoke,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PreTokenize => "PreTokenize",
            Stage::Tokenize => "Tokenize",
            Stage::ParseInput => "ParseInput",
            Stage::BindValues => "BindValues",
            Stage::Invoke => "Invoke",
        };
        f.write_str(name)
    }
}

/// A middleware function: receives the run context and a continuation; may
/// pass through, post-process the exit code, or short-circuit.
pub type Middleware = Arc<dyn Fn(&mut RunContext<'_>, Next<'_>) -> anyhow::Result<i32>>;

pub(crate) struct MiddlewareStep {
    pub(crate) name: String,
    pub(crate) stage: Stage,
    pub(crate) order: i32,
    pub(crate) func: Middleware,
}

/// Collects middleware during configuration; resolved into one sorted
/// chain when the app is built, then reused across runs.
#[derive(Default)]
pub struct MiddlewareRegistry {
    steps: Vec<MiddlewareStep>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        stage: Stage,
        order: i32,
        func: impl Fn(&mut RunContext<'_>, Next<'_>) -> anyhow::Result<i32> + 'static,
    ) {
        self.steps.push(MiddlewareStep {
            name: name.into(),
            stage,
            order,
            func: Arc::new(func),
        });
    }

    /// Stable-sort into the final chain: stage first, order within stage,
    /// registration order as the tiebreak.
    pub(crate) fn into_chain(self, validate_stages: bool) -> Chain {
        let mut steps = self.steps;
        steps.sort_by_key(|s| (s.stage, s.order));
        tracing::debug!(
            middleware = ?steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "middleware chain resolved"
        );
        Chain::new(steps, validate_stages)
    }
}
