//! The resolved middleware chain.
//!
//! Middleware compose right to left into one continuation chain: the
//! first-registered step in the earliest stage runs outermost. The chain
//! observes cancellation between hops and stops with a success code.

use crate::error::exit_code;

use super::context::RunContext;
use super::stage::MiddlewareStep;

pub struct Chain {
    steps: Vec<MiddlewareStep>,
    validate_stages: bool,
}

impl Chain {
    pub(crate) fn new(steps: Vec<MiddlewareStep>, validate_stages: bool) -> Self {
        Self {
            steps,
            validate_stages,
        }
    }

    pub fn run(&self, ctx: &mut RunContext<'_>) -> anyhow::Result<i32> {
        self.run_from(ctx, 0)
    }

    pub(crate) fn run_from(&self, ctx: &mut RunContext<'_>, index: usize) -> anyhow::Result<i32> {
        if ctx.cancellation.is_cancelled() {
            tracing::debug!("run cancelled between middleware");
            return Ok(exit_code::SUCCESS);
        }
        let Some(step) = self.steps.get(index) else {
            return Ok(exit_code::SUCCESS);
        };
        if self.validate_stages && index > 0 {
            let previous = self.steps[index - 1].stage;
            if previous != step.stage {
                ctx.validate_stage_exit(previous)?;
            }
        }
        tracing::trace!(middleware = %step.name, stage = %step.stage, "middleware hop");
        (step.func)(
            ctx,
            Next {
                chain: self,
                index: index + 1,
            },
        )
    }

    #[cfg(test)]
    pub(crate) fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Continuation into the rest of the chain. A middleware that never calls
/// [`Next::run`] short-circuits everything after it.
pub struct Next<'c> {
    chain: &'c Chain,
    index: usize,
}

impl Next<'_> {
    pub fn run(self, ctx: &mut RunContext<'_>) -> anyhow::Result<i32> {
        self.chain.run_from(ctx, self.index)
    }
}
