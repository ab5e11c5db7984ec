//! Handler resolution and the onion-style invocation chain.
//!
//! Ancestor interceptors run outermost-first; each receives its own bound
//! values and a continuation into the rest of the chain. Instances created
//! here (rather than by an external resolver) are tracked and disposed in
//! creation order once the whole pipeline has unwound.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::cancellation::CancelToken;
use crate::error::exit_code;
use crate::model::{Command, HandlerKey, TypedValue};
use crate::parse::{ParseResult, StepKind};

/// A command or interceptor implementation.
///
/// One handler unit may serve several commands; an interceptor and a target
/// sharing a [`HandlerKey`] receive the same instance, so state written by
/// `intercept` is visible to `execute`. Methods take `&self`: handlers that
/// carry cross-call state use interior mutability.
pub trait CommandHandler {
    /// Run the target command.
    fn execute(&self, invocation: &Invocation<'_, '_>) -> anyhow::Result<i32>;

    /// Wrap descendant execution. The default continues straight through.
    fn intercept(
        &self,
        invocation: &Invocation<'_, '_>,
        next: NextStep<'_, '_>,
    ) -> anyhow::Result<i32> {
        let _ = invocation;
        next.call()
    }

    /// Release held resources. Must be idempotent; failures are logged and
    /// never stop other disposals.
    fn dispose(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Resolves handler instances from an external container.
pub trait InstanceResolver {
    fn try_resolve(&self, key: &HandlerKey) -> Option<Rc<dyn CommandHandler>>;
}

/// The in-process fallback: constructor functions registered per key.
#[derive(Default)]
pub struct FactoryResolver {
    factories: HashMap<String, Box<dyn Fn() -> Rc<dyn CommandHandler>>>,
}

impl FactoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: impl Into<HandlerKey>,
        factory: impl Fn() -> Rc<dyn CommandHandler> + 'static,
    ) {
        self.factories
            .insert(key.into().as_str().to_string(), Box::new(factory));
    }

    pub fn contains(&self, key: &HandlerKey) -> bool {
        self.factories.contains_key(key.as_str())
    }

    pub fn create(&self, key: &HandlerKey) -> Option<Rc<dyn CommandHandler>> {
        self.factories.get(key.as_str()).map(|f| f())
    }
}

/// One bound parameter of an invocation step.
#[derive(Debug, Clone)]
pub struct BoundParam {
    pub name: String,
    pub values: Vec<TypedValue>,
}

/// An invocation step with its instance and bound values in place.
pub struct ResolvedStep<'a> {
    pub(crate) command: &'a Command,
    pub(crate) kind: StepKind,
    pub(crate) handler: Rc<dyn CommandHandler>,
    pub(crate) params: Vec<BoundParam>,
    pub(crate) separated: Vec<String>,
}

/// What a handler sees of its step: the command, its bound values, and the
/// run's cancellation token.
pub struct Invocation<'s, 'a> {
    step: &'s ResolvedStep<'a>,
    cancel: &'s CancelToken,
}

impl<'s, 'a> Invocation<'s, 'a> {
    pub fn command(&self) -> &'a Command {
        self.step.command
    }

    pub fn params(&self) -> &'s [BoundParam] {
        &self.step.params
    }

    pub fn values(&self, name: &str) -> Option<&'s [TypedValue]> {
        self.step
            .params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.values.as_slice())
    }

    /// First value of `name`, rendered as a string.
    pub fn string(&self, name: &str) -> Option<String> {
        self.values(name)?.first().map(ToString::to_string)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.values(name)?.first().and_then(TypedValue::as_int)
    }

    /// A boolean flag's presence; absent means false.
    pub fn flag(&self, name: &str) -> bool {
        self.values(name)
            .and_then(|v| v.first())
            .and_then(TypedValue::as_bool)
            .unwrap_or(false)
    }

    /// Tokens after `--` under the pass-through strategy; target step only.
    pub fn separated(&self) -> &'s [String] {
        &self.step.separated
    }

    pub fn cancellation(&self) -> &'s CancelToken {
        self.cancel
    }
}

/// Continuation into the remaining steps of the invocation pipeline.
/// Dropping it without calling short-circuits the rest of the chain.
pub struct NextStep<'s, 'a> {
    steps: &'s [ResolvedStep<'a>],
    index: usize,
    cancel: &'s CancelToken,
}

impl NextStep<'_, '_> {
    pub fn call(self) -> anyhow::Result<i32> {
        invoke_from(self.steps, self.index, self.cancel)
    }
}

/// Run the resolved steps outermost-first.
pub(crate) fn run_invocation(
    steps: &[ResolvedStep<'_>],
    cancel: &CancelToken,
) -> anyhow::Result<i32> {
    invoke_from(steps, 0, cancel)
}

fn invoke_from(
    steps: &[ResolvedStep<'_>],
    index: usize,
    cancel: &CancelToken,
) -> anyhow::Result<i32> {
    if cancel.is_cancelled() {
        return Ok(exit_code::SUCCESS);
    }
    let Some(step) = steps.get(index) else {
        return Ok(exit_code::SUCCESS);
    };
    let invocation = Invocation { step, cancel };
    match step.kind {
        StepKind::Interceptor => {
            tracing::debug!(command = %step.command.name(), "entering interceptor");
            step.handler.intercept(
                &invocation,
                NextStep {
                    steps,
                    index: index + 1,
                    cancel,
                },
            )
        }
        StepKind::Target => {
            tracing::debug!(command = %step.command.name(), "invoking target");
            step.handler.execute(&invocation)
        }
    }
}

/// Resolve an instance per step, reusing one instance per handler key and
/// recording framework-created instances into `created` for disposal.
pub(crate) fn resolve_steps<'a>(
    result: &ParseResult<'a>,
    external: Option<&dyn InstanceResolver>,
    factories: &FactoryResolver,
    created: &RefCell<Vec<Rc<dyn CommandHandler>>>,
) -> anyhow::Result<Vec<ResolvedStep<'a>>> {
    let mut cache: HashMap<HandlerKey, Rc<dyn CommandHandler>> = HashMap::new();
    let mut steps = Vec::with_capacity(result.steps().len());

    for (index, step) in result.steps().iter().enumerate() {
        let key = step.command.handler_key().ok_or_else(|| {
            anyhow::anyhow!("command '{}' has no handler", step.command.name())
        })?;
        let handler = match cache.get(key) {
            Some(handler) => handler.clone(),
            None => {
                let handler = match external.and_then(|r| r.try_resolve(key)) {
                    Some(handler) => handler,
                    None => {
                        let handler = factories.create(key).ok_or_else(|| {
                            anyhow::anyhow!("no factory registered for handler '{key}'")
                        })?;
                        created.borrow_mut().push(handler.clone());
                        tracing::debug!(handler = %key, "instance created");
                        handler
                    }
                };
                cache.insert(key.clone(), handler.clone());
                handler
            }
        };

        let params = result
            .bindings()
            .iter()
            .filter(|b| b.step() == Some(index))
            .map(|b| BoundParam {
                name: b.arg().name().to_string(),
                values: b.value().map(<[_]>::to_vec).unwrap_or_default(),
            })
            .collect();
        let separated = match step.kind {
            StepKind::Target => result.separated().iter().map(|t| t.raw().to_string()).collect(),
            StepKind::Interceptor => Vec::new(),
        };

        steps.push(ResolvedStep {
            command: step.command,
            kind: step.kind,
            handler,
            params,
            separated,
        });
    }
    Ok(steps)
}

/// Dispose created instances in creation order. Each failure is logged and
/// the rest are still attempted; draining makes a second call a no-op.
pub(crate) fn dispose_created(created: &RefCell<Vec<Rc<dyn CommandHandler>>>) {
    for handler in created.borrow_mut().drain(..) {
        if let Err(error) = handler.dispose() {
            tracing::warn!(%error, "handler disposal failed");
        }
    }
}
