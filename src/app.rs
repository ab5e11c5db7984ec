//! App assembly: configure once, run many times.
//!
//! The builder validates the command tree, type coverage, and handler
//! coverage up front, then resolves the middleware chain a single time.
//! Each [`App::run`] call is an independent run with its own context and
//! cancellation scope.

use std::rc::Rc;
use std::sync::Arc;

use crate::bind::{DefaultSource, PipedInput};
use crate::cancellation::{install_interrupt_handler, CancelStack};
use crate::error::{exit_code, ConfigError};
use crate::model::{validate_tree, Command, HandlerKey, ParserRegistry, ValueParser};
use crate::pipeline::builtin::register_builtins;
use crate::pipeline::{
    dispose_created, AppServices, Chain, CommandHandler, FactoryResolver, InstanceResolver,
    MiddlewareRegistry, Next, RunContext, Stage,
};
use crate::token::{default_transformations, TokenTransformation};

/// Configures an [`App`]. Start with [`App::builder`].
pub struct AppBuilder {
    root: Command,
    registry: ParserRegistry,
    transformations: Vec<TokenTransformation>,
    sources: Vec<Box<dyn DefaultSource>>,
    factories: FactoryResolver,
    external: Option<Box<dyn InstanceResolver>>,
    middleware: MiddlewareRegistry,
    sink: Box<dyn Fn(&str)>,
    piped: Option<Box<dyn PipedInput>>,
    validate_stages: bool,
}

impl AppBuilder {
    pub fn new(root: Command) -> Self {
        let mut middleware = MiddlewareRegistry::new();
        register_builtins(&mut middleware);
        Self {
            root,
            registry: ParserRegistry::with_builtins(),
            transformations: default_transformations(),
            sources: Vec::new(),
            factories: FactoryResolver::new(),
            external: None,
            middleware,
            sink: Box::new(|text| println!("{text}")),
            piped: None,
            validate_stages: cfg!(debug_assertions),
        }
    }

    pub fn value_parser(mut self, parser: Box<dyn ValueParser>) -> Self {
        self.registry.register(parser);
        self
    }

    /// Register the constructor for one handler unit.
    pub fn handler(
        mut self,
        key: impl Into<HandlerKey>,
        factory: impl Fn() -> Rc<dyn CommandHandler> + 'static,
    ) -> Self {
        self.factories.register(key, factory);
        self
    }

    /// An external resolver consulted before the registered factories.
    /// Instances it supplies are never disposed by the framework.
    pub fn resolver(mut self, resolver: Box<dyn InstanceResolver>) -> Self {
        self.external = Some(resolver);
        self
    }

    /// Default sources are consulted in registration order.
    pub fn default_source(mut self, source: Box<dyn DefaultSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn transformation(mut self, transformation: TokenTransformation) -> Self {
        self.transformations.push(transformation);
        self
    }

    pub fn middleware(
        mut self,
        name: impl Into<String>,
        stage: Stage,
        order: i32,
        func: impl Fn(&mut RunContext<'_>, Next<'_>) -> anyhow::Result<i32> + 'static,
    ) -> Self {
        self.middleware.register(name, stage, order, func);
        self
    }

    /// Where user-facing output lines go; defaults to stdout.
    pub fn output(mut self, sink: impl Fn(&str) + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Enable appending piped stdin to the target's unbounded operand.
    pub fn piped_input(mut self, piped: Box<dyn PipedInput>) -> Self {
        self.piped = Some(piped);
        self
    }

    /// Check stage-boundary guarantees while the chain runs. On by default
    /// in debug builds.
    pub fn validate_stages(mut self, on: bool) -> Self {
        self.validate_stages = on;
        self
    }

    /// Validate everything declarative and resolve the middleware chain.
    pub fn build(self) -> Result<App, ConfigError> {
        validate_tree(&self.root)?;
        validate_types(&self.root, &self.registry)?;
        if self.external.is_none() {
            validate_handlers(&self.root, &self.factories)?;
        }

        let chain = self.middleware.into_chain(self.validate_stages);
        Ok(App {
            root: self.root,
            services: AppServices {
                registry: self.registry,
                transformations: self.transformations,
                sources: self.sources,
                factories: self.factories,
                external: self.external,
                sink: self.sink,
                piped: self.piped,
            },
            chain,
            cancel_stack: Arc::new(CancelStack::new()),
        })
    }
}

fn validate_types(command: &Command, registry: &ParserRegistry) -> Result<(), ConfigError> {
    for operand in command.operands() {
        registry.require(operand.name(), operand.value_type())?;
    }
    for option in command.options() {
        registry.require(option.name(), option.value_type())?;
    }
    for sub in command.subcommands() {
        validate_types(sub, registry)?;
    }
    Ok(())
}

fn validate_handlers(command: &Command, factories: &FactoryResolver) -> Result<(), ConfigError> {
    if let Some(key) = command.handler_key() {
        if !factories.contains(key) {
            return Err(ConfigError::UnresolvableHandler {
                key: key.as_str().to_string(),
            });
        }
    }
    for sub in command.subcommands() {
        validate_handlers(sub, factories)?;
    }
    Ok(())
}

/// A configured application. One instance serves any number of runs,
/// including nested interactive sessions.
pub struct App {
    root: Command,
    services: AppServices,
    chain: Chain,
    cancel_stack: Arc<CancelStack>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("root", &self.root).finish_non_exhaustive()
    }
}

impl App {
    pub fn builder(root: Command) -> AppBuilder {
        AppBuilder::new(root)
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// The cancellation-scope stack; nested sessions share it.
    pub fn cancel_stack(&self) -> Arc<CancelStack> {
        self.cancel_stack.clone()
    }

    /// Route SIGINT to the innermost active run.
    pub fn install_interrupt_handler(&self) -> std::io::Result<()> {
        install_interrupt_handler(self.cancel_stack.clone())
    }

    /// Execute one run and return its exit code. Invocation errors are
    /// reported through the sink and map to the failure code; they never
    /// unwind out of this call.
    pub fn run<I, S>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        tracing::debug!(?args, "run started");

        let token = self.cancel_stack.push();
        let mut ctx = RunContext::new(&self.root, &self.services, args, token);

        // Instances created during the run are released when the chain has
        // fully unwound, in creation order, whether it returned or failed.
        let created = ctx.created.clone();
        let outcome = {
            let _dispose = scopeguard::guard(created, |created| dispose_created(&created));
            self.chain.run(&mut ctx)
        };
        self.cancel_stack.pop();

        match outcome {
            Ok(code) => {
                tracing::debug!(code, "run finished");
                code
            }
            Err(error) => {
                tracing::error!(%error, "run failed");
                ctx.emit(&format!("error: {error}"));
                exit_code::FAILURE
            }
        }
    }
}
