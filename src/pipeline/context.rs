//! Per-run shared state threaded through the middleware chain.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bind::{DefaultSource, PipedInput};
use crate::cancellation::CancelToken;
use crate::directive::DirectiveSet;
use crate::error::BindingError;
use crate::model::{Command, ParserRegistry};
use crate::parse::ParseResult;
use crate::token::{TokenCollection, TokenTransformation, TransformationLog};

use super::invoke::{CommandHandler, FactoryResolver, InstanceResolver, ResolvedStep};
use super::stage::Stage;

/// Everything configured once per app and shared read-only by every run.
pub(crate) struct AppServices {
    pub(crate) registry: ParserRegistry,
    pub(crate) transformations: Vec<TokenTransformation>,
    pub(crate) sources: Vec<Box<dyn DefaultSource>>,
    pub(crate) factories: FactoryResolver,
    pub(crate) external: Option<Box<dyn InstanceResolver>>,
    pub(crate) sink: Box<dyn Fn(&str)>,
    pub(crate) piped: Option<Box<dyn PipedInput>>,
}

/// State owned by exactly one run. Middleware reads and advances it stage
/// by stage; nothing here is shared across concurrent runs.
pub struct RunContext<'a> {
    /// The argument vector as received, before directive stripping.
    pub original_args: Vec<String>,
    /// Arguments remaining after directives were stripped.
    pub effective_args: Vec<String>,
    pub directives: DirectiveSet,
    /// First-pass tokens, set during PreTokenize.
    pub tokens: Option<TokenCollection>,
    pub transform_log: TransformationLog,
    /// Set once the Tokenize stage has applied every transformation.
    pub transforms_applied: bool,
    pub parse_result: Option<ParseResult<'a>>,
    pub binding_errors: Vec<BindingError>,
    pub(crate) resolved_steps: Vec<ResolvedStep<'a>>,
    pub(crate) created: Rc<RefCell<Vec<Rc<dyn CommandHandler>>>>,
    pub cancellation: CancelToken,
    pub root: &'a Command,
    pub(crate) services: &'a AppServices,
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(
        root: &'a Command,
        services: &'a AppServices,
        args: Vec<String>,
        cancellation: CancelToken,
    ) -> Self {
        Self {
            original_args: args.clone(),
            effective_args: args,
            directives: DirectiveSet::default(),
            tokens: None,
            transform_log: TransformationLog::default(),
            transforms_applied: false,
            parse_result: None,
            binding_errors: Vec::new(),
            resolved_steps: Vec::new(),
            created: Rc::new(RefCell::new(Vec::new())),
            cancellation,
            root,
            services,
        }
    }

    /// Write a line of user-facing output through the configured sink.
    pub fn emit(&self, text: &str) {
        (self.services.sink)(text);
    }

    /// Check the guarantees that must hold when control leaves `stage`.
    /// Only called when the chain was built with stage validation on.
    pub(crate) fn validate_stage_exit(&self, stage: Stage) -> anyhow::Result<()> {
        match stage {
            Stage::PreTokenize => {
                if self.tokens.is_none() {
                    anyhow::bail!("stage guarantee violated: no tokens after PreTokenize");
                }
            }
            Stage::Tokenize => {
                if !self.transforms_applied {
                    anyhow::bail!(
                        "stage guarantee violated: transformations not applied after Tokenize"
                    );
                }
            }
            Stage::ParseInput => {
                let Some(result) = self.parse_result.as_ref() else {
                    anyhow::bail!("stage guarantee violated: no parse result after ParseInput");
                };
                if result.steps().is_empty() {
                    anyhow::bail!("stage guarantee violated: empty pipeline after ParseInput");
                }
                if !self.resolved_steps.is_empty() {
                    anyhow::bail!(
                        "stage guarantee violated: instances resolved before BindValues"
                    );
                }
            }
            Stage::BindValues => {
                let steps = self.parse_result.as_ref().map_or(0, |r| r.steps().len());
                if self.resolved_steps.len() != steps {
                    anyhow::bail!(
                        "stage guarantee violated: {} of {} steps resolved after BindValues",
                        self.resolved_steps.len(),
                        steps
                    );
                }
            }
            Stage::Invoke => {}
        }
        Ok(())
    }
}
