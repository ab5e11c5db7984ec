//! The framework's own middleware, registered ahead of host middleware.

use crate::bind::{apply_default_sources, bind};
use crate::directive::{extract_directives, render_parse_report};
use crate::error::exit_code;
use crate::model::InputSource;
use crate::parse::parse;
use crate::token::{apply_transformations, tokenize, TransformContext, SOURCE_ARGV};

use super::invoke::{resolve_steps, run_invocation};
use super::stage::{MiddlewareRegistry, Stage};

pub(crate) fn register_builtins(registry: &mut MiddlewareRegistry) {
    registry.register("extract-directives", Stage::PreTokenize, -50, |ctx, next| {
        match extract_directives(&ctx.original_args) {
            Ok((directives, remaining)) => {
                if !directives.is_empty() {
                    tracing::debug!(count = directives.iter().len(), "directives extracted");
                }
                ctx.directives = directives;
                ctx.effective_args = remaining;
                next.run(ctx)
            }
            Err(error) => {
                ctx.emit(&error.to_string());
                Ok(exit_code::VALIDATION)
            }
        }
    });

    registry.register("tokenize-input", Stage::PreTokenize, 0, |ctx, next| {
        ctx.tokens = Some(tokenize(&ctx.effective_args, SOURCE_ARGV));
        next.run(ctx)
    });

    registry.register(
        "apply-token-transformations",
        Stage::Tokenize,
        0,
        |ctx, next| {
            let services = ctx.services;
            let tokens = ctx.tokens.take().unwrap_or_default();
            let transform_ctx = TransformContext { root: ctx.root };
            match apply_transformations(
                &transform_ctx,
                tokens,
                &services.transformations,
                &mut ctx.transform_log,
            ) {
                Ok(tokens) => {
                    ctx.tokens = Some(tokens);
                    ctx.transforms_applied = true;
                    next.run(ctx)
                }
                Err(error) => {
                    ctx.emit(&error.to_string());
                    Ok(exit_code::VALIDATION)
                }
            }
        },
    );

    registry.register("resolve-command", Stage::ParseInput, 0, |ctx, next| {
        let tokens = ctx.tokens.clone().unwrap_or_default();
        ctx.parse_result = Some(parse(&tokens, ctx.root));
        next.run(ctx)
    });

    registry.register("check-parse-errors", Stage::ParseInput, 50, |ctx, next| {
        if !ctx.directives.has("parse") {
            if let Some(error) = ctx.parse_result.as_ref().and_then(|r| r.error()) {
                let message = error.to_string();
                ctx.emit(&message);
                return Ok(exit_code::VALIDATION);
            }
        }
        next.run(ctx)
    });

    registry.register(
        "apply-default-sources",
        Stage::BindValues,
        -20,
        |ctx, next| {
            let services = ctx.services;
            if let Some(result) = ctx.parse_result.as_mut() {
                apply_default_sources(result, &services.sources);
            }
            next.run(ctx)
        },
    );

    registry.register("append-piped-input", Stage::BindValues, -10, |ctx, next| {
        let services = ctx.services;
        if let (Some(piped), Some(result)) = (services.piped.as_ref(), ctx.parse_result.as_mut())
        {
            if result.error().is_none() {
                if let Some(lines) = piped.read_lines() {
                    if !lines.is_empty()
                        && result.append_to_unbounded_operand(InputSource::PipedStream, lines)
                    {
                        tracing::debug!("piped input appended to unbounded operand");
                    }
                }
            }
        }
        next.run(ctx)
    });

    registry.register("bind-values", Stage::BindValues, 0, |ctx, next| {
        let services = ctx.services;
        if let Some(result) = ctx.parse_result.as_mut() {
            if result.error().is_none() {
                match bind(result, &services.registry) {
                    Ok(errors) => ctx.binding_errors = errors,
                    Err(config) => return Err(config.into()),
                }
            }
        }
        next.run(ctx)
    });

    registry.register("check-binding-errors", Stage::BindValues, 10, |ctx, next| {
        if !ctx.binding_errors.is_empty() && !ctx.directives.has("parse") {
            let lines: Vec<String> = ctx.binding_errors.iter().map(ToString::to_string).collect();
            for line in lines {
                ctx.emit(&line);
            }
            return Ok(exit_code::VALIDATION);
        }
        next.run(ctx)
    });

    registry.register("render-parse-report", Stage::BindValues, 20, |ctx, next| {
        if !ctx.directives.has("parse") {
            return next.run(ctx);
        }
        let report = render_parse_report(ctx);
        ctx.emit(&report);
        let failed = ctx.parse_result.as_ref().and_then(|r| r.error()).is_some()
            || !ctx.binding_errors.is_empty();
        Ok(if failed {
            exit_code::VALIDATION
        } else {
            exit_code::SUCCESS
        })
    });

    registry.register("resolve-instances", Stage::BindValues, 30, |ctx, next| {
        let services = ctx.services;
        if let Some(result) = ctx.parse_result.as_ref() {
            ctx.resolved_steps = resolve_steps(
                result,
                services.external.as_deref(),
                &services.factories,
                &ctx.created,
            )?;
        }
        next.run(ctx)
    });

    registry.register("report-run-duration", Stage::Invoke, -10, |ctx, next| {
        if !ctx.directives.has("time") {
            return next.run(ctx);
        }
        let start = std::time::Instant::now();
        let outcome = next.run(ctx);
        let elapsed = start.elapsed();
        ctx.emit(&format!("time: {elapsed:.3?}"));
        outcome
    });

    registry.register("invoke-pipeline", Stage::Invoke, 0, |ctx, _next| {
        let steps = std::mem::take(&mut ctx.resolved_steps);
        let cancel = ctx.cancellation.clone();
        run_invocation(&steps, &cancel)
    });
}
