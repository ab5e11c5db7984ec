//! The `[parse]` diagnostic report.
//!
//! Renders the original input, every transformation snapshot, and the full
//! argument state of the invocation pipeline. Arguments marked obscured are
//! masked with a fixed-width placeholder in every surface, including the
//! original-args echo.

use std::fmt::Write;

use crate::parse::ArgumentBinding;
use crate::pipeline::RunContext;

const MASK: &str = "*****";

pub(crate) fn render_parse_report(ctx: &RunContext<'_>) -> String {
    let mut out = String::new();
    let secrets = collect_secrets(ctx);

    if let Some(result) = ctx.parse_result.as_ref() {
        let path: Vec<&str> = result.path().iter().map(|c| c.name()).collect();
        let _ = writeln!(out, "command: {}", path.join(" "));
    }
    let echo: Vec<String> = ctx
        .original_args
        .iter()
        .map(|arg| mask_secrets(arg, &secrets))
        .collect();
    let _ = writeln!(out, "original input: {}", echo.join(" "));

    if let Some(result) = ctx.parse_result.as_ref() {
        if let Some(error) = result.error() {
            let _ = writeln!(out, "error: {error}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "token transformations:");
    for record in ctx.transform_log.records() {
        if record.changed {
            let _ = writeln!(out, "  {}:", record.name);
            let _ = writeln!(out, "    before: {}", mask_secrets(&record.before, &secrets));
            let _ = writeln!(out, "    after: {}", mask_secrets(&record.after, &secrets));
        } else {
            let _ = writeln!(out, "  {}: no changes", record.name);
        }
    }

    if let Some(result) = ctx.parse_result.as_ref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "arguments:");
        for binding in result.bindings() {
            render_argument(&mut out, binding);
        }
        if !result.unrecognized().is_empty() {
            let raws: Vec<&str> = result.unrecognized().iter().map(|t| t.raw()).collect();
            let _ = writeln!(out, "unrecognized: {}", raws.join(" "));
        }
    }

    if !ctx.binding_errors.is_empty() {
        let _ = writeln!(out);
        for error in &ctx.binding_errors {
            let _ = writeln!(out, "error: {error}");
        }
    }

    out
}

fn render_argument(out: &mut String, binding: &ArgumentBinding<'_>) {
    let arg = binding.arg();
    let obscured = arg.is_obscured();
    let _ = writeln!(out, "  {} <{}>", arg.name(), arg.value_type());

    let value = match binding.value() {
        Some(_) if obscured => MASK.to_string(),
        Some(values) => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        None => String::new(),
    };
    let _ = writeln!(out, "    value: {value}");

    let inputs = binding
        .inputs()
        .iter()
        .zip(binding.traces())
        .map(|(input, trace)| {
            if obscured {
                format!("{}: {MASK}", input.source.label())
            } else {
                format!("{}: {trace}", input.source.label())
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "    inputs: {inputs}");

    let default = match binding.effective_default() {
        Some(default) if obscured => format!("{}={MASK}", default.label),
        Some(default) => format!("{}={}", default.label, default.values.join(",")),
        None => String::new(),
    };
    let _ = writeln!(out, "    default: {default}");
}

/// Raw strings that belong to obscured arguments: every supplied input
/// value and every default value.
fn collect_secrets(ctx: &RunContext<'_>) -> Vec<String> {
    let Some(result) = ctx.parse_result.as_ref() else {
        return Vec::new();
    };
    result
        .bindings()
        .iter()
        .filter(|b| b.arg().is_obscured())
        .flat_map(|b| {
            b.inputs()
                .iter()
                .flat_map(|i| i.values.iter().cloned())
                .chain(b.effective_default().into_iter().flat_map(|d| d.values.clone()))
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn mask_secrets(text: &str, secrets: &[String]) -> String {
    let mut masked = text.to_string();
    for secret in secrets {
        masked = masked.replace(secret.as_str(), MASK);
    }
    masked
}
