//! Raw strings to typed values, with collect-all validation.
//!
//! Every argument reachable from the invocation pipeline is processed even
//! after earlier ones fail, so one run surfaces every binding problem at
//! once. Arity validation runs as a second pass over the bound state.

use std::collections::HashSet;

use crate::error::{BindingError, ConfigError};
use crate::model::ParserRegistry;
use crate::parse::ParseResult;

/// Bind every argument of `result`, returning the collected binding and
/// arity errors. A missing value parser is a configuration fault and comes
/// back as `Err` instead.
pub fn bind(
    result: &mut ParseResult<'_>,
    registry: &ParserRegistry,
) -> Result<Vec<BindingError>, ConfigError> {
    let mut errors = Vec::new();
    let mut failed = HashSet::new();

    for (index, binding) in result.bindings_mut().iter_mut().enumerate() {
        // Rebinding must be idempotent: clear anything a previous pass set.
        binding.value = None;
        binding.default_label = None;

        let (raws, default_label) = if binding.inputs.is_empty() {
            match binding.effective_default() {
                Some(default) => (default.values.clone(), Some(default.label)),
                None => continue,
            }
        } else {
            let raws = binding
                .inputs
                .iter()
                .flat_map(|input| input.values.iter().cloned())
                .collect();
            (raws, None)
        };

        let raws = match binding.arg.split_char() {
            Some(separator) => raws
                .iter()
                .flat_map(|raw| raw.split(separator).map(str::to_string))
                .collect(),
            None => raws,
        };

        let parser = registry.require(binding.arg.name(), binding.arg.value_type())?;
        let mut values = Vec::with_capacity(raws.len());
        let mut ok = true;
        for raw in &raws {
            match parser.parse(raw) {
                Ok(value) => values.push(value),
                Err(message) => {
                    ok = false;
                    errors.push(BindingError::InvalidValue {
                        argument: binding.arg.name().to_string(),
                        raw: raw.clone(),
                        type_name: binding.arg.value_type().to_string(),
                        message,
                    });
                }
            }
        }
        if ok {
            binding.value = Some(values);
            binding.default_label = default_label;
            if let Some(label) = default_label {
                tracing::debug!(
                    argument = binding.arg.name(),
                    source = label,
                    "bound from default"
                );
            }
        } else {
            failed.insert(index);
        }
    }

    errors.extend(validate_arities(result, &failed));
    Ok(errors)
}

/// Count checks over the bound state. Arguments that already failed type
/// parsing are skipped so one mistake reports once.
fn validate_arities(result: &ParseResult<'_>, failed: &HashSet<usize>) -> Vec<BindingError> {
    let mut errors = Vec::new();
    for (index, binding) in result.bindings().iter().enumerate() {
        if failed.contains(&index) || binding.arg().is_implicit_bool() {
            continue;
        }
        let arity = binding.arg().arity();
        let count = binding.value().map_or(0, <[_]>::len);

        if count == 0 {
            if arity.is_required() {
                errors.push(BindingError::Required {
                    argument: binding.arg().name().to_string(),
                });
            }
            continue;
        }
        if count < arity.min() {
            errors.push(BindingError::TooFewValues {
                argument: binding.arg().name().to_string(),
                min: arity.min(),
                actual: count,
            });
        } else if let Some(max) = arity.max() {
            if count > max {
                errors.push(BindingError::TooManyValues {
                    argument: binding.arg().name().to_string(),
                    max,
                    actual: count,
                });
            }
        }
    }
    errors
}
