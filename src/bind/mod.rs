//! Value binding: raw inputs to typed values, defaults, arity checks.

mod binder;
mod defaults;
mod piped;

pub use binder::bind;
pub use defaults::{
    apply_default_sources, AppSettingsSource, DefaultSource, EnvVarSource, PresetSource,
};
pub use piped::{FixedPipe, PipedInput, StdinPipe};
