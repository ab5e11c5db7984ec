//! Error taxonomy and process exit codes.
//!
//! Configuration errors are fatal and detected before any run. Parse and
//! binding errors are recovered into structured lists so diagnostics can
//! still render, and map to the validation exit code. Invocation errors
//! unwind through the middleware chain as `anyhow::Error`.

use thiserror::Error;

/// Process exit codes produced by a run.
pub mod exit_code {
    /// Run completed (or was cancelled cooperatively).
    pub const SUCCESS: i32 = 0;
    /// Unhandled invocation error or other general failure.
    pub const FAILURE: i32 = 1;
    /// Parse, binding, or arity validation failure.
    pub const VALIDATION: i32 = 2;
}

/// Fatal configuration errors, detected while building an app.
///
/// These indicate a broken command declaration, never bad user input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An alias (name, short, or symbol) appears twice in the set visible
    /// at one command, counting options inherited from ancestors.
    #[error("duplicate alias '{alias}' on command '{command}'")]
    DuplicateAlias { command: String, alias: String },

    /// An unbounded-arity operand that is not the last operand declared.
    #[error("operand '{operand}' on command '{command}' has unlimited arity but is not the last operand")]
    UnboundedOperandNotLast { command: String, operand: String },

    /// More than one unbounded-arity operand on a single command.
    #[error("command '{command}' declares more than one unlimited-arity operand")]
    MultipleUnboundedOperands { command: String },

    /// An argument references a value type with no registered parser.
    #[error("no value parser registered for type '{type_name}' (argument '{argument}')")]
    UnknownValueType { argument: String, type_name: String },

    /// An option marked inherited sits on a command without an interceptor,
    /// so no invocation step could ever receive its value.
    #[error("inherited option '{option}' on command '{command}' requires an interceptor")]
    InheritedWithoutInterceptor { command: String, option: String },

    /// A command is executable or intercepting but has no handler key.
    #[error("command '{command}' is executable but declares no handler")]
    MissingHandlerKey { command: String },

    /// No factory registered for a handler key and no external resolver set.
    #[error("no factory registered for handler '{key}'")]
    UnresolvableHandler { key: String },

    /// An empty or whitespace name on a command or argument.
    #[error("empty name on {kind}")]
    EmptyName { kind: &'static str },
}

/// Errors raised while producing or transforming tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A response file could not be read.
    #[error("cannot read response file '{path}': {source}")]
    ResponseFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Response files referencing each other past the nesting limit.
    #[error("response file nesting exceeds {limit} levels at '{path}'")]
    ResponseFileNesting { path: String, limit: usize },

    /// A bracketed directive token that does not parse.
    #[error("malformed directive '{raw}'")]
    MalformedDirective { raw: String },
}

/// User-input errors found while resolving commands and assigning tokens.
///
/// Carried as data on the parse result, never raised, so the diagnostic
/// directive can render a partial report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An option token with no matching alias at the current command.
    #[error("Unrecognized option '{alias}'{}", suggestion_suffix(.suggestion))]
    UnrecognizedOption {
        alias: String,
        suggestion: Option<String>,
    },

    /// A value token with no operand slot or subcommand to receive it.
    #[error("Unrecognized command or argument '{raw}'{}", suggestion_suffix(.suggestion))]
    UnexpectedValue {
        raw: String,
        suggestion: Option<String>,
    },

    /// An option that requires a value reached the end of input or another
    /// option before one appeared.
    #[error("Missing value for option '{alias}'")]
    MissingOptionValue { alias: String },

    /// Input resolved to a command that cannot itself execute.
    #[error("Command '{command}' is not executable")]
    NotExecutable { command: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", did you mean '{s}'?"),
        None => String::new(),
    }
}

/// Per-argument binding and validation failures.
///
/// Collected across the whole invocation pipeline and reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A raw value failed the argument's type parser.
    #[error("'{argument}': cannot parse '{raw}' as {type_name}: {message}")]
    InvalidValue {
        argument: String,
        raw: String,
        type_name: String,
        message: String,
    },

    /// A required argument received no value and no default.
    #[error("'{argument}' is required")]
    Required { argument: String },

    /// Fewer values than the arity minimum.
    #[error("'{argument}' requires at least {min} values but {actual} were provided")]
    TooFewValues {
        argument: String,
        min: usize,
        actual: usize,
    },

    /// More values than the arity maximum.
    #[error("'{argument}' can have no more than {max} values but {actual} were provided")]
    TooManyValues {
        argument: String,
        max: usize,
        actual: usize,
    },
}
