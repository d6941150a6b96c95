//! Error types for profile resolution and plan composition.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Composition failures. Every variant is fatal to the current build
/// invocation: no partial plan is ever returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Mode string is not one of the known build modes.
    #[error("unknown build mode: {mode:?} (expected \"development\" or \"production\")")]
    InvalidMode { mode: String },

    /// A required field has no value after merging every fragment for the mode.
    #[error("incomplete profile: no fragment defines {field}")]
    IncompleteProfile { field: &'static str },

    /// A transform override or plugin toggle names something outside the registry.
    #[error("unknown stage or plugin: {name}")]
    UnknownStage { name: String },

    /// Composed rules and plugins reference each other in an unsatisfiable way.
    #[error("inconsistent plan: {message}")]
    InconsistentPlan { message: String },

    // Fragment file loading errors
    #[error("no fragment file found")]
    NotFound,

    #[error("invalid config value: {field}")]
    InvalidValue {
        field: String,
        hint: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
