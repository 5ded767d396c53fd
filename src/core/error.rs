//! Error types for the state container.

use thiserror::Error;

/// Boxed error produced by user-supplied reducers, actions, and callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while committing or dispatching state changes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A transform produced a pending (asynchronous) result.
    #[error("state changes must be made synchronously")]
    InvalidUsage,

    /// The input has no representation in the closed `Value` model.
    #[error("unsupported type stored in state: {0}")]
    UnsupportedType(String),

    /// A reducer or action body returned an error.
    #[error("operation '{name}' failed: {source}")]
    ActionFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A registered callback failed. Only ever logged, never returned.
    #[error("callback for '{name}' failed: {source}")]
    CallbackFailed {
        name: String,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    /// Name of the operation this error is attributed to, if any.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::ActionFailed { name, .. } | Self::CallbackFailed { name, .. } => Some(name),
            Self::InvalidUsage | Self::UnsupportedType(_) => None,
        }
    }
}
