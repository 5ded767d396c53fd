//! Build errors for the dispatcher builder.

use thiserror::Error;

/// Errors that can occur when building a dispatcher.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) or .initial_with(factory) before .build()")]
    MissingInitialState,
}
