//! Builder API for ergonomic dispatcher construction.
//!
//! This module provides a fluent builder and a macro for creating
//! dispatchers and state types with minimal boilerplate.

pub mod dispatcher;
pub mod error;
pub mod macros;

pub use dispatcher::DispatcherBuilder;
pub use error::BuildError;
