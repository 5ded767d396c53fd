//! Core state types.
//!
//! This module contains the leaf of the container:
//! - State definitions via the `State` trait
//! - The closed `Value` model for dynamically shaped state
//! - The `ImmutableCell` that commits frozen snapshots
//! - Append-only operation history
//!
//! Nothing in here knows about reducers, actions, or callbacks; that is the
//! job of [`dispatch`](crate::dispatch).

mod cell;
mod error;
mod history;
pub(crate) mod isolate;
mod state;
mod value;

pub use cell::{Change, Commit, ImmutableCell, Subscriber};
pub use error::{BoxError, StoreError};
pub use history::{Argument, History, HistoryEntry, OperationKind};
pub use state::State;
pub use value::{Value, MAX_COPY_DEPTH};
