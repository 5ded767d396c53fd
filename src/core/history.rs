//! Operation history tracking.
//!
//! Every successful update or action appends one [`HistoryEntry`] to the
//! dispatcher's [`History`]. Failed operations never appear here, so each
//! entry corresponds to a real, completed operation.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

trait ArgumentValue: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<A: Any + Debug + Send + Sync> ArgumentValue for A {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased argument passed to an update or action.
///
/// Cloning is cheap; the argument itself is shared.
///
/// # Example
///
/// ```rust
/// use frostbox::core::Argument;
///
/// let arg = Argument::new(5i64);
/// assert_eq!(arg.downcast_ref::<i64>(), Some(&5));
/// assert!(arg.downcast_ref::<String>().is_none());
/// assert_eq!(format!("{arg:?}"), "5");
/// ```
#[derive(Clone)]
pub struct Argument(Arc<dyn ArgumentValue>);

impl Argument {
    pub fn new<A>(value: A) -> Self
    where
        A: Debug + Send + Sync + 'static,
    {
        Self(Arc::new(value))
    }

    /// Borrow the argument as its concrete type, if it is an `A`.
    pub fn downcast_ref<A: 'static>(&self) -> Option<&A> {
        (*self.0).as_any().downcast_ref::<A>()
    }
}

impl Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

/// Which write path produced a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Synchronous reducer
    Update,
    /// Asynchronous action
    Action,
}

/// Record of one completed operation.
#[derive(Clone, Debug)]
pub struct HistoryEntry<T: State> {
    /// Display name of the operation
    pub name: String,
    pub kind: OperationKind,
    /// Argument the operation was called with
    pub argument: Argument,
    /// Committed state after the operation finished
    pub state: Arc<T>,
    /// When the operation completed
    pub timestamp: DateTime<Utc>,
}

impl<T: State> HistoryEntry<T> {
    /// Create an entry stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        kind: OperationKind,
        argument: Argument,
        state: Arc<T>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            argument,
            state,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only, chronological log of completed operations.
///
/// There is no eviction; the log grows for the lifetime of its owner.
#[derive(Clone, Debug)]
pub struct History<T: State> {
    entries: Vec<HistoryEntry<T>>,
}

impl<T: State> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: State> History<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, entry: HistoryEntry<T>) {
        self.entries.push(entry);
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry<T>> {
        self.entries.last()
    }

    /// Operation names in commit order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Resulting states in commit order.
    pub fn states(&self) -> Vec<&T> {
        self.entries.iter().map(|e| e.state.as_ref()).collect()
    }

    /// Time between the first and last recorded operation.
    ///
    /// Returns `None` if nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }
}
