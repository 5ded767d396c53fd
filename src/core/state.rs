//! Core State trait for values held by the container.
//!
//! Any type stored in an [`ImmutableCell`](super::ImmutableCell) implements
//! this trait. Committed values are only ever reachable through shared
//! references, so the trait only has to describe how a mutable draft is made.

use std::fmt::Debug;

/// Trait for application state values.
///
/// # Required Traits
///
/// - `Clone`: drafts are produced by copying the committed value
/// - `PartialEq`: states must be comparable for diagnostics and tests
/// - `Debug`: states are rendered when state-change logging is enabled
/// - `Send` + `Sync`: snapshots are shared across tasks
///
/// # Example
///
/// ```rust
/// use frostbox::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter {
///     count: i64,
/// }
///
/// impl State for Counter {}
///
/// let counter = Counter { count: 3 };
/// let mut draft = counter.deep_copy();
/// draft.count += 1;
/// assert_eq!(counter.count, 3);
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Produce an independent, mutable copy for a transform to work on.
    ///
    /// Mutating the returned value must never be observable through `self`.
    /// The default clones, which is already deep for owned data. Types with
    /// shared interior nodes override this.
    fn deep_copy(&self) -> Self {
        self.clone()
    }
}

impl State for () {}
impl State for bool {}
impl State for i64 {}
impl State for u64 {}
impl State for String {}
impl<S: State> State for Vec<S> {}
impl<S: State> State for Option<S> {}
