//! Immutable snapshot cell.
//!
//! An [`ImmutableCell`] owns exactly one committed value at a time. The value
//! is handed out as `Arc<T>`, so every snapshot a caller holds stays exactly
//! as it was committed. Writes go through [`ImmutableCell::transform`], which
//! runs the caller's function on a deep copy and commits whatever it returns.

use super::error::{BoxError, StoreError};
use super::isolate::run_isolated;
use super::state::State;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;

/// Callback invoked with `(current, previous)` once per delivered change.
pub type Subscriber<T> = Arc<dyn Fn(&Arc<T>, &Arc<T>) -> Result<(), BoxError> + Send + Sync>;

/// Result of a transform: what should become the committed value.
pub enum Commit<T> {
    /// A freshly produced value.
    Value(T),
    /// An existing snapshot. Re-committing the current snapshot is a no-op
    /// that notifies nobody.
    Shared(Arc<T>),
    /// An asynchronous result. Always rejected with
    /// [`StoreError::InvalidUsage`]; the future is dropped without being polled.
    Pending(BoxFuture<'static, T>),
}

impl<T> Commit<T> {
    /// Wrap a future as a pending commit.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }
}

impl<T> From<T> for Commit<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Commit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Shared(snapshot) => f.debug_tuple("Shared").field(snapshot).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A committed change waiting to be delivered to subscribers.
#[derive(Clone, Debug)]
pub struct Change<T> {
    pub current: Arc<T>,
    pub previous: Arc<T>,
}

struct Slot<T> {
    current: Arc<T>,
    previous: Arc<T>,
}

/// Cell holding one frozen value of type `T`.
///
/// # Example
///
/// ```rust
/// use frostbox::core::{ImmutableCell, State};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter {
///     count: i64,
/// }
///
/// impl State for Counter {}
///
/// let cell = ImmutableCell::new(Counter { count: 0 });
/// let before = cell.get();
///
/// cell.transform(|mut draft| {
///     draft.count = 9;
///     draft
/// })
/// .unwrap();
///
/// assert_eq!(before.count, 0);
/// assert_eq!(cell.get().count, 9);
/// ```
pub struct ImmutableCell<T: State> {
    slot: Mutex<Slot<T>>,
    writer: Mutex<()>,
    subscribers: RwLock<Vec<Subscriber<T>>>,
    pending: Mutex<VecDeque<Change<T>>>,
    flushing: Mutex<()>,
    wake: Notify,
}

impl<T: State> ImmutableCell<T> {
    /// Create a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        let current = Arc::new(initial);
        Self {
            slot: Mutex::new(Slot {
                previous: Arc::clone(&current),
                current,
            }),
            writer: Mutex::new(()),
            subscribers: RwLock::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            flushing: Mutex::new(()),
            wake: Notify::new(),
        }
    }

    /// Create a cell from a factory, which is invoked exactly once.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: FnOnce() -> T,
    {
        Self::new(factory())
    }

    /// The current committed snapshot.
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.slot.lock().current)
    }

    /// The snapshot committed immediately before the current one.
    ///
    /// Identical to [`get`](Self::get) until the first commit.
    pub fn previous(&self) -> Arc<T> {
        Arc::clone(&self.slot.lock().previous)
    }

    /// Commit a replacement value directly, without making a draft.
    pub fn replace<R>(&self, value: R) -> Result<Arc<T>, StoreError>
    where
        R: Into<Commit<T>>,
    {
        let _writer = self.writer.lock();
        self.commit(value.into())
    }

    /// Run `f` on a deep copy of the current value and commit the result.
    ///
    /// Other writers wait while `f` runs, so `f` must not write to this cell
    /// again. Reads through [`get`](Self::get) and [`previous`](Self::previous)
    /// are never blocked and see the value from before the transform.
    pub fn transform<F, R>(&self, f: F) -> Result<Arc<T>, StoreError>
    where
        F: FnOnce(T) -> R,
        R: Into<Commit<T>>,
    {
        self.try_transform(|draft| Ok(f(draft)))
    }

    /// Like [`transform`](Self::transform), for functions that can fail.
    ///
    /// On error nothing is committed and the error is returned unchanged.
    pub fn try_transform<F, R>(&self, f: F) -> Result<Arc<T>, StoreError>
    where
        F: FnOnce(T) -> Result<R, StoreError>,
        R: Into<Commit<T>>,
    {
        let _writer = self.writer.lock();
        let draft = self.get().deep_copy();
        let next = f(draft)?;
        self.commit(next.into())
    }

    /// Callers hold `writer`.
    fn commit(&self, next: Commit<T>) -> Result<Arc<T>, StoreError> {
        let next = match next {
            Commit::Value(value) => Arc::new(value),
            Commit::Shared(snapshot) => snapshot,
            Commit::Pending(_) => return Err(StoreError::InvalidUsage),
        };

        let mut slot = self.slot.lock();
        let previous = std::mem::replace(&mut slot.current, Arc::clone(&next));
        slot.previous = Arc::clone(&previous);

        if !Arc::ptr_eq(&next, &previous) {
            // Enqueued under the slot lock so the queue follows commit order.
            self.pending.lock().push_back(Change {
                current: Arc::clone(&next),
                previous,
            });
            self.wake.notify_one();
        }

        Ok(next)
    }

    /// Register a subscriber for committed changes.
    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&Arc<T>, &Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribers.write().push(Arc::new(subscriber));
    }

    /// Number of changes committed but not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Deliver every queued change to every subscriber, in commit order.
    ///
    /// Changes committed by subscribers during the flush are delivered by the
    /// same flush. A flush started while another is running returns `0`.
    /// Returns the number of changes delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            {
                let Some(_flushing) = self.flushing.try_lock() else {
                    break;
                };
                delivered += self.drain();
            }

            // A commit whose own flush lost the race to ours is picked up here.
            if self.pending() == 0 {
                break;
            }
        }
        delivered
    }

    /// Callers hold `flushing`.
    fn drain(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.pending.lock().pop_front();
            let Some(change) = next else {
                break;
            };

            let subscribers = self.subscribers.read().clone();
            for subscriber in &subscribers {
                run_isolated("state change", || {
                    subscriber(&change.current, &change.previous)
                });
            }
            delivered += 1;
        }
        delivered
    }

    /// Wait until at least one change has been committed since the last wake-up.
    pub async fn notified(&self) {
        self.wake.notified().await;
    }
}

impl<T: State> fmt::Debug for ImmutableCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableCell")
            .field("value", &self.get())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}
