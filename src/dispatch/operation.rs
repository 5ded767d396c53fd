//! Reducers and actions: the two kinds of write operation.

use crate::core::{BoxError, Commit, State};
use crate::dispatch::Dispatcher;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// Display name used for operations created without one.
pub const ANONYMOUS: &str = "anonymous";

/// Unique identity of one reducer or action.
///
/// Clones of an operation share its id; two separately constructed
/// operations never do, even if their names match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Common view of reducers and actions, used to scope callbacks.
pub trait Operation {
    fn id(&self) -> OperationId;
    fn name(&self) -> &str;
}

type ReduceFn<T, A> = dyn Fn(T, &A) -> Result<Commit<T>, BoxError> + Send + Sync;

/// Synchronous state transform run by [`Dispatcher::update`].
///
/// The function receives a mutable draft of the current state and the
/// argument, and returns the state to commit.
///
/// # Example
///
/// ```rust
/// use frostbox::core::State;
/// use frostbox::dispatch::{Operation, Reducer};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter {
///     count: i64,
/// }
///
/// impl State for Counter {}
///
/// let add = Reducer::new("add", |mut state: Counter, amount: &i64| {
///     state.count += amount;
///     Ok(state)
/// });
/// assert_eq!(add.name(), "add");
/// ```
pub struct Reducer<T, A> {
    id: OperationId,
    name: Arc<str>,
    reduce: Arc<ReduceFn<T, A>>,
}

impl<T: State, A> Reducer<T, A> {
    pub fn new<F, R>(name: impl Into<String>, reduce: F) -> Self
    where
        F: Fn(T, &A) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Commit<T>>,
    {
        let reduce: Arc<ReduceFn<T, A>> =
            Arc::new(move |state: T, arg: &A| reduce(state, arg).map(Into::into));
        Self {
            id: OperationId::new(),
            name: Arc::from(name.into()),
            reduce,
        }
    }

    /// A reducer without a name; it is reported as `"anonymous"`.
    pub fn anonymous<F, R>(reduce: F) -> Self
    where
        F: Fn(T, &A) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Commit<T>>,
    {
        Self::new(ANONYMOUS, reduce)
    }

    pub(crate) fn apply(&self, draft: T, arg: &A) -> Result<Commit<T>, BoxError> {
        (self.reduce)(draft, arg)
    }
}

impl<T, A> Operation for Reducer<T, A> {
    fn id(&self) -> OperationId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T, A> Clone for Reducer<T, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            reduce: Arc::clone(&self.reduce),
        }
    }
}

impl<T, A> fmt::Debug for Reducer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type ActFn<T, A> =
    dyn Fn(Arc<T>, A, Dispatcher<T>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync;

/// Asynchronous operation run by [`Dispatcher::send`].
///
/// The function receives the current state, the argument, and a handle to
/// the dispatcher, through which it may run further updates and sends.
pub struct Action<T: State, A> {
    id: OperationId,
    name: Arc<str>,
    act: Arc<ActFn<T, A>>,
}

impl<T: State, A> Action<T, A> {
    pub fn new<F, Fut>(name: impl Into<String>, act: F) -> Self
    where
        F: Fn(Arc<T>, A, Dispatcher<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let act: Arc<ActFn<T, A>> =
            Arc::new(move |state: Arc<T>, arg: A, store: Dispatcher<T>| {
                act(state, arg, store).boxed()
            });
        Self {
            id: OperationId::new(),
            name: Arc::from(name.into()),
            act,
        }
    }

    /// An action without a name; it is reported as `"anonymous"`.
    pub fn anonymous<F, Fut>(act: F) -> Self
    where
        F: Fn(Arc<T>, A, Dispatcher<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::new(ANONYMOUS, act)
    }

    pub(crate) fn run(
        &self,
        state: Arc<T>,
        arg: A,
        store: Dispatcher<T>,
    ) -> BoxFuture<'static, Result<(), BoxError>> {
        (self.act)(state, arg, store)
    }
}

impl<T: State, A> Operation for Action<T, A> {
    fn id(&self) -> OperationId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T: State, A> Clone for Action<T, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            act: Arc::clone(&self.act),
        }
    }
}

impl<T: State, A> fmt::Debug for Action<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
