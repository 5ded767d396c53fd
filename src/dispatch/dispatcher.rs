//! Dispatcher that serializes updates and actions against one cell.

use crate::builder::DispatcherBuilder;
use crate::core::{
    Argument, BoxError, History, HistoryEntry, ImmutableCell, OperationKind, State, StoreError,
};
use crate::dispatch::callbacks::{CallbackRegistry, Scope};
use crate::dispatch::operation::{Action, Operation, Reducer};
use crate::dispatch::options::Options;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::Instrument;

struct Inner<T: State> {
    cell: ImmutableCell<T>,
    history: Mutex<History<T>>,
    callbacks: CallbackRegistry<T>,
    options: Options,
}

/// Owner of one [`ImmutableCell`] and the only way to write to it.
///
/// `Dispatcher` is a cheap, cloneable handle. Every clone refers to the same
/// state, history, and callbacks, so a clone is what actions and rendering
/// code hold on to as their write handle. Separately constructed dispatchers
/// share nothing.
///
/// # Example
///
/// ```rust
/// use frostbox::core::State;
/// use frostbox::dispatch::{Dispatcher, Reducer};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter {
///     count: i64,
/// }
///
/// impl State for Counter {}
///
/// let store = Dispatcher::new(Counter { count: 0 });
/// let set = Reducer::new("set", |mut state: Counter, value: &i64| {
///     state.count = *value;
///     Ok(state)
/// });
///
/// let state = store.update(&set, 1).unwrap();
/// assert_eq!(state.count, 1);
/// assert_eq!(store.history().names(), vec!["set"]);
/// ```
pub struct Dispatcher<T: State> {
    inner: Arc<Inner<T>>,
}

impl<T: State> Dispatcher<T> {
    /// Create a dispatcher holding `initial`, with default options.
    pub fn new(initial: T) -> Self {
        Self::with_options(initial, Options::default())
    }

    /// Create a dispatcher whose initial state comes from `factory`.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: FnOnce() -> T,
    {
        Self::from_cell(ImmutableCell::with_factory(factory), Options::default())
    }

    pub fn with_options(initial: T, options: Options) -> Self {
        Self::from_cell(ImmutableCell::new(initial), options)
    }

    /// Start a [`DispatcherBuilder`].
    pub fn builder() -> DispatcherBuilder<T> {
        DispatcherBuilder::new()
    }

    pub(crate) fn from_cell(cell: ImmutableCell<T>, options: Options) -> Self {
        if options.log_state_changes {
            cell.subscribe(|state, previous| {
                tracing::debug!(?state, ?previous, "state changed");
                Ok(())
            });
        }

        Self {
            inner: Arc::new(Inner {
                cell,
                history: Mutex::new(History::new()),
                callbacks: CallbackRegistry::new(),
                options,
            }),
        }
    }

    /// Current committed state.
    pub fn state(&self) -> Arc<T> {
        self.inner.cell.get()
    }

    /// State committed immediately before the current one.
    pub fn previous_state(&self) -> Arc<T> {
        self.inner.cell.previous()
    }

    /// Copy of the history of completed operations.
    pub fn history(&self) -> History<T> {
        self.inner.history.lock().clone()
    }

    pub fn options(&self) -> Options {
        self.inner.options
    }

    /// Run `reducer` on a draft of the current state and commit the result.
    ///
    /// On success the operation is recorded in the history, action callbacks
    /// run, and the committed state is returned. On failure nothing is
    /// recorded, error callbacks run, and the error is returned.
    ///
    /// The reducer may read this dispatcher's state but must not update or
    /// send through it; other writers wait until the reducer returns.
    pub fn update<A>(&self, reducer: &Reducer<T, A>, arg: A) -> Result<Arc<T>, StoreError>
    where
        A: Debug + Send + Sync + 'static,
    {
        let name = reducer.name();
        let _span = tracing::debug_span!("update", operation = name).entered();

        let committed = self.inner.cell.try_transform(|draft| {
            reducer
                .apply(draft, &arg)
                .map_err(|source| StoreError::ActionFailed {
                    name: name.to_string(),
                    source,
                })
        });

        match committed {
            Ok(state) => {
                self.complete(reducer, OperationKind::Update, Argument::new(arg), &state);
                Ok(state)
            }
            Err(error) => {
                self.fail(&error, name);
                Err(error)
            }
        }
    }

    /// Run `action` to completion.
    ///
    /// The action receives the current state, `arg`, and a clone of this
    /// dispatcher for nested updates and sends. After it finishes, the
    /// operation is recorded with the state as it is then, and that state is
    /// returned. There is no depth limit on nested sends.
    pub fn send<A>(
        &self,
        action: &Action<T, A>,
        arg: A,
    ) -> BoxFuture<'static, Result<Arc<T>, StoreError>>
    where
        A: Clone + Debug + Send + Sync + 'static,
    {
        let store = self.clone();
        let action = action.clone();
        let span = tracing::debug_span!("send", operation = action.name());

        async move {
            let current = store.state();
            match action.run(current, arg.clone(), store.clone()).await {
                Ok(()) => {
                    let state = store.state();
                    store.complete(&action, OperationKind::Action, Argument::new(arg), &state);
                    Ok(state)
                }
                Err(source) => {
                    let error = StoreError::ActionFailed {
                        name: action.name().to_string(),
                        source,
                    };
                    store.fail(&error, action.name());
                    Err(error)
                }
            }
        }
        .instrument(span)
        .boxed()
    }

    /// Yield to the scheduler once, then [`send`](Self::send) `action`.
    ///
    /// The resulting state is discarded; errors still propagate.
    pub fn next<A>(
        &self,
        action: &Action<T, A>,
        arg: A,
    ) -> BoxFuture<'static, Result<(), StoreError>>
    where
        A: Clone + Debug + Send + Sync + 'static,
    {
        let store = self.clone();
        let action = action.clone();

        async move {
            tokio::task::yield_now().await;
            store.send(&action, arg).await.map(|_| ())
        }
        .boxed()
    }

    fn complete(
        &self,
        operation: &impl Operation,
        kind: OperationKind,
        argument: Argument,
        state: &Arc<T>,
    ) {
        let name = operation.name();
        self.inner.history.lock().record(HistoryEntry::new(
            name,
            kind,
            argument.clone(),
            Arc::clone(state),
        ));
        self.inner.callbacks.run_action(
            operation.id(),
            state,
            &argument,
            name,
            self.inner.options.log_action_callback_timings,
        );
    }

    fn fail(&self, error: &StoreError, name: &str) {
        tracing::error!(operation = name, error = %error, "operation failed");
        let state = self.state();
        self.inner.callbacks.run_error(&state, error, name);
    }

    /// Register a callback run after every successful operation in `scope`.
    ///
    /// Callback failures are logged and never reach the caller of
    /// `update` or `send`.
    pub fn on_action<F>(&self, scope: Scope, callback: F)
    where
        F: Fn(&Arc<T>, &Argument, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.inner.callbacks.on_action(scope, callback);
    }

    /// Register a callback for one specific reducer or action.
    pub fn on_operation<F>(&self, operation: &impl Operation, callback: F)
    where
        F: Fn(&Arc<T>, &Argument, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_action(Scope::of(operation), callback);
    }

    /// Register a callback run after every failed operation.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(&Arc<T>, &StoreError, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.inner.callbacks.on_error(callback);
    }

    /// Subscribe to committed changes, receiving `(state, previous)`.
    ///
    /// Delivery is deferred; see [`flush_notifications`](Self::flush_notifications).
    pub fn on_state_change<F>(&self, callback: F)
    where
        F: Fn(&Arc<T>, &Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.inner.cell.subscribe(callback);
    }

    /// Deliver queued state changes now. Returns how many were delivered.
    pub fn flush_notifications(&self) -> usize {
        self.inner.cell.flush()
    }

    /// Deliver state changes as they are committed, forever.
    pub async fn run_notifications(self) {
        loop {
            self.inner.cell.notified().await;
            self.inner.cell.flush();
        }
    }

    /// Spawn [`run_notifications`](Self::run_notifications) on the current
    /// tokio runtime.
    pub fn spawn_notifier(&self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.clone().run_notifications())
    }
}

impl<T: State> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: State> Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("history", &self.inner.history.lock().len())
            .field("options", &self.inner.options)
            .finish()
    }
}
