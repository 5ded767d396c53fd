//! Builder for constructing dispatchers.

use crate::builder::error::BuildError;
use crate::core::{Argument, BoxError, ImmutableCell, State, StoreError};
use crate::dispatch::{Dispatcher, Options, Scope};
use std::sync::Arc;

enum Initial<T> {
    Value(T),
    Factory(Box<dyn FnOnce() -> T>),
}

type Hook<T> = Box<dyn FnOnce(&Dispatcher<T>)>;

/// Builder for constructing dispatchers with a fluent API.
///
/// # Example
///
/// ```rust
/// use frostbox::builder::DispatcherBuilder;
/// use frostbox::core::Value;
///
/// let store = DispatcherBuilder::new()
///     .initial_with(|| Value::map([("count", Value::from(0))]))
///     .log_state_changes(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(store.state().get("count").and_then(Value::as_i64), Some(0));
/// assert!(store.options().log_state_changes);
/// ```
pub struct DispatcherBuilder<T: State> {
    initial: Option<Initial<T>>,
    options: Options,
    hooks: Vec<Hook<T>>,
}

impl<T: State> DispatcherBuilder<T> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            options: Options::default(),
            hooks: Vec::new(),
        }
    }

    /// Set the initial state.
    pub fn initial(mut self, state: T) -> Self {
        self.initial = Some(Initial::Value(state));
        self
    }

    /// Set a factory for the initial state. It runs once, during `build`.
    pub fn initial_with<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        self.initial = Some(Initial::Factory(Box::new(factory)));
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn log_state_changes(mut self, enabled: bool) -> Self {
        self.options.log_state_changes = enabled;
        self
    }

    pub fn log_action_callback_timings(mut self, enabled: bool) -> Self {
        self.options.log_action_callback_timings = enabled;
        self
    }

    /// Subscribe to state changes as soon as the dispatcher exists.
    pub fn on_state_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Arc<T>, &Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks
            .push(Box::new(move |store: &Dispatcher<T>| store.on_state_change(callback)));
        self
    }

    /// Register an action callback as soon as the dispatcher exists.
    pub fn on_action<F>(mut self, scope: Scope, callback: F) -> Self
    where
        F: Fn(&Arc<T>, &Argument, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks
            .push(Box::new(move |store: &Dispatcher<T>| store.on_action(scope, callback)));
        self
    }

    /// Register an error callback as soon as the dispatcher exists.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Arc<T>, &StoreError, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks
            .push(Box::new(move |store: &Dispatcher<T>| store.on_error(callback)));
        self
    }

    /// Build the dispatcher.
    /// Returns an error if no initial state was given.
    pub fn build(self) -> Result<Dispatcher<T>, BuildError> {
        let cell = match self.initial.ok_or(BuildError::MissingInitialState)? {
            Initial::Value(state) => ImmutableCell::new(state),
            Initial::Factory(factory) => ImmutableCell::with_factory(factory),
        };

        let store = Dispatcher::from_cell(cell, self.options);
        for hook in self.hooks {
            hook(&store);
        }

        Ok(store)
    }
}

impl<T: State> Default for DispatcherBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
