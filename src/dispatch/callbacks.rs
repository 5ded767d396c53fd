//! Callback registries for completed and failed operations.

use crate::core::{Argument, BoxError, State, StoreError};
use crate::core::isolate::run_isolated;
use crate::dispatch::operation::{Operation, OperationId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Called with `(state, argument, operation_name)` after a successful operation.
pub type ActionCallback<T> =
    Arc<dyn Fn(&Arc<T>, &Argument, &str) -> Result<(), BoxError> + Send + Sync>;

/// Called with `(state, error, operation_name)` after a failed operation.
pub type ErrorCallback<T> =
    Arc<dyn Fn(&Arc<T>, &StoreError, &str) -> Result<(), BoxError> + Send + Sync>;

/// Which operations an action callback listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every update and action
    All,
    /// One specific reducer or action
    Operation(OperationId),
}

impl Scope {
    /// Scope covering exactly `operation`.
    pub fn of(operation: &impl Operation) -> Self {
        Self::Operation(operation.id())
    }
}

pub(crate) struct CallbackRegistry<T: State> {
    actions: RwLock<HashMap<Scope, Vec<ActionCallback<T>>>>,
    errors: RwLock<Vec<ErrorCallback<T>>>,
}

impl<T: State> CallbackRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            actions: RwLock::new(HashMap::new()),
            errors: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn on_action<F>(&self, scope: Scope, callback: F)
    where
        F: Fn(&Arc<T>, &Argument, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let callback: ActionCallback<T> = Arc::new(callback);
        self.actions.write().entry(scope).or_default().push(callback);
    }

    pub(crate) fn on_error<F>(&self, callback: F)
    where
        F: Fn(&Arc<T>, &StoreError, &str) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let callback: ErrorCallback<T> = Arc::new(callback);
        self.errors.write().push(callback);
    }

    /// Run wildcard callbacks, then the ones scoped to `id`, each in
    /// registration order. Returns how many completed successfully.
    pub(crate) fn run_action(
        &self,
        id: OperationId,
        state: &Arc<T>,
        argument: &Argument,
        name: &str,
        log_timings: bool,
    ) -> usize {
        let callbacks: Vec<ActionCallback<T>> = {
            let actions = self.actions.read();
            [Scope::All, Scope::Operation(id)]
                .iter()
                .filter_map(|scope| actions.get(scope))
                .flatten()
                .cloned()
                .collect()
        };

        let started = Instant::now();
        let succeeded = callbacks
            .iter()
            .filter(|callback| run_isolated(name, || callback(state, argument, name)))
            .count();

        if log_timings {
            tracing::debug!(
                operation = name,
                callbacks = callbacks.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "action callbacks finished"
            );
        }
        succeeded
    }

    pub(crate) fn run_error(&self, state: &Arc<T>, error: &StoreError, name: &str) {
        let callbacks = self.errors.read().clone();
        for callback in &callbacks {
            run_isolated(name, || callback(state, error, name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Clone, PartialEq, Debug)]
    struct Counter {
        count: i64,
    }

    impl State for Counter {}

    fn tracker(
        log: &Arc<Mutex<Vec<String>>>,
        label: &str,
    ) -> impl Fn(&Arc<Counter>, &Argument, &str) -> Result<(), BoxError> + Send + Sync + 'static
    {
        let log = Arc::clone(log);
        let label = label.to_string();
        move |_state, _arg, name| {
            log.lock().push(format!("{label}:{name}"));
            Ok(())
        }
    }

    #[test]
    fn wildcard_callbacks_run_before_scoped_ones() {
        let registry: CallbackRegistry<Counter> = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = OperationId::new();

        registry.on_action(Scope::Operation(id), tracker(&log, "scoped"));
        registry.on_action(Scope::All, tracker(&log, "all"));

        let ran = registry.run_action(
            id,
            &Arc::new(Counter { count: 0 }),
            &Argument::new(()),
            "add",
            false,
        );

        assert_eq!(ran, 2);
        assert_eq!(*log.lock(), vec!["all:add", "scoped:add"]);
    }

    #[test]
    fn scoped_callbacks_ignore_other_operations() {
        let registry: CallbackRegistry<Counter> = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.on_action(Scope::Operation(OperationId::new()), tracker(&log, "scoped"));
        registry.run_action(
            OperationId::new(),
            &Arc::new(Counter { count: 0 }),
            &Argument::new(()),
            "other",
            true,
        );

        assert!(log.lock().is_empty());
    }

    #[test]
    fn failing_callbacks_are_counted_and_skipped() {
        let registry: CallbackRegistry<Counter> = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.on_action(Scope::All, |_, _, _| Err("nope".into()));
        registry.on_action(Scope::All, |_, _, _| panic!("worse"));
        registry.on_action(Scope::All, tracker(&log, "after"));

        let ran = registry.run_action(
            OperationId::new(),
            &Arc::new(Counter { count: 0 }),
            &Argument::new(()),
            "op",
            false,
        );

        assert_eq!(ran, 1);
        assert_eq!(*log.lock(), vec!["after:op"]);
    }

    #[test]
    fn error_callbacks_receive_error_and_name() {
        let registry: CallbackRegistry<Counter> = CallbackRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        registry.on_error(move |state, error, name| {
            sink.lock()
                .push((state.count, error.to_string(), name.to_string()));
            Ok(())
        });

        registry.run_error(
            &Arc::new(Counter { count: 3 }),
            &StoreError::InvalidUsage,
            "add",
        );

        assert_eq!(
            *seen.lock(),
            vec![(
                3,
                "state changes must be made synchronously".to_string(),
                "add".to_string()
            )]
        );
    }
}
