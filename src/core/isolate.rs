//! Failure isolation for observer callbacks.

use super::error::{BoxError, StoreError};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run an observer callback so that neither an error nor a panic escapes.
///
/// Failures are logged as [`StoreError::CallbackFailed`] and discarded.
/// Returns `true` when the callback completed successfully.
pub(crate) fn run_isolated<F>(name: &str, callback: F) -> bool
where
    F: FnOnce() -> Result<(), BoxError>,
{
    let outcome = match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(result) => result,
        Err(payload) => Err(panic_message(payload).into()),
    };

    match outcome {
        Ok(()) => true,
        Err(source) => {
            let error = StoreError::CallbackFailed {
                name: name.to_string(),
                source,
            };
            tracing::error!(operation = name, error = %error, "callback failed");
            false
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("callback panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("callback panicked: {message}")
    } else {
        "callback panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_passes_through() {
        assert!(run_isolated("ok", || Ok(())));
    }

    #[test]
    fn error_is_swallowed() {
        assert!(!run_isolated("err", || Err("nope".into())));
    }

    #[test]
    fn panic_is_swallowed() {
        assert!(!run_isolated("panic", || panic!("kaboom")));
    }

    #[test]
    fn panic_message_reads_payload() {
        let payload: Box<dyn Any + Send> = Box::new("bad state");
        assert_eq!(panic_message(payload), "callback panicked: bad state");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload), "callback panicked");
    }
}
