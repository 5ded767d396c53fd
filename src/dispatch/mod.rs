//! The dispatcher: the imperative shell around the immutable cell.
//!
//! All writes to application state go through a [`Dispatcher`], either as a
//! synchronous [`Reducer`] run by [`Dispatcher::update`] or as an asynchronous
//! [`Action`] run by [`Dispatcher::send`]. The dispatcher records every
//! completed operation in its history and tells registered callbacks about
//! successes and failures.
//!
//! # Key Concepts
//!
//! - **Operations**: reducers and actions carry a name and a unique id
//! - **Scopes**: callbacks listen to every operation or to one id
//! - **Notifications**: state changes are queued and delivered by
//!   [`Dispatcher::flush_notifications`] or a spawned notifier task

mod callbacks;
mod dispatcher;
mod operation;
mod options;

pub use callbacks::{ActionCallback, ErrorCallback, Scope};
pub use dispatcher::Dispatcher;
pub use operation::{Action, Operation, OperationId, Reducer, ANONYMOUS};
pub use options::Options;
