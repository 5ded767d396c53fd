//! Frostbox: an application-state container with frozen snapshots
//!
//! Frostbox holds one value, the application state, and only lets it change
//! through two disciplined channels: a synchronous reducer run by
//! [`Dispatcher::update`](dispatch::Dispatcher::update) and an asynchronous
//! action run by [`Dispatcher::send`](dispatch::Dispatcher::send). Every
//! committed state is a frozen snapshot, so code holding an old snapshot
//! never sees it change.
//!
//! # Core Concepts
//!
//! - **State**: any type implementing the `State` trait, or the dynamic `Value`
//! - **Cell**: `ImmutableCell` commits snapshots and queues change notifications
//! - **Dispatcher**: runs reducers and actions, keeps history, runs callbacks
//!
//! # Example
//!
//! ```rust
//! use frostbox::core::{BoxError, State};
//! use frostbox::dispatch::{Action, Dispatcher, Reducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Wallet {
//!     amount: i64,
//! }
//!
//! impl State for Wallet {}
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let add = Reducer::new("add", |mut state: Wallet, amount: &i64| {
//!     state.amount += amount;
//!     Ok(state)
//! });
//!
//! let double = {
//!     let add = add.clone();
//!     Action::new("double", move |state: Arc<Wallet>, _: (), store: Dispatcher<Wallet>| {
//!         let add = add.clone();
//!         async move {
//!             store.update(&add, state.amount)?;
//!             Ok::<(), BoxError>(())
//!         }
//!     })
//! };
//!
//! let store = Dispatcher::new(Wallet { amount: 2 });
//! store.update(&add, 3).unwrap();
//! let state = store.send(&double, ()).await.unwrap();
//!
//! assert_eq!(state.amount, 10);
//! assert_eq!(store.history().names(), vec!["add", "add", "double"]);
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod dispatch;

// Re-export commonly used types
pub use builder::{BuildError, DispatcherBuilder};
pub use core::{ImmutableCell, State, StoreError, Value};
pub use dispatch::{Action, Dispatcher, Options, Reducer, Scope};
