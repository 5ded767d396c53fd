//! Observability options for a dispatcher.

use serde::{Deserialize, Serialize};

/// Diagnostic switches. Neither affects what gets committed or when.
///
/// Both default to `false`. Missing fields deserialize to their defaults, so
/// hosts can load a partial configuration:
///
/// ```rust
/// use frostbox::dispatch::Options;
///
/// let options: Options = serde_json::from_str(r#"{ "log_state_changes": true }"#).unwrap();
/// assert!(options.log_state_changes);
/// assert!(!options.log_action_callback_timings);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Emit a `debug` event for every delivered state change
    pub log_state_changes: bool,
    /// Emit a `debug` event with the elapsed time of each callback batch
    pub log_action_callback_timings: bool,
}
