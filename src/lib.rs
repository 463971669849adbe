//! Focus-history tracking and window re-activation for editor hosts.
//!
//! The crate records which editor window the user last had focused, keeps a
//! bounded history of those events in SQLite, and can later map a recorded
//! event back to a live OS window and raise it. A host integration wires four
//! commands to this crate: force-log the current window
//! ([`FocusCoordinator::record_current_window`] with `force = true`), focus
//! the last non-placeholder window ([`WindowResolver::focus_last_window`]),
//! and its own out-of-scope task/build helpers.

pub mod bridge;
mod coordinator;
mod db;
mod error;
mod host;
pub mod matching;
mod resolver;
mod store;

pub use bridge::{
    supported_applications, CandidateWindow, FocusTarget, FrontmostWindow, OsaScriptBridge,
    WindowBridge,
};
pub use coordinator::{FocusCoordinator, LastWindowMarker, RecordOutcome};
pub use db::{FocusEvent, MAX_ROWS};
pub use error::FocusError;
pub use host::{init_logging, HostEnvironment};
pub use resolver::{FocusOutcome, WindowResolver};
pub use store::{EventStore, NewFocusEvent};
