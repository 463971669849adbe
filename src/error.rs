use thiserror::Error;

/// Failure taxonomy for focus tracking and window activation.
///
/// Debounce skips and "nothing recorded yet" are ordinary outcomes, not
/// errors; everything here is something the host should surface or log.
#[derive(Debug, Error)]
pub enum FocusError {
    /// The embedded store could not be opened, migrated, or written.
    /// Focus tracking degrades to a no-op; the user is warned once.
    #[error("focus-history store is unavailable: {0}")]
    StoreUnavailable(String),

    /// At least one supported application was running, but none of its
    /// windows matched the requested target.
    #[error("no open window matches the recorded title or workspace")]
    NoMatchingWindow,

    /// None of the supported applications had a running process.
    #[error("no supported editor application is currently running")]
    NoSupportedApplicationRunning,

    /// Window automation is not available on this OS.
    #[error("window automation is not supported on this platform")]
    PlatformUnsupported,

    /// The OS refused the automation permission needed to enumerate or
    /// raise windows.
    #[error("window automation permission denied: {0}")]
    PermissionDenied(String),

    /// Any other scripting failure (non-zero exit, unparseable output).
    #[error("window automation failed: {0}")]
    Automation(String),
}
