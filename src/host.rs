//! Seams to the embedding host application.
//!
//! The host's command/menu framework is not modeled here; the integration
//! layer registers commands that call into [`crate::FocusCoordinator`] and
//! [`crate::WindowResolver`] and hands this crate the few capabilities it
//! actually needs.

use std::path::PathBuf;

/// What the crate consumes from its host: the current editing context plus
/// the user-facing reporting surfaces.
pub trait HostEnvironment: Send + Sync {
    /// Path of the file open in the active editor, if any.
    fn active_file(&self) -> Option<PathBuf>;

    /// Root path of the active workspace/project, if any.
    fn workspace_root(&self) -> Option<PathBuf>;

    /// Toast-style warning shown to the user.
    fn warn_user(&self, message: &str);

    /// One line appended to the host's diagnostic log surface.
    fn log_line(&self, message: &str);
}

/// Initializes logging the same way for every host (reads RUST_LOG).
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
