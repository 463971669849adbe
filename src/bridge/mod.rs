//! OS window enumeration and activation.
//!
//! The scripting surface is reduced to three primitives: check whether a
//! process exists and is frontmost, read a window title, and raise a window by
//! exact identity. [`WindowBridge`] is the seam; [`OsaScriptBridge`] is the
//! macOS implementation that ships those primitives to `osascript`. Matching
//! decisions stay in Rust (see [`crate::matching`]) so they can be tested
//! without an OS.

mod osascript;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::FocusError;
use crate::matching::title_matches;

pub use osascript::OsaScriptBridge;

/// Application identifiers paired with the process names System Events
/// reports for them. Order is the activation preference order; several
/// process names can map to one identifier (alternate distribution channels
/// of the same editor).
pub const SUPPORTED_APPLICATIONS: &[(&str, &str)] = &[
    ("vscode", "Code"),
    ("vscode", "Visual Studio Code"),
    ("vscode-insiders", "Code - Insiders"),
    ("cursor", "Cursor"),
    ("vscodium", "VSCodium"),
    ("vscodium", "Codium"),
];

/// Fixed, ordered table of the application variants focus tracking supports.
pub fn supported_applications() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_APPLICATIONS
}

pub(crate) fn app_id_for_process(process_name: &str) -> Option<&'static str> {
    SUPPORTED_APPLICATIONS
        .iter()
        .find(|(_, name)| *name == process_name)
        .map(|(id, _)| *id)
}

/// Process names to try when activating, preferred application id first,
/// then the remainder of the table in its fixed order.
pub(crate) fn candidate_processes(
    preferred_app_id: Option<&str>,
) -> Vec<(&'static str, &'static str)> {
    let mut ordered = Vec::with_capacity(SUPPORTED_APPLICATIONS.len());
    if let Some(preferred) = preferred_app_id {
        ordered.extend(
            SUPPORTED_APPLICATIONS
                .iter()
                .copied()
                .filter(|(id, _)| *id == preferred),
        );
    }
    ordered.extend(
        SUPPORTED_APPLICATIONS
            .iter()
            .copied()
            .filter(|(id, _)| preferred_app_id != Some(*id)),
    );
    ordered
}

/// Title and application id of whichever supported application currently has
/// OS input focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontmostWindow {
    pub app_id: String,
    pub title: String,
}

/// A live window observed during one enumeration pass. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateWindow {
    pub app_id: String,
    pub process_name: String,
    pub title: String,
}

/// What `focus_window` should locate and raise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTarget {
    pub title: Option<String>,
    pub workspace_hint: Option<String>,
    pub preferred_app_id: Option<String>,
}

/// Window enumeration and activation as seen by the coordinator and resolver.
#[async_trait]
pub trait WindowBridge: Send + Sync {
    /// Whether this platform can drive window automation at all.
    fn supports_automation(&self) -> bool;

    /// Frontmost supported window, or `None` when no supported application is
    /// frontmost, it has zero windows, or the platform is unsupported.
    /// Genuine automation failures are logged and reported as `None`; focus
    /// tracking is best-effort.
    async fn frontmost_window(&self) -> Result<Option<FrontmostWindow>, FocusError>;

    /// Locates and raises a live window matching the target. At most one
    /// raise attempt per candidate window; a failed match is terminal for
    /// this invocation.
    async fn focus_window(&self, target: &FocusTarget) -> Result<(), FocusError>;
}

/// First window in enumeration order that satisfies the target.
pub(crate) fn first_matching_window<'a>(
    candidates: &'a [CandidateWindow],
    target: &FocusTarget,
) -> Option<&'a CandidateWindow> {
    candidates.iter().find(|window| {
        title_matches(
            &window.title,
            target.title.as_deref(),
            target.workspace_hint.as_deref(),
        )
    })
}
