use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::bridge::WindowBridge;
use crate::error::FocusError;
use crate::host::HostEnvironment;
use crate::matching::derive_workspace_name;
use crate::store::{EventStore, NewFocusEvent};

/// Repeated identical focus signals inside this window are not re-recorded.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// What one focus-change notification turned into. None of these are errors;
/// the coordinator absorbs store failures into a degraded mode by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A row was written.
    Recorded,
    /// Same window signature within the debounce window; nothing written.
    Debounced,
    /// No usable frontmost window (or no automation on this platform).
    Skipped,
    /// The store is unavailable; tracking continues without persistence.
    Degraded,
}

/// Side-channel marker describing the most recent meaningful window, for
/// consumers outside the host process (e.g. a status-bar script).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastWindowMarker {
    pub label: String,
    pub window_title: String,
    pub recorded_at: i64,
}

struct RecorderState {
    last_signature: Option<String>,
    last_recorded_at: Option<Instant>,
    warned_store_unavailable: bool,
}

/// Subscribes to host focus-change notifications, debounces repeated signals,
/// enriches them with host context, and persists them.
pub struct FocusCoordinator {
    session_id: String,
    store: EventStore,
    bridge: Arc<dyn WindowBridge>,
    host: Arc<dyn HostEnvironment>,
    marker_path: Option<PathBuf>,
    state: Mutex<RecorderState>,
}

impl FocusCoordinator {
    pub fn new(
        store: EventStore,
        bridge: Arc<dyn WindowBridge>,
        host: Arc<dyn HostEnvironment>,
        marker_path: Option<PathBuf>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            store,
            bridge,
            host,
            marker_path,
            state: Mutex::new(RecorderState {
                last_signature: None,
                last_recorded_at: None,
                warned_store_unavailable: false,
            }),
        }
    }

    /// Identifier for this host process instance. Recorded with every event
    /// so queries can exclude "switch back to my own window" noise.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Entry point for host focus-change notifications. `force` comes from
    /// the explicit user command and bypasses the debounce window; it also
    /// turns silent skips into user-visible warnings.
    pub async fn record_current_window(&self, force: bool) -> RecordOutcome {
        if !self.bridge.supports_automation() {
            if force {
                self.host
                    .warn_user("Window tracking is only available on macOS.");
            }
            return RecordOutcome::Skipped;
        }

        let window = match self.bridge.frontmost_window().await {
            Ok(Some(window)) => window,
            Ok(None) => {
                if force {
                    self.host
                        .warn_user("Could not determine the focused editor window.");
                }
                return RecordOutcome::Skipped;
            }
            Err(err) => {
                warn!("frontmost-window query failed: {err}");
                if force {
                    self.host
                        .warn_user("Could not determine the focused editor window.");
                }
                return RecordOutcome::Skipped;
            }
        };

        let signature = format!("{}::{}", window.app_id, window.title);
        if !force {
            let state = self.state.lock().await;
            let repeated = state.last_signature.as_deref() == Some(signature.as_str());
            let within_window = state
                .last_recorded_at
                .is_some_and(|at| at.elapsed() < DEBOUNCE_WINDOW);
            if repeated && within_window {
                return RecordOutcome::Debounced;
            }
        }

        let event = NewFocusEvent {
            session_id: self.session_id.clone(),
            window_title: window.title.clone(),
            workspace_path: self
                .host
                .workspace_root()
                .map(|path| path.to_string_lossy().into_owned()),
            active_file: self
                .host
                .active_file()
                .map(|path| path.to_string_lossy().into_owned()),
            app_id: Some(window.app_id.clone()),
        };

        match self.store.record_focus_event(event).await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.last_signature = Some(signature);
                state.last_recorded_at = Some(Instant::now());
                drop(state);

                self.host
                    .log_line(&format!("recorded focus event for '{}'", window.title));
                self.write_last_window_marker(&window.title);
                RecordOutcome::Recorded
            }
            Err(FocusError::StoreUnavailable(detail)) => {
                let mut state = self.state.lock().await;
                let first_failure = !state.warned_store_unavailable;
                state.warned_store_unavailable = true;
                drop(state);

                if first_failure {
                    self.host.warn_user(
                        "Focus history is unavailable; window tracking is disabled for this session.",
                    );
                }
                self.host
                    .log_line(&format!("focus event dropped, store unavailable: {detail}"));
                RecordOutcome::Degraded
            }
            Err(err) => {
                self.host
                    .log_line(&format!("focus event dropped: {err}"));
                RecordOutcome::Degraded
            }
        }
    }

    fn write_last_window_marker(&self, title: &str) {
        let Some(path) = &self.marker_path else {
            return;
        };
        let Some(label) = marker_label(title) else {
            return;
        };

        let marker = LastWindowMarker {
            label,
            window_title: title.to_string(),
            recorded_at: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string_pretty(&marker) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    warn!("failed to write last-window marker: {err}");
                }
            }
            Err(err) => warn!("failed to serialize last-window marker: {err}"),
        }
    }
}

/// Label for the side-channel marker: the derived workspace name, falling
/// back to the raw trimmed title. Labels ending in `.` follow the placeholder
/// convention and produce no marker at all.
fn marker_label(title: &str) -> Option<String> {
    let label = derive_workspace_name(title).unwrap_or_else(|| title.trim().to_string());
    if label.ends_with('.') {
        None
    } else {
        Some(label)
    }
}
