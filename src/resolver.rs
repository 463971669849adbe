use std::sync::Arc;

use log::info;

use crate::bridge::{FocusTarget, WindowBridge};
use crate::db::FocusEvent;
use crate::error::FocusError;
use crate::matching::derive_workspace_name;
use crate::store::EventStore;

/// Result of a focus-last-window request. An empty history is informational,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The recorded event whose window was located and raised.
    Raised(FocusEvent),
    /// No qualifying prior window exists in the history.
    NothingToFocus,
}

/// Maps a recorded focus event back to a live OS window and raises it.
pub struct WindowResolver {
    store: EventStore,
    bridge: Arc<dyn WindowBridge>,
}

impl WindowResolver {
    pub fn new(store: EventStore, bridge: Arc<dyn WindowBridge>) -> Self {
        Self { store, bridge }
    }

    /// Finds the most recent relevant window recorded outside the current
    /// session and asks the bridge to raise it. Store and bridge failures
    /// propagate; permission errors gain a remediation hint.
    pub async fn focus_last_window(
        &self,
        current_session_id: &str,
        preferred_app_id: Option<&str>,
    ) -> Result<FocusOutcome, FocusError> {
        let Some(event) = self
            .store
            .query_last_relevant_window(current_session_id, None)
            .await?
        else {
            info!("no prior window recorded outside session {current_session_id}");
            return Ok(FocusOutcome::NothingToFocus);
        };

        let target = FocusTarget {
            title: Some(event.window_title.clone()),
            workspace_hint: event
                .workspace_name
                .clone()
                .or_else(|| derive_workspace_name(&event.window_title)),
            preferred_app_id: event
                .app_id
                .clone()
                .or_else(|| preferred_app_id.map(str::to_string)),
        };

        match self.bridge.focus_window(&target).await {
            Ok(()) => Ok(FocusOutcome::Raised(event)),
            Err(FocusError::PermissionDenied(detail)) => {
                Err(FocusError::PermissionDenied(format!(
                    "{detail}; grant the host application Automation and Accessibility \
                     permissions in System Settings > Privacy & Security"
                )))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FrontmostWindow;
    use crate::store::NewFocusEvent;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tempfile::tempdir;

    /// Bridge fake that records the target it was asked to raise and replies
    /// with a scripted result.
    struct RecordingBridge {
        response: fn() -> Result<(), FocusError>,
        raised: StdMutex<Vec<FocusTarget>>,
    }

    impl RecordingBridge {
        fn replying(response: fn() -> Result<(), FocusError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                raised: StdMutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl WindowBridge for RecordingBridge {
        fn supports_automation(&self) -> bool {
            true
        }

        async fn frontmost_window(&self) -> Result<Option<FrontmostWindow>, FocusError> {
            Ok(None)
        }

        async fn focus_window(&self, target: &FocusTarget) -> Result<(), FocusError> {
            self.raised.lock().unwrap().push(target.clone());
            (self.response)()
        }
    }

    async fn seeded_store(dir: &tempfile::TempDir) -> EventStore {
        let store = EventStore::new(dir.path().join("focus.sqlite3"));
        store
            .record_focus_event(NewFocusEvent {
                session_id: "session-a".to_string(),
                window_title: "x.ts — demo".to_string(),
                app_id: Some("vscode".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn resolves_record_into_focus_target() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir).await;
        let bridge = RecordingBridge::replying(|| Ok(()));
        let resolver = WindowResolver::new(store, bridge.clone());

        let outcome = resolver
            .focus_last_window("session-b", None)
            .await
            .unwrap();
        assert!(matches!(outcome, FocusOutcome::Raised(_)));

        let raised = bridge.raised.lock().unwrap();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].title.as_deref(), Some("x.ts — demo"));
        assert_eq!(raised[0].workspace_hint.as_deref(), Some("demo"));
        assert_eq!(raised[0].preferred_app_id.as_deref(), Some("vscode"));
    }

    #[tokio::test]
    async fn own_session_is_excluded() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir).await;
        let bridge = RecordingBridge::replying(|| Ok(()));
        let resolver = WindowResolver::new(store, bridge.clone());

        let outcome = resolver
            .focus_last_window("session-a", None)
            .await
            .unwrap();
        assert_eq!(outcome, FocusOutcome::NothingToFocus);
        assert!(bridge.raised.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_matching_window_propagates() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir).await;
        let bridge = RecordingBridge::replying(|| Err(FocusError::NoMatchingWindow));
        let resolver = WindowResolver::new(store, bridge);

        let err = resolver
            .focus_last_window("session-b", None)
            .await
            .unwrap_err();
        assert!(matches!(err, FocusError::NoMatchingWindow));
    }

    #[tokio::test]
    async fn permission_denied_gains_remediation_hint() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir).await;
        let bridge = RecordingBridge::replying(|| {
            Err(FocusError::PermissionDenied("error -1743".to_string()))
        });
        let resolver = WindowResolver::new(store, bridge);

        let err = resolver
            .focus_last_window("session-b", None)
            .await
            .unwrap_err();
        match err {
            FocusError::PermissionDenied(detail) => {
                assert!(detail.contains("error -1743"));
                assert!(detail.contains("System Settings"));
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn caller_preference_fills_missing_app_id() {
        let dir = tempdir().unwrap();
        let store = EventStore::new(dir.path().join("focus.sqlite3"));
        store
            .record_focus_event(NewFocusEvent {
                session_id: "session-a".to_string(),
                window_title: "notes.md".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let bridge = RecordingBridge::replying(|| Ok(()));
        let resolver = WindowResolver::new(store, bridge.clone());

        resolver
            .focus_last_window("session-b", Some("cursor"))
            .await
            .unwrap();

        let raised = bridge.raised.lock().unwrap();
        assert_eq!(raised[0].preferred_app_id.as_deref(), Some("cursor"));
        assert_eq!(raised[0].workspace_hint, None);
    }

    #[tokio::test]
    async fn empty_history_is_informational() {
        let dir = tempdir().unwrap();
        let store = EventStore::new(dir.path().join("focus.sqlite3"));
        let bridge = RecordingBridge::replying(|| Ok(()));
        let resolver = WindowResolver::new(store, bridge);

        let outcome = resolver
            .focus_last_window("session-b", None)
            .await
            .unwrap();
        assert_eq!(outcome, FocusOutcome::NothingToFocus);
    }
}
