use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use tokio::sync::Mutex;

use crate::db::{Database, FocusEvent};
use crate::error::FocusError;
use crate::matching::derive_workspace_name;

/// Fields the coordinator supplies for one focus-change record.
///
/// `workspace_name` and `focused_at` are not here on purpose: the store
/// derives the former from the title and stamps the latter at write time.
#[derive(Debug, Clone, Default)]
pub struct NewFocusEvent {
    pub session_id: String,
    pub window_title: String,
    pub workspace_path: Option<String>,
    pub active_file: Option<String>,
    pub app_id: Option<String>,
}

/// Durable, bounded store of focus events.
///
/// The backing database opens lazily on first use. The mutex around the slot
/// makes concurrent first callers wait on a single initialization; a failed
/// open leaves the slot empty so the next call retries instead of wedging the
/// store for the rest of the process.
#[derive(Clone)]
pub struct EventStore {
    db_path: Arc<PathBuf>,
    handle: Arc<Mutex<Option<Database>>>,
}

impl EventStore {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
            handle: Arc::new(Mutex::new(None)),
        }
    }

    async fn database(&self) -> Result<Database, FocusError> {
        let mut guard = self.handle.lock().await;
        if let Some(db) = guard.as_ref() {
            return Ok(db.clone());
        }

        let path = self.db_path.as_ref().clone();
        let db = tokio::task::spawn_blocking(move || Database::new(path))
            .await
            .map_err(|err| FocusError::StoreUnavailable(err.to_string()))?
            .map_err(|err| FocusError::StoreUnavailable(format!("{err:#}")))?;

        *guard = Some(db.clone());
        Ok(db)
    }

    /// Persists one focus event. Empty titles (after trimming) are dropped
    /// silently; callers treat that as a non-event, not a failure.
    pub async fn record_focus_event(&self, event: NewFocusEvent) -> Result<(), FocusError> {
        let title = event.window_title.trim();
        if title.is_empty() {
            debug!("dropping focus event with empty title");
            return Ok(());
        }

        let row = FocusEvent {
            session_id: event.session_id,
            window_title: title.to_string(),
            workspace_name: derive_workspace_name(title),
            workspace_path: event.workspace_path,
            active_file: event.active_file,
            focused_at: Utc::now().timestamp_millis(),
            app_id: event.app_id,
        };

        let db = self.database().await?;
        db.insert_focus_event(row)
            .await
            .map_err(|err| FocusError::StoreUnavailable(format!("{err:#}")))
    }

    /// Most recent event recorded by some other session, skipping rows whose
    /// workspace name ends with the `.` placeholder suffix. `Ok(None)` when
    /// nothing qualifies.
    pub async fn query_last_relevant_window(
        &self,
        exclude_session_id: &str,
        app_id_filter: Option<&str>,
    ) -> Result<Option<FocusEvent>, FocusError> {
        let db = self.database().await?;
        db.last_relevant_window(
            exclude_session_id.to_string(),
            app_id_filter.map(str::to_string),
        )
        .await
        .map_err(|err| FocusError::StoreUnavailable(format!("{err:#}")))
    }
}
