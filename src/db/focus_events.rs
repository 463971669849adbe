use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use crate::db::Database;

/// Upper bound on retained focus events. Every insert prunes everything but
/// the most-recent `MAX_ROWS` rows in the same transaction.
pub const MAX_ROWS: u32 = 500;

/// One persisted focus-change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusEvent {
    pub session_id: String,
    pub window_title: String,
    pub workspace_name: Option<String>,
    pub workspace_path: Option<String>,
    pub active_file: Option<String>,
    /// Milliseconds since the Unix epoch, assigned by the store at write time.
    pub focused_at: i64,
    pub app_id: Option<String>,
}

fn row_to_event(row: &Row) -> rusqlite::Result<FocusEvent> {
    Ok(FocusEvent {
        session_id: row.get("session_id")?,
        window_title: row.get("window_title")?,
        workspace_name: row.get("workspace_name")?,
        workspace_path: row.get("workspace_path")?,
        active_file: row.get("active_file")?,
        focused_at: row.get("focused_at")?,
        app_id: row.get("app_id")?,
    })
}

impl Database {
    /// Appends one focus event and prunes the table back down to `MAX_ROWS`
    /// rows by `focused_at`. Insert and prune commit as one transaction, so a
    /// concurrent reader never observes an over-full table or a torn insert.
    pub(crate) async fn insert_focus_event(&self, event: FocusEvent) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open focus-event transaction")?;
            tx.execute(
                "INSERT INTO window_focus
                     (session_id, window_title, workspace_name, workspace_path, active_file, focused_at, app_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    event.session_id,
                    event.window_title,
                    event.workspace_name,
                    event.workspace_path,
                    event.active_file,
                    event.focused_at,
                    event.app_id,
                ],
            )
            .context("failed to insert focus event")?;
            tx.execute(
                "DELETE FROM window_focus
                 WHERE id NOT IN (
                     SELECT id FROM window_focus
                     ORDER BY focused_at DESC, id DESC
                     LIMIT ?1
                 )",
                params![MAX_ROWS],
            )
            .context("failed to prune focus events")?;
            tx.commit().context("failed to commit focus event")?;
            Ok(())
        })
        .await
    }

    /// Most recent event from a different session whose workspace name does
    /// not carry the trailing-dot placeholder convention, optionally narrowed
    /// to one application id. `Ok(None)` when nothing qualifies.
    pub(crate) async fn last_relevant_window(
        &self,
        exclude_session_id: String,
        app_id: Option<String>,
    ) -> Result<Option<FocusEvent>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, window_title, workspace_name, workspace_path, active_file, focused_at, app_id
                 FROM window_focus
                 WHERE session_id != ?1
                   AND (workspace_name IS NULL OR workspace_name = '' OR workspace_name NOT LIKE '%.')
                   AND (?2 IS NULL OR app_id = ?2)
                 ORDER BY focused_at DESC, id DESC
                 LIMIT 1",
            )?;
            stmt.query_row(params![exclude_session_id, app_id], row_to_event)
                .optional()
                .context("failed to query last relevant window")
        })
        .await
    }
}
