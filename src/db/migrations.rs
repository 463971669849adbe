use anyhow::{bail, Context, Result};
use rusqlite::{Connection, Transaction};

const CURRENT_SCHEMA_VERSION: i32 = 2;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_migration(&tx, next_version)
            .with_context(|| format!("migration to version {next_version} failed"))?;
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<()> {
    match version {
        1 => {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS window_focus (
                     id INTEGER PRIMARY KEY AUTOINCREMENT,
                     session_id TEXT NOT NULL,
                     window_title TEXT NOT NULL,
                     workspace_name TEXT,
                     workspace_path TEXT,
                     active_file TEXT,
                     focused_at INTEGER NOT NULL
                 );
                 CREATE INDEX IF NOT EXISTS idx_window_focus_focused_at
                     ON window_focus(focused_at);",
            )
            .context("failed to create window_focus table")?;
            Ok(())
        }
        2 => add_column(tx, "window_focus", "app_id", "TEXT"),
        _ => bail!("unknown migration target version: {version}"),
    }
}

/// ALTER TABLE that treats "duplicate column name" as success. Early builds
/// added `app_id` outside the versioned path, so stores in the wild may carry
/// the column already while still reporting an older user_version.
fn add_column(tx: &Transaction<'_>, table: &str, column: &str, column_type: &str) -> Result<()> {
    let statement = format!("ALTER TABLE {table} ADD COLUMN {column} {column_type}");
    match tx.execute_batch(&statement) {
        Ok(()) => Ok(()),
        Err(err) if err.to_string().contains("duplicate column name") => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to add column {table}.{column}")),
    }
}
