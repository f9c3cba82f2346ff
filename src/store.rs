use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;
use crate::state::EnsembleState;

/// Sqlite-backed checkpoint store for [`EnsembleState`]. The aggregate is
/// persisted as an opaque JSON record keyed by strategy label; the core has
/// no opinion on the format beyond round-tripping its own shape.
#[derive(Debug)]
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS ensemble_snapshots (
                strategy_label TEXT NOT NULL PRIMARY KEY,
                state_json TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    pub fn save(&self, strategy_label: &str, state: &EnsembleState) -> Result<(), AppError> {
        let state_json = serde_json::to_string(state)?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            r#"
            INSERT INTO ensemble_snapshots (strategy_label, state_json, updated_at_ms)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(strategy_label) DO UPDATE SET
                state_json = excluded.state_json,
                updated_at_ms = excluded.updated_at_ms
            "#,
            params![strategy_label, state_json, now_ms],
        )?;
        Ok(())
    }

    pub fn load(&self, strategy_label: &str) -> Result<Option<EnsembleState>, AppError> {
        let row: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM ensemble_snapshots WHERE strategy_label = ?1",
                [strategy_label],
                |row| row.get(0),
            )
            .optional()?;
        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
