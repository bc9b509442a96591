//! SQLite-backed mirror.
//!
//! The group and participant list are stored as JSON; `start_time` is
//! duplicated into its own column for ordering.

use chrono::{DateTime, Utc};
use group_types::{GroupId, Outcome};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use crate::store::{MirrorError, MirrorResult, MirrorStore};
use crate::MirrorEntry;

pub struct SqliteMirrorStore {
    conn: Mutex<Connection>,
}

impl SqliteMirrorStore {
    /// Opens (or creates) the mirror database at `path`.
    pub fn open(path: impl AsRef<Path>) -> MirrorResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> MirrorResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> MirrorResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS mirror_entries (
                group_id TEXT PRIMARY KEY,
                group_json TEXT NOT NULL,
                participants_json TEXT NOT NULL,
                outcome TEXT NOT NULL,
                is_joined INTEGER NOT NULL,
                start_time INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

struct EntryRow {
    group_json: String,
    participants_json: String,
    outcome: String,
    is_joined: bool,
    updated_at: i64,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            group_json: row.get(0)?,
            participants_json: row.get(1)?,
            outcome: row.get(2)?,
            is_joined: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_entry(self) -> MirrorResult<MirrorEntry> {
        let outcome = Outcome::parse(&self.outcome)
            .ok_or_else(|| MirrorError::Corrupt(format!("unknown outcome {:?}", self.outcome)))?;
        let updated_at = DateTime::<Utc>::from_timestamp_millis(self.updated_at)
            .ok_or_else(|| MirrorError::Corrupt(format!("bad timestamp {}", self.updated_at)))?;
        Ok(MirrorEntry {
            group: serde_json::from_str(&self.group_json)?,
            participants: serde_json::from_str(&self.participants_json)?,
            outcome,
            is_joined: self.is_joined,
            updated_at,
        })
    }
}

const ENTRY_COLUMNS: &str = "group_json, participants_json, outcome, is_joined, updated_at";

impl MirrorStore for SqliteMirrorStore {
    fn get(&self, id: &GroupId) -> MirrorResult<Option<MirrorEntry>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM mirror_entries WHERE group_id = ?"),
                params![id.as_str()],
                EntryRow::from_row,
            )
            .optional()?;
        row.map(EntryRow::into_entry).transpose()
    }

    fn put(&self, entry: &MirrorEntry) -> MirrorResult<()> {
        let group_json = serde_json::to_string(&entry.group)?;
        let participants_json = serde_json::to_string(&entry.participants)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO mirror_entries
                (group_id, group_json, participants_json, outcome, is_joined, start_time, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(group_id) DO UPDATE SET
                group_json = excluded.group_json,
                participants_json = excluded.participants_json,
                outcome = excluded.outcome,
                is_joined = excluded.is_joined,
                start_time = excluded.start_time,
                updated_at = excluded.updated_at",
            params![
                entry.group.id.as_str(),
                group_json,
                participants_json,
                entry.outcome.as_str(),
                entry.is_joined,
                entry.group.start_time.timestamp_millis(),
                entry.updated_at.timestamp_millis(),
            ],
        )?;
        debug!(group_id = %entry.group.id, is_joined = entry.is_joined, "mirror entry written");
        Ok(())
    }

    fn delete(&self, id: &GroupId) -> MirrorResult<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM mirror_entries WHERE group_id = ?",
            params![id.as_str()],
        )?;
        Ok(removed > 0)
    }

    fn list(&self) -> MirrorResult<Vec<MirrorEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM mirror_entries ORDER BY start_time, group_id"
        ))?;
        let rows = stmt.query_map([], EntryRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }
}
