//! SQLite storage for group records.
//!
//! Timestamps are stored as Unix milliseconds. The `seq` column records
//! creation order and survives updates of the same group.

use chrono::{DateTime, Utc};
use group_types::{
    Group, GroupId, GroupRecord, GroupStatus, Location, Participant, ParticipantStatus, UserId,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

use crate::{GroupStore, StoreError, StoreResult};

const GROUP_COLUMNS: &str = "id, kind, distance_km, pace_min_per_km, start_time, lat, lng, \
     place_name, meeting_point, capacity, status, created_at, updated_at";

/// SQLite-backed [`GroupStore`].
pub struct SqliteGroupStore {
    conn: Mutex<Connection>,
}

impl SqliteGroupStore {
    /// Opens a SQLite database at the given path.
    ///
    /// Creates the database and schema if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS groups (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                distance_km REAL NOT NULL,
                pace_min_per_km REAL NOT NULL,
                start_time INTEGER NOT NULL,
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                place_name TEXT,
                meeting_point TEXT,
                capacity INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS participants (
                group_id TEXT NOT NULL REFERENCES groups(id),
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                display_name TEXT,
                pace_min_per_km REAL,
                status TEXT NOT NULL,
                joined_at INTEGER NOT NULL,
                PRIMARY KEY (group_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_groups_kind_status ON groups(kind, status);
            CREATE INDEX IF NOT EXISTS idx_groups_start_time ON groups(start_time);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn load_participants(conn: &Connection, id: &GroupId) -> StoreResult<Vec<Participant>> {
        let mut stmt = conn.prepare(
            "SELECT user_id, display_name, pace_min_per_km, status, joined_at
             FROM participants WHERE group_id = ? ORDER BY position",
        )?;
        let rows = stmt.query_map(params![id.as_str()], |row| {
            Ok(ParticipantRow {
                user_id: row.get(0)?,
                display_name: row.get(1)?,
                pace_min_per_km: row.get(2)?,
                status: row.get(3)?,
                joined_at: row.get(4)?,
            })
        })?;

        let mut participants = Vec::new();
        for row in rows {
            participants.push(row?.into_participant()?);
        }
        Ok(participants)
    }

    fn query_groups(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<Group>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, GroupRow::from_row)?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?.into_group()?);
        }
        Ok(groups)
    }
}

impl GroupStore for SqliteGroupStore {
    fn get(&self, id: &GroupId) -> StoreResult<Option<GroupRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = ?"),
                params![id.as_str()],
                GroupRow::from_row,
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let group = row.into_group()?;
        let participants = Self::load_participants(&conn, id)?;
        Ok(Some(GroupRecord {
            group,
            participants,
        }))
    }

    fn put(&self, record: &GroupRecord) -> StoreResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let g = &record.group;

        tx.execute(
            "INSERT INTO groups (id, kind, distance_km, pace_min_per_km, start_time, lat, lng,
                                 place_name, meeting_point, capacity, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                distance_km = excluded.distance_km,
                pace_min_per_km = excluded.pace_min_per_km,
                start_time = excluded.start_time,
                lat = excluded.lat,
                lng = excluded.lng,
                place_name = excluded.place_name,
                meeting_point = excluded.meeting_point,
                capacity = excluded.capacity,
                status = excluded.status,
                updated_at = excluded.updated_at",
            params![
                g.id.as_str(),
                g.kind,
                g.distance_km,
                g.pace_min_per_km,
                g.start_time.timestamp_millis(),
                g.location.lat,
                g.location.lng,
                g.location.place_name,
                g.meeting_point,
                g.capacity,
                g.status.as_str(),
                g.created_at.timestamp_millis(),
                g.updated_at.timestamp_millis(),
            ],
        )?;

        tx.execute(
            "DELETE FROM participants WHERE group_id = ?",
            params![g.id.as_str()],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO participants
                    (group_id, user_id, position, display_name, pace_min_per_km, status, joined_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, p) in record.participants.iter().enumerate() {
                insert.execute(params![
                    g.id.as_str(),
                    p.user_id.as_str(),
                    position as i64,
                    p.display_name,
                    p.pace_min_per_km,
                    p.status.as_str(),
                    p.joined_at.timestamp_millis(),
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            group_id = %g.id,
            status = %g.status,
            participants = record.participants.len(),
            "group record stored"
        );
        Ok(())
    }

    fn matchable_groups_of_kind(&self, kind: &str) -> StoreResult<Vec<Group>> {
        let conn = self.conn.lock();
        Self::query_groups(
            &conn,
            &format!(
                "SELECT {GROUP_COLUMNS} FROM groups WHERE kind = ? AND status != ? ORDER BY seq"
            ),
            params![kind, GroupStatus::Cancelled.as_str()],
        )
    }

    fn upcoming(&self, now: DateTime<Utc>) -> StoreResult<Vec<Group>> {
        let conn = self.conn.lock();
        Self::query_groups(
            &conn,
            &format!(
                "SELECT {GROUP_COLUMNS} FROM groups WHERE start_time >= ? ORDER BY start_time, seq"
            ),
            params![now.timestamp_millis()],
        )
    }
}

/// Raw `groups` row before decoding.
struct GroupRow {
    id: String,
    kind: String,
    distance_km: f64,
    pace_min_per_km: f64,
    start_time: i64,
    lat: f64,
    lng: f64,
    place_name: Option<String>,
    meeting_point: Option<String>,
    capacity: u32,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl GroupRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            distance_km: row.get(2)?,
            pace_min_per_km: row.get(3)?,
            start_time: row.get(4)?,
            lat: row.get(5)?,
            lng: row.get(6)?,
            place_name: row.get(7)?,
            meeting_point: row.get(8)?,
            capacity: row.get(9)?,
            status: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_group(self) -> StoreResult<Group> {
        let status = GroupStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Corrupt(format!("group status {:?}", self.status)))?;
        Ok(Group {
            id: GroupId::from(self.id),
            kind: self.kind,
            distance_km: self.distance_km,
            pace_min_per_km: self.pace_min_per_km,
            start_time: from_millis(self.start_time)?,
            location: Location {
                lat: self.lat,
                lng: self.lng,
                place_name: self.place_name,
            },
            meeting_point: self.meeting_point,
            capacity: self.capacity,
            status,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
        })
    }
}

struct ParticipantRow {
    user_id: String,
    display_name: Option<String>,
    pace_min_per_km: Option<f64>,
    status: String,
    joined_at: i64,
}

impl ParticipantRow {
    fn into_participant(self) -> StoreResult<Participant> {
        let status = ParticipantStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Corrupt(format!("participant status {:?}", self.status)))?;
        Ok(Participant {
            user_id: UserId::from(self.user_id),
            display_name: self.display_name,
            pace_min_per_km: self.pace_min_per_km,
            status,
            joined_at: from_millis(self.joined_at)?,
        })
    }
}

fn from_millis(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {ms} out of range")))
}
