//! Meeting history persistence.
//!
//! One row per saved meeting, attached to its scrum. Dates are stored as
//! RFC 3339 text with fixed precision so they sort chronologically.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use crate::meeting::HistorySink;
use crate::scrum::History;

struct HistoryRow {
    id: String,
    scrum_id: String,
    date: String,
    attendees: String,
    length_in_minutes: i64,
    transcript: Option<String>,
}

impl HistoryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            scrum_id: row.get(1)?,
            date: row.get(2)?,
            attendees: row.get(3)?,
            length_in_minutes: row.get(4)?,
            transcript: row.get(5)?,
        })
    }

    fn into_history(self) -> Result<(Uuid, History)> {
        let scrum_id = Uuid::parse_str(&self.scrum_id).context("Invalid scrum id in history")?;
        let history = History {
            id: Uuid::parse_str(&self.id).context("Invalid history id")?,
            date: DateTime::parse_from_rfc3339(&self.date)
                .context("Invalid history date")?
                .with_timezone(&Utc),
            attendees: serde_json::from_str(&self.attendees)
                .context("Invalid history attendees")?,
            length_in_minutes: u32::try_from(self.length_in_minutes)
                .context("Invalid history length")?,
            transcript: self.transcript,
        };
        Ok((scrum_id, history))
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

const SELECT_COLUMNS: &str =
    "SELECT id, scrum_id, date, attendees, length_in_minutes, transcript FROM history";

/// Repository for meeting history records.
pub struct HistoryRepository;

impl HistoryRepository {
    /// Insert a history record for a scrum.
    pub fn insert(conn: &Connection, scrum_id: Uuid, history: &History) -> Result<()> {
        let attendees =
            serde_json::to_string(&history.attendees).context("Failed to serialize attendees")?;

        conn.execute(
            "INSERT INTO history (id, scrum_id, date, attendees, length_in_minutes, transcript) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                history.id.to_string(),
                scrum_id.to_string(),
                format_date(&history.date),
                attendees,
                history.length_in_minutes,
                history.transcript,
            ],
        )
        .context("Failed to insert history")?;

        Ok(())
    }

    /// Insert unless a record with the same id already exists.
    pub fn insert_if_missing(conn: &Connection, scrum_id: Uuid, history: &History) -> Result<bool> {
        if Self::get(conn, history.id)?.is_some() {
            return Ok(false);
        }
        Self::insert(conn, scrum_id, history)?;
        Ok(true)
    }

    /// Get a history record and the id of the scrum it belongs to.
    pub fn get(conn: &Connection, id: Uuid) -> Result<Option<(Uuid, History)>> {
        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                HistoryRow::from_row,
            )
            .optional()
            .context("Failed to query history")?;

        row.map(HistoryRow::into_history).transpose()
    }

    /// List a scrum's history, newest first.
    pub fn list_for_scrum(conn: &Connection, scrum_id: Uuid, limit: usize) -> Result<Vec<History>> {
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE scrum_id = ?1 ORDER BY date DESC, rowid DESC LIMIT ?2"
            ))
            .context("Failed to prepare history query")?;

        let rows = stmt
            .query_map(params![scrum_id.to_string(), limit as i64], HistoryRow::from_row)
            .context("Failed to list history")?;

        let mut entries = Vec::new();
        for row in rows {
            let (_, history) = row?.into_history()?;
            entries.push(history);
        }

        Ok(entries)
    }

    pub fn count_for_scrum(conn: &Connection, scrum_id: Uuid) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM history WHERE scrum_id = ?1",
            params![scrum_id.to_string()],
            |row| row.get(0),
        )
        .context("Failed to count history")
    }
}

/// `HistorySink` writing straight to the database.
pub struct SqliteHistorySink {
    conn: Mutex<Connection>,
}

impl SqliteHistorySink {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(super::open_db(db_path)?))
    }

    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&conn)
    }
}

impl HistorySink for SqliteHistorySink {
    fn record(&self, scrum_id: Uuid, history: &History) -> Result<()> {
        self.with_connection(|conn| HistoryRepository::insert(conn, scrum_id, history))
    }
}
