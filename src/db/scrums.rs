use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use uuid::Uuid;

use super::history::HistoryRepository;
use crate::scrum::{DailyScrum, Theme};

/// Number of history entries loaded with each scrum.
const LOADED_HISTORY: usize = 100;

struct ScrumRow {
    id: String,
    title: String,
    attendees: String,
    length_in_minutes: i64,
    theme: String,
}

impl ScrumRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            attendees: row.get(2)?,
            length_in_minutes: row.get(3)?,
            theme: row.get(4)?,
        })
    }

    fn into_scrum(self, conn: &Connection) -> Result<DailyScrum> {
        let id = Uuid::parse_str(&self.id).context("Invalid scrum id")?;
        Ok(DailyScrum {
            id,
            title: self.title,
            attendees: serde_json::from_str(&self.attendees)
                .context("Invalid scrum attendees")?,
            length_in_minutes: u32::try_from(self.length_in_minutes)
                .context("Invalid scrum length")?,
            theme: self.theme.parse::<Theme>()?,
            history: HistoryRepository::list_for_scrum(conn, id, LOADED_HISTORY)?,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, attendees, length_in_minutes, theme FROM scrums";

/// Repository for scrum definitions.
pub struct ScrumRepository;

impl ScrumRepository {
    /// Insert or update a scrum definition. New scrums go to the end of the
    /// list. History is written separately.
    pub fn save(conn: &Connection, scrum: &DailyScrum) -> Result<()> {
        let position: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM scrums",
                [],
                |row| row.get(0),
            )
            .context("Failed to compute scrum position")?;

        Self::upsert(conn, scrum, position)
    }

    fn upsert(conn: &Connection, scrum: &DailyScrum, position: i64) -> Result<()> {
        let attendees =
            serde_json::to_string(&scrum.attendees).context("Failed to serialize attendees")?;

        conn.execute(
            "INSERT INTO scrums (id, title, attendees, length_in_minutes, theme, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                attendees = excluded.attendees,
                length_in_minutes = excluded.length_in_minutes,
                theme = excluded.theme",
            params![
                scrum.id.to_string(),
                scrum.title,
                attendees,
                scrum.length_in_minutes,
                scrum.theme.as_str(),
                position,
            ],
        )
        .with_context(|| format!("Failed to save scrum '{}'", scrum.title))?;

        Ok(())
    }

    pub fn get(conn: &Connection, id: Uuid) -> Result<Option<DailyScrum>> {
        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                ScrumRow::from_row,
            )
            .optional()
            .context("Failed to query scrum")?;

        row.map(|row| row.into_scrum(conn)).transpose()
    }

    /// All scrums in list order, each with its recent history.
    pub fn load_all(conn: &Connection) -> Result<Vec<DailyScrum>> {
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY position ASC, rowid ASC"))
            .context("Failed to prepare scrum query")?;

        let rows = stmt
            .query_map([], ScrumRow::from_row)
            .context("Failed to query scrums")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to map scrums")?;

        rows.into_iter().map(|row| row.into_scrum(conn)).collect()
    }

    /// Replace the stored list with `scrums`, in order. Scrums missing from
    /// the list are deleted along with their history. History entries are
    /// only ever added.
    pub fn save_all(conn: &Connection, scrums: &[DailyScrum]) -> Result<()> {
        let tx = conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let keep: HashSet<String> = scrums.iter().map(|s| s.id.to_string()).collect();
        let stored: Vec<String> = {
            let mut stmt = tx
                .prepare("SELECT id FROM scrums")
                .context("Failed to prepare scrum id query")?;
            let ids = stmt
                .query_map([], |row| row.get(0))
                .context("Failed to query scrum ids")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to map scrum ids")?;
            ids
        };
        for id in stored.iter().filter(|id| !keep.contains(*id)) {
            tx.execute("DELETE FROM scrums WHERE id = ?1", params![id])
                .context("Failed to delete scrum")?;
        }

        for (position, scrum) in scrums.iter().enumerate() {
            Self::upsert(&tx, scrum, position as i64)?;
            tx.execute(
                "UPDATE scrums SET position = ?1 WHERE id = ?2",
                params![position as i64, scrum.id.to_string()],
            )
            .context("Failed to update scrum position")?;
            for history in &scrum.history {
                HistoryRepository::insert_if_missing(&tx, scrum.id, history)?;
            }
        }

        tx.commit().context("Failed to commit scrums")?;
        Ok(())
    }

    /// Delete a scrum and its history. Returns whether it existed.
    pub fn delete(conn: &Connection, id: Uuid) -> Result<bool> {
        let deleted = conn
            .execute("DELETE FROM scrums WHERE id = ?1", params![id.to_string()])
            .context("Failed to delete scrum")?;
        Ok(deleted > 0)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM scrums", [], |row| row.get(0))
            .context("Failed to count scrums")
    }
}
