//! Meeting history browsing.
//!
//! Display-ready views over the history records stored for a scrum, shared by
//! the `history` command and the post-meeting summary.

use crate::db::HistoryRepository;
use crate::scrum::{DailyScrum, History};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters of transcript shown in list views.
const PREVIEW_CHARS: usize = 80;

/// A single history record with formatted display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub scrum_title: String,
    pub date: String,
    pub attendees: String,
    pub length_in_minutes: u32,
    pub transcript: Option<String>,
}

impl HistoryEntry {
    pub fn new(scrum_title: &str, history: History) -> Self {
        Self {
            id: history.id,
            scrum_title: scrum_title.to_string(),
            date: format_date(&history.date),
            attendees: history.attendee_names().join(", "),
            length_in_minutes: history.length_in_minutes,
            transcript: history.transcript,
        }
    }

    /// First part of the transcript on a single line, if there is one.
    pub fn transcript_preview(&self) -> Option<String> {
        let text = self.transcript.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        Some(preview(text, PREVIEW_CHARS))
    }

    /// One-line description for lists.
    pub fn summary(&self) -> String {
        format!(
            "{}  {} min  {}",
            self.date, self.length_in_minutes, self.attendees
        )
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Collapses whitespace and truncates to `max` characters.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let truncated: String = flat.chars().take(max).collect();
    format!("{}...", truncated.trim_end())
}

/// Recent meetings of a scrum, newest first.
pub fn recent(conn: &Connection, scrum: &DailyScrum, limit: usize) -> Result<Vec<HistoryEntry>> {
    let entries = HistoryRepository::list_for_scrum(conn, scrum.id, limit)?;
    Ok(entries
        .into_iter()
        .map(|history| HistoryEntry::new(&scrum.title, history))
        .collect())
}

/// Look up a record by id or unique id prefix within a scrum's history.
pub fn find(conn: &Connection, scrum: &DailyScrum, key: &str) -> Result<HistoryEntry> {
    let key = key.trim().to_ascii_lowercase();
    if let Ok(id) = Uuid::parse_str(&key) {
        if let Some((scrum_id, history)) = HistoryRepository::get(conn, id)? {
            if scrum_id == scrum.id {
                return Ok(HistoryEntry::new(&scrum.title, history));
            }
        }
        return Err(anyhow!("Meeting {} not found in '{}'", key, scrum.title));
    }

    let count = HistoryRepository::count_for_scrum(conn, scrum.id)?;
    let all = HistoryRepository::list_for_scrum(conn, scrum.id, count.max(0) as usize)?;
    let mut matches = all
        .into_iter()
        .filter(|history| !key.is_empty() && history.id.to_string().starts_with(&key));

    match (matches.next(), matches.next()) {
        (Some(history), None) => Ok(HistoryEntry::new(&scrum.title, history)),
        (Some(_), Some(_)) => Err(anyhow!("Meeting id '{}' is ambiguous", key)),
        _ => Err(anyhow!("Meeting {} not found in '{}'", key, scrum.title)),
    }
}
