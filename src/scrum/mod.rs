//! Daily scrum model.
//!
//! A `DailyScrum` is the definition a meeting is run from: who attends, in
//! which order they speak, and how long the whole meeting lasts. Every
//! finished meeting that was saved becomes a `History` entry.

pub mod samples;
pub mod theme;

pub use samples::samples;
pub use theme::Theme;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub name: String,
}

impl Attendee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Record of a finished meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
    pub length_in_minutes: u32,
    pub transcript: Option<String>,
}

impl History {
    pub fn new(
        date: DateTime<Utc>,
        attendees: Vec<Attendee>,
        length_in_minutes: u32,
        transcript: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            attendees,
            length_in_minutes,
            transcript,
        }
    }

    pub fn attendee_names(&self) -> Vec<&str> {
        self.attendees.iter().map(|a| a.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyScrum {
    pub id: Uuid,
    pub title: String,
    /// Speaking order.
    pub attendees: Vec<Attendee>,
    pub length_in_minutes: u32,
    pub theme: Theme,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<History>,
}

impl DailyScrum {
    pub fn new<I, S>(title: impl Into<String>, attendees: I, length_in_minutes: u32, theme: Theme) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            attendees: attendees.into_iter().map(Attendee::new).collect(),
            length_in_minutes,
            theme,
            history: Vec::new(),
        }
    }

    pub fn from_draft(draft: ScrumDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            attendees: draft.attendees,
            length_in_minutes: draft.length_in_minutes,
            theme: draft.theme,
            history: Vec::new(),
        }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.length_in_minutes) * 60
    }

    /// Editable copy of the definition fields.
    pub fn draft(&self) -> ScrumDraft {
        ScrumDraft {
            title: self.title.clone(),
            attendees: self.attendees.clone(),
            length_in_minutes: self.length_in_minutes,
            theme: self.theme,
        }
    }

    /// Applies an edited draft. Identity and history are kept.
    pub fn update(&mut self, draft: ScrumDraft) {
        self.title = draft.title;
        self.attendees = draft.attendees;
        self.length_in_minutes = draft.length_in_minutes;
        self.theme = draft.theme;
    }

    /// Appends an attendee unless one with the same id is already present.
    pub fn add_attendee(&mut self, attendee: Attendee) -> bool {
        if self.attendees.iter().any(|a| a.id == attendee.id) {
            return false;
        }
        self.attendees.push(attendee);
        true
    }

    /// Removes the first attendee whose name matches, ignoring case.
    pub fn remove_attendee(&mut self, name: &str) -> Option<Attendee> {
        let index = self
            .attendees
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attendees.remove(index))
    }

    pub fn record(&mut self, history: History) {
        self.history.insert(0, history);
    }
}

/// Editable form of a scrum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrumDraft {
    pub title: String,
    pub attendees: Vec<Attendee>,
    pub length_in_minutes: u32,
    pub theme: Theme,
}

impl Default for ScrumDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            attendees: Vec::new(),
            length_in_minutes: 5,
            theme: Theme::Seafoam,
        }
    }
}

/// Finds a scrum by id, id prefix or case-insensitive title.
pub fn find<'a>(scrums: &'a [DailyScrum], key: &str) -> Option<&'a DailyScrum> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(scrum) = scrums.iter().find(|s| s.id == id) {
            return Some(scrum);
        }
    }

    if let Some(scrum) = scrums.iter().find(|s| s.title.eq_ignore_ascii_case(key)) {
        return Some(scrum);
    }

    let lowered = key.to_ascii_lowercase();
    let mut by_prefix = scrums
        .iter()
        .filter(|s| s.id.to_string().starts_with(&lowered));
    match (by_prefix.next(), by_prefix.next()) {
        (Some(scrum), None) => Some(scrum),
        _ => None,
    }
}
