//! Meeting phases and the read-only view handed to presentation code.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Phase of a meeting session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl MeetingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One attendee's slot in the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: Uuid,
    pub name: String,
    pub is_completed: bool,
}

/// Point-in-time copy of a session, safe to render while the timer keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub title: String,
    pub phase: MeetingPhase,
    pub speakers: Vec<Speaker>,
    pub current_speaker_index: usize,
    pub seconds_per_speaker: u64,
    pub seconds_elapsed: u64,
    pub seconds_remaining: u64,
    pub is_recording: bool,
}

impl SessionSnapshot {
    fn current_position(&self) -> Option<usize> {
        self.speakers.iter().position(|s| !s.is_completed)
    }

    pub fn current_speaker_name(&self) -> &str {
        self.current_position()
            .map(|i| self.speakers[i].name.as_str())
            .unwrap_or("Someone")
    }

    /// "Speaker 2 of 5", or "No more speakers" once everyone is done.
    pub fn speaker_label(&self) -> String {
        match self.current_position() {
            Some(index) => format!("Speaker {} of {}", index + 1, self.speakers.len()),
            None => "No more speakers".to_string(),
        }
    }

    pub fn is_last_speaker(&self) -> bool {
        match self.speakers.split_last() {
            Some((_, before)) => before.iter().all(|s| s.is_completed),
            None => false,
        }
    }

    /// Share of speakers whose turn is over, between 0.0 and 1.0.
    pub fn progress(&self) -> f64 {
        if self.speakers.is_empty() {
            return 0.0;
        }
        let done = self.speakers.iter().filter(|s| s.is_completed).count();
        done as f64 / self.speakers.len() as f64
    }
}

/// Formats a second count as `MM:SS`.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
