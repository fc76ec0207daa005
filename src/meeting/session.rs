//! Speaker rotation state machine.
//!
//! The meeting length is split evenly between attendees. Each speaker's turn
//! is timed from the instant it began, so a late or missed tick never loses
//! time. The session holds no timers itself: every operation takes the
//! current instant, and `MeetingMachine` decides when to call it.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::error::SessionError;
use crate::scrum::{DailyScrum, History};

use super::status::{MeetingPhase, SessionSnapshot, Speaker};

/// What a tick or skip did to the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// The current speaker keeps the floor.
    Unchanged,
    /// The turn passed to the speaker at this index.
    NextSpeaker(usize),
    /// The last speaker finished. Returned once per session.
    AllSpeakersCompleted,
    /// The session is not running; nothing changed.
    Inactive,
}

#[derive(Debug, Clone)]
pub struct MeetingSession {
    definition: DailyScrum,
    speakers: Vec<Speaker>,
    seconds_per_speaker: u64,
    current_speaker_index: usize,
    seconds_elapsed: u64,
    seconds_remaining: u64,
    phase: MeetingPhase,
    speaker_started_at: Instant,
}

impl MeetingSession {
    pub fn start(definition: DailyScrum, now: Instant) -> Result<Self, SessionError> {
        validate(&definition)?;

        let speakers = definition
            .attendees
            .iter()
            .map(|attendee| Speaker {
                id: attendee.id,
                name: attendee.name.clone(),
                is_completed: false,
            })
            .collect::<Vec<_>>();
        let total = definition.total_seconds();
        let seconds_per_speaker = total / speakers.len() as u64;

        Ok(Self {
            definition,
            speakers,
            seconds_per_speaker,
            current_speaker_index: 0,
            seconds_elapsed: 0,
            seconds_remaining: total,
            phase: MeetingPhase::Running,
            speaker_started_at: now,
        })
    }

    /// Restarts the rotation from the first speaker of `definition`.
    /// An invalid definition leaves the session untouched.
    pub fn reset(&mut self, definition: DailyScrum, now: Instant) -> Result<(), SessionError> {
        *self = Self::start(definition, now)?;
        Ok(())
    }

    pub fn tick(&mut self, now: Instant) -> Rotation {
        if self.phase != MeetingPhase::Running {
            return Rotation::Inactive;
        }

        let seconds_for_current = now
            .saturating_duration_since(self.speaker_started_at)
            .as_secs();

        self.seconds_elapsed =
            self.current_speaker_index as u64 * self.seconds_per_speaker + seconds_for_current;
        self.seconds_remaining = self.total_seconds().saturating_sub(self.seconds_elapsed);

        if seconds_for_current >= self.slot_for(self.current_speaker_index) {
            return self.advance_speaker(now);
        }

        Rotation::Unchanged
    }

    pub fn advance_speaker(&mut self, now: Instant) -> Rotation {
        if self.phase != MeetingPhase::Running {
            return Rotation::Inactive;
        }

        self.speakers[self.current_speaker_index].is_completed = true;
        self.current_speaker_index += 1;

        if self.current_speaker_index == self.speakers.len() {
            self.phase = MeetingPhase::Completed;
            return Rotation::AllSpeakersCompleted;
        }

        self.seconds_elapsed = self.current_speaker_index as u64 * self.seconds_per_speaker;
        self.seconds_remaining = self.total_seconds().saturating_sub(self.seconds_elapsed);
        self.speaker_started_at = now;

        Rotation::NextSpeaker(self.current_speaker_index)
    }

    /// Ends the current turn early.
    pub fn skip_speaker(&mut self, now: Instant) -> Rotation {
        self.advance_speaker(now)
    }

    /// Stops the rotation without completing it.
    pub fn cancel(&mut self) {
        if self.phase == MeetingPhase::Running {
            self.phase = MeetingPhase::Cancelled;
        }
    }

    /// Closes the session. A history record is only produced when `save` is set.
    pub fn finish(
        self,
        save: bool,
        transcript: Option<String>,
        date: DateTime<Utc>,
    ) -> Option<History> {
        if !save {
            return None;
        }

        Some(History::new(
            date,
            self.definition.attendees,
            self.definition.length_in_minutes,
            transcript,
        ))
    }

    /// Length of a speaker's turn. The last speaker also gets the seconds that
    /// did not divide evenly.
    fn slot_for(&self, index: usize) -> u64 {
        if index + 1 == self.speakers.len() {
            self.total_seconds() - self.seconds_per_speaker * (self.speakers.len() as u64 - 1)
        } else {
            self.seconds_per_speaker
        }
    }

    pub fn definition(&self) -> &DailyScrum {
        &self.definition
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    pub fn current_speaker_index(&self) -> usize {
        self.current_speaker_index
    }

    pub fn current_speaker(&self) -> Option<&Speaker> {
        self.speakers.get(self.current_speaker_index)
    }

    pub fn seconds_per_speaker(&self) -> u64 {
        self.seconds_per_speaker
    }

    pub fn seconds_elapsed(&self) -> u64 {
        self.seconds_elapsed
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn total_seconds(&self) -> u64 {
        self.definition.total_seconds()
    }

    pub fn phase(&self) -> MeetingPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == MeetingPhase::Running
    }

    pub fn is_completed(&self) -> bool {
        self.phase == MeetingPhase::Completed
    }

    pub fn snapshot(&self, is_recording: bool) -> SessionSnapshot {
        SessionSnapshot {
            title: self.definition.title.clone(),
            phase: self.phase,
            speakers: self.speakers.clone(),
            current_speaker_index: self.current_speaker_index,
            seconds_per_speaker: self.seconds_per_speaker,
            seconds_elapsed: self.seconds_elapsed,
            seconds_remaining: self.seconds_remaining,
            is_recording,
        }
    }
}

pub fn validate(definition: &DailyScrum) -> Result<(), SessionError> {
    if definition.attendees.is_empty() {
        return Err(SessionError::NoAttendees);
    }
    if definition.length_in_minutes == 0 {
        return Err(SessionError::ZeroLength);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrum::Theme;
    use std::time::Duration;

    fn scrum(attendees: &[&str], minutes: u32) -> DailyScrum {
        DailyScrum::new("Standup", attendees.iter().copied(), minutes, Theme::Yellow)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_start_initial_state() {
        let now = Instant::now();
        let session = MeetingSession::start(scrum(&["A", "B", "C"], 3), now).unwrap();

        assert_eq!(session.phase(), MeetingPhase::Running);
        assert_eq!(session.current_speaker_index(), 0);
        assert_eq!(session.seconds_elapsed(), 0);
        assert_eq!(session.seconds_remaining(), 180);
        assert_eq!(session.seconds_per_speaker(), 60);
        assert_eq!(session.speakers().len(), 3);
        assert!(session.speakers().iter().all(|s| !s.is_completed));
        assert_eq!(session.current_speaker().unwrap().name, "A");
    }

    #[test]
    fn test_speakers_mirror_attendees() {
        let definition = scrum(&["Kim", "James"], 5);
        let session = MeetingSession::start(definition.clone(), Instant::now()).unwrap();

        for (speaker, attendee) in session.speakers().iter().zip(&definition.attendees) {
            assert_eq!(speaker.id, attendee.id);
            assert_eq!(speaker.name, attendee.name);
        }
    }

    #[test]
    fn test_seconds_per_speaker_is_floor_division() {
        let cases: [(usize, u32, u64); 5] = [(1, 1, 60), (3, 3, 60), (7, 10, 85), (4, 1, 15), (6, 1, 10)];
        for (count, minutes, expected) in cases {
            let names: Vec<String> = (0..count).map(|i| format!("P{i}")).collect();
            let definition = DailyScrum::new("t", names, minutes, Theme::Sky);
            let session = MeetingSession::start(definition, Instant::now()).unwrap();
            assert_eq!(
                session.seconds_per_speaker(),
                u64::from(minutes) * 60 / count as u64
            );
            assert_eq!(session.seconds_per_speaker(), expected);
        }
    }

    #[test]
    fn test_start_rejects_empty_attendees() {
        let result = MeetingSession::start(scrum(&[], 5), Instant::now());
        assert_eq!(result.unwrap_err(), SessionError::NoAttendees);
    }

    #[test]
    fn test_start_rejects_zero_length() {
        let result = MeetingSession::start(scrum(&["A"], 0), Instant::now());
        assert_eq!(result.unwrap_err(), SessionError::ZeroLength);
    }

    #[test]
    fn test_tick_uses_time_since_turn_began() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B", "C"], 3), start).unwrap();

        assert_eq!(session.tick(start + secs(1)), Rotation::Unchanged);
        assert_eq!(session.seconds_elapsed(), 1);
        assert_eq!(session.seconds_remaining(), 179);

        // Ticks in between were missed; the delta still counts.
        assert_eq!(session.tick(start + Duration::from_millis(42_700)), Rotation::Unchanged);
        assert_eq!(session.seconds_elapsed(), 42);
        assert_eq!(session.seconds_remaining(), 138);
    }

    #[test]
    fn test_tick_advances_when_turn_is_over() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B", "C"], 3), start).unwrap();

        assert_eq!(session.tick(start + secs(59)), Rotation::Unchanged);
        assert_eq!(session.tick(start + secs(60)), Rotation::NextSpeaker(1));

        assert!(session.speakers()[0].is_completed);
        assert!(!session.speakers()[1].is_completed);
        assert_eq!(session.current_speaker_index(), 1);
        assert_eq!(session.seconds_elapsed(), 60);
        assert_eq!(session.seconds_remaining(), 120);

        // The new turn is timed from the advance.
        assert_eq!(session.tick(start + secs(70)), Rotation::Unchanged);
        assert_eq!(session.seconds_elapsed(), 70);
    }

    #[test]
    fn test_last_speaker_absorbs_remainder() {
        // 120s over 7 speakers: 17s each, the last speaker gets 17 + 1.
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&names, 2), start).unwrap();
        assert_eq!(session.seconds_per_speaker(), 17);

        let mut now = start;
        for _ in 0..6 {
            session.skip_speaker(now);
        }
        assert_eq!(session.current_speaker_index(), 6);
        assert_eq!(session.seconds_elapsed(), 102);

        now += secs(17);
        assert_eq!(session.tick(now), Rotation::Unchanged);
        assert_eq!(session.seconds_remaining(), 1);

        now += secs(1);
        assert_eq!(session.tick(now), Rotation::AllSpeakersCompleted);
        assert_eq!(session.seconds_remaining(), 0);
    }

    #[test]
    fn test_skip_each_speaker_completes_once() {
        let now = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B", "C"], 3), now).unwrap();

        assert_eq!(session.skip_speaker(now), Rotation::NextSpeaker(1));
        assert_eq!(session.skip_speaker(now), Rotation::NextSpeaker(2));
        assert_eq!(session.skip_speaker(now), Rotation::AllSpeakersCompleted);

        assert!(session.is_completed());
        assert!(session.speakers().iter().all(|s| s.is_completed));
        assert_eq!(session.skip_speaker(now), Rotation::Inactive);
        assert_eq!(session.tick(now + secs(500)), Rotation::Inactive);
    }

    #[test]
    fn test_remaining_never_negative() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B"], 1), start).unwrap();

        session.skip_speaker(start);
        // Resumed long after the meeting should have ended.
        let rotation = session.tick(start + secs(3_600));
        assert_eq!(rotation, Rotation::AllSpeakersCompleted);
        assert_eq!(session.seconds_remaining(), 0);
        assert_eq!(
            session.seconds_remaining(),
            session.total_seconds().saturating_sub(session.seconds_elapsed())
        );
    }

    #[test]
    fn test_cancel_stops_mutation() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B"], 2), start).unwrap();
        session.tick(start + secs(30));
        session.cancel();

        assert_eq!(session.phase(), MeetingPhase::Cancelled);
        assert_eq!(session.tick(start + secs(90)), Rotation::Inactive);
        assert_eq!(session.skip_speaker(start + secs(90)), Rotation::Inactive);
        assert_eq!(session.seconds_elapsed(), 30);
        assert_eq!(session.current_speaker_index(), 0);
    }

    #[test]
    fn test_reset_restarts_with_new_definition() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B"], 2), start).unwrap();
        session.skip_speaker(start);

        session.reset(scrum(&["X", "Y", "Z", "W"], 4), start + secs(5)).unwrap();
        assert_eq!(session.current_speaker_index(), 0);
        assert_eq!(session.speakers().len(), 4);
        assert_eq!(session.seconds_per_speaker(), 60);
        assert_eq!(session.seconds_remaining(), 240);
    }

    #[test]
    fn test_reset_rejects_empty_attendees() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B"], 2), start).unwrap();
        session.skip_speaker(start);

        let err = session.reset(scrum(&[], 2), start).unwrap_err();
        assert_eq!(err, SessionError::NoAttendees);
        assert_eq!(session.current_speaker_index(), 1);
        assert_eq!(session.speakers().len(), 2);
    }

    #[test]
    fn test_finish_with_save_builds_history() {
        let definition = scrum(&["A", "B"], 10);
        let session = MeetingSession::start(definition.clone(), Instant::now()).unwrap();
        let date = Utc::now();

        let history = session.finish(true, Some("T".to_string()), date).unwrap();
        assert_eq!(history.attendees, definition.attendees);
        assert_eq!(history.length_in_minutes, 10);
        assert_eq!(history.transcript.as_deref(), Some("T"));
        assert_eq!(history.date, date);
    }

    #[test]
    fn test_finish_without_save_returns_nothing() {
        let session = MeetingSession::start(scrum(&["A", "B"], 10), Instant::now()).unwrap();
        assert!(session.finish(false, Some("T".to_string()), Utc::now()).is_none());

        let session = MeetingSession::start(scrum(&["A"], 10), Instant::now()).unwrap();
        assert!(session.finish(false, None, Utc::now()).is_none());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let start = Instant::now();
        let mut session = MeetingSession::start(scrum(&["A", "B", "C"], 3), start).unwrap();
        session.tick(start + secs(61));

        let snapshot = session.snapshot(true);
        assert_eq!(snapshot.title, "Standup");
        assert_eq!(snapshot.current_speaker_index, 1);
        assert_eq!(snapshot.speaker_label(), "Speaker 2 of 3");
        assert_eq!(snapshot.current_speaker_name(), "B");
        assert!(snapshot.is_recording);
    }
}
