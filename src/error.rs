//! Errors raised by the meeting engine.

use thiserror::Error;

/// Reasons a meeting session operation can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot start session with no attendees")]
    NoAttendees,
    #[error("cannot start session with a length of zero minutes")]
    ZeroLength,
    #[error("a meeting is already running, finish or cancel it first")]
    AlreadyRunning,
    #[error("no meeting session is active")]
    NoActiveSession,
}
