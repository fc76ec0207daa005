//! Meeting timer and speaker rotation.
//!
//! Splits a meeting evenly between its attendees, passes the floor on a
//! schedule or on demand, and produces a history record when the meeting
//! is saved.

pub mod chime;
pub mod clock;
pub mod history_sink;
pub mod meeting_machine;
pub mod recorder;
pub mod session;
pub mod status;
pub mod ticker;

pub use chime::{Chime, CommandChime, SilentChime, TerminalBell};
pub use clock::{Clock, ManualClock, SystemClock};
pub use history_sink::HistorySink;
pub use meeting_machine::{MeetingDeps, MeetingEvent, MeetingMachine, DEFAULT_TICK_INTERVAL};
pub use recorder::{CommandRecorder, TranscriptRecorder};
pub use session::{MeetingSession, Rotation};
pub use status::{format_clock, MeetingPhase, SessionSnapshot, Speaker};
pub use ticker::Ticker;
