//! Builds a meeting engine from the user's configuration.

use crate::config::{Config, MeetingConfig, TranscriptionConfig};
use crate::db::SqliteHistorySink;
use crate::global;
use crate::meeting::{
    Chime, CommandChime, CommandRecorder, HistorySink, MeetingDeps, MeetingEvent, MeetingMachine,
    SilentChime, SystemClock, TerminalBell, TranscriptRecorder,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Per-run switches from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub record: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { record: true }
    }
}

pub fn build_chime(config: &MeetingConfig) -> Arc<dyn Chime> {
    if !config.chime {
        debug!("Chime disabled");
        return Arc::new(SilentChime);
    }

    let command = config.chime_command.trim();
    if command.is_empty() {
        Arc::new(TerminalBell)
    } else {
        debug!("Using chime command: {}", command);
        Arc::new(CommandChime::new(command))
    }
}

pub fn build_recorder(
    config: &TranscriptionConfig,
    options: RunOptions,
) -> Option<Arc<dyn TranscriptRecorder>> {
    if !options.record {
        info!("Recording disabled for this meeting");
        return None;
    }

    let command = config.active_command()?;
    Some(Arc::new(CommandRecorder::new(command)))
}

pub fn build_machine(
    config: &Config,
    history: Option<Arc<dyn HistorySink>>,
    options: RunOptions,
    events: mpsc::UnboundedSender<MeetingEvent>,
) -> MeetingMachine {
    let deps = MeetingDeps {
        clock: Arc::new(SystemClock),
        chime: build_chime(&config.meeting),
        recorder: build_recorder(&config.transcription, options),
        history,
    };

    MeetingMachine::new(deps, config.meeting.tick_interval(), events)
}

/// Meeting engine writing saved meetings to the default database.
pub fn build_default_machine(
    config: &Config,
    options: RunOptions,
    events: mpsc::UnboundedSender<MeetingEvent>,
) -> Result<MeetingMachine> {
    let sink = SqliteHistorySink::open(&global::db_file()?)?;
    Ok(build_machine(config, Some(Arc::new(sink)), options, events))
}
