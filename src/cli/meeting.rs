//! Interactive terminal front end for a running meeting.
//!
//! Commands are read line by line from stdin while the meeting runs:
//! `n` (or an empty line) passes the floor, `e` asks whether to save,
//! discard or keep going, `q` ends the meeting without saving.

use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, FuzzySelect};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::args::RunCliArgs;
use super::resolve_scrum;
use crate::app::{self, RunOptions};
use crate::config::Config;
use crate::error::SessionError;
use crate::db::{self, ScrumRepository};
use crate::history::HistoryEntry;
use crate::meeting::{format_clock, MeetingEvent, MeetingMachine, SessionSnapshot};
use crate::scrum::{DailyScrum, History};

/// Command typed while the meeting runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingCommand {
    Skip,
    End,
    Quit,
    Unknown(String),
}

impl MeetingCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "n" | "next" | "skip" => Self::Skip,
            "e" | "end" => Self::End,
            "q" | "quit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Answer to the end-meeting prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingEndAction {
    Save,
    Discard,
    Cancel,
}

impl MeetingEndAction {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "save" => Some(Self::Save),
            "d" | "discard" => Some(Self::Discard),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingOutcome {
    Saved(History),
    Discarded,
}

pub async fn handle_run_command(args: RunCliArgs) -> Result<()> {
    let config = Config::load()?;
    let conn = db::init_db()?;
    let scrums = ScrumRepository::load_all(&conn)?;

    let scrum = match args.scrum.as_deref() {
        Some(key) => resolve_scrum(&scrums, key)?.clone(),
        None => choose_scrum(&scrums)?,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let options = RunOptions {
        record: !args.no_record,
    };
    let machine = app::build_default_machine(&config, options, tx)?;

    machine
        .start(&scrum)
        .await
        .with_context(|| format!("Failed to start '{}'", scrum.title))?;

    println!(
        "{} started: {} speakers, {} min",
        scrum.title,
        scrum.attendees.len(),
        scrum.length_in_minutes
    );
    println!("Commands: [n]ext speaker, [e]nd meeting, [q]uit without saving\n");

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let outcome = tokio::select! {
        outcome = run_meeting(
            &machine,
            rx,
            lines,
            &mut stdout,
            config.meeting.tick_interval(),
            config.behavior.save_on_completion,
        ) => outcome?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, discarding meeting");
            discard_interrupted(&machine).await?
        }
    };

    println!();
    match outcome {
        MeetingOutcome::Saved(history) => {
            let entry = HistoryEntry::new(&scrum.title, history);
            println!("Meeting saved to history: {}", entry.summary());
            if let Some(preview) = entry.transcript_preview() {
                println!("Transcript: {}", preview);
            }
        }
        MeetingOutcome::Discarded => println!("Meeting discarded."),
    }

    Ok(())
}

fn choose_scrum(scrums: &[DailyScrum]) -> Result<DailyScrum> {
    if scrums.is_empty() {
        bail!("No scrums yet. Create one with `scrumdinger add` or `scrumdinger seed`");
    }
    if !io::stdin().is_terminal() {
        bail!("No scrum given. Pass one, e.g. `scrumdinger run \"{}\"`", scrums[0].title);
    }

    let titles: Vec<String> = scrums
        .iter()
        .map(|s| format!("{} ({} min, {} attendees)", s.title, s.length_in_minutes, s.attendees.len()))
        .collect();

    let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Which scrum?")
        .items(&titles)
        .default(0)
        .interact_opt()?;

    match selection {
        Some(index) => Ok(scrums[index].clone()),
        None => bail!("No scrum selected"),
    }
}

/// One-line meeting status.
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let mic = if snapshot.is_recording {
        "mic on"
    } else {
        "mic off"
    };
    let last = if snapshot.is_last_speaker() { " (last)" } else { "" };
    format!(
        "{}{} | {} | {} elapsed | {} remaining | {:.0}% done | {}",
        snapshot.speaker_label(),
        last,
        snapshot.current_speaker_name(),
        format_clock(snapshot.seconds_elapsed),
        format_clock(snapshot.seconds_remaining),
        snapshot.progress() * 100.0,
        mic
    )
}

/// Drive a started meeting from `input` until it is finished.
pub async fn run_meeting<R, W>(
    machine: &MeetingMachine,
    mut events: mpsc::UnboundedReceiver<MeetingEvent>,
    mut input: Lines<R>,
    out: &mut W,
    status_interval: Duration,
    save_on_completion: bool,
) -> Result<MeetingOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut status = tokio::time::interval(status_interval);
    status.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut input_open = true;
    let mut confirming_end = false;

    loop {
        tokio::select! {
            biased;

            Some(event) = events.recv() => match event {
                MeetingEvent::SpeakerChanged { index, name } => {
                    writeln!(out, "\nSpeaker {}: {}", index + 1, name)?;
                }
                MeetingEvent::AllSpeakersCompleted => {
                    writeln!(out, "\nAll speakers completed.")?;
                    return finish(machine, save_on_completion).await;
                }
            },

            line = input.next_line(), if input_open => {
                let Some(line) = line.context("Failed to read input")? else {
                    info!("Input closed, meeting continues until all speakers are done");
                    input_open = false;
                    continue;
                };

                if confirming_end {
                    match MeetingEndAction::parse(&line) {
                        Some(MeetingEndAction::Save) => return finish(machine, true).await,
                        Some(MeetingEndAction::Discard) => return finish(machine, false).await,
                        Some(MeetingEndAction::Cancel) => {
                            confirming_end = false;
                            writeln!(out, "Meeting continues.")?;
                        }
                        None => writeln!(out, "Choose [s]ave, [d]iscard or [c]ancel.")?,
                    }
                    continue;
                }

                match MeetingCommand::parse(&line) {
                    MeetingCommand::Skip => machine.skip_speaker().await?,
                    MeetingCommand::End => {
                        confirming_end = true;
                        writeln!(out, "End meeting? [s]ave, [d]iscard or [c]ancel")?;
                    }
                    MeetingCommand::Quit => return finish(machine, false).await,
                    MeetingCommand::Unknown(command) => {
                        warn!("Unknown meeting command: {}", command);
                        writeln!(out, "Unknown command '{}'. Use n, e or q.", command)?;
                    }
                }
            },

            _ = status.tick() => {
                if let Some(snapshot) = machine.snapshot().await {
                    write!(out, "\r{}", status_line(&snapshot))?;
                    out.flush()?;
                }
            },
        }
    }
}

async fn finish(machine: &MeetingMachine, save: bool) -> Result<MeetingOutcome> {
    Ok(match machine.finish(save).await? {
        Some(history) => MeetingOutcome::Saved(history),
        None => MeetingOutcome::Discarded,
    })
}

/// Ends the meeting after an interrupt. The interrupted loop may already
/// have taken the session out of the machine while finishing.
async fn discard_interrupted(machine: &MeetingMachine) -> Result<MeetingOutcome> {
    match machine.finish(false).await {
        Ok(_) => Ok(MeetingOutcome::Discarded),
        Err(SessionError::NoActiveSession) => {
            debug!("Meeting was already finished when interrupted");
            Ok(MeetingOutcome::Discarded)
        }
        Err(e) => Err(e.into()),
    }
}
