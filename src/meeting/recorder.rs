//! Transcription recorder abstraction and shell command implementation.
//!
//! The meeting engine only starts and finishes a recording; how audio is
//! captured and turned into text is up to the implementation. A recorder
//! that fails to start never stops the meeting.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[async_trait]
pub trait TranscriptRecorder: Send + Sync {
    /// Begins capturing. May fail, e.g. when no capture backend is available.
    async fn start_transcription(&self) -> Result<()>;

    /// Stops capturing and returns everything transcribed so far.
    async fn finish_transcription(&self) -> String;

    fn is_transcribing(&self) -> bool;
}

/// How long `finish_transcription` waits for output still in flight after
/// the command was stopped.
const FINISH_GRACE: Duration = Duration::from_secs(2);

struct RunningCapture {
    child: Child,
    reader: JoinHandle<()>,
    transcript: Arc<std::sync::Mutex<Vec<String>>>,
}

/// Streams the transcript from the stdout of a shell command.
///
/// The command is expected to keep running and print recognised text until it
/// is killed, e.g. a speech-to-text tool reading from the default microphone.
pub struct CommandRecorder {
    command: String,
    capture: Mutex<Option<RunningCapture>>,
    transcribing: AtomicBool,
}

impl CommandRecorder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            capture: Mutex::new(None),
            transcribing: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TranscriptRecorder for CommandRecorder {
    async fn start_transcription(&self) -> Result<()> {
        let mut capture = self.capture.lock().await;
        if capture.is_some() {
            bail!("Transcription already in progress");
        }

        info!("Starting transcription command: {}", self.command);
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn transcription command `{}`", self.command))?;

        let stdout = child
            .stdout
            .take()
            .context("Transcription command has no stdout")?;

        let transcript = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&transcript);
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => sink.lock().unwrap_or_else(|e| e.into_inner()).push(line),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read transcription output: {}", e);
                        break;
                    }
                }
            }
        });

        *capture = Some(RunningCapture {
            child,
            reader,
            transcript,
        });
        self.transcribing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn finish_transcription(&self) -> String {
        self.transcribing.store(false, Ordering::SeqCst);

        let Some(RunningCapture {
            mut child,
            reader,
            transcript,
        }) = self.capture.lock().await.take()
        else {
            return String::new();
        };

        // The command may already have exited on its own.
        if let Ok(None) = child.try_wait() {
            if let Err(e) = child.kill().await {
                warn!("Failed to stop transcription command: {}", e);
            }
        }

        // Processes spawned by the command can keep the pipe open after it
        // was killed; keep whatever arrived within the grace period.
        let abort = reader.abort_handle();
        if tokio::time::timeout(FINISH_GRACE, reader).await.is_err() {
            warn!("Transcription output still open after stop, truncating");
            abort.abort();
        }

        let lines = std::mem::take(&mut *transcript.lock().unwrap_or_else(|e| e.into_inner()));
        let text = lines.join("\n").trim().to_string();
        info!("Transcription finished: {} chars", text.len());
        text
    }

    fn is_transcribing(&self) -> bool {
        self.transcribing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_recorder_captures_stdout() {
        let recorder = CommandRecorder::new("echo 'Darla, would you like to start today?'");
        recorder.start_transcription().await.unwrap();
        assert!(recorder.is_transcribing());
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let transcript = recorder.finish_transcription().await;
        assert_eq!(transcript, "Darla, would you like to start today?");
        assert!(!recorder.is_transcribing());
    }

    #[tokio::test]
    async fn test_command_recorder_kills_long_running_command() {
        let recorder = CommandRecorder::new("echo partial; exec sleep 30");
        recorder.start_transcription().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let transcript = recorder.finish_transcription().await;
        assert_eq!(transcript, "partial");
    }

    #[tokio::test]
    async fn test_multiline_output_is_joined() {
        let recorder = CommandRecorder::new("printf 'first\\nsecond\\n'; exec sleep 30");
        recorder.start_transcription().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        assert_eq!(recorder.finish_transcription().await, "first\nsecond");
    }

    #[tokio::test]
    async fn test_finish_without_start_is_empty() {
        let recorder = CommandRecorder::new("echo unused");
        assert_eq!(recorder.finish_transcription().await, "");
        assert!(!recorder.is_transcribing());
    }

    #[tokio::test]
    async fn test_double_start_fails() {
        let recorder = CommandRecorder::new("exec sleep 30");
        recorder.start_transcription().await.unwrap();
        assert!(recorder.start_transcription().await.is_err());
        recorder.finish_transcription().await;
    }
}
