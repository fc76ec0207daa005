//! Real-time meeting driver.
//!
//! Runs a `MeetingSession` against the clock:
//! start → tick / skip ... → all speakers completed → finish
//!
//! Every mutation goes through one mutex. Manual transitions cancel the tick
//! task, mutate, then spawn a fresh tick task, all while holding the lock;
//! the tick task re-checks its token under the same lock, so a stale tick
//! can never overwrite a newer transition.
//!
//! Clock, chime, recorder and history sink are injected via `MeetingDeps`.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::scrum::{DailyScrum, History};

use super::chime::Chime;
use super::clock::Clock;
use super::history_sink::HistorySink;
use super::recorder::TranscriptRecorder;
use super::session::{self, MeetingSession, Rotation};
use super::status::{MeetingPhase, SessionSnapshot};
use super::ticker::Ticker;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingEvent {
    SpeakerChanged { index: usize, name: String },
    AllSpeakersCompleted,
}

/// Collaborators of a running meeting.
pub struct MeetingDeps {
    pub clock: Arc<dyn Clock>,
    pub chime: Arc<dyn Chime>,
    pub recorder: Option<Arc<dyn TranscriptRecorder>>,
    pub history: Option<Arc<dyn HistorySink>>,
}

#[derive(Default)]
struct MachineState {
    session: Option<MeetingSession>,
    ticker: Option<Ticker>,
}

impl MachineState {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

/// Shared by the machine and its tick task.
#[derive(Clone)]
struct Shared {
    state: Arc<Mutex<MachineState>>,
    clock: Arc<dyn Clock>,
    chime: Arc<dyn Chime>,
    events: mpsc::UnboundedSender<MeetingEvent>,
}

impl Shared {
    /// Plays the chime and reports a rotation change.
    fn announce(&self, rotation: Rotation, session: &MeetingSession) {
        match rotation {
            Rotation::NextSpeaker(index) => {
                self.chime.play();
                let name = session.speakers()[index].name.clone();
                info!("Speaker {} of {}: {}", index + 1, session.speakers().len(), name);
                self.emit(MeetingEvent::SpeakerChanged { index, name });
            }
            Rotation::AllSpeakersCompleted => {
                self.chime.play();
                info!("All speakers completed: {}", session.definition().title);
                self.emit(MeetingEvent::AllSpeakersCompleted);
            }
            Rotation::Unchanged | Rotation::Inactive => {}
        }
    }

    fn emit(&self, event: MeetingEvent) {
        if self.events.send(event).is_err() {
            debug!("Meeting event dropped, no listener");
        }
    }
}

pub struct MeetingMachine {
    shared: Shared,
    recorder: Option<Arc<dyn TranscriptRecorder>>,
    history: Option<Arc<dyn HistorySink>>,
    tick_interval: Duration,
    root: CancellationToken,
}

impl MeetingMachine {
    pub fn new(
        deps: MeetingDeps,
        tick_interval: Duration,
        events: mpsc::UnboundedSender<MeetingEvent>,
    ) -> Self {
        Self {
            shared: Shared {
                state: Arc::new(Mutex::new(MachineState::default())),
                clock: deps.clock,
                chime: deps.chime,
                events,
            },
            recorder: deps.recorder,
            history: deps.history,
            tick_interval,
            root: CancellationToken::new(),
        }
    }

    /// Start a meeting for `definition`, then start recording if a recorder is
    /// configured. A recording failure is logged and the meeting goes on.
    pub async fn start(&self, definition: &DailyScrum) -> Result<(), SessionError> {
        {
            let mut state = self.shared.state.lock().await;
            if state.session.as_ref().is_some_and(MeetingSession::is_running) {
                return Err(SessionError::AlreadyRunning);
            }

            let session = MeetingSession::start(definition.clone(), self.shared.clock.now())?;
            info!(
                "Meeting started: {} ({} speakers, {}s each)",
                definition.title,
                session.speakers().len(),
                session.seconds_per_speaker()
            );

            state.stop_ticker();
            if let Some(previous) = state.session.take() {
                self.discard_transcription(&previous.definition().title).await;
            }
            state.session = Some(session);
            state.ticker = Some(self.spawn_ticker());
        }

        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.start_transcription().await {
                warn!("Failed to start transcription: {}. Meeting continues without transcript.", e);
            }
        }

        Ok(())
    }

    /// Stops a capture left over from a meeting that was never finished, so
    /// its text cannot end up in the next meeting's history.
    async fn discard_transcription(&self, title: &str) {
        if let Some(recorder) = self.recorder.as_ref().filter(|r| r.is_transcribing()) {
            let transcript = recorder.finish_transcription().await;
            info!(
                "Discarded unfinished transcript of {} ({} chars)",
                title,
                transcript.len()
            );
        }
    }

    /// Pass the floor to the next speaker now.
    pub async fn skip_speaker(&self) -> Result<(), SessionError> {
        let mut state = self.shared.state.lock().await;
        let Some(session) = state.session.as_mut() else {
            return Err(SessionError::NoActiveSession);
        };
        if !session.is_running() {
            debug!("Skip ignored, meeting is {}", session.phase().as_str());
            return Ok(());
        }

        let rotation = session.skip_speaker(self.shared.clock.now());
        self.shared.announce(rotation, session);
        let still_running = session.is_running();

        state.stop_ticker();
        if still_running {
            state.ticker = Some(self.spawn_ticker());
        }

        Ok(())
    }

    /// Restart the rotation with an updated definition, e.g. after the scrum
    /// was edited while the meeting was open. An invalid definition is
    /// rejected and the current meeting keeps running.
    pub async fn reset(&self, definition: &DailyScrum) -> Result<(), SessionError> {
        session::validate(definition)?;

        let mut state = self.shared.state.lock().await;
        state.stop_ticker();

        let now = self.shared.clock.now();
        match state.session.as_mut() {
            Some(session) => session.reset(definition.clone(), now)?,
            None => state.session = Some(MeetingSession::start(definition.clone(), now)?),
        }
        state.ticker = Some(self.spawn_ticker());

        info!("Meeting reset: {}", definition.title);
        Ok(())
    }

    /// Tear the meeting down without recording it. Once this returns the
    /// session no longer changes; `finish` can still be called afterwards.
    pub async fn cancel(&self) {
        let mut state = self.shared.state.lock().await;
        state.stop_ticker();
        if let Some(session) = state.session.as_mut() {
            session.cancel();
            info!("Meeting cancelled: {}", session.definition().title);
        }
    }

    /// End the meeting. With `save`, the history record is built, handed to
    /// the history sink and returned.
    pub async fn finish(&self, save: bool) -> Result<Option<History>, SessionError> {
        let (session, ticker) = {
            let mut state = self.shared.state.lock().await;
            let ticker = state.ticker.take();
            if let Some(ticker) = &ticker {
                ticker.cancel();
            }
            let session = state.session.take().ok_or(SessionError::NoActiveSession)?;
            (session, ticker)
        };
        // The tick task needs the lock to notice cancellation.
        if let Some(ticker) = ticker {
            ticker.stop().await;
        }

        let transcript = match &self.recorder {
            Some(recorder) if recorder.is_transcribing() => {
                Some(recorder.finish_transcription().await)
            }
            _ => None,
        };

        let scrum_id = session.definition().id;
        let title = session.definition().title.clone();
        let history = session.finish(save, transcript, self.shared.clock.wall_time());

        match &history {
            Some(record) => {
                info!("Meeting finished and saved: {}", title);
                if let Some(sink) = &self.history {
                    if let Err(e) = sink.record(scrum_id, record) {
                        warn!("Failed to save meeting history: {}", e);
                    }
                }
            }
            None => info!("Meeting finished without saving: {}", title),
        }

        Ok(history)
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let is_recording = self.is_recording();
        let state = self.shared.state.lock().await;
        state
            .session
            .as_ref()
            .map(|session| session.snapshot(is_recording))
    }

    pub async fn phase(&self) -> MeetingPhase {
        let state = self.shared.state.lock().await;
        state
            .session
            .as_ref()
            .map(MeetingSession::phase)
            .unwrap_or(MeetingPhase::Idle)
    }

    pub async fn is_running(&self) -> bool {
        self.phase().await == MeetingPhase::Running
    }

    pub fn is_recording(&self) -> bool {
        self.recorder
            .as_ref()
            .is_some_and(|recorder| recorder.is_transcribing())
    }

    fn spawn_ticker(&self) -> Ticker {
        let shared = self.shared.clone();
        Ticker::spawn(self.tick_interval, self.root.child_token(), move |token| {
            let shared = shared.clone();
            async move { Self::on_tick(&shared, &token).await }
        })
    }

    async fn on_tick(shared: &Shared, token: &CancellationToken) -> ControlFlow<()> {
        let mut state = shared.state.lock().await;
        // A manual transition may have replaced this ticker while we waited.
        if token.is_cancelled() {
            return ControlFlow::Break(());
        }

        let Some(session) = state.session.as_mut() else {
            return ControlFlow::Break(());
        };

        let rotation = session.tick(shared.clock.now());
        shared.announce(rotation, session);

        match rotation {
            Rotation::Unchanged | Rotation::NextSpeaker(_) => ControlFlow::Continue(()),
            Rotation::AllSpeakersCompleted | Rotation::Inactive => {
                state.ticker = None;
                ControlFlow::Break(())
            }
        }
    }
}

impl Drop for MeetingMachine {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
