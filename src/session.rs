//! Async session driver.
//!
//! One `WheelSession` is active per player session. It owns the engine
//! behind a lock, runs the reveal timer between spin and reveal, fans
//! engine events out to UI subscribers, and talks to the progress and
//! platform collaborators. Both historical entry points — the standalone
//! play flow and the embedded material player — drive this same type.

use crate::engine::{GameSession, EngineResult, SPIN_DURATION};
use crate::progress::{ProgressReport, ProgressSink};
use crate::protocol::{SegmentInfo, SessionCommand, SessionEvent};
use crate::types::{GamePhase, Question, SessionConfig, Team};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

/// Host-platform hooks bracketing active play. Failure to enter fullscreen
/// is non-fatal and silently ignored.
pub trait PlatformHooks: Send + Sync {
    fn enter_fullscreen(&self) -> bool {
        true
    }

    fn exit_fullscreen(&self) -> bool {
        true
    }
}

/// Default hooks for hosts without a platform surface
pub struct NoopPlatform;

impl PlatformHooks for NoopPlatform {}

pub struct WheelSession {
    engine: Arc<RwLock<GameSession>>,
    /// Broadcast channel for pushing engine events to UI subscribers
    events: broadcast::Sender<SessionEvent>,
    progress: Arc<dyn ProgressSink>,
    platform: Arc<dyn PlatformHooks>,
    material_id: String,
    reveal_timer: Mutex<Option<JoinHandle<()>>>,
    progress_started: AtomicBool,
}

impl WheelSession {
    pub fn new(
        material_id: impl Into<String>,
        questions: Vec<Question>,
        config: SessionConfig,
        progress: Arc<dyn ProgressSink>,
        platform: Arc<dyn PlatformHooks>,
    ) -> EngineResult<Self> {
        let engine = GameSession::new(questions, config)?;
        let (tx, _rx) = broadcast::channel(100);

        Ok(Self {
            engine: Arc::new(RwLock::new(engine)),
            events: tx,
            progress,
            platform,
            material_id: material_id.into(),
            reveal_timer: Mutex::new(None),
            progress_started: AtomicBool::new(false),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Dispatch a UI command to the matching transition.
    pub async fn handle(&self, command: SessionCommand) -> EngineResult<()> {
        match command {
            SessionCommand::ConfirmSetup => self.confirm_setup().await,
            SessionCommand::Spin => {
                self.spin().await;
                Ok(())
            }
            SessionCommand::BeginScoring => {
                self.begin_scoring().await;
                Ok(())
            }
            SessionCommand::ResolveAnswer { correct, team_id } => {
                self.resolve_answer(correct, team_id.as_deref()).await;
                Ok(())
            }
            SessionCommand::Restart => {
                self.restart().await;
                Ok(())
            }
        }
    }

    /// Confirm setup and enter the game loop. The first successful entry
    /// fires the one best-effort progress `start` for this session and the
    /// fullscreen-enter hook.
    pub async fn confirm_setup(&self) -> EngineResult<()> {
        let events = self.engine.write().await.confirm_setup()?;
        if events.is_empty() {
            return Ok(());
        }

        if !self.progress_started.swap(true, Ordering::SeqCst) {
            let sink = self.progress.clone();
            let material_id = self.material_id.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.start(&material_id).await {
                    tracing::warn!(material_id = %material_id, error = %e, "progress start failed");
                }
            });
        }

        if !self.platform.enter_fullscreen() {
            tracing::debug!("fullscreen enter rejected by platform");
        }

        self.emit(events);
        Ok(())
    }

    /// Start a spin and schedule its reveal after `SPIN_DURATION`.
    pub async fn spin(&self) {
        let events = self.engine.write().await.spin();
        let spun = events
            .iter()
            .any(|e| matches!(e, SessionEvent::SpinStarted { .. }));
        self.emit(events);

        if spun {
            self.schedule_reveal();
        }
    }

    pub async fn begin_scoring(&self) {
        let events = self.engine.write().await.begin_scoring();
        self.emit(events);
    }

    /// Resolve the revealed question. Completion fires the one best-effort
    /// progress `submit` and the fullscreen-exit hook.
    pub async fn resolve_answer(&self, correct: bool, team_id: Option<&str>) {
        let (events, report) = {
            let mut engine = self.engine.write().await;
            let events = engine.resolve_answer(correct, team_id);
            let completed = events
                .iter()
                .any(|e| matches!(e, SessionEvent::Completed { .. }));
            let report = completed.then(|| Self::final_report(&engine));
            (events, report)
        };
        self.emit(events);

        if let Some(report) = report {
            let sink = self.progress.clone();
            let material_id = self.material_id.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.submit(&material_id, &report).await {
                    tracing::warn!(material_id = %material_id, error = %e, "progress submit failed");
                }
            });

            if !self.platform.exit_fullscreen() {
                tracing::debug!("fullscreen exit rejected by platform");
            }
        }
    }

    /// Discard the current run and start over from the original questions.
    pub async fn restart(&self) {
        self.cancel_pending_reveal();
        let events = self.engine.write().await.restart();
        self.emit(events);
    }

    /// Tear the session down (navigation away). A pending reveal is
    /// discarded without side effects: nothing is committed until
    /// `resolve_answer`.
    pub async fn shutdown(&self) {
        self.cancel_pending_reveal();
        self.platform.exit_fullscreen();
    }

    // ------------------------------------------------------------------
    // Snapshot accessors
    // ------------------------------------------------------------------

    pub async fn phase(&self) -> GamePhase {
        self.engine.read().await.phase()
    }

    pub async fn segments(&self) -> Vec<SegmentInfo> {
        self.engine.read().await.segments()
    }

    pub async fn ranked(&self) -> Vec<Team> {
        self.engine.read().await.ranked()
    }

    pub async fn answered_count(&self) -> usize {
        self.engine.read().await.answered_count()
    }

    fn schedule_reveal(&self) {
        let engine = self.engine.clone();
        let tx = self.events.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(SPIN_DURATION).await;
            let events = engine.write().await.finish_spin();
            for event in events {
                let _ = tx.send(event);
            }
        });

        let mut timer = self.reveal_timer.lock().expect("reveal timer lock poisoned");
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_pending_reveal(&self) {
        let handle = self
            .reveal_timer
            .lock()
            .expect("reveal timer lock poisoned")
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn final_report(engine: &GameSession) -> ProgressReport {
        let leaderboard = engine.ranked();
        let score = leaderboard.first().map(|t| t.score).unwrap_or(0);

        ProgressReport {
            score,
            total_items: engine.total_questions(),
            answers_data: json!({
                "teams": leaderboard,
                "spins": engine.spin_count(),
                "solo": engine.is_solo(),
            }),
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn emit(&self, events: Vec<SessionEvent>) {
        for event in events {
            // Ignore send errors (no receivers connected is fine)
            let _ = self.events.send(event);
        }
    }
}

impl Drop for WheelSession {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.reveal_timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}
