//! Trivia-wheel game engine.
//!
//! `GameSession` is a plain value object with synchronous transition methods;
//! it knows nothing about timers, rendering, or transport. Every method is a
//! phase-guarded no-op when called out of turn (the UI may race a double-tap),
//! so illegal transitions return an empty event batch instead of an error.

mod pool;
mod score;
pub mod spin;

pub use pool::{Resolution, SegmentPool};
pub use score::ScoreBoard;
pub use spin::{EXTRA_TURNS, SPIN_DURATION};

use crate::protocol::{RevealedQuestion, SegmentInfo, SessionEvent};
use crate::types::*;
use rand::Rng;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Contract-level failures. Phase races are not errors (they no-op); these
/// are the conditions that indicate a caller bug or unusable input.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot start a session without questions")]
    NoQuestions,

    #[error("team count {0} outside supported range")]
    InvalidTeamCount(usize),

    #[error("slot {0} is already retired")]
    SlotRetired(usize),

    #[error("slot {0} is outside the wheel")]
    SlotOutOfRange(usize),
}

/// One active trivia-wheel game. Created per player session and fully
/// replaced on restart; never shared across sessions.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    config: SessionConfig,
    /// Original ordered question list, kept for restart.
    questions: Vec<Question>,
    phase: GamePhase,
    pool: SegmentPool,
    board: ScoreBoard,
    spin_count: u32,
    rotation: f64,
    selected_slot: Option<usize>,
}

impl GameSession {
    pub fn new(questions: Vec<Question>, config: SessionConfig) -> EngineResult<Self> {
        let board = ScoreBoard::new(config.team_count, config.team_names.as_deref())?;
        let pool = SegmentPool::new(&questions, config.display_cap);

        Ok(Self {
            id: ulid::Ulid::new().to_string(),
            config,
            questions,
            phase: GamePhase::Setup,
            pool,
            board,
            spin_count: 0,
            rotation: 0.0,
            selected_slot: None,
        })
    }

    /// Leave setup once teams are confirmed. A zero-question session refuses
    /// to start; re-confirming after the first time is a no-op.
    pub fn confirm_setup(&mut self) -> EngineResult<Vec<SessionEvent>> {
        if self.phase != GamePhase::Setup {
            return Ok(Vec::new());
        }
        if self.questions.is_empty() {
            return Err(EngineError::NoQuestions);
        }

        self.phase = GamePhase::Ready;
        tracing::info!(session = %self.id, total = self.pool.total(), "session ready");
        Ok(vec![self.phase_event()])
    }

    /// Spin using the ambient RNG.
    pub fn spin(&mut self) -> Vec<SessionEvent> {
        self.spin_with(&mut rand::rng())
    }

    /// Pick a segment, compute the landing rotation and start the wheel.
    /// The landed question is not part of the emitted events; it stays
    /// hidden until `finish_spin`.
    pub fn spin_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<SessionEvent> {
        if self.phase != GamePhase::Ready {
            return Vec::new();
        }

        let available = self.pool.available_slots();
        let Some(slot) = spin::choose_segment(&available, rng) else {
            // Caller should already have observed completion.
            tracing::warn!(session = %self.id, "spin requested with no available slots");
            return Vec::new();
        };

        let rotation = spin::compute_rotation(slot, self.pool.segment_count(), self.spin_count);
        self.spin_count += 1;
        self.rotation = rotation;
        self.selected_slot = Some(slot);
        self.phase = GamePhase::Spinning;

        tracing::debug!(
            session = %self.id,
            spin_no = self.spin_count,
            rotation,
            "wheel spinning"
        );

        vec![
            SessionEvent::SpinStarted {
                spin_no: self.spin_count,
                rotation,
            },
            self.phase_event(),
        ]
    }

    /// Settle the spin and expose the landed question. Driven by the session
    /// timer after `SPIN_DURATION` elapses.
    pub fn finish_spin(&mut self) -> Vec<SessionEvent> {
        if self.phase != GamePhase::Spinning {
            return Vec::new();
        }
        let Some(slot) = self.selected_slot else {
            debug_assert!(false, "spinning without a selected slot");
            tracing::error!(session = %self.id, "spinning without a selected slot");
            return Vec::new();
        };

        self.phase = GamePhase::Revealed;
        let question = RevealedQuestion::from(&self.pool.displayed()[slot]);

        vec![
            SessionEvent::QuestionRevealed { slot, question },
            self.phase_event(),
        ]
    }

    /// Enter the team-attribution step. Solo mode has nothing to attribute,
    /// so the transition only exists for multi-team sessions.
    pub fn begin_scoring(&mut self) -> Vec<SessionEvent> {
        if self.phase != GamePhase::Revealed || self.board.is_solo() {
            return Vec::new();
        }

        self.phase = GamePhase::Scoring;
        vec![self.phase_event()]
    }

    /// Record the answer outcome, resolve the segment and advance the loop.
    pub fn resolve_answer(&mut self, correct: bool, team_id: Option<&str>) -> Vec<SessionEvent> {
        if self.phase != GamePhase::Revealed && self.phase != GamePhase::Scoring {
            return Vec::new();
        }
        let Some(slot) = self.selected_slot else {
            debug_assert!(false, "resolving without a selected slot");
            tracing::error!(session = %self.id, "resolving without a selected slot");
            return Vec::new();
        };

        let resolution = match self.pool.resolve(slot) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!(session = %self.id, slot, error = %e, "segment resolve rejected");
                return Vec::new();
            }
        };

        let mut events = Vec::new();

        if correct {
            if self.board.is_solo() {
                // Tracked for the final progress report, never surfaced.
                self.board.credit_solo();
            } else {
                match team_id.and_then(|id| self.board.credit(id)) {
                    Some(team) => events.push(SessionEvent::ScoreUpdated { team }),
                    None => tracing::warn!(
                        session = %self.id,
                        ?team_id,
                        "correct answer without a creditable team"
                    ),
                }
            }
        }

        match resolution {
            Resolution::Replaced(question) => events.push(SessionEvent::SegmentReplaced {
                slot,
                question: (&question).into(),
            }),
            Resolution::Retired => events.push(SessionEvent::SegmentRetired { slot }),
        }

        self.selected_slot = None;

        if self.pool.answered() == self.pool.total() {
            self.phase = GamePhase::Completed;
            tracing::info!(session = %self.id, answered = self.pool.answered(), "session completed");
            events.push(SessionEvent::Completed {
                answered: self.pool.answered(),
                leaderboard: self.board.ranked(),
            });
        } else {
            self.phase = GamePhase::Ready;
        }
        events.push(self.phase_event());

        events
    }

    /// Rebuild pool and scoreboard from the original question list and team
    /// configuration. The fresh game starts at READY with the wheel at rest.
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        if self.phase == GamePhase::Setup {
            return Vec::new();
        }

        self.pool = SegmentPool::new(&self.questions, self.config.display_cap);
        self.board = ScoreBoard::new(self.config.team_count, self.config.team_names.as_deref())
            .expect("team config was validated at construction");
        self.spin_count = 0;
        self.rotation = 0.0;
        self.selected_slot = None;
        self.phase = GamePhase::Ready;

        tracing::info!(session = %self.id, "session restarted");
        vec![self.phase_event()]
    }

    fn phase_event(&self) -> SessionEvent {
        SessionEvent::Phase {
            phase: self.phase,
            answered: self.pool.answered(),
            total: self.pool.total(),
        }
    }

    // ------------------------------------------------------------------
    // Read-side accessors for the UI snapshot
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn spin_count(&self) -> u32 {
        self.spin_count
    }

    /// Cumulative wheel rotation in degrees. Monotonically non-decreasing
    /// within a session run.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn answered_count(&self) -> usize {
        self.pool.answered()
    }

    pub fn total_questions(&self) -> usize {
        self.pool.total()
    }

    pub fn is_solo(&self) -> bool {
        self.board.is_solo()
    }

    pub fn teams(&self) -> &[Team] {
        self.board.teams()
    }

    pub fn ranked(&self) -> Vec<Team> {
        self.board.ranked()
    }

    /// Wheel snapshot for initial render and reconnect. Labels only; answers
    /// are never part of the snapshot.
    pub fn segments(&self) -> Vec<SegmentInfo> {
        self.pool
            .displayed()
            .iter()
            .enumerate()
            .map(|(slot, q)| SegmentInfo {
                slot,
                question: q.into(),
                retired: self.pool.is_retired(slot),
            })
            .collect()
    }

    pub fn available_slots(&self) -> std::collections::BTreeSet<usize> {
        self.pool.available_slots()
    }

    /// The slot under the pointer, exposed only once the spin has settled.
    pub fn selected_slot(&self) -> Option<usize> {
        match self.phase {
            GamePhase::Revealed | GamePhase::Scoring => self.selected_slot,
            _ => None,
        }
    }

    /// The landed question, exposed only once the spin has settled.
    pub fn revealed_question(&self) -> Option<&Question> {
        match self.phase {
            GamePhase::Revealed | GamePhase::Scoring => {
                self.selected_slot.map(|slot| &self.pool.displayed()[slot])
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| Question {
                id: format!("q{}", i),
                prompt: format!("Question {}?", i),
                answer: format!("Answer {}", i),
                order: i as u32,
            })
            .collect()
    }

    fn ready_session(question_count: usize, team_count: usize) -> GameSession {
        let mut session = GameSession::new(
            questions(question_count),
            SessionConfig::teams(team_count),
        )
        .unwrap();
        session.confirm_setup().unwrap();
        session
    }

    /// Drive one full spin → reveal → resolve cycle.
    fn play_one(session: &mut GameSession, rng: &mut StdRng, correct: bool, team_id: Option<&str>) {
        assert!(!session.spin_with(rng).is_empty(), "spin should start");
        assert!(!session.finish_spin().is_empty(), "reveal should fire");
        assert!(
            !session.resolve_answer(correct, team_id).is_empty(),
            "resolution should fire"
        );
    }

    #[test]
    fn test_empty_session_refuses_to_start() {
        let mut session = GameSession::new(Vec::new(), SessionConfig::solo()).unwrap();
        assert!(matches!(
            session.confirm_setup(),
            Err(EngineError::NoQuestions)
        ));
        assert_eq!(session.phase(), GamePhase::Setup);
    }

    #[test]
    fn test_invalid_team_count_rejected_at_construction() {
        assert!(matches!(
            GameSession::new(questions(3), SessionConfig::teams(9)),
            Err(EngineError::InvalidTeamCount(9))
        ));
    }

    #[test]
    fn test_confirm_setup_not_reenterable() {
        let mut session = ready_session(5, 1);
        assert_eq!(session.phase(), GamePhase::Ready);
        assert!(session.confirm_setup().unwrap().is_empty());
    }

    #[test]
    fn test_spin_hides_question_until_reveal() {
        let mut session = ready_session(5, 1);
        let mut rng = StdRng::seed_from_u64(3);

        let events = session.spin_with(&mut rng);
        assert_eq!(session.phase(), GamePhase::Spinning);
        assert!(session.revealed_question().is_none());
        assert!(session.selected_slot().is_none());
        assert!(events.iter().all(|e| !matches!(
            e,
            SessionEvent::QuestionRevealed { .. }
        )));

        let events = session.finish_spin();
        assert_eq!(session.phase(), GamePhase::Revealed);
        let revealed = session.revealed_question().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::QuestionRevealed { question, .. } if question.id == revealed.id
        )));
    }

    #[test]
    fn test_double_spin_is_noop() {
        let mut session = ready_session(5, 1);
        let mut rng = StdRng::seed_from_u64(11);

        session.spin_with(&mut rng);
        let spin_count = session.spin_count();
        let rotation = session.rotation();

        // Second tap races the animation: nothing recomputed.
        assert!(session.spin_with(&mut rng).is_empty());
        assert_eq!(session.spin_count(), spin_count);
        assert_eq!(session.rotation(), rotation);
        assert_eq!(session.phase(), GamePhase::Spinning);

        session.finish_spin();
        assert!(session.spin_with(&mut rng).is_empty());
        assert_eq!(session.phase(), GamePhase::Revealed);
    }

    #[test]
    fn test_out_of_turn_calls_are_noops() {
        let mut session = ready_session(5, 2);

        assert!(session.finish_spin().is_empty());
        assert!(session.begin_scoring().is_empty());
        assert!(session.resolve_answer(true, None).is_empty());
        assert_eq!(session.phase(), GamePhase::Ready);
    }

    #[test]
    fn test_rotation_monotone_across_session() {
        let mut session = ready_session(8, 1);
        let mut rng = StdRng::seed_from_u64(5);
        let mut previous = 0.0;

        for _ in 0..8 {
            session.spin_with(&mut rng);
            assert!(session.rotation() > previous);
            previous = session.rotation();
            session.finish_spin();
            session.resolve_answer(false, None);
        }
    }

    #[test]
    fn test_scenario_small_set_completes_after_every_question() {
        // 5 questions, cap 10, solo: 5 segments, every resolution retires.
        let mut session = ready_session(5, 1);
        let mut rng = StdRng::seed_from_u64(21);
        assert_eq!(session.segments().len(), 5);

        for played in 1..=5 {
            session.spin_with(&mut rng);
            session.finish_spin();
            let events = session.resolve_answer(true, None);
            assert!(events
                .iter()
                .any(|e| matches!(e, SessionEvent::SegmentRetired { .. })));
            assert_eq!(session.answered_count(), played);
        }

        assert_eq!(session.phase(), GamePhase::Completed);
        assert_eq!(session.answered_count(), 5);
        assert!(session.spin_with(&mut rng).is_empty());
    }

    #[test]
    fn test_scenario_overflow_replaces_then_retires() {
        // 15 questions, cap 10, two teams: 5 replacements then 10 retirements,
        // completion after exactly 15 resolutions, never 10.
        let mut session = ready_session(15, 2);
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(session.segments().len(), 10);

        let mut replaced = 0;
        let mut retired = 0;
        for _ in 0..15 {
            assert_ne!(session.phase(), GamePhase::Completed);
            session.spin_with(&mut rng);
            session.finish_spin();
            for event in session.resolve_answer(false, None) {
                match event {
                    SessionEvent::SegmentReplaced { .. } => replaced += 1,
                    SessionEvent::SegmentRetired { .. } => retired += 1,
                    _ => {}
                }
            }
        }

        assert_eq!(replaced, 5);
        assert_eq!(retired, 10);
        assert_eq!(session.answered_count(), 15);
        assert_eq!(session.phase(), GamePhase::Completed);
    }

    #[test]
    fn test_scenario_team_scoring_and_ranking() {
        // Three teams; team B claims 6 answers and gets 4 of them right.
        let mut session = ready_session(12, 3);
        let mut rng = StdRng::seed_from_u64(13);
        let team_b = session.teams()[1].id.clone();

        let outcomes = [true, true, false, true, false, true];
        for correct in outcomes {
            session.spin_with(&mut rng);
            session.finish_spin();
            session.begin_scoring();
            assert_eq!(session.phase(), GamePhase::Scoring);
            session.resolve_answer(correct, Some(&team_b));
        }

        let ranked = session.ranked();
        assert_eq!(ranked[0].id, team_b);
        assert_eq!(ranked[0].score, 4);
    }

    #[test]
    fn test_solo_skips_scoring_phase() {
        let mut session = ready_session(4, 1);
        let mut rng = StdRng::seed_from_u64(2);

        session.spin_with(&mut rng);
        session.finish_spin();
        assert!(session.begin_scoring().is_empty());
        assert_eq!(session.phase(), GamePhase::Revealed);

        // Correct solo answers are tracked without a ScoreUpdated event.
        let events = session.resolve_answer(true, None);
        assert!(events
            .iter()
            .all(|e| !matches!(e, SessionEvent::ScoreUpdated { .. })));
        assert_eq!(session.phase(), GamePhase::Ready);
        assert_eq!(session.ranked()[0].score, 1);
    }

    #[test]
    fn test_correct_answer_without_team_is_not_credited() {
        let mut session = ready_session(6, 2);
        let mut rng = StdRng::seed_from_u64(17);

        session.spin_with(&mut rng);
        session.finish_spin();
        let events = session.resolve_answer(true, None);

        assert!(events
            .iter()
            .all(|e| !matches!(e, SessionEvent::ScoreUpdated { .. })));
        assert!(session.ranked().iter().all(|t| t.score == 0));
        // The question still counts as played.
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_completed_is_terminal_except_restart() {
        let mut session = ready_session(2, 2);
        let mut rng = StdRng::seed_from_u64(4);
        let team_a = session.teams()[0].id.clone();

        play_one(&mut session, &mut rng, true, Some(&team_a));
        play_one(&mut session, &mut rng, true, Some(&team_a));
        assert_eq!(session.phase(), GamePhase::Completed);

        assert!(session.spin_with(&mut rng).is_empty());
        assert!(session.resolve_answer(true, Some(&team_a)).is_empty());

        let events = session.restart();
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Phase {
                phase: GamePhase::Ready,
                answered: 0,
                ..
            }]
        ));
        assert_eq!(session.spin_count(), 0);
        assert_eq!(session.rotation(), 0.0);
        assert_eq!(session.answered_count(), 0);
        assert!(session.ranked().iter().all(|t| t.score == 0));
        assert_eq!(session.segments().len(), 2);

        // The rebuilt game is fully playable again.
        play_one(&mut session, &mut rng, false, None);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_completion_exactly_at_total_for_any_pool_size() {
        for (total, cap) in [(1, 10), (5, 10), (10, 10), (15, 10), (23, 10), (7, 3)] {
            let mut session = GameSession::new(
                questions(total),
                SessionConfig {
                    team_count: 1,
                    team_names: None,
                    display_cap: cap,
                },
            )
            .unwrap();
            session.confirm_setup().unwrap();
            let mut rng = StdRng::seed_from_u64(total as u64);

            for played in 1..=total {
                session.spin_with(&mut rng);
                session.finish_spin();
                session.resolve_answer(played % 2 == 0, None);
                let expect_completed = played == total;
                assert_eq!(
                    session.phase() == GamePhase::Completed,
                    expect_completed,
                    "total={} cap={} played={}",
                    total,
                    cap,
                    played
                );
            }
        }
    }
}
