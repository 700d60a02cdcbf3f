use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Confirm team setup and enter the game loop.
    ConfirmSetup,
    /// Request a wheel spin (no-op outside the READY phase).
    Spin,
    /// Move from REVEALED to SCORING so a team can be picked (multi-team only).
    BeginScoring,
    /// Report whether the revealed question was answered correctly.
    /// `team_id` names the acting team in multi-team mode.
    ResolveAnswer {
        correct: bool,
        team_id: Option<TeamId>,
    },
    /// Throw away pool and scores and start over from the original questions.
    Restart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Wheel started turning. Carries the cumulative target rotation in
    /// degrees; the question stays hidden until the spin settles.
    SpinStarted { spin_no: u32, rotation: f64 },
    /// Spin settled; the landed question is now visible.
    QuestionRevealed {
        slot: usize,
        question: RevealedQuestion,
    },
    /// A resolved segment got fresh content from the overflow pool and is
    /// spinnable again.
    SegmentReplaced {
        slot: usize,
        question: SegmentQuestion,
    },
    /// A resolved segment is permanently out of play (skip glyph).
    SegmentRetired { slot: usize },
    /// A team was credited a point.
    ScoreUpdated { team: Team },
    /// All questions have been played.
    Completed {
        answered: usize,
        leaderboard: Vec<Team>,
    },
    Phase {
        phase: GamePhase,
        answered: usize,
        total: usize,
    },
}

/// Wheel-label view of a question (no answer to prevent spoilers)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentQuestion {
    pub id: QuestionId,
    pub prompt: String,
}

impl From<&Question> for SegmentQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
        }
    }
}

/// Full view exposed once the spin has settled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevealedQuestion {
    pub id: QuestionId,
    pub prompt: String,
    pub answer: String,
}

impl From<&Question> for RevealedQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            answer: q.answer.clone(),
        }
    }
}

/// Snapshot of one wheel segment for initial render and reconnect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub slot: usize,
    pub question: SegmentQuestion,
    /// True once the segment is permanently out of play.
    pub retired: bool,
}
