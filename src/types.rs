use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type SessionId = String;
pub type QuestionId = String;
pub type TeamId = String;

/// Number of wheel segments shown at once. Questions beyond this stay in the
/// overflow pool and refill resolved segments in order.
pub const DISPLAY_CAP: usize = 10;

/// Teams per session, inclusive bounds.
pub const MIN_TEAMS: usize = 1;
pub const MAX_TEAMS: usize = 4;

/// Default wedge colors assigned to teams in creation order.
pub const TEAM_COLORS: [&str; MAX_TEAMS] = ["#E17076", "#7BC862", "#65AADD", "#EE7AAE"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Setup,
    Ready,
    Spinning,
    Revealed,
    Scoring,
    Completed,
}

/// A canonical question as the engine sees it. Produced once by the content
/// adapter and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub answer: String,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: String,
    pub score: u32,
}

/// Session-level configuration collected during setup.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub team_count: usize,
    /// Caller-supplied team names; missing entries fall back to defaults.
    pub team_names: Option<Vec<String>>,
    pub display_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            team_count: 1,
            team_names: None,
            display_cap: DISPLAY_CAP,
        }
    }
}

impl SessionConfig {
    pub fn solo() -> Self {
        Self::default()
    }

    pub fn teams(team_count: usize) -> Self {
        Self {
            team_count,
            ..Self::default()
        }
    }

    pub fn is_solo(&self) -> bool {
        self.team_count == 1
    }
}

pub fn default_team_name(index: usize) -> String {
    format!("Team {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&GamePhase::Revealed).unwrap();
        assert_eq!(json, "\"REVEALED\"");

        let phase: GamePhase = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(phase, GamePhase::Completed);
    }

    #[test]
    fn test_default_config_is_solo() {
        let config = SessionConfig::default();
        assert!(config.is_solo());
        assert_eq!(config.display_cap, DISPLAY_CAP);
    }
}
