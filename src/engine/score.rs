use super::{EngineError, EngineResult};
use crate::types::{default_team_name, Team, TeamId, MAX_TEAMS, MIN_TEAMS, TEAM_COLORS};

/// Per-team running score. In solo mode a single synthetic team exists and
/// its score is tracked but never surfaced competitively.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    teams: Vec<Team>,
}

impl ScoreBoard {
    pub fn new(team_count: usize, names: Option<&[String]>) -> EngineResult<Self> {
        if !(MIN_TEAMS..=MAX_TEAMS).contains(&team_count) {
            return Err(EngineError::InvalidTeamCount(team_count));
        }

        let teams = (0..team_count)
            .map(|i| Team {
                id: ulid::Ulid::new().to_string(),
                name: names
                    .and_then(|n| n.get(i))
                    .filter(|n| !n.trim().is_empty())
                    .map(|n| n.trim().to_string())
                    .unwrap_or_else(|| default_team_name(i)),
                color: TEAM_COLORS[i].to_string(),
                score: 0,
            })
            .collect();

        Ok(Self { teams })
    }

    pub fn is_solo(&self) -> bool {
        self.teams.len() == 1
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn get(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Attribute one point. Answers are never un-scored, so there is no
    /// decrement counterpart. Returns the updated team, or `None` for an
    /// unknown id.
    pub fn credit(&mut self, team_id: &str) -> Option<Team> {
        let team = self.teams.iter_mut().find(|t| t.id == team_id)?;
        team.score += 1;
        Some(team.clone())
    }

    /// Solo shortcut: credit the single synthetic team.
    pub fn credit_solo(&mut self) -> Option<Team> {
        if !self.is_solo() {
            return None;
        }
        let id: TeamId = self.teams[0].id.clone();
        self.credit(&id)
    }

    /// Descending by score; ties keep team creation order so leaderboard
    /// rendering stays deterministic.
    pub fn ranked(&self) -> Vec<Team> {
        let mut ranked = self.teams.clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_count_bounds() {
        assert!(matches!(
            ScoreBoard::new(0, None),
            Err(EngineError::InvalidTeamCount(0))
        ));
        assert!(matches!(
            ScoreBoard::new(5, None),
            Err(EngineError::InvalidTeamCount(5))
        ));
        assert!(ScoreBoard::new(1, None).is_ok());
        assert!(ScoreBoard::new(4, None).is_ok());
    }

    #[test]
    fn test_default_names_and_colors() {
        let board = ScoreBoard::new(3, None).unwrap();
        let names: Vec<_> = board.teams().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Team 1", "Team 2", "Team 3"]);

        let colors: Vec<_> = board.teams().iter().map(|t| t.color.as_str()).collect();
        assert_eq!(colors, &TEAM_COLORS[..3]);
    }

    #[test]
    fn test_caller_names_with_fallback() {
        let names = vec!["Tigers".to_string(), "  ".to_string()];
        let board = ScoreBoard::new(3, Some(&names)).unwrap();

        assert_eq!(board.teams()[0].name, "Tigers");
        assert_eq!(board.teams()[1].name, "Team 2");
        assert_eq!(board.teams()[2].name, "Team 3");
    }

    #[test]
    fn test_credit_accumulates() {
        let mut board = ScoreBoard::new(2, None).unwrap();
        let id = board.teams()[1].id.clone();

        for expected in 1..=4 {
            let team = board.credit(&id).unwrap();
            assert_eq!(team.score, expected);
        }

        assert!(board.credit("nope").is_none());
        assert_eq!(board.get(&id).unwrap().score, 4);
    }

    #[test]
    fn test_ranked_descending_with_stable_ties() {
        let mut board = ScoreBoard::new(4, None).unwrap();
        let ids: Vec<_> = board.teams().iter().map(|t| t.id.clone()).collect();

        // Team 3 leads, teams 1 and 2 tie, team 4 stays at zero.
        board.credit(&ids[2]);
        board.credit(&ids[2]);
        board.credit(&ids[0]);
        board.credit(&ids[1]);

        let ranked = board.ranked();
        assert_eq!(ranked[0].id, ids[2]);
        // Ties keep creation order.
        assert_eq!(ranked[1].id, ids[0]);
        assert_eq!(ranked[2].id, ids[1]);
        assert_eq!(ranked[3].id, ids[3]);
    }

    #[test]
    fn test_solo_credit() {
        let mut solo = ScoreBoard::new(1, None).unwrap();
        assert!(solo.is_solo());
        assert_eq!(solo.credit_solo().unwrap().score, 1);

        let mut multi = ScoreBoard::new(2, None).unwrap();
        assert!(multi.credit_solo().is_none());
    }
}
