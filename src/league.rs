// Standings model: each team's record going into the remaining schedule, plus the
// per-run scenario counters the engines write into.

use serde::{Deserialize, Serialize};

use crate::error::{LeagueError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// 1-based roster id, dense across the league
    pub roster_id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    /// Secondary tiebreak metric
    #[serde(default)]
    pub points_for: f64,
    #[serde(skip)]
    pub qualifying_scenarios: u64,
    /// Scenarios where the team finishes strictly above the cutoff
    #[serde(skip)]
    pub guaranteed_scenarios: u64,
    /// finishes[r] = scenarios ending with the team in standings position r (0 = first)
    #[serde(skip)]
    pub finishes: Vec<u64>,
}

impl Team {
    pub fn new(roster_id: u32, wins: u32, losses: u32, points_for: f64) -> Team {
        Team {
            roster_id,
            name: None,
            wins,
            losses,
            ties: 0,
            points_for,
            qualifying_scenarios: 0,
            guaranteed_scenarios: 0,
            finishes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Team {
        self.name = Some(name.to_string());
        self
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Team {}", self.roster_id),
        }
    }

    pub fn record(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }

    /// Clear all counters before a run. `positions` sizes the finish table (0 disables it).
    pub fn reset_counters(&mut self, positions: usize) {
        self.qualifying_scenarios = 0;
        self.guaranteed_scenarios = 0;
        self.finishes.clear();
        self.finishes.resize(positions, 0);
    }
}

/// Teams must sit in roster-id order with ids 1..=n, so a roster id doubles as a slot.
pub fn check_roster_ids(teams: &[Team]) -> Result<()> {
    for (position, team) in teams.iter().enumerate() {
        if team.roster_id as usize != position + 1 {
            return Err(LeagueError::RosterIds {
                position,
                roster_id: team.roster_id,
            });
        }
    }
    Ok(())
}

/// Shape of the league and where the season currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueParams {
    pub team_count: usize,
    pub playoff_spots: usize,
    /// First week whose games are still undecided
    pub start_week: u32,
    /// Last week of the regular season
    pub last_week: u32,
}

impl LeagueParams {
    pub fn new(team_count: usize, playoff_spots: usize, start_week: u32, last_week: u32) -> LeagueParams {
        LeagueParams {
            team_count,
            playoff_spots,
            start_week,
            last_week,
        }
    }

    pub fn season_over(&self) -> bool {
        self.start_week > self.last_week
    }

    /// Number of regular-season weeks still to be played.
    pub fn weeks_remaining(&self) -> usize {
        if self.season_over() {
            0
        } else {
            (self.last_week - self.start_week + 1) as usize
        }
    }

    /// Check spot counts and roster ids against the supplied teams.
    pub fn validate(&self, teams: &[Team]) -> Result<()> {
        if self.playoff_spots == 0 {
            return Err(LeagueError::NoSpots);
        }
        if self.playoff_spots > self.team_count {
            return Err(LeagueError::TooManySpots {
                spots: self.playoff_spots,
                teams: self.team_count,
            });
        }
        if teams.len() != self.team_count {
            return Err(LeagueError::TeamCountMismatch {
                declared: self.team_count,
                supplied: teams.len(),
            });
        }
        check_roster_ids(teams)
    }

    /// Everything `validate` checks, plus refusing to run once the season is over.
    pub fn validate_for_run(&self, teams: &[Team]) -> Result<()> {
        self.validate(teams)?;
        if self.season_over() {
            return Err(LeagueError::SeasonOver {
                start: self.start_week,
                last: self.last_week,
            });
        }
        Ok(())
    }
}
