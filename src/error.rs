// Error taxonomy for the playoff calculator.
// Configuration errors are fatal and surfaced immediately; the adapter variants wrap
// failures from reading league snapshots and config files.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeagueError>;

/// Everything that can stop a run before or while it computes.
#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("{spots} playoff spots requested but the league only has {teams} teams")]
    TooManySpots { spots: usize, teams: usize },
    #[error("a league needs at least one playoff spot")]
    NoSpots,
    #[error("league declares {declared} teams but {supplied} team records were supplied")]
    TeamCountMismatch { declared: usize, supplied: usize },
    #[error("roster ids must be dense and 1-based: position {position} holds roster {roster_id}")]
    RosterIds { position: usize, roster_id: u32 },
    #[error("starting week {start} is past the last regular-season week {last}")]
    SeasonOver { start: u32, last: u32 },
    #[error("week {week} references unknown roster {roster_id}")]
    UnknownTeam { week: u32, roster_id: u32 },
    #[error("roster {roster_id} is paired more than once in week {week}")]
    DoubleBooked { week: u32, roster_id: u32 },
    #[error("roster {roster_id} is paired against itself in week {week}")]
    SelfMatchup { week: u32, roster_id: u32 },
    #[error("matchup in week {week} falls outside the remaining weeks {start}..={last}")]
    WeekOutOfRange { week: u32, start: u32, last: u32 },
    #[error("matchup {matchup_id} in week {week} does not pair exactly two rosters (found {found})")]
    UnpairedMatchup { week: u32, matchup_id: u32, found: usize },
    #[error("cannot turn counts into probabilities over zero scenarios")]
    NoScenarios,
    #[error("{matchups} remaining matchups is too many to enumerate exactly")]
    ScenarioOverflow { matchups: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LeagueError {
    /// True for the configuration class of errors, false for adapter failures.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            LeagueError::Io(_) | LeagueError::Csv(_) | LeagueError::Yaml(_) | LeagueError::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_values() {
        let err = LeagueError::TooManySpots { spots: 7, teams: 6 };
        assert_eq!(
            err.to_string(),
            "7 playoff spots requested but the league only has 6 teams"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_adapter_errors_are_not_configuration() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LeagueError = io.into();
        assert!(!err.is_configuration());
    }
}
