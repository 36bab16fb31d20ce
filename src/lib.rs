// Playoff qualification odds for a head-to-head league: exact enumeration of the remaining
// schedule, or Monte Carlo sampling when the schedule is too large to enumerate.

pub mod config;
pub mod cutoff;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod ingest;
pub mod league;
pub mod monte_carlo;
pub mod outcome;
pub mod probability;
pub mod prune;
pub mod report;
pub mod schedule;

pub use config::Config;
pub use engine::{compute, compute_exact, compute_monte_carlo, should_approximate, EngineOptions, Mode, ModeChoice, ScenarioRun};
pub use error::{LeagueError, Result};
pub use ingest::LeagueSnapshot;
pub use league::{LeagueParams, Team};
pub use probability::PlayoffOdds;
pub use report::Report;
pub use schedule::{Matchup, RemainingSchedule};
