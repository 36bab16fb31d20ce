// Turns scenario counts into per-team probabilities.

use serde::Serialize;

use crate::error::{LeagueError, Result};
use crate::league::Team;

/// z for a two-sided 95% interval
pub const Z_95: f64 = 1.959_963_984_540_054;

#[derive(Debug, Clone, Serialize)]
pub struct PlayoffOdds {
    pub roster_id: u32,
    pub name: String,
    pub record: String,
    pub points_for: f64,
    pub qualifying_scenarios: u64,
    pub guaranteed_scenarios: u64,
    pub playoff_probability: f64,
    pub guaranteed_probability: f64,
    /// 95% half-width on the probabilities; only set for sampled runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_of_error: Option<f64>,
    /// finish_distribution[r] = share of scenarios ending in standings position r
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub finish_distribution: Vec<f64>,
}

/// Normal-approximation half-width of a 95% interval around `p` estimated from `n` draws.
pub fn margin_of_error(p: f64, n: u64) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    Z_95 * (p * (1.0 - p) / n as f64).sqrt()
}

/// Divide every team's counters by `total_scenarios`.
pub fn finalize(teams: &[Team], total_scenarios: u64) -> Result<Vec<PlayoffOdds>> {
    if total_scenarios == 0 {
        return Err(LeagueError::NoScenarios);
    }
    let total = total_scenarios as f64;

    Ok(teams
        .iter()
        .map(|team| PlayoffOdds {
            roster_id: team.roster_id,
            name: team.display_name(),
            record: team.record(),
            points_for: team.points_for,
            qualifying_scenarios: team.qualifying_scenarios,
            guaranteed_scenarios: team.guaranteed_scenarios,
            playoff_probability: team.qualifying_scenarios as f64 / total,
            guaranteed_probability: team.guaranteed_scenarios as f64 / total,
            margin_of_error: None,
            finish_distribution: team.finishes.iter().map(|&n| n as f64 / total).collect(),
        })
        .collect())
}

/// Attach the sampling margin for a run of `draws` draws. The widest margin of the two
/// probabilities is reported.
pub fn with_sampling_error(mut odds: Vec<PlayoffOdds>, draws: u64) -> Vec<PlayoffOdds> {
    for entry in odds.iter_mut() {
        let margin = margin_of_error(entry.playoff_probability, draws)
            .max(margin_of_error(entry.guaranteed_probability, draws));
        entry.margin_of_error = Some(margin);
    }
    odds
}
