// Entry points: exact enumeration, Monte Carlo estimation, and the threshold policy that
// picks between them. Every run says which mode produced it so exact and sampled
// denominators are never mixed.

use clap::ValueEnum;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::enumerate::{enumerate, ExactOptions};
use crate::error::Result;
use crate::league::{LeagueParams, Team};
use crate::monte_carlo::{simulate, SimulationOptions};
use crate::probability::{finalize, with_sampling_error, PlayoffOdds};
use crate::schedule::RemainingSchedule;

/// How the counters of a run were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Every scenario counted
    Exact,
    /// Sampled draws; probabilities carry a margin of error
    MonteCarlo,
    /// Nothing left to play; the single current standing was counted
    Decided,
}

/// Which engine the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModeChoice {
    /// Exact below the scenario threshold, Monte Carlo above it
    Auto,
    Exact,
    MonteCarlo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioRun {
    pub mode: Mode,
    /// Denominator: 2^matchups for exact runs, the draw count for Monte Carlo
    pub total_scenarios: u64,
    pub workers: usize,
    pub pruned_branches: u64,
}

impl ScenarioRun {
    /// Probabilities for the counters this run left on `teams`.
    pub fn odds(&self, teams: &[Team]) -> Result<Vec<PlayoffOdds>> {
        let odds = finalize(teams, self.total_scenarios)?;
        Ok(match self.mode {
            Mode::MonteCarlo => with_sampling_error(odds, self.total_scenarios),
            Mode::Exact | Mode::Decided => odds,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub choice: ModeChoice,
    /// Largest scenario count still enumerated exactly in `Auto` mode
    pub scenario_threshold: u64,
    pub exact: ExactOptions,
    pub simulation: SimulationOptions,
}

pub fn should_approximate(total_scenarios: u128, threshold: u64) -> bool {
    total_scenarios > u128::from(threshold)
}

fn check_inputs(params: &LeagueParams, teams: &[Team], schedule: &RemainingSchedule) -> Result<()> {
    params.validate_for_run(teams)?;
    schedule.check_teams(params, teams)
}

/// Count the one remaining scenario: the standings as they are.
fn decided(
    params: &LeagueParams,
    teams: &mut [Team],
    schedule: &RemainingSchedule,
    track_finishes: bool,
) -> Result<ScenarioRun> {
    warn!("season already decided: no matchups remain from week {}", params.start_week);
    let options = ExactOptions {
        prune: false,
        track_finishes,
        progress: None,
    };
    let result = enumerate(params, teams, schedule, options)?;
    result.tally.write_into(teams);
    Ok(ScenarioRun {
        mode: Mode::Decided,
        total_scenarios: result.total_scenarios(),
        workers: 1,
        pruned_branches: 0,
    })
}

/// Enumerate every remaining scenario and leave exact counters on `teams`.
pub fn compute_exact(
    params: &LeagueParams,
    teams: &mut [Team],
    schedule: &RemainingSchedule,
    options: ExactOptions,
) -> Result<ScenarioRun> {
    check_inputs(params, teams, schedule)?;
    if schedule.is_empty() {
        return decided(params, teams, schedule, options.track_finishes);
    }

    info!(
        "enumerating {} scenarios ({} matchups over {} weeks)",
        schedule.scenario_count(),
        schedule.matchup_count(),
        schedule.week_count()
    );
    let result = enumerate(params, teams, schedule, options)?;
    result.tally.write_into(teams);
    if result.pruned_branches > 0 {
        info!(
            "pruned {} branches covering {} of {} scenarios",
            result.pruned_branches,
            result.pruned_scenarios,
            result.total_scenarios()
        );
    }

    Ok(ScenarioRun {
        mode: Mode::Exact,
        total_scenarios: result.total_scenarios(),
        workers: 1,
        pruned_branches: result.pruned_branches,
    })
}

/// Sample `options.draws` seasons and leave approximate counters on `teams`.
pub fn compute_monte_carlo(
    params: &LeagueParams,
    teams: &mut [Team],
    schedule: &RemainingSchedule,
    options: SimulationOptions,
) -> Result<ScenarioRun> {
    check_inputs(params, teams, schedule)?;
    if schedule.is_empty() {
        return decided(params, teams, schedule, options.track_finishes);
    }

    let result = simulate(params, teams, schedule, options)?;
    result.tally.write_into(teams);
    Ok(ScenarioRun {
        mode: Mode::MonteCarlo,
        total_scenarios: result.draws,
        workers: result.workers,
        pruned_branches: 0,
    })
}

/// Run whichever engine `options.choice` and the scenario threshold call for.
pub fn compute(
    params: &LeagueParams,
    teams: &mut [Team],
    schedule: &RemainingSchedule,
    options: EngineOptions,
) -> Result<ScenarioRun> {
    let approximate = match options.choice {
        ModeChoice::Exact => false,
        ModeChoice::MonteCarlo => true,
        ModeChoice::Auto => {
            let scenarios = schedule.scenario_count();
            let approximate = should_approximate(scenarios, options.scenario_threshold);
            if approximate {
                info!(
                    "{} scenarios exceed the threshold of {}, switching to Monte Carlo",
                    scenarios, options.scenario_threshold
                );
            }
            approximate
        }
    };

    if approximate {
        compute_monte_carlo(params, teams, schedule, options.simulation)
    } else {
        compute_exact(params, teams, schedule, options.exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeagueError;
    use crate::schedule::Matchup;
    use approx::assert_abs_diff_eq;

    fn boundary_league() -> (LeagueParams, Vec<Team>, RemainingSchedule) {
        let params = LeagueParams::new(4, 2, 9, 9);
        let teams = vec![
            Team::new(1, 5, 3, 900.0).with_name("A"),
            Team::new(2, 5, 3, 880.0).with_name("B"),
            Team::new(3, 4, 4, 870.0).with_name("C"),
            Team::new(4, 3, 5, 860.0).with_name("D"),
        ];
        let matchups = [Matchup::new(9, 1, 2), Matchup::new(9, 3, 4)];
        let schedule = RemainingSchedule::new(&params, &matchups).unwrap();
        (params, teams, schedule)
    }

    fn options(choice: ModeChoice, threshold: u64) -> EngineOptions {
        EngineOptions {
            choice,
            scenario_threshold: threshold,
            exact: ExactOptions::default(),
            simulation: SimulationOptions { draws: 2_000, seed: Some(5), ..Default::default() },
        }
    }

    #[test]
    fn test_should_approximate() {
        assert!(!should_approximate(1 << 20, 1 << 20));
        assert!(should_approximate((1 << 20) + 1, 1 << 20));
        assert!(should_approximate(u128::MAX, u64::MAX));
    }

    #[test]
    fn test_exact_boundary_probabilities() {
        let (params, mut teams, schedule) = boundary_league();
        let run = compute_exact(&params, &mut teams, &schedule, ExactOptions::default()).unwrap();
        assert_eq!(run.mode, Mode::Exact);
        assert_eq!(run.total_scenarios, 4);

        let odds = run.odds(&teams).unwrap();
        let playoff: Vec<f64> = odds.iter().map(|o| o.playoff_probability).collect();
        let guaranteed: Vec<f64> = odds.iter().map(|o| o.guaranteed_probability).collect();
        assert_eq!(playoff, vec![1.0, 1.0, 0.5, 0.0]);
        assert_eq!(guaranteed, vec![0.5, 0.5, 0.0, 0.0]);
        assert!(odds.iter().all(|o| o.margin_of_error.is_none()));
    }

    #[test]
    fn test_counters_reset_between_runs() {
        let (params, mut teams, schedule) = boundary_league();
        compute_exact(&params, &mut teams, &schedule, ExactOptions::default()).unwrap();
        compute_exact(&params, &mut teams, &schedule, ExactOptions::default()).unwrap();
        assert_eq!(teams[0].qualifying_scenarios, 4);
        assert_eq!(teams[2].qualifying_scenarios, 2);
    }

    #[test]
    fn test_empty_schedule_is_decided() {
        let params = LeagueParams::new(4, 2, 9, 9);
        let (_, mut teams, _) = boundary_league();
        let schedule = RemainingSchedule::new(&params, &[]).unwrap();

        let run = compute(&params, &mut teams, &schedule, options(ModeChoice::Auto, 1 << 20)).unwrap();
        assert_eq!(run.mode, Mode::Decided);
        assert_eq!(run.total_scenarios, 1);
        for odds in run.odds(&teams).unwrap() {
            assert!(odds.playoff_probability == 0.0 || odds.playoff_probability == 1.0);
            assert!(odds.guaranteed_probability == 0.0 || odds.guaranteed_probability == 1.0);
        }
        // A and B level on 5 with C on 4: both in, neither clear
        assert_eq!(teams[0].qualifying_scenarios, 1);
        assert_eq!(teams[0].guaranteed_scenarios, 0);
        assert_eq!(teams[2].qualifying_scenarios, 0);
    }

    #[test]
    fn test_empty_schedule_decided_in_monte_carlo_too() {
        let params = LeagueParams::new(4, 2, 9, 9);
        let (_, mut teams, _) = boundary_league();
        let schedule = RemainingSchedule::new(&params, &[]).unwrap();
        let run = compute(&params, &mut teams, &schedule, options(ModeChoice::MonteCarlo, 0)).unwrap();
        assert_eq!(run.mode, Mode::Decided);
        assert_eq!(run.total_scenarios, 1);
    }

    #[test]
    fn test_season_over_is_error() {
        let params = LeagueParams::new(4, 2, 10, 9);
        let (_, mut teams, _) = boundary_league();
        let schedule = RemainingSchedule::new(&params, &[]).unwrap();
        let err = compute(&params, &mut teams, &schedule, options(ModeChoice::Auto, 1 << 20)).unwrap_err();
        assert!(matches!(err, LeagueError::SeasonOver { .. }));
    }

    #[test]
    fn test_too_many_spots_is_error() {
        let (_, mut teams, schedule) = boundary_league();
        let params = LeagueParams::new(4, 5, 9, 9);
        assert!(matches!(
            compute_exact(&params, &mut teams, &schedule, ExactOptions::default()),
            Err(LeagueError::TooManySpots { .. })
        ));
    }

    #[test]
    fn test_auto_dispatch_respects_threshold() {
        let (params, mut teams, schedule) = boundary_league();
        let exact = compute(&params, &mut teams, &schedule, options(ModeChoice::Auto, 4)).unwrap();
        assert_eq!(exact.mode, Mode::Exact);

        let sampled = compute(&params, &mut teams, &schedule, options(ModeChoice::Auto, 3)).unwrap();
        assert_eq!(sampled.mode, Mode::MonteCarlo);
        assert_eq!(sampled.total_scenarios, 2_000);

        let odds = sampled.odds(&teams).unwrap();
        assert!(odds.iter().all(|o| o.margin_of_error.is_some()));
        // A and B win every tie-break against C
        assert_abs_diff_eq!(odds[0].playoff_probability, 1.0);
        assert_abs_diff_eq!(odds[2].playoff_probability, 0.0);
    }
}
