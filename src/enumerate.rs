// Exact enumeration: walk every winner assignment of every remaining week, depth first,
// and count each complete scenario once. A week with k matchups has 2^k assignments,
// indexed 0..2^k with bit i deciding matchup i (0 = home win).

use indicatif::ProgressBar;
use log::debug;

use crate::cutoff::{CutoffEvaluator, Tally};
use crate::error::{LeagueError, Result};
use crate::league::{LeagueParams, Team};
use crate::outcome::OutcomeMatrix;
use crate::prune::PruningFilter;
use crate::schedule::RemainingSchedule;

/// Counters are u64, so exact runs stop short of 2^64 scenarios.
pub const MAX_EXACT_MATCHUPS: usize = 63;

#[derive(Debug, Clone, Default)]
pub struct ExactOptions {
    pub prune: bool,
    pub track_finishes: bool,
    /// Ticks once per first-week assignment
    pub progress: Option<ProgressBar>,
}

/// What a finished enumeration produced.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub tally: Tally,
    /// Scenarios evaluated one by one
    pub evaluated: u64,
    /// Branches the pruning filter credited in bulk
    pub pruned_branches: u64,
    /// Scenarios covered by those branches
    pub pruned_scenarios: u64,
}

impl Enumeration {
    pub fn total_scenarios(&self) -> u64 {
        self.evaluated + self.pruned_scenarios
    }
}

pub struct Enumerator<'a> {
    schedule: &'a RemainingSchedule,
    base_wins: Vec<u32>,
    matrix: OutcomeMatrix,
    evaluator: CutoffEvaluator,
    filter: Option<PruningFilter>,
    games_left: Vec<Vec<u32>>,
    matchups_after: Vec<usize>,
    totals: Vec<u32>,
    tally: Tally,
    evaluated: u64,
    pruned_branches: u64,
    pruned_scenarios: u64,
    progress: Option<ProgressBar>,
}

impl<'a> Enumerator<'a> {
    pub fn new(
        params: &LeagueParams,
        teams: &[Team],
        schedule: &'a RemainingSchedule,
        options: ExactOptions,
    ) -> Result<Enumerator<'a>> {
        schedule.check_teams(params, teams)?;
        let matchups = schedule.matchup_count();
        if matchups > MAX_EXACT_MATCHUPS {
            return Err(LeagueError::ScenarioOverflow { matchups });
        }
        let evaluator = CutoffEvaluator::new(params.playoff_spots, teams.len())?;

        let filter = if options.prune && options.track_finishes {
            debug!("pruning bypassed: finish positions cannot be credited in bulk");
            None
        } else if options.prune {
            Some(PruningFilter::new(params.playoff_spots, teams.len()))
        } else {
            None
        };

        if let (Some(pb), Some(first)) = (&options.progress, schedule.weeks().first()) {
            pb.set_length(first.assignments());
        }

        Ok(Enumerator {
            schedule,
            base_wins: teams.iter().map(|t| t.wins).collect(),
            matrix: OutcomeMatrix::new(teams.len(), schedule.week_count()),
            evaluator,
            filter,
            games_left: schedule.games_left_after(),
            matchups_after: schedule.matchups_after(),
            totals: Vec::with_capacity(teams.len()),
            tally: Tally::new(teams.len(), options.track_finishes),
            evaluated: 0,
            pruned_branches: 0,
            pruned_scenarios: 0,
            progress: options.progress,
        })
    }

    pub fn run(mut self) -> Enumeration {
        if self.matrix.weeks() == 0 {
            self.evaluate_leaf();
        } else {
            self.enumerate(0);
        }
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        debug!(
            "enumeration done: {} evaluated, {} branches pruned covering {} scenarios",
            self.evaluated, self.pruned_branches, self.pruned_scenarios
        );
        Enumeration {
            tally: self.tally,
            evaluated: self.evaluated,
            pruned_branches: self.pruned_branches,
            pruned_scenarios: self.pruned_scenarios,
        }
    }

    fn enumerate(&mut self, week: usize) {
        let schedule = self.schedule;
        let matchups = &schedule.weeks()[week].matchups;
        let last = week + 1 == self.matrix.weeks();

        for assignment in 0..(1u64 << matchups.len()) {
            self.matrix.apply_week(week, matchups, assignment);

            if last {
                self.evaluate_leaf();
            } else if !self.try_prune(week) {
                self.enumerate(week + 1);
            }

            if week == 0 {
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
            }
        }
    }

    fn evaluate_leaf(&mut self) {
        self.matrix
            .totals_through(&self.base_wins, self.matrix.weeks(), &mut self.totals);
        self.evaluator.evaluate(&self.totals, &mut self.tally);
        self.evaluated += 1;
    }

    /// Credit the branch below `week` in bulk if every team's outcome is already fixed.
    fn try_prune(&mut self, week: usize) -> bool {
        let filter = match self.filter.as_mut() {
            Some(filter) => filter,
            None => return false,
        };
        if !PruningFilter::applies(self.matrix.weeks() - week - 1) {
            return false;
        }

        self.matrix
            .totals_through(&self.base_wins, week + 1, &mut self.totals);
        match filter.settle(&self.totals, &self.games_left[week]) {
            Some(settled) => {
                let weight = 1u64 << self.matchups_after[week];
                for (team, outcome) in settled.iter().enumerate() {
                    self.tally
                        .credit(team, outcome.qualifies, outcome.guaranteed, weight);
                }
                self.pruned_branches += 1;
                self.pruned_scenarios += weight;
                true
            }
            None => false,
        }
    }
}

/// Enumerate every scenario of `schedule` from the teams' current records.
pub fn enumerate(
    params: &LeagueParams,
    teams: &[Team],
    schedule: &RemainingSchedule,
    options: ExactOptions,
) -> Result<Enumeration> {
    Ok(Enumerator::new(params, teams, schedule, options)?.run())
}
