// Monte Carlo estimation for leagues too big to enumerate.
//
// Each draw flips a fair coin for every remaining matchup, ranks the league by wins
// with points-for breaking ties, and counts who lands inside the playoff field.
// Draws are split across rayon workers; every worker owns its rng and tally and only
// reads the shared snapshot, and the tallies are summed once all workers are done.

use indicatif::ProgressBar;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::cutoff::Tally;
use crate::error::{LeagueError, Result};
use crate::league::{LeagueParams, Team};
use crate::schedule::{Matchup, RemainingSchedule};

/// Beyond this many workers the scheduling overhead outweighs the extra cores.
pub const MAX_WORKERS: usize = 16;

/// Draws between progress bar updates.
const PROGRESS_CHUNK: u64 = 1024;

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub draws: u64,
    /// Explicit worker count; `None` adapts to the machine
    pub workers: Option<usize>,
    pub max_workers: usize,
    /// Seed for reproducible runs; worker w uses seed + w
    pub seed: Option<u64>,
    pub track_finishes: bool,
    pub progress: Option<ProgressBar>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            draws: 100_000,
            workers: None,
            max_workers: MAX_WORKERS,
            seed: None,
            track_finishes: false,
            progress: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub tally: Tally,
    pub draws: u64,
    pub workers: usize,
}

/// Read-only view of the league every worker draws from.
struct Snapshot<'a> {
    base_wins: Vec<u32>,
    points_for: Vec<f64>,
    matchups: Vec<&'a Matchup>,
    spots: usize,
    track_finishes: bool,
}

/// How many workers to run: the explicit request if any, else one per core up to
/// `max_workers`, never more than there are draws.
pub fn worker_count(requested: Option<usize>, max_workers: usize, draws: u64) -> usize {
    let wanted = match requested {
        Some(n) => n,
        None => num_cpus::get().min(max_workers),
    };
    let cap = usize::try_from(draws).unwrap_or(usize::MAX);
    wanted.clamp(1, cap.max(1))
}

/// Split `draws` evenly; the first `draws % workers` workers take one extra.
pub fn partition(draws: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let share = draws / workers;
    let extra = draws % workers;
    (0..workers).map(|w| share + u64::from(w < extra)).collect()
}

/// Order `order` by wins, then points-for, then roster id. Every draw gets a strict ranking.
pub fn rank_with_tiebreak(totals: &[u32], points_for: &[f64], order: &mut Vec<usize>) {
    order.clear();
    order.extend(0..totals.len());
    order.sort_by(|&a, &b| {
        totals[b]
            .cmp(&totals[a])
            .then_with(|| points_for[b].total_cmp(&points_for[a]))
            .then_with(|| a.cmp(&b))
    });
}

fn run_worker(
    snapshot: &Snapshot,
    draws: u64,
    mut rng: StdRng,
    progress: Option<&ProgressBar>,
) -> Tally {
    let teams = snapshot.base_wins.len();
    let mut tally = Tally::new(teams, snapshot.track_finishes);
    let mut totals = vec![0u32; teams];
    let mut order: Vec<usize> = Vec::with_capacity(teams);

    for draw in 0..draws {
        totals.copy_from_slice(&snapshot.base_wins);
        for matchup in &snapshot.matchups {
            let (winner, _) = matchup.resolve(rng.gen::<bool>());
            totals[winner as usize - 1] += 1;
        }

        rank_with_tiebreak(&totals, &snapshot.points_for, &mut order);
        let cutoff = totals[order[snapshot.spots - 1]];

        for (rank, &team) in order.iter().enumerate() {
            tally.credit(team, rank < snapshot.spots, totals[team] > cutoff, 1);
            tally.record_finish(team, rank);
        }

        if let Some(pb) = progress {
            if (draw + 1) % PROGRESS_CHUNK == 0 {
                pb.inc(PROGRESS_CHUNK);
            }
        }
    }

    if let Some(pb) = progress {
        pb.inc(draws % PROGRESS_CHUNK);
    }
    tally
}

/// Estimate qualification counts from `options.draws` independent random seasons.
pub fn simulate(
    params: &LeagueParams,
    teams: &[Team],
    schedule: &RemainingSchedule,
    options: SimulationOptions,
) -> Result<Simulation> {
    if options.draws == 0 {
        return Err(LeagueError::NoScenarios);
    }
    schedule.check_teams(params, teams)?;

    let snapshot = Snapshot {
        base_wins: teams.iter().map(|t| t.wins).collect(),
        points_for: teams.iter().map(|t| t.points_for).collect(),
        matchups: schedule.matchups().collect(),
        spots: params.playoff_spots,
        track_finishes: options.track_finishes,
    };

    let workers = worker_count(options.workers, options.max_workers, options.draws);
    let shares = partition(options.draws, workers);
    info!(
        "simulating {} draws over {} matchups with {} workers",
        options.draws,
        snapshot.matchups.len(),
        workers
    );

    if let Some(pb) = &options.progress {
        pb.set_length(options.draws);
    }

    let seed = options.seed;
    let progress = options.progress.as_ref();
    let track_finishes = options.track_finishes;
    let tally = shares
        .par_iter()
        .enumerate()
        .map(|(worker, &draws)| {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
                None => StdRng::from_entropy(),
            };
            debug!("worker {} drawing {} seasons", worker, draws);
            run_worker(&snapshot, draws, rng, progress)
        })
        .reduce(|| Tally::new(teams.len(), track_finishes), Tally::merge);

    if let Some(pb) = &options.progress {
        pb.finish_and_clear();
    }

    Ok(Simulation {
        tally,
        draws: options.draws,
        workers,
    })
}
