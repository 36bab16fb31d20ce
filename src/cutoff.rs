// Cutoff evaluation: find the win total at the last qualifying position and count,
// for every team, whether this scenario puts it in (or clear of) the playoff field.

use crate::error::{LeagueError, Result};
use crate::league::{check_roster_ids, Team};
use crate::outcome::OutcomeMatrix;

/// Per-team scenario counters for one run (or one Monte Carlo worker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub qualifying: Vec<u64>,
    pub guaranteed: Vec<u64>,
    /// Flat finish table, finishes[team * positions + rank]; empty when not tracked
    pub finishes: Vec<u64>,
    positions: usize,
}

impl Tally {
    pub fn new(teams: usize, track_finishes: bool) -> Tally {
        let positions = if track_finishes { teams } else { 0 };
        Tally {
            qualifying: vec![0; teams],
            guaranteed: vec![0; teams],
            finishes: vec![0; teams * positions],
            positions,
        }
    }

    pub fn tracks_finishes(&self) -> bool {
        self.positions > 0
    }

    pub fn finish_count(&self, team: usize, rank: usize) -> u64 {
        self.finishes[team * self.positions + rank]
    }

    #[inline]
    pub fn record_finish(&mut self, team: usize, rank: usize) {
        if self.positions > 0 {
            self.finishes[team * self.positions + rank] += 1;
        }
    }

    /// Credit `weight` scenarios at once to a team whose outcome is already settled.
    #[inline]
    pub fn credit(&mut self, team: usize, qualifies: bool, guaranteed: bool, weight: u64) {
        if qualifies {
            self.qualifying[team] += weight;
        }
        if guaranteed {
            self.guaranteed[team] += weight;
        }
    }

    /// Element-wise sum, used to reduce worker tallies.
    pub fn merge(mut self, other: Tally) -> Tally {
        for (a, b) in self.qualifying.iter_mut().zip(other.qualifying) {
            *a += b;
        }
        for (a, b) in self.guaranteed.iter_mut().zip(other.guaranteed) {
            *a += b;
        }
        for (a, b) in self.finishes.iter_mut().zip(other.finishes) {
            *a += b;
        }
        self
    }

    /// Copy the counters onto the team records, replacing whatever they held.
    pub fn write_into(&self, teams: &mut [Team]) {
        for (idx, team) in teams.iter_mut().enumerate() {
            team.reset_counters(self.positions);
            team.qualifying_scenarios = self.qualifying[idx];
            team.guaranteed_scenarios = self.guaranteed[idx];
            if self.positions > 0 {
                team.finishes
                    .copy_from_slice(&self.finishes[idx * self.positions..(idx + 1) * self.positions]);
            }
        }
    }
}

/// Reusable evaluator for complete scenarios in exact mode. Ties at the cutoff are
/// not broken: every team level with the cutoff counts as qualifying.
#[derive(Debug, Clone)]
pub struct CutoffEvaluator {
    spots: usize,
    order: Vec<usize>,
}

impl CutoffEvaluator {
    pub fn new(playoff_spots: usize, team_count: usize) -> Result<CutoffEvaluator> {
        if playoff_spots == 0 {
            return Err(LeagueError::NoSpots);
        }
        if playoff_spots > team_count {
            return Err(LeagueError::TooManySpots {
                spots: playoff_spots,
                teams: team_count,
            });
        }
        Ok(CutoffEvaluator {
            spots: playoff_spots,
            order: (0..team_count).collect(),
        })
    }

    /// Sort teams by total wins and return the win total at the last qualifying position.
    pub fn rank(&mut self, totals: &[u32]) -> u32 {
        self.order.clear();
        self.order.extend(0..totals.len());
        self.order.sort_by(|&a, &b| totals[b].cmp(&totals[a]));
        totals[self.order[self.spots - 1]]
    }

    /// Count one scenario. Returns its cutoff.
    pub fn evaluate(&mut self, totals: &[u32], tally: &mut Tally) -> u32 {
        let cutoff = self.rank(totals);

        for (team, &wins) in totals.iter().enumerate() {
            tally.credit(team, wins >= cutoff, wins > cutoff, 1);
        }

        if tally.tracks_finishes() {
            // competition ranking: tied teams share the higher position
            let mut rank = 0;
            for r in 0..self.order.len() {
                if r != 0 && totals[self.order[r]] < totals[self.order[r - 1]] {
                    rank = r;
                }
                tally.record_finish(self.order[r], rank);
            }
        }

        cutoff
    }
}

/// One-shot evaluation of the scenario held in `matrix`, crediting the team records directly.
pub fn evaluate(teams: &mut [Team], matrix: &OutcomeMatrix, playoff_spots: usize) -> Result<u32> {
    if matrix.teams() != teams.len() {
        return Err(LeagueError::TeamCountMismatch {
            declared: matrix.teams(),
            supplied: teams.len(),
        });
    }
    check_roster_ids(teams)?;
    let mut evaluator = CutoffEvaluator::new(playoff_spots, teams.len())?;
    let base: Vec<u32> = teams.iter().map(|t| t.wins).collect();
    let mut totals = Vec::with_capacity(teams.len());
    matrix.totals_through(&base, matrix.weeks(), &mut totals);

    let mut tally = Tally::new(teams.len(), false);
    let cutoff = evaluator.evaluate(&totals, &mut tally);
    for (idx, team) in teams.iter_mut().enumerate() {
        team.qualifying_scenarios += tally.qualifying[idx];
        team.guaranteed_scenarios += tally.guaranteed[idx];
    }
    Ok(cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Matchup;

    #[test]
    fn test_cutoff_with_tie_at_boundary() {
        // A6 B5 C5 D3, two spots: cutoff 5, A guaranteed, B and C qualify on the tie
        let mut evaluator = CutoffEvaluator::new(2, 4).unwrap();
        let mut tally = Tally::new(4, true);
        let cutoff = evaluator.evaluate(&[6, 5, 5, 3], &mut tally);

        assert_eq!(cutoff, 5);
        assert_eq!(tally.qualifying, vec![1, 1, 1, 0]);
        assert_eq!(tally.guaranteed, vec![1, 0, 0, 0]);
        assert_eq!(tally.finish_count(0, 0), 1);
        assert_eq!(tally.finish_count(1, 1), 1);
        assert_eq!(tally.finish_count(2, 1), 1);
        assert_eq!(tally.finish_count(3, 3), 1);
    }

    #[test]
    fn test_no_tie_means_exactly_spots_qualify() {
        let mut evaluator = CutoffEvaluator::new(3, 5).unwrap();
        let mut tally = Tally::new(5, false);
        evaluator.evaluate(&[9, 2, 7, 8, 4], &mut tally);
        assert_eq!(tally.qualifying.iter().sum::<u64>(), 3);
        assert_eq!(tally.qualifying, vec![1, 0, 1, 1, 0]);
        assert_eq!(tally.guaranteed, vec![1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_spots_exceeding_teams_is_error() {
        assert!(matches!(
            CutoffEvaluator::new(5, 4),
            Err(LeagueError::TooManySpots { spots: 5, teams: 4 })
        ));
    }

    #[test]
    fn test_merge_sums_elementwise() {
        let mut a = Tally::new(2, true);
        let mut b = Tally::new(2, true);
        a.credit(0, true, true, 3);
        b.credit(0, true, false, 2);
        b.credit(1, true, false, 5);
        b.record_finish(1, 0);
        let merged = a.merge(b);
        assert_eq!(merged.qualifying, vec![5, 5]);
        assert_eq!(merged.guaranteed, vec![3, 0]);
        assert_eq!(merged.finish_count(1, 0), 1);
    }

    #[test]
    fn test_evaluate_checks_team_list() {
        let matrix = OutcomeMatrix::new(4, 1);
        let mut three = vec![
            Team::new(1, 5, 3, 0.0),
            Team::new(2, 5, 3, 0.0),
            Team::new(3, 4, 4, 0.0),
        ];
        assert!(matches!(
            evaluate(&mut three, &matrix, 2),
            Err(LeagueError::TeamCountMismatch { declared: 4, supplied: 3 })
        ));

        three.push(Team::new(6, 3, 5, 0.0));
        assert!(matches!(
            evaluate(&mut three, &matrix, 2),
            Err(LeagueError::RosterIds { position: 3, roster_id: 6 })
        ));
    }

    #[test]
    fn test_evaluate_reads_matrix() {
        let mut teams = vec![
            Team::new(1, 5, 3, 0.0),
            Team::new(2, 5, 3, 0.0),
            Team::new(3, 4, 4, 0.0),
            Team::new(4, 3, 5, 0.0),
        ];
        let mut matrix = OutcomeMatrix::new(4, 1);
        // A and C win
        matrix.apply_week(0, &[Matchup::new(9, 1, 2), Matchup::new(9, 3, 4)], 0b00);
        let cutoff = evaluate(&mut teams, &matrix, 2).unwrap();
        assert_eq!(cutoff, 5);
        let qualifying: Vec<u64> = teams.iter().map(|t| t.qualifying_scenarios).collect();
        assert_eq!(qualifying, vec![1, 1, 1, 0]);
    }
}
