// Outcome matrix: one win/loss bit per (team, remaining week) for the scenario being built.
// It is allocated once per run and overwritten in place, one week column at a time.

use crate::schedule::Matchup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeMatrix {
    teams: usize,
    weeks: usize,
    /// Team-major: bits[team * weeks + week_offset]
    bits: Vec<bool>,
}

impl OutcomeMatrix {
    pub fn new(teams: usize, weeks: usize) -> OutcomeMatrix {
        OutcomeMatrix {
            teams,
            weeks,
            bits: vec![false; teams * weeks],
        }
    }

    pub fn teams(&self) -> usize {
        self.teams
    }

    pub fn weeks(&self) -> usize {
        self.weeks
    }

    #[inline]
    pub fn get(&self, team: usize, week: usize) -> bool {
        self.bits[team * self.weeks + week]
    }

    #[inline]
    pub fn set(&mut self, team: usize, week: usize, won: bool) {
        self.bits[team * self.weeks + week] = won;
    }

    /// Write the column for `week` from an assignment index: bit i of `assignment`
    /// decides matchup i, 0 meaning the home team wins.
    pub fn apply_week(&mut self, week: usize, matchups: &[Matchup], assignment: u64) {
        for (i, matchup) in matchups.iter().enumerate() {
            let home_wins = (assignment >> i) & 1 == 0;
            let (winner, loser) = matchup.resolve(home_wins);
            self.set(winner as usize - 1, week, true);
            self.set(loser as usize - 1, week, false);
        }
    }

    /// Wins the team picks up in week offsets `0..weeks`.
    #[inline]
    pub fn wins_through(&self, team: usize, weeks: usize) -> u32 {
        let row = &self.bits[team * self.weeks..team * self.weeks + weeks];
        row.iter().filter(|&&won| won).count() as u32
    }

    /// Fill `out` with base wins plus hypothesised wins through `weeks`.
    pub fn totals_through(&self, base_wins: &[u32], weeks: usize, out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            base_wins
                .iter()
                .enumerate()
                .map(|(team, base)| base + self.wins_through(team, weeks)),
        );
    }
}
