// Pruning filter for the last few weeks of exact enumeration.
//
// A team with final total T qualifies iff fewer than k other teams finish strictly
// above T, and clears the cutoff outright iff fewer than k-1 other teams finish level
// with or above T. Bounding every team by min = wins so far and max = min + games left
// decides both flags for some teams without walking the branch. When every team is
// decided the branch is credited in bulk, so counters match a full enumeration.

/// Only consult the filter when at most this many weeks are left below the branch.
pub const PRUNE_WINDOW: usize = 3;

/// Fixed outcome of a team across every completion of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub qualifies: bool,
    pub guaranteed: bool,
}

#[derive(Debug, Clone)]
pub struct PruningFilter {
    spots: usize,
    settled: Vec<Settled>,
}

impl PruningFilter {
    pub fn new(playoff_spots: usize, team_count: usize) -> PruningFilter {
        PruningFilter {
            spots: playoff_spots,
            settled: Vec::with_capacity(team_count),
        }
    }

    /// Whether the filter is worth running with `weeks_left` weeks still unassigned.
    #[inline]
    pub fn applies(weeks_left: usize) -> bool {
        (1..=PRUNE_WINDOW).contains(&weeks_left)
    }

    /// Returns every team's settled outcome, or `None` if any team can still go either way.
    pub fn settle(&mut self, current: &[u32], games_left: &[u32]) -> Option<&[Settled]> {
        let k = self.spots;
        self.settled.clear();

        for (team, (&min, &left)) in current.iter().zip(games_left).enumerate() {
            let max = min + left;
            let mut can_pass = 0; // others that might finish above min
            let mut can_reach = 0; // others that might finish level with or above min
            let mut sure_above = 0; // others certain to finish above max
            let mut sure_level = 0; // others certain to finish level with or above max

            for (other, (&other_min, &other_left)) in current.iter().zip(games_left).enumerate() {
                if other == team {
                    continue;
                }
                let other_max = other_min + other_left;
                if other_max > min {
                    can_pass += 1;
                }
                if other_max >= min {
                    can_reach += 1;
                }
                if other_min > max {
                    sure_above += 1;
                }
                if other_min >= max {
                    sure_level += 1;
                }
            }

            let qualifies = if can_pass < k {
                true
            } else if sure_above >= k {
                false
            } else {
                return None;
            };
            let guaranteed = if can_reach + 1 < k {
                true
            } else if sure_level + 1 >= k {
                false
            } else {
                return None;
            };
            self.settled.push(Settled { qualifies, guaranteed });
        }

        Some(&self.settled)
    }

    pub fn can_skip(&mut self, current: &[u32], games_left: &[u32]) -> bool {
        self.settle(current, games_left).is_some()
    }
}
