// Remaining-schedule model: the still-unplayed pairings grouped by week.
// Weeks are kept in ascending order because every engine walks them front to back.

use serde::{Deserialize, Serialize};

use crate::error::{LeagueError, Result};
use crate::league::{LeagueParams, Team};

/// One undecided game. `home` is the first-listed team; outcome encodings treat
/// a 0 bit as a home win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    pub home: u32,
    pub away: u32,
}

impl Matchup {
    pub fn new(week: u32, home: u32, away: u32) -> Matchup {
        Matchup { week, home, away }
    }

    /// Returns (winner, loser) roster ids.
    #[inline]
    pub fn resolve(&self, home_wins: bool) -> (u32, u32) {
        if home_wins {
            (self.home, self.away)
        } else {
            (self.away, self.home)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub number: u32,
    pub matchups: Vec<Matchup>,
}

impl Week {
    /// Number of distinct winner assignments for this week (2^k).
    pub fn assignments(&self) -> u64 {
        1u64 << self.matchups.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingSchedule {
    weeks: Vec<Week>,
    team_count: usize,
}

impl RemainingSchedule {
    /// Group matchups into the weeks `start_week..=last_week`, rejecting anything that
    /// does not pair active teams into disjoint couples. Weeks without games are kept
    /// so week offsets line up with the league calendar.
    pub fn new(params: &LeagueParams, matchups: &[Matchup]) -> Result<RemainingSchedule> {
        let mut weeks: Vec<Week> = (0..params.weeks_remaining())
            .map(|offset| Week {
                number: params.start_week + offset as u32,
                matchups: Vec::new(),
            })
            .collect();

        let mut booked = vec![false; params.team_count * weeks.len()];

        for matchup in matchups {
            if matchup.week < params.start_week || matchup.week > params.last_week {
                return Err(LeagueError::WeekOutOfRange {
                    week: matchup.week,
                    start: params.start_week,
                    last: params.last_week,
                });
            }
            if matchup.home == matchup.away {
                return Err(LeagueError::SelfMatchup {
                    week: matchup.week,
                    roster_id: matchup.home,
                });
            }
            let offset = (matchup.week - params.start_week) as usize;
            for roster_id in [matchup.home, matchup.away] {
                if roster_id == 0 || roster_id as usize > params.team_count {
                    return Err(LeagueError::UnknownTeam {
                        week: matchup.week,
                        roster_id,
                    });
                }
                let slot = offset * params.team_count + (roster_id as usize - 1);
                if booked[slot] {
                    return Err(LeagueError::DoubleBooked {
                        week: matchup.week,
                        roster_id,
                    });
                }
                booked[slot] = true;
            }
            weeks[offset].matchups.push(*matchup);
        }

        Ok(RemainingSchedule {
            weeks,
            team_count: params.team_count,
        })
    }

    /// Refuse team records that do not fit `params` or this schedule: bad spot counts,
    /// sparse roster ids, or a different number of teams than the schedule was built for.
    pub fn check_teams(&self, params: &LeagueParams, teams: &[Team]) -> Result<()> {
        params.validate(teams)?;
        if teams.len() != self.team_count {
            return Err(LeagueError::TeamCountMismatch {
                declared: self.team_count,
                supplied: teams.len(),
            });
        }
        Ok(())
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn team_count(&self) -> usize {
        self.team_count
    }

    pub fn matchup_count(&self) -> usize {
        self.weeks.iter().map(|w| w.matchups.len()).sum()
    }

    /// True when no game is left to decide.
    pub fn is_empty(&self) -> bool {
        self.matchup_count() == 0
    }

    pub fn matchups(&self) -> impl Iterator<Item = &Matchup> {
        self.weeks.iter().flat_map(|w| w.matchups.iter())
    }

    /// 2^(matchup count), saturating at `u128::MAX` for absurdly long schedules.
    pub fn scenario_count(&self) -> u128 {
        let matchups = self.matchup_count();
        if matchups >= 128 {
            u128::MAX
        } else {
            1u128 << matchups
        }
    }

    /// games_left[offset][team] = games the team still plays in weeks after `offset`.
    /// Row `week_count() - 1` is all zeros.
    pub fn games_left_after(&self) -> Vec<Vec<u32>> {
        let mut table = vec![vec![0u32; self.team_count]; self.weeks.len()];
        for offset in (0..self.weeks.len().saturating_sub(1)).rev() {
            let mut row = table[offset + 1].clone();
            for matchup in &self.weeks[offset + 1].matchups {
                row[matchup.home as usize - 1] += 1;
                row[matchup.away as usize - 1] += 1;
            }
            table[offset] = row;
        }
        table
    }

    /// matchups_after[offset] = matchups in weeks strictly after `offset`.
    pub fn matchups_after(&self) -> Vec<usize> {
        let mut after = vec![0usize; self.weeks.len()];
        for offset in (0..self.weeks.len().saturating_sub(1)).rev() {
            after[offset] = after[offset + 1] + self.weeks[offset + 1].matchups.len();
        }
        after
    }
}
