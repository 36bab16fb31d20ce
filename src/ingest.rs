// This file ingests a league snapshot from csv files: one file of standings and one file of
// provider-style matchup rows, and turns them into the structures the engines consume.
//
// League providers list each roster's game separately as (week, matchup_id, roster_id);
// the opponent is whichever other roster shares the same week and matchup_id.

use fnv::FnvHashMap;
use serde::Deserialize;
use std::io;
use std::path::Path;

use crate::error::{LeagueError, Result};
use crate::league::{LeagueParams, Team};
use crate::schedule::{Matchup, RemainingSchedule};

/// One roster's entry for one week. A missing matchup_id means a bye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MatchupRow {
    pub week: u32,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    pub roster_id: u32,
}

/// Everything a run needs, loaded and validated.
#[derive(Debug, Clone)]
pub struct LeagueSnapshot {
    pub params: LeagueParams,
    pub teams: Vec<Team>,
    pub schedule: RemainingSchedule,
}

impl LeagueSnapshot {
    pub fn load(
        teams_path: impl AsRef<Path>,
        matchups_path: impl AsRef<Path>,
        playoff_spots: usize,
        start_week: u32,
        last_week: u32,
    ) -> Result<LeagueSnapshot> {
        let teams = load_teams(teams_path)?;
        let rows = load_matchup_rows(matchups_path)?;
        LeagueSnapshot::from_parts(teams, &rows, playoff_spots, start_week, last_week)
    }

    pub fn from_parts(
        teams: Vec<Team>,
        rows: &[MatchupRow],
        playoff_spots: usize,
        start_week: u32,
        last_week: u32,
    ) -> Result<LeagueSnapshot> {
        let params = LeagueParams::new(teams.len(), playoff_spots, start_week, last_week);
        params.validate(&teams)?;
        let matchups = pair_matchups(rows, &params)?;
        let schedule = RemainingSchedule::new(&params, &matchups)?;
        Ok(LeagueSnapshot {
            params,
            teams,
            schedule,
        })
    }
}

/// Read standings rows (roster_id, name, wins, losses, ties, points_for), ordered by roster id.
pub fn read_teams<R: io::Read>(reader: R) -> Result<Vec<Team>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut teams: Vec<Team> = Vec::new();
    for result in rdr.deserialize() {
        let team: Team = result?;
        teams.push(team);
    }
    teams.sort_by_key(|t| t.roster_id);
    Ok(teams)
}

pub fn load_teams(path: impl AsRef<Path>) -> Result<Vec<Team>> {
    let file = std::fs::File::open(path)?;
    read_teams(file)
}

pub fn read_matchup_rows<R: io::Read>(reader: R) -> Result<Vec<MatchupRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: MatchupRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_matchup_rows(path: impl AsRef<Path>) -> Result<Vec<MatchupRow>> {
    let file = std::fs::File::open(path)?;
    read_matchup_rows(file)
}

/// Pair rows sharing (week, matchup_id) into matchups for the remaining weeks. Rows for
/// weeks already played and byes are skipped. The first roster listed is the home side.
pub fn pair_matchups(rows: &[MatchupRow], params: &LeagueParams) -> Result<Vec<Matchup>> {
    let mut games: FnvHashMap<(u32, u32), Vec<u32>> = FnvHashMap::default();
    for row in rows {
        if row.week < params.start_week || row.week > params.last_week {
            continue;
        }
        if let Some(matchup_id) = row.matchup_id {
            games.entry((row.week, matchup_id)).or_default().push(row.roster_id);
        }
    }

    let mut keys: Vec<(u32, u32)> = games.keys().copied().collect();
    keys.sort_unstable();

    let mut matchups = Vec::with_capacity(keys.len());
    for (week, matchup_id) in keys {
        let rosters = &games[&(week, matchup_id)];
        match rosters.as_slice() {
            [home, away] => matchups.push(Matchup::new(week, *home, *away)),
            _ => {
                return Err(LeagueError::UnpairedMatchup {
                    week,
                    matchup_id,
                    found: rosters.len(),
                })
            }
        }
    }
    Ok(matchups)
}
