// Standings report: ordered odds table, finish distribution and JSON export.

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;

use crate::engine::{Mode, ScenarioRun};
use crate::error::Result;
use crate::probability::PlayoffOdds;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run: ScenarioRun,
    pub teams: Vec<PlayoffOdds>,
}

impl Report {
    /// Teams ordered by guaranteed scenarios, then qualifying scenarios, best first.
    pub fn new(run: ScenarioRun, mut teams: Vec<PlayoffOdds>) -> Report {
        teams.sort_by(|a, b| {
            b.guaranteed_scenarios
                .cmp(&a.guaranteed_scenarios)
                .then_with(|| b.qualifying_scenarios.cmp(&a.qualifying_scenarios))
        });
        Report { run, teams }
    }

    pub fn header(&self) -> String {
        match self.run.mode {
            Mode::Exact => {
                let mut line = format!("Exact: {} scenarios", self.run.total_scenarios);
                if self.run.pruned_branches > 0 {
                    line.push_str(&format!(" ({} branches pruned)", self.run.pruned_branches));
                }
                line
            }
            Mode::MonteCarlo => {
                let widest = self
                    .teams
                    .iter()
                    .filter_map(|t| t.margin_of_error)
                    .fold(0.0f64, f64::max);
                format!(
                    "Monte Carlo: {} draws on {} workers, margin of error up to ±{:.2}%",
                    self.run.total_scenarios,
                    self.run.workers,
                    widest * 100.0
                )
            }
            Mode::Decided => "Season decided: no matchups remain".to_string(),
        }
    }

    /// Plain-text table; see the `Display` impl.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn pretty_print(&self) {
        print!("{}", self.render());
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn export_to_file(&self, filename: &str) -> Result<()> {
        let mut file = File::create(filename)?;
        file.write_all(self.to_json()?.as_bytes())?;
        Ok(())
    }
}

/// "P% (G%)" is playoff odds with guaranteed odds in brackets.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .teams
            .iter()
            .map(|t| t.name.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        writeln!(f, "{}", self.header())?;
        writeln!(
            f,
            "{:<width$}  {:>7}  {:>9}  {:>17}",
            "Team",
            "Record",
            "PF",
            "Playoffs (Clinch)",
            width = width
        )?;
        for team in &self.teams {
            let odds = format!(
                "{:.2}% ({:.2}%)",
                team.playoff_probability * 100.0,
                team.guaranteed_probability * 100.0
            );
            writeln!(
                f,
                "{:<width$}  {:>7}  {:>9.2}  {:>17}",
                team.name,
                team.record,
                team.points_for,
                odds,
                width = width
            )?;
        }

        let positions = self.teams.first().map_or(0, |t| t.finish_distribution.len());
        if positions > 0 {
            writeln!(f)?;
            write!(f, "{:<width$}", "Finish", width = width)?;
            for rank in 1..=positions {
                write!(f, "  {:>6}", rank)?;
            }
            writeln!(f)?;
            for team in &self.teams {
                write!(f, "{:<width$}", team.name, width = width)?;
                for share in &team.finish_distribution {
                    write!(f, "  {:>5.1}%", share * 100.0)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::Team;
    use crate::probability::{finalize, with_sampling_error};

    fn sample_odds(track_finishes: bool) -> Vec<PlayoffOdds> {
        let mut teams = vec![
            Team::new(1, 5, 3, 900.0).with_name("Alpha"),
            Team::new(2, 6, 2, 950.0).with_name("Bravo"),
            Team::new(3, 4, 4, 870.0).with_name("Charlie"),
        ];
        let counts = [(3, 1), (4, 2), (1, 0)];
        for (team, &(q, g)) in teams.iter_mut().zip(counts.iter()) {
            team.qualifying_scenarios = q;
            team.guaranteed_scenarios = g;
            if track_finishes {
                team.finishes = vec![1, 2, 1];
            }
        }
        finalize(&teams, 4).unwrap()
    }

    fn exact_run() -> ScenarioRun {
        ScenarioRun {
            mode: Mode::Exact,
            total_scenarios: 4,
            workers: 1,
            pruned_branches: 0,
        }
    }

    #[test]
    fn test_ordered_by_guaranteed_then_qualifying() {
        let report = Report::new(exact_run(), sample_odds(false));
        let names: Vec<&str> = report.teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Alpha", "Charlie"]);
    }

    #[test]
    fn test_render_lists_odds() {
        let text = Report::new(exact_run(), sample_odds(false)).render();
        assert!(text.starts_with("Exact: 4 scenarios"));
        assert!(text.contains("100.00% (50.00%)"));
        assert!(text.contains("25.00% (0.00%)"));
        assert!(!text.contains("Finish"));
    }

    #[test]
    fn test_display_matches_render() {
        let mut run = exact_run();
        run.pruned_branches = 3;
        let report = Report::new(run, sample_odds(true));
        assert_eq!(format!("{}", report), report.render());
        assert!(report.render().starts_with("Exact: 4 scenarios (3 branches pruned)\n"));
    }

    #[test]
    fn test_render_finish_table() {
        let text = Report::new(exact_run(), sample_odds(true)).render();
        assert!(text.contains("Finish"));
        assert!(text.contains("50.0%"));
    }

    #[test]
    fn test_monte_carlo_header_reports_margin() {
        let run = ScenarioRun {
            mode: Mode::MonteCarlo,
            total_scenarios: 4,
            workers: 2,
            pruned_branches: 0,
        };
        let report = Report::new(run, with_sampling_error(sample_odds(false), 4));
        assert!(report.header().starts_with("Monte Carlo: 4 draws on 2 workers"));
        assert!(report.header().contains('±'));
    }

    #[test]
    fn test_json_export() {
        let report = Report::new(exact_run(), sample_odds(false));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["run"]["mode"], "Exact");
        assert_eq!(value["teams"][0]["name"], "Bravo");
        assert!(value["teams"][0].get("margin_of_error").is_none());
    }
}
