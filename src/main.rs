use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use playoffs::config::{generate_sample_config, Config};
use playoffs::engine::{compute, should_approximate, ModeChoice};
use playoffs::ingest::LeagueSnapshot;
use playoffs::report::Report;

#[derive(Parser)]
#[command(name = "playoffs")]
#[command(about = "Playoff odds from the remaining schedule of a head-to-head league", long_about = None)]
struct Cli {
    /// Standings csv: roster_id,name,wins,losses,ties,points_for
    #[arg(long, default_value = "data/teams.csv")]
    teams: String,

    /// Matchup rows csv: week,matchup_id,roster_id
    #[arg(long, default_value = "data/matchups.csv")]
    matchups: String,

    /// Number of playoff spots
    #[arg(long, default_value_t = 6)]
    spots: usize,

    /// First week still to be played
    #[arg(long)]
    start_week: Option<u32>,

    /// Last regular-season week
    #[arg(long)]
    last_week: Option<u32>,

    /// Config file path (searches config.yaml, config.yml, .playoffs.yaml when unset)
    #[arg(short, long)]
    config: Option<String>,

    /// Engine to run
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Monte Carlo draws
    #[arg(long)]
    draws: Option<u64>,

    /// Monte Carlo worker count
    #[arg(long)]
    workers: Option<usize>,

    /// Seed for reproducible Monte Carlo draws
    #[arg(long)]
    seed: Option<u64>,

    /// Skip settled branches in the last weeks of exact enumeration
    #[arg(long)]
    prune: bool,

    /// Write the report as JSON to this path
    #[arg(long)]
    json: Option<String>,

    /// Write the effective configuration (file plus flags) to this path
    #[arg(long)]
    save_config: Option<String>,

    /// Write a sample config file to this path and exit
    #[arg(long)]
    init_config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta})")
            .progress_chars("=> "),
    );
    pb
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.init_config {
        std::fs::write(path, generate_sample_config())
            .with_context(|| format!("writing sample config to {}", path))?;
        println!("Wrote sample configuration to {}", path);
        return Ok(());
    }

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref()).context("loading configuration")?;
    if let Some(mode) = cli.mode {
        config.engine.mode = mode;
    }
    if let Some(draws) = cli.draws {
        config.simulation.draws = draws;
    }
    if cli.workers.is_some() {
        config.simulation.workers = cli.workers;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    if cli.prune {
        config.engine.prune = true;
    }
    if let Some(path) = &cli.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("saving configuration to {}", path))?;
        info!("configuration written to {}", path);
    }
    if config.engine.prune && config.engine.track_finishes {
        warn!("pruning is bypassed while finish positions are tracked");
    }

    let start_week = cli.start_week.ok_or_else(|| anyhow!("--start-week is required"))?;
    let last_week = cli.last_week.ok_or_else(|| anyhow!("--last-week is required"))?;

    let LeagueSnapshot {
        params,
        mut teams,
        schedule,
    } = LeagueSnapshot::load(&cli.teams, &cli.matchups, cli.spots, start_week, last_week)
        .with_context(|| format!("loading league from {} and {}", cli.teams, cli.matchups))?;

    let scenarios = schedule.scenario_count();
    info!(
        "{} teams, {} playoff spots, {} matchups left over {} weeks: {} scenarios",
        params.team_count,
        params.playoff_spots,
        schedule.matchup_count(),
        schedule.week_count(),
        scenarios
    );
    if config.engine.mode == ModeChoice::Exact && should_approximate(scenarios, config.engine.scenario_threshold) {
        warn!(
            "exact mode forced above the threshold of {} scenarios; this may take a long time",
            config.engine.scenario_threshold
        );
    }

    let mut options = config.to_engine_options();
    let pb = progress_bar();
    options.exact.progress = Some(pb.clone());
    options.simulation.progress = Some(pb);

    let run = compute(&params, &mut teams, &schedule, options).context("computing playoff odds")?;
    let report = Report::new(run, run.odds(&teams)?);
    report.pretty_print();

    if let Some(path) = &cli.json {
        report
            .export_to_file(path)
            .with_context(|| format!("exporting report to {}", path))?;
        info!("report written to {}", path);
    }
    Ok(())
}
