// Configuration module for the playoff calculator
// Supports YAML configuration files for engine selection and simulation settings

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::{EngineOptions, ModeChoice};
use crate::enumerate::ExactOptions;
use crate::error::Result;
use crate::monte_carlo::{SimulationOptions, MAX_WORKERS};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load the given file, or search the default locations and fall back to defaults.
    /// An explicit path that cannot be read or parsed is an error.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            let config = Self::from_file(p)?;
            info!("loaded configuration from {}", p);
            return Ok(config);
        }
        for default_path in &["config.yaml", "config.yml", ".playoffs.yaml"] {
            if Path::new(default_path).exists() {
                match Self::from_file(default_path) {
                    Ok(config) => {
                        info!("loaded configuration from {}", default_path);
                        return Ok(config);
                    }
                    Err(e) => warn!("skipping {}: {}", default_path, e),
                }
            }
        }
        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn to_engine_options(&self) -> EngineOptions {
        EngineOptions {
            choice: self.engine.mode,
            scenario_threshold: self.engine.scenario_threshold,
            exact: ExactOptions {
                prune: self.engine.prune,
                track_finishes: self.engine.track_finishes,
                progress: None,
            },
            simulation: SimulationOptions {
                draws: self.simulation.draws,
                workers: self.simulation.workers,
                max_workers: self.simulation.max_workers,
                seed: self.simulation.seed,
                track_finishes: self.engine.track_finishes,
                progress: None,
            },
        }
    }
}

/// Engine selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// "auto", "exact" or "monte-carlo"
    #[serde(default = "default_mode")]
    pub mode: ModeChoice,

    /// Largest scenario count enumerated exactly in auto mode
    #[serde(default = "default_scenario_threshold")]
    pub scenario_threshold: u64,

    /// Skip settled branches during the last weeks of exact enumeration
    #[serde(default)]
    pub prune: bool,

    /// Count how often each team finishes in each standings position
    #[serde(default = "default_track_finishes")]
    pub track_finishes: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            mode: default_mode(),
            scenario_threshold: default_scenario_threshold(),
            prune: false,
            track_finishes: default_track_finishes(),
        }
    }
}

fn default_mode() -> ModeChoice { ModeChoice::Auto }
fn default_scenario_threshold() -> u64 { 1 << 24 }
fn default_track_finishes() -> bool { true }

/// Monte Carlo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Number of simulated seasons
    #[serde(default = "default_draws")]
    pub draws: u64,

    /// Fixed worker count (unset = one per core)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Upper bound on adaptive worker count
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Seed for reproducible draws (unset = fresh entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            draws: default_draws(),
            workers: None,
            max_workers: default_max_workers(),
            seed: None,
        }
    }
}

fn default_draws() -> u64 { 100_000 }
fn default_max_workers() -> usize { MAX_WORKERS }

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    r#"# Playoff calculator configuration
# All values shown are defaults - uncomment and modify as needed

# Engine selection
engine:
  # "auto" enumerates exactly up to the threshold and samples above it,
  # "exact" always enumerates, "monte-carlo" always samples
  mode: auto
  # Largest number of scenarios (2^remaining matchups) enumerated exactly
  scenario_threshold: 16777216
  # Skip branches whose outcome is already settled in the last three weeks
  # (ignored while track_finishes is on)
  prune: false
  # Count how often each team finishes in each standings position
  track_finishes: true

# Monte Carlo settings
simulation:
  # Number of simulated seasons (higher = tighter margin of error)
  draws: 100000
  # Fixed number of workers; leave unset to use one per core
  # workers: 8
  # Upper bound on the worker count when it adapts to the machine
  max_workers: 16
  # Seed for reproducible draws; leave unset for fresh randomness
  # seed: 42
"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.mode, ModeChoice::Auto);
        assert_eq!(config.engine.scenario_threshold, 16_777_216);
        assert!(!config.engine.prune);
        assert_eq!(config.simulation.draws, 100_000);
        assert_eq!(config.simulation.max_workers, MAX_WORKERS);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
engine:
  mode: monte-carlo
  prune: true
simulation:
  draws: 50000
  seed: 7
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.engine.mode, ModeChoice::MonteCarlo);
        assert!(config.engine.prune);
        assert_eq!(config.simulation.draws, 50_000);
        assert_eq!(config.simulation.seed, Some(7));
        // Defaults should still work
        assert_eq!(config.engine.scenario_threshold, 1 << 24);
        assert!(config.simulation.workers.is_none());
    }

    #[test]
    fn test_sample_config_parses_to_defaults() {
        let config: Config = serde_yaml::from_str(&generate_sample_config()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.engine.mode, defaults.engine.mode);
        assert_eq!(config.engine.scenario_threshold, defaults.engine.scenario_threshold);
        assert_eq!(config.simulation.draws, defaults.simulation.draws);
        assert_eq!(config.simulation.max_workers, defaults.simulation.max_workers);
    }

    #[test]
    fn test_engine_options_conversion() {
        let mut config = Config::default();
        config.simulation.seed = Some(9);
        config.engine.track_finishes = false;
        let options = config.to_engine_options();
        assert_eq!(options.scenario_threshold, 1 << 24);
        assert_eq!(options.simulation.seed, Some(9));
        assert!(!options.exact.track_finishes);
        assert!(!options.simulation.track_finishes);
    }

    fn scratch_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("playoffs-{}-{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::from_file("does-not-exist.yaml").is_err());
        assert!(Config::load_or_default(Some("does-not-exist.yaml")).is_err());
    }

    #[test]
    fn test_explicit_bad_file_is_error() {
        let path = scratch_path("bad.yaml");
        fs::write(&path, "engine:\n  mode: exactly\n").unwrap();
        let result = Config::load_or_default(Some(&path));
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(crate::error::LeagueError::Yaml(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("saved.yaml");
        let mut config = Config::default();
        config.engine.mode = ModeChoice::Exact;
        config.simulation.seed = Some(17);
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_or_default(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.engine.mode, ModeChoice::Exact);
        assert_eq!(loaded.simulation.seed, Some(17));
        assert_eq!(loaded.simulation.draws, 100_000);
    }
}
