//! Runner configuration, loaded from TOML.
//!
//! Every field is optional; a missing file section or key falls back to the
//! defaults below.
//!
//! ```toml
//! tick_period_ms = 500
//! speed = 2.0           # omit to keep a saved world's speed
//! save_path = "beltline.save"
//! save_every = 5
//! seed = 42
//!
//! [sim]
//! lane_length = 40
//! timing_jitter = 0.35
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use beltline_core::config::SimConfig;
use beltline_core::fixed::{checked_f64_to_fixed64, fixed64_to_f64};
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

const MAX_TICKS_PER_SECOND: u32 = 1_000;

/// Settings for the real-time driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Wall-clock time between ticks at speed 1.
    pub tick_period_ms: u64,
    /// Speed multiplier to impose on the loaded world. When absent, a
    /// restored world keeps its saved speed and a fresh one runs at 1.
    pub speed: Option<f64>,
    /// Where the world is saved.
    pub save_path: PathBuf,
    /// Save after every this many ticks. 0 disables periodic saves.
    pub save_every: u64,
    /// Seed for fresh worlds. Drawn from the clock when absent.
    pub seed: Option<u64>,
    pub sim: SimSection,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 500,
            speed: None,
            save_path: PathBuf::from("beltline.save"),
            save_every: 5,
            seed: None,
            sim: SimSection::default(),
        }
    }
}

/// The TOML face of [`SimConfig`], with the jitter as a plain float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSection {
    pub lane_length: usize,
    pub resource_count: usize,
    pub timing_jitter: f64,
    pub history_capacity: usize,
    pub rate_window: usize,
    pub ticks_per_second: u32,
}

impl Default for SimSection {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            lane_length: sim.lane_length,
            resource_count: sim.resource_count,
            timing_jitter: fixed64_to_f64(sim.timing_jitter),
            history_capacity: sim.history_capacity,
            rate_window: sim.rate_window,
            ticks_per_second: sim.ticks_per_second,
        }
    }
}

impl SimSection {
    /// An unrepresentable jitter falls back to the default; [`RunnerConfig`]
    /// loading rejects such files before they get here.
    pub fn to_sim_config(&self) -> SimConfig {
        let defaults = SimConfig::default();
        SimConfig {
            lane_length: self.lane_length,
            resource_count: self.resource_count,
            timing_jitter: checked_f64_to_fixed64(self.timing_jitter)
                .unwrap_or(defaults.timing_jitter),
            history_capacity: self.history_capacity,
            rate_window: self.rate_window,
            ticks_per_second: self.ticks_per_second,
        }
        .normalized()
    }
}

impl RunnerConfig {
    pub fn from_toml_str(input: &str, file: &Path) -> Result<Self, RunnerError> {
        let config: Self = toml::from_str(input).map_err(|e: toml::de::Error| RunnerError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject numbers the simulation cannot represent.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if let Some(speed) = self.speed
            && (speed.is_nan() || speed <= 0.0 || checked_f64_to_fixed64(speed).is_none())
        {
            return Err(RunnerError::InvalidSpeed { speed });
        }
        let sim = &self.sim;
        let checks = [
            ("sim.timing_jitter", sim.timing_jitter, (0.0..=1.0).contains(&sim.timing_jitter)),
            (
                "sim.ticks_per_second",
                sim.ticks_per_second as f64,
                (1..=MAX_TICKS_PER_SECOND).contains(&sim.ticks_per_second),
            ),
            ("sim.history_capacity", sim.history_capacity as f64, sim.history_capacity >= 1),
            (
                "sim.rate_window",
                sim.rate_window as f64,
                (1..=sim.history_capacity).contains(&sim.rate_window),
            ),
        ];
        match checks.into_iter().find(|&(_, _, ok)| !ok) {
            Some((field, value, _)) => Err(RunnerError::InvalidValue { field, value }),
            None => Ok(()),
        }
    }

    /// Load from `path`. A missing file is an error; use
    /// [`RunnerConfig::load_or_default`] when the file is optional.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, RunnerError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Wall-clock interval between ticks at `speed`.
    pub fn tick_interval(&self, speed: f64) -> Duration {
        scaled_period(Duration::from_millis(self.tick_period_ms), speed)
    }

    /// The configured seed, or one drawn from the clock.
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}

/// `base / speed`, never shorter than one millisecond.
pub fn scaled_period(base: Duration, speed: f64) -> Duration {
    let secs = if speed > 0.0 {
        base.as_secs_f64() / speed
    } else {
        base.as_secs_f64()
    };
    Duration::from_secs_f64(secs).max(Duration::from_millis(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.tick_period_ms, 500);
        assert_eq!(config.save_every, 5);
        assert_eq!(config.sim.to_sim_config(), SimConfig::default());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = RunnerConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let input = r#"
            speed = 4.0
            seed = 9

            [sim]
            lane_length = 60
        "#;
        let config = RunnerConfig::from_toml_str(input, Path::new("c.toml")).unwrap();
        assert_eq!(config.speed, Some(4.0));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.tick_period_ms, 500);
        let sim = config.sim.to_sim_config();
        assert_eq!(sim.lane_length, 60);
        assert_eq!(sim.resource_count, 5);
    }

    #[test]
    fn bad_toml_names_the_file() {
        let err = RunnerConfig::from_toml_str("speed = [", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn unusable_numbers_are_rejected() {
        let path = Path::new("c.toml");
        assert!(matches!(
            RunnerConfig::from_toml_str("speed = 0.0", path),
            Err(RunnerError::InvalidSpeed { .. })
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("speed = nan", path),
            Err(RunnerError::InvalidSpeed { .. })
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("[sim]\ntiming_jitter = 1.5", path),
            Err(RunnerError::InvalidValue { field: "sim.timing_jitter", .. })
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("[sim]\nticks_per_second = 20000000", path),
            Err(RunnerError::InvalidValue { field: "sim.ticks_per_second", .. })
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("[sim]\nticks_per_second = 0", path),
            Err(RunnerError::InvalidValue { field: "sim.ticks_per_second", .. })
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("[sim]\nhistory_capacity = 10\nrate_window = 20", path),
            Err(RunnerError::InvalidValue { field: "sim.rate_window", .. })
        ));
    }

    #[test]
    fn speed_is_optional() {
        let config = RunnerConfig::from_toml_str("seed = 1", Path::new("c.toml")).unwrap();
        assert_eq!(config.speed, None);
    }

    #[test]
    fn interval_scales_with_speed() {
        let config = RunnerConfig::default();
        assert_eq!(config.tick_interval(1.0), Duration::from_millis(500));
        assert_eq!(config.tick_interval(2.0), Duration::from_millis(250));
        assert_eq!(config.tick_interval(0.5), Duration::from_millis(1000));
        assert_eq!(config.tick_interval(1e9), Duration::from_millis(1));
    }
}
