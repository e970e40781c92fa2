//! Simulation constants that shape a world for its whole lifetime.

use crate::fixed::{Fixed64, f64_to_fixed64};
use serde::{Deserialize, Serialize};

/// Shape and tuning of a world. Frozen at world creation.
///
/// Snapshots are only accepted when their lanes match `lane_length`; the
/// other fields tune rolls and rate reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Slots per belt lane.
    pub lane_length: usize,
    /// Ore patches generated at slots `0..resource_count`.
    pub resource_count: usize,
    /// Symmetric fractional jitter applied to base durations (0.35 = ±35%).
    pub timing_jitter: Fixed64,
    /// Maximum per-tick science entries retained in the history.
    pub history_capacity: usize,
    /// Entries summed by the rate estimator.
    pub rate_window: usize,
    /// Simulation ticks per wall-clock second at speed 1.
    pub ticks_per_second: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            lane_length: 40,
            resource_count: 5,
            timing_jitter: f64_to_fixed64(0.35),
            history_capacity: 240,
            rate_window: 120,
            ticks_per_second: 2,
        }
    }
}

impl SimConfig {
    /// Clamp values that would make the world degenerate.
    ///
    /// Resources never extend past the lane, the jitter band stays within
    /// `[0, 1]` and the rate window never exceeds the retained history.
    pub fn normalized(mut self) -> Self {
        self.lane_length = self.lane_length.max(1);
        self.resource_count = self.resource_count.min(self.lane_length);
        self.timing_jitter = self.timing_jitter.clamp(Fixed64::ZERO, Fixed64::ONE);
        self.history_capacity = self.history_capacity.max(1);
        self.rate_window = self.rate_window.clamp(1, self.history_capacity);
        self.ticks_per_second = self.ticks_per_second.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_constants() {
        let config = SimConfig::default();
        assert_eq!(config.lane_length, 40);
        assert_eq!(config.resource_count, 5);
        assert_eq!(config.history_capacity, 240);
        assert_eq!(config.rate_window, 120);
        assert_eq!(config.ticks_per_second, 2);
    }

    #[test]
    fn normalized_clamps_degenerate_values() {
        let config = SimConfig {
            lane_length: 3,
            resource_count: 10,
            timing_jitter: f64_to_fixed64(1.5),
            history_capacity: 0,
            rate_window: 500,
            ticks_per_second: 0,
        }
        .normalized();
        assert_eq!(config.resource_count, 3);
        assert_eq!(config.timing_jitter, Fixed64::ONE);
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.rate_window, 1);
        assert_eq!(config.ticks_per_second, 1);
    }

    #[test]
    fn normalized_keeps_defaults() {
        assert_eq!(SimConfig::default().normalized(), SimConfig::default());
    }
}
