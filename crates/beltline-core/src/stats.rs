//! Lifetime counters and the science-per-minute estimator.
//!
//! The tick engine appends one entry per tick to a bounded history: the
//! number of science packs labs finished that tick. The rate estimator is a
//! pure function over that history and never touches world state.

use crate::fixed::Fixed64;
use crate::item::{Item, ItemCounts};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const SECONDS_PER_MINUTE: u32 = 60;

/// Cumulative statistics carried by the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    /// Lifetime items delivered to a belt, per kind.
    pub produced: ItemCounts,
    /// Science packs consumed by labs, one entry per tick, oldest first.
    pub history: VecDeque<u32>,
    /// Items that fell off the end of either lane.
    pub lost_to_space: u64,
}

impl Stats {
    /// Append one tick's lab completions, dropping the oldest entries past
    /// `capacity`.
    pub fn record_tick(&mut self, science_consumed: u32, capacity: usize) {
        self.history.push_back(science_consumed);
        while self.history.len() > capacity {
            self.history.pop_front();
        }
    }

    pub fn record_delivery(&mut self, item: Item) {
        self.produced.increment(item);
    }
}

/// Science per minute over the most recent `window` entries.
///
/// Covered seconds are `entries / ticks_per_second`; the result is
/// `sum / covered_seconds * 60`. An empty history yields zero.
pub fn science_per_minute<'a, I>(history: I, window: usize, ticks_per_second: u32) -> Fixed64
where
    I: IntoIterator<Item = &'a u32>,
    I::IntoIter: DoubleEndedIterator,
{
    let (entries, total) = history
        .into_iter()
        .rev()
        .take(window)
        .fold((0u128, 0u128), |(n, sum), &v| (n + 1, sum + u128::from(v)));
    if entries == 0 {
        return Fixed64::ZERO;
    }
    let per_minute = total * u128::from(ticks_per_second) * u128::from(SECONDS_PER_MINUTE);
    // Whole and fractional parts separately, so any history saturates
    // instead of overflowing the Q32.32 range.
    let whole = Fixed64::saturating_from_num(per_minute / entries);
    let frac_bits = ((per_minute % entries) << Fixed64::FRAC_NBITS) / entries;
    whole.saturating_add(Fixed64::from_bits(frac_bits as i64))
}
