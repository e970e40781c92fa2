//! Read-only views over a world.
//!
//! Every type here is an owned copy, so observers never hold references
//! into world storage and never mutate it.

use crate::belt::Side;
use crate::fixed::{Fixed64, Ticks};
use crate::id::BuildingId;
use crate::item::{BuildingKind, Item, ItemCounts, Recipe};
use crate::world::{Building, WorldState};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline numbers for a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldSummary {
    pub tick: Ticks,
    pub science_per_minute: Fixed64,
    pub produced: ItemCounts,
    pub lost_to_space: u64,
    pub building_count: usize,
    pub running: bool,
    pub speed: Fixed64,
}

// ---------------------------------------------------------------------------
// Building view
// ---------------------------------------------------------------------------

/// Where a building is in its production cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingPhase {
    /// Nothing in hand and nothing under way, or a miner with no ore.
    Idle,
    /// Holding some but not all recipe inputs.
    Collecting,
    /// Accumulating progress toward the cycle time.
    Processing,
    /// Finished output in hand, home slot free.
    Delivering,
    /// Finished output in hand, home slot occupied.
    Stalled,
}

/// A snapshot of one building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingView {
    #[serde(skip)]
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub side: Side,
    pub slot: usize,
    pub phase: BuildingPhase,
    pub progress: u32,
    pub cycle_time: u32,
    pub held: Vec<Item>,
    pub total_produced: u64,
}

impl BuildingView {
    /// Progress as a `0..=1` fraction of the cycle time.
    pub fn progress_fraction(&self) -> Fixed64 {
        if self.cycle_time == 0 {
            return Fixed64::ZERO;
        }
        (Fixed64::from_num(self.progress) / Fixed64::from_num(self.cycle_time)).min(Fixed64::ONE)
    }
}

impl WorldState {
    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            tick: self.ticks,
            science_per_minute: self.science_per_minute(),
            produced: self.stats.produced,
            lost_to_space: self.stats.lost_to_space,
            building_count: self.buildings.len(),
            running: self.running,
            speed: self.speed,
        }
    }

    /// Where `building` currently is in its cycle.
    pub fn phase_of(&self, building: &Building) -> BuildingPhase {
        let home_free = self.belts.lane(building.side).is_free(building.slot);
        let finished = |output_ready: bool| match (output_ready, home_free) {
            (true, true) => Some(BuildingPhase::Delivering),
            (true, false) => Some(BuildingPhase::Stalled),
            (false, _) => None,
        };

        match building.kind.recipe() {
            Recipe::Extract => {
                if self.resource_at(building.slot).is_none() {
                    BuildingPhase::Idle
                } else {
                    finished(building.progress >= building.cycle_time)
                        .unwrap_or(BuildingPhase::Processing)
                }
            }
            Recipe::Convert(pairs) => {
                let output_ready = pairs.iter().any(|&(_, out)| building.held.contains(out));
                finished(output_ready).unwrap_or(if building.held.is_empty() {
                    BuildingPhase::Idle
                } else {
                    BuildingPhase::Processing
                })
            }
            Recipe::Combine { output, .. } => {
                finished(building.held.contains(output)).unwrap_or(if building.progress > 0 {
                    BuildingPhase::Processing
                } else if building.held.is_empty() {
                    BuildingPhase::Idle
                } else {
                    BuildingPhase::Collecting
                })
            }
            Recipe::Consume(_) => {
                if building.progress > 0 {
                    BuildingPhase::Processing
                } else {
                    BuildingPhase::Idle
                }
            }
        }
    }

    pub fn building_view(&self, id: BuildingId) -> Option<BuildingView> {
        let b = self.buildings.get(id)?;
        Some(BuildingView {
            id,
            kind: b.kind,
            side: b.side,
            slot: b.slot,
            phase: self.phase_of(b),
            progress: b.progress,
            cycle_time: b.cycle_time,
            held: b.held.iter().collect(),
            total_produced: b.total_produced,
        })
    }

    /// Views of every building in processing order.
    pub fn building_views(&self) -> Vec<BuildingView> {
        self.processing_order()
            .into_iter()
            .filter_map(|id| self.building_view(id))
            .collect()
    }

    /// Contents of one lane, entry slot first.
    pub fn lane_view(&self, side: Side) -> Vec<Option<Item>> {
        self.belts.lane(side).slots().to_vec()
    }
}
