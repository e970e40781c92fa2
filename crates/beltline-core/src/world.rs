//! The world: belts, buildings, ore patches, counters and clock.
//!
//! A [`WorldState`] is a plain value. The tick engine clones it and returns
//! the successor; placement operations mutate it between ticks.

use crate::belt::{Belts, Side};
use crate::config::SimConfig;
use crate::fixed::{Fixed64, Ticks};
use crate::id::BuildingId;
use crate::item::{BuildingKind, HeldItems, Item};
use crate::rng::SimRng;
use crate::stats::{Stats, science_per_minute};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// An infinite ore patch under a belt slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub slot: usize,
    pub ore: Item,
}

/// Roll one patch per slot in `0..count`, iron or copper with equal odds.
pub fn generate_resources(count: usize, rng: &mut SimRng) -> Vec<Resource> {
    let half = Fixed64::from_num(0.5);
    (0..count)
        .map(|slot| Resource {
            slot,
            ore: if rng.chance(half) {
                Item::IronOre
            } else {
                Item::CopperOre
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A placed machine and its production state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub side: Side,
    pub slot: usize,
    /// Ticks accumulated toward the current cycle.
    pub progress: u32,
    /// Ticks one cycle takes for this particular machine.
    pub cycle_time: u32,
    pub held: HeldItems,
    /// Lifetime completed cycles.
    pub total_produced: u64,
}

impl Building {
    /// A freshly placed building with an empty hand.
    pub fn new(kind: BuildingKind, side: Side, slot: usize, cycle_time: u32) -> Self {
        Self {
            kind,
            side,
            slot,
            progress: 0,
            cycle_time: cycle_time.max(1),
            held: HeldItems::EMPTY,
            total_produced: 0,
        }
    }

    /// Sort key for the tick: slot ascending, left before right.
    pub fn order_key(&self) -> (usize, Side) {
        (self.slot, self.side)
    }
}

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

/// Everything the simulation knows.
#[derive(Debug, Clone)]
pub struct WorldState {
    pub(crate) config: SimConfig,
    /// Both belt lanes. Public so harnesses can seed items between ticks.
    pub belts: Belts,
    pub(crate) buildings: SlotMap<BuildingId, Building>,
    pub(crate) resources: Vec<Resource>,
    pub(crate) ticks: Ticks,
    pub(crate) stats: Stats,
    pub(crate) running: bool,
    pub(crate) speed: Fixed64,
    pub(crate) rng: SimRng,
}

impl WorldState {
    /// A fresh world: empty lanes, no buildings, freshly rolled resources,
    /// zeroed stats, paused at speed 1.
    pub fn new(config: SimConfig, mut rng: SimRng) -> Self {
        let config = config.normalized();
        let resources = generate_resources(config.resource_count, &mut rng);
        Self::with_resources(config, resources, rng)
    }

    /// A fresh world over an explicit set of resources.
    ///
    /// Patches outside the lane and duplicate slots are dropped (first wins).
    pub fn with_resources(config: SimConfig, resources: Vec<Resource>, rng: SimRng) -> Self {
        let config = config.normalized();
        let mut kept: Vec<Resource> = Vec::with_capacity(resources.len());
        for r in resources {
            if r.slot < config.lane_length
                && r.ore.is_ore()
                && !kept.iter().any(|k| k.slot == r.slot)
            {
                kept.push(r);
            }
        }
        Self {
            belts: Belts::new(config.lane_length),
            buildings: SlotMap::with_key(),
            resources: kept,
            ticks: 0,
            stats: Stats::default(),
            running: false,
            speed: Fixed64::ONE,
            rng,
            config,
        }
    }

    /// Replace this world with a fresh one under the same config.
    ///
    /// The RNG carries on, so the new resources differ from the old ones.
    pub fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = WorldState::new(self.config.clone(), rng);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn lane_length(&self) -> usize {
        self.config.lane_length
    }

    /// Completed ticks since the world was created.
    pub fn ticks(&self) -> Ticks {
        self.ticks
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource_at(&self, slot: usize) -> Option<&Resource> {
        self.resources.iter().find(|r| r.slot == slot)
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn buildings(&self) -> impl Iterator<Item = (BuildingId, &Building)> {
        self.buildings.iter()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// The building at `(slot, side)`, if any.
    pub fn building_at(&self, slot: usize, side: Side) -> Option<BuildingId> {
        self.buildings
            .iter()
            .find(|(_, b)| b.slot == slot && b.side == side)
            .map(|(id, _)| id)
    }

    /// Building ids in tick order: slot ascending, left before right.
    pub fn processing_order(&self) -> Vec<BuildingId> {
        let mut order: Vec<((usize, Side), BuildingId)> = self
            .buildings
            .iter()
            .map(|(id, b)| (b.order_key(), id))
            .collect();
        order.sort_unstable_by_key(|&(key, _)| key);
        order.into_iter().map(|(_, id)| id).collect()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn speed(&self) -> Fixed64 {
        self.speed
    }

    /// Set the speed multiplier. Non-positive values are ignored.
    pub fn set_speed(&mut self, speed: Fixed64) -> bool {
        if speed <= Fixed64::ZERO {
            return false;
        }
        self.speed = speed;
        true
    }

    pub fn rng(&self) -> &SimRng {
        &self.rng
    }

    /// Current science-per-minute estimate.
    pub fn science_per_minute(&self) -> Fixed64 {
        science_per_minute(
            &self.stats.history,
            self.config.rate_window,
            self.config.ticks_per_second,
        )
    }
}

impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.belts == other.belts
            && self.resources == other.resources
            && self.ticks == other.ticks
            && self.stats == other.stats
            && self.running == other.running
            && self.speed == other.speed
            && self.rng == other.rng
            && self.buildings.len() == other.buildings.len()
            && self
                .buildings
                .iter()
                .all(|(id, b)| other.buildings.get(id) == Some(b))
    }
}

impl Eq for WorldState {}
