//! World consistency checks and determinism tooling.
//!
//! [`validate_world`] is the gate every decoded snapshot passes before it is
//! trusted. The hashing helpers compare two worlds subsystem by subsystem
//! to locate where a divergence started.

use crate::belt::Side;
use crate::config::SimConfig;
use crate::engine::{hash_building, hash_lane};
use crate::fixed::Fixed64;
use crate::hash::StateHash;
use crate::item::{BuildingKind, HeldItems, Item, Recipe};
use crate::serialize::DeserializeError;
use crate::world::WorldState;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Semantic validation
// ---------------------------------------------------------------------------

/// A world invariant that a decoded snapshot violates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{side:?} lane has {found} slots, expected {expected}")]
    LaneLength {
        side: Side,
        expected: usize,
        found: usize,
    },
    #[error("building at slot {slot} is outside the belt (length {lane_length})")]
    BuildingOutOfRange { slot: usize, lane_length: usize },
    #[error("two buildings at slot {slot} on the {side:?} side")]
    DuplicateSpot { slot: usize, side: Side },
    #[error("building at slot {slot} has a zero cycle time")]
    ZeroCycleTime { slot: usize },
    #[error("building at slot {slot} has progress {progress} past its cycle time {cycle_time}")]
    ProgressPastCycle {
        slot: usize,
        progress: u32,
        cycle_time: u32,
    },
    #[error("building at slot {slot} holds unknown items")]
    MalformedHand { slot: usize },
    #[error("{kind} at slot {slot} holds {item}, which its recipe never takes")]
    ForeignItemInHand {
        kind: BuildingKind,
        slot: usize,
        item: Item,
    },
    #[error("{kind} at slot {slot} holds more than its recipe allows at once")]
    OverfullHand { kind: BuildingKind, slot: usize },
    #[error("miner at slot {slot} has no resource under it")]
    MinerWithoutResource { slot: usize },
    #[error("resource at slot {slot} is outside the belt")]
    ResourceOutOfRange { slot: usize },
    #[error("two resources at slot {slot}")]
    DuplicateResource { slot: usize },
    #[error("resource at slot {slot} is not an ore")]
    NotAnOre { slot: usize },
    #[error("science history holds {len} entries, capacity is {capacity}")]
    HistoryOverCapacity { len: usize, capacity: usize },
    #[error("science history records {value} packs in one tick, at most {max} fit on the belt")]
    HistoryEntryTooLarge { value: u32, max: usize },
    #[error("speed multiplier must be positive")]
    NonPositiveSpeed,
}

/// Check every structural invariant of `world` against its config.
pub fn validate_world(world: &WorldState) -> Result<(), ValidationError> {
    let lane_length = world.lane_length();

    for side in [Side::Left, Side::Right] {
        let found = world.belts.lane(side).len();
        if found != lane_length {
            return Err(ValidationError::LaneLength {
                side,
                expected: lane_length,
                found,
            });
        }
    }

    let mut resource_slots = BTreeSet::new();
    for r in world.resources() {
        if r.slot >= lane_length {
            return Err(ValidationError::ResourceOutOfRange { slot: r.slot });
        }
        if !r.ore.is_ore() {
            return Err(ValidationError::NotAnOre { slot: r.slot });
        }
        if !resource_slots.insert(r.slot) {
            return Err(ValidationError::DuplicateResource { slot: r.slot });
        }
    }

    let mut spots = BTreeSet::new();
    for (_, b) in world.buildings() {
        if b.slot >= lane_length {
            return Err(ValidationError::BuildingOutOfRange {
                slot: b.slot,
                lane_length,
            });
        }
        if !spots.insert((b.slot, b.side)) {
            return Err(ValidationError::DuplicateSpot {
                slot: b.slot,
                side: b.side,
            });
        }
        if b.cycle_time == 0 {
            return Err(ValidationError::ZeroCycleTime { slot: b.slot });
        }
        if b.progress > b.cycle_time {
            return Err(ValidationError::ProgressPastCycle {
                slot: b.slot,
                progress: b.progress,
                cycle_time: b.cycle_time,
            });
        }
        if !b.held.is_well_formed() {
            return Err(ValidationError::MalformedHand { slot: b.slot });
        }
        check_hand(b.kind, b.slot, b.held)?;
        if b.kind == BuildingKind::Miner && !resource_slots.contains(&b.slot) {
            return Err(ValidationError::MinerWithoutResource { slot: b.slot });
        }
    }

    let capacity = world.config().history_capacity;
    let len = world.stats().history.len();
    if len > capacity {
        return Err(ValidationError::HistoryOverCapacity { len, capacity });
    }
    // One pack per lab per tick, one lab per spot. Labs may since have been
    // removed, so the bound is the belt's spot count, not today's labs.
    let max = lane_length * 2;
    if let Some(&value) = world.stats().history.iter().find(|&&v| v as usize > max) {
        return Err(ValidationError::HistoryEntryTooLarge { value, max });
    }

    if world.speed() <= Fixed64::ZERO {
        return Err(ValidationError::NonPositiveSpeed);
    }
    Ok(())
}

/// A hand may only hold recipe inputs and outputs. Converters and labs
/// work one unit at a time; a combiner's finished output never sits next
/// to its inputs.
fn check_hand(kind: BuildingKind, slot: usize, held: HeldItems) -> Result<(), ValidationError> {
    let recipe = kind.recipe();
    let inputs = recipe.accepted_inputs();
    let outputs = recipe.belt_outputs();
    if let Some(item) = held
        .iter()
        .find(|item| !inputs.contains(item) && !outputs.contains(item))
    {
        return Err(ValidationError::ForeignItemInHand { kind, slot, item });
    }
    let count = held.iter().count();
    let overfull = match recipe {
        Recipe::Extract => count > 0,
        Recipe::Convert(_) | Recipe::Consume(_) => count > 1,
        Recipe::Combine { output, .. } => held.contains(output) && count > 1,
    };
    if overfull {
        return Err(ValidationError::OverfullHand { kind, slot });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subsystem hashes
// ---------------------------------------------------------------------------

/// Per-subsystem state hashes. Pinpoints which part of two worlds diverged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemHashes {
    pub belts: u64,
    pub buildings: u64,
    pub resources: u64,
    pub stats: u64,
    pub clock: u64,
}

/// Per-subsystem match results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemDiff {
    pub belts_match: bool,
    pub buildings_match: bool,
    pub resources_match: bool,
    pub stats_match: bool,
    pub clock_matches: bool,
}

impl SubsystemDiff {
    pub fn is_identical(&self) -> bool {
        self.belts_match
            && self.buildings_match
            && self.resources_match
            && self.stats_match
            && self.clock_matches
    }
}

impl WorldState {
    pub fn subsystem_hashes(&self) -> SubsystemHashes {
        let mut belts = StateHash::new();
        hash_lane(&mut belts, &self.belts.up);
        hash_lane(&mut belts, &self.belts.down);

        let mut buildings = StateHash::new();
        for id in self.processing_order() {
            if let Some(b) = self.buildings.get(id) {
                hash_building(&mut buildings, b);
            }
        }

        let mut resources = StateHash::new();
        for r in &self.resources {
            resources.write_u64(r.slot as u64);
            resources.write_u8(r.ore as u8);
        }

        let mut stats = StateHash::new();
        for (_, count) in self.stats.produced.iter() {
            stats.write_u64(count);
        }
        stats.write_u64(self.stats.lost_to_space);
        for &v in &self.stats.history {
            stats.write_u32(v);
        }

        let mut clock = StateHash::new();
        clock.write_u64(self.ticks);
        clock.write_u64(self.rng.state());
        clock.write_fixed64(self.speed);

        SubsystemHashes {
            belts: belts.finish(),
            buildings: buildings.finish(),
            resources: resources.finish(),
            stats: stats.finish(),
            clock: clock.finish(),
        }
    }
}

/// Quick subsystem-level comparison using hashes.
pub fn quick_compare(a: &WorldState, b: &WorldState) -> SubsystemDiff {
    let ha = a.subsystem_hashes();
    let hb = b.subsystem_hashes();
    SubsystemDiff {
        belts_match: ha.belts == hb.belts,
        buildings_match: ha.buildings == hb.buildings,
        resources_match: ha.resources == hb.resources,
        stats_match: ha.stats == hb.stats,
        clock_matches: ha.clock == hb.clock,
    }
}

// ---------------------------------------------------------------------------
// Determinism check
// ---------------------------------------------------------------------------

/// Outcome of replaying one snapshot twice.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    pub is_deterministic: bool,
    /// First tick at which the two runs hashed differently.
    pub divergence_tick: Option<u64>,
    /// `(tick, hash_run1, hash_run2)` for each tick.
    pub hash_log: Vec<(u64, u64, u64)>,
}

/// Restore `snapshot` twice and run both copies for `ticks` ticks,
/// comparing state hashes after each one.
pub fn validate_determinism(
    snapshot: &[u8],
    config: &SimConfig,
    ticks: u64,
) -> Result<DeterminismResult, DeserializeError> {
    let mut a = WorldState::deserialize(snapshot, config)?;
    let mut b = WorldState::deserialize(snapshot, config)?;

    let mut hash_log = Vec::with_capacity(ticks as usize);
    let mut divergence_tick = None;
    for _ in 0..ticks {
        a.step();
        b.step();
        let (ha, hb) = (a.state_hash(), b.state_hash());
        hash_log.push((a.ticks(), ha, hb));
        if ha != hb && divergence_tick.is_none() {
            divergence_tick = Some(a.ticks());
        }
    }

    Ok(DeterminismResult {
        is_deterministic: divergence_tick.is_none(),
        divergence_tick,
        hash_log,
    })
}
