//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::belt::Side;
use crate::config::SimConfig;
use crate::engine::TickReport;
use crate::fixed::Fixed64;
use crate::id::BuildingId;
use crate::item::{BuildingKind, Item};
use crate::rng::SimRng;
use crate::world::{Resource, WorldState};

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Worlds
// ===========================================================================

/// Default-config world with exactly the given ore patches.
pub fn world_with_resources(patches: &[(usize, Item)]) -> WorldState {
    WorldState::with_resources(
        SimConfig::default(),
        patches
            .iter()
            .map(|&(slot, ore)| Resource { slot, ore })
            .collect(),
        SimRng::new(0xBE17),
    )
}

/// Iron at slot 0, copper at slot 1.
pub fn two_ore_world() -> WorldState {
    world_with_resources(&[(0, Item::IronOre), (1, Item::CopperOre)])
}

/// Place a building and pin its cycle time, bypassing the random roll.
///
/// Panics if the placement is rejected.
pub fn place_with_cycle(
    world: &mut WorldState,
    kind: BuildingKind,
    side: Side,
    slot: usize,
    cycle_time: u32,
) -> BuildingId {
    let id = world
        .place(kind, side, slot)
        .unwrap_or_else(|err| panic!("placing {kind} at {slot}/{side:?}: {err}"));
    world.buildings[id].cycle_time = cycle_time.max(1);
    id
}

/// Ids of the buildings in [`science_line`].
#[derive(Debug, Clone, Copy)]
pub struct ScienceLine {
    pub iron_miner: BuildingId,
    pub copper_miner: BuildingId,
    pub iron_furnace: BuildingId,
    pub copper_furnace: BuildingId,
    pub gear_assembler: BuildingId,
    pub wire_assembler: BuildingId,
    pub science_assembler: BuildingId,
    pub lab: BuildingId,
}

/// A complete ore-to-science chain over [`two_ore_world`] with base cycle
/// times.
pub fn science_line(world: &mut WorldState) -> ScienceLine {
    let base = |kind: BuildingKind| kind.base_ticks();
    ScienceLine {
        iron_miner: place_with_cycle(world, BuildingKind::Miner, Side::Left, 0, base(BuildingKind::Miner)),
        copper_miner: place_with_cycle(world, BuildingKind::Miner, Side::Right, 1, base(BuildingKind::Miner)),
        iron_furnace: place_with_cycle(world, BuildingKind::Furnace, Side::Left, 3, base(BuildingKind::Furnace)),
        copper_furnace: place_with_cycle(world, BuildingKind::Furnace, Side::Right, 4, base(BuildingKind::Furnace)),
        gear_assembler: place_with_cycle(world, BuildingKind::GearAssembler, Side::Left, 8, base(BuildingKind::GearAssembler)),
        wire_assembler: place_with_cycle(world, BuildingKind::WireAssembler, Side::Right, 9, base(BuildingKind::WireAssembler)),
        science_assembler: place_with_cycle(world, BuildingKind::ScienceAssembler, Side::Left, 14, base(BuildingKind::ScienceAssembler)),
        lab: place_with_cycle(world, BuildingKind::Lab, Side::Right, 20, base(BuildingKind::Lab)),
    }
}

// ===========================================================================
// Running
// ===========================================================================

/// Step `world` `n` times in place, collecting every report.
pub fn run_ticks(world: &mut WorldState, n: u64) -> Vec<TickReport> {
    (0..n).map(|_| world.step()).collect()
}
