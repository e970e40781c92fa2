//! The tick engine.
//!
//! One tick runs two phases in a fixed order:
//!
//! 1. **Belt** -- both lanes advance one slot; terminal items are lost.
//! 2. **Buildings** -- every building runs its state machine once, in
//!    `(slot, side)` order with left before right at equal slots.
//!
//! Afterwards the tick's lab completions are appended to the science
//! history and the clock advances. The tick needs no randomness: cycle
//! times are rolled when a building is placed or moved, so the same input
//! world always produces the same successor.

use crate::belt::{Lane, Spill};
use crate::building::run_building;
use crate::hash::StateHash;
use crate::id::BuildingId;
use crate::item::{Item, ItemCounts};
use crate::world::{Building, WorldState};
use tracing::trace;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number after the step completed.
    pub tick: u64,
    /// Items pushed off the terminal slot of each lane.
    pub lost: Spill,
    /// Items placed on a belt by buildings this tick.
    pub delivered: ItemCounts,
    /// Science packs labs finished this tick.
    pub science_consumed: u32,
    /// Buildings holding a finished output they could not place.
    pub stalled: Vec<BuildingId>,
}

impl TickReport {
    pub fn is_stalled(&self, id: BuildingId) -> bool {
        self.stalled.contains(&id)
    }
}

/// Compute the successor of `state`. The input is left untouched.
pub fn tick(state: &WorldState) -> WorldState {
    tick_with_report(state).0
}

/// Like [`tick`], also returning what happened.
pub fn tick_with_report(state: &WorldState) -> (WorldState, TickReport) {
    let mut next = state.clone();
    let report = next.step();
    (next, report)
}

impl WorldState {
    /// Advance this world by one tick in place.
    ///
    /// Runs regardless of [`WorldState::is_running`]; the pause flag is for
    /// drivers to honor.
    pub fn step(&mut self) -> TickReport {
        let mut report = TickReport::default();

        // Phase 1: belt.
        report.lost = self.belts.advance();
        self.stats.lost_to_space += report.lost.count();

        // Phase 2: buildings.
        for id in self.processing_order() {
            let Some(building) = self.buildings.get_mut(id) else {
                continue;
            };
            run_building(id, building, &mut self.belts, &self.resources, &mut report);
        }

        for (item, count) in report.delivered.iter() {
            for _ in 0..count {
                self.stats.record_delivery(item);
            }
        }
        self.stats
            .record_tick(report.science_consumed, self.config.history_capacity);
        self.ticks += 1;
        report.tick = self.ticks;

        trace!(
            tick = self.ticks,
            lost = report.lost.count(),
            delivered = report.delivered.total(),
            science = report.science_consumed,
            stalled = report.stalled.len(),
            "tick"
        );
        report
    }

    /// Run `n` ticks in place, discarding reports.
    pub fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Deterministic hash of the entire simulation state.
    ///
    /// Buildings are hashed in processing order, so two worlds that hold
    /// the same buildings under different keys hash the same.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        hash_lane(&mut h, &self.belts.up);
        hash_lane(&mut h, &self.belts.down);
        h.write_u64(self.buildings.len() as u64);
        for id in self.processing_order() {
            if let Some(b) = self.buildings.get(id) {
                hash_building(&mut h, b);
            }
        }
        for r in &self.resources {
            h.write_u64(r.slot as u64);
            h.write_u8(r.ore as u8);
        }
        for (_, count) in self.stats.produced.iter() {
            h.write_u64(count);
        }
        h.write_u64(self.stats.lost_to_space);
        for &v in &self.stats.history {
            h.write_u32(v);
        }
        h.write_u64(self.ticks);
        h.write_u64(self.rng.state());
        h.finish()
    }
}

pub(crate) fn hash_lane(h: &mut StateHash, lane: &Lane) {
    for slot in lane.slots() {
        h.write_u8(slot.map_or(0, |item: Item| item as u8 + 1));
    }
}

pub(crate) fn hash_building(h: &mut StateHash, b: &Building) {
    h.write_u8(b.kind as u8);
    h.write_u8(b.side as u8);
    h.write_u64(b.slot as u64);
    h.write_u32(b.progress);
    h.write_u32(b.cycle_time);
    h.write_u8(b.held.bits());
    h.write_u64(b.total_produced);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belt::Side;
    use crate::config::SimConfig;
    use crate::item::BuildingKind;
    use crate::rng::SimRng;
    use crate::world::Resource;

    fn empty_world() -> WorldState {
        WorldState::with_resources(
            SimConfig::default(),
            vec![Resource { slot: 0, ore: Item::IronOre }],
            SimRng::new(9),
        )
    }

    fn add(w: &mut WorldState, kind: BuildingKind, side: Side, slot: usize, cycle: u32) -> BuildingId {
        w.buildings.insert(Building::new(kind, side, slot, cycle))
    }

    // -----------------------------------------------------------------------
    // Purity
    // -----------------------------------------------------------------------

    #[test]
    fn tick_does_not_mutate_input() {
        let mut w = empty_world();
        add(&mut w, BuildingKind::Miner, Side::Left, 0, 1);
        let before = w.clone();
        let next = tick(&w);
        assert_eq!(w, before);
        assert_ne!(next, before);
        assert_eq!(next.ticks(), 1);
    }

    #[test]
    fn tick_is_deterministic() {
        let mut w = empty_world();
        add(&mut w, BuildingKind::Miner, Side::Left, 0, 2);
        add(&mut w, BuildingKind::Furnace, Side::Left, 6, 3);
        let a = (0..50).fold(w.clone(), |s, _| tick(&s));
        let b = (0..50).fold(w, |s, _| tick(&s));
        assert_eq!(a, b);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    // -----------------------------------------------------------------------
    // Belt phase
    // -----------------------------------------------------------------------

    #[test]
    fn items_travel_one_slot_per_tick_and_fall_off() {
        let mut w = empty_world();
        assert!(w.belts.up.try_insert(37, Item::Gear));
        w.step();
        assert_eq!(w.belts.up.get(38), Some(Item::Gear));
        w.step();
        assert_eq!(w.belts.up.get(39), Some(Item::Gear));
        let report = w.step();
        assert_eq!(report.lost.up, Some(Item::Gear));
        assert_eq!(w.stats().lost_to_space, 1);
        assert_eq!(w.belts.item_count(), 0);
    }

    #[test]
    fn belt_moves_before_buildings_act() {
        // An item at slot 4 reaches slot 5 and is picked up the same tick.
        let mut w = empty_world();
        let furnace = add(&mut w, BuildingKind::Furnace, Side::Left, 5, 3);
        assert!(w.belts.up.try_insert(4, Item::IronOre));
        w.step();
        assert!(w.building(furnace).is_some_and(|b| b.held.contains(Item::IronOre)));
        assert_eq!(w.belts.item_count(), 0);
    }

    // -----------------------------------------------------------------------
    // Building phase ordering
    // -----------------------------------------------------------------------

    #[test]
    fn left_building_wins_contested_item() {
        let mut w = empty_world();
        let right = add(&mut w, BuildingKind::Furnace, Side::Right, 5, 3);
        let left = add(&mut w, BuildingKind::Furnace, Side::Left, 5, 3);
        assert!(w.belts.down.try_insert(4, Item::IronOre));
        w.step();
        // The left furnace falls back to the down lane and takes it first.
        assert!(w.building(left).is_some_and(|b| b.held.contains(Item::IronOre)));
        assert!(w.building(right).is_some_and(|b| b.held.is_empty()));
    }

    #[test]
    fn upstream_output_reaches_downstream_next_tick() {
        let mut w = empty_world();
        add(&mut w, BuildingKind::Miner, Side::Left, 0, 1);
        let furnace = add(&mut w, BuildingKind::Furnace, Side::Left, 1, 4);
        w.step();
        assert_eq!(w.belts.up.get(0), Some(Item::IronOre));
        w.step();
        assert!(w.building(furnace).is_some_and(|b| b.held.contains(Item::IronOre)));
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    #[test]
    fn deliveries_and_history_recorded() {
        let mut w = empty_world();
        add(&mut w, BuildingKind::Miner, Side::Left, 0, 1);
        add(&mut w, BuildingKind::Lab, Side::Right, 3, 1);
        for _ in 0..5 {
            w.step();
        }
        assert_eq!(w.stats().produced.get(Item::IronOre), 5);
        assert_eq!(w.stats().history.len(), 5);
        assert!(w.stats().history.iter().all(|&v| v == 0));
    }

    #[test]
    fn history_is_bounded() {
        let config = SimConfig {
            history_capacity: 10,
            rate_window: 5,
            ..SimConfig::default()
        };
        let mut w = WorldState::new(config, SimRng::new(1));
        w.advance(25);
        assert_eq!(w.stats().history.len(), 10);
        assert_eq!(w.ticks(), 25);
    }

    #[test]
    fn lab_completion_feeds_history() {
        let mut w = empty_world();
        let lab = add(&mut w, BuildingKind::Lab, Side::Left, 2, 2);
        assert!(w.belts.up.try_insert(1, Item::Science));
        let first = w.step();
        assert_eq!(first.science_consumed, 0);
        let second = w.step();
        assert_eq!(second.science_consumed, 1);
        assert_eq!(w.stats().history.back(), Some(&1));
        assert_eq!(w.building(lab).map(|b| b.total_produced), Some(1));
        assert!(w.science_per_minute() > crate::fixed::Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Hashing
    // -----------------------------------------------------------------------

    #[test]
    fn state_hash_tracks_changes() {
        let mut w = empty_world();
        add(&mut w, BuildingKind::Miner, Side::Left, 0, 1);
        let h0 = w.state_hash();
        w.step();
        assert_ne!(h0, w.state_hash());
    }

    #[test]
    fn state_hash_ignores_insertion_order() {
        let mut a = empty_world();
        add(&mut a, BuildingKind::Lab, Side::Left, 3, 2);
        add(&mut a, BuildingKind::Furnace, Side::Right, 7, 2);
        let mut b = empty_world();
        add(&mut b, BuildingKind::Furnace, Side::Right, 7, 2);
        add(&mut b, BuildingKind::Lab, Side::Left, 3, 2);
        assert_eq!(a.state_hash(), b.state_hash());
    }
}
