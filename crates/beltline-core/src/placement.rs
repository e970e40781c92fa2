//! Placing, removing and moving buildings between ticks.
//!
//! Every operation either applies fully or is rejected with the world left
//! untouched.

use crate::belt::Side;
use crate::id::BuildingId;
use crate::item::BuildingKind;
use crate::timing::roll_cycle_time;
use crate::world::{Building, WorldState};
use tracing::debug;

/// Why a placement operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementRejected {
    #[error("slot {slot} is outside the belt (length {lane_length})")]
    OutOfRange { slot: usize, lane_length: usize },
    #[error("slot {slot} on the {side:?} side is already taken")]
    Occupied { slot: usize, side: Side },
    #[error("no ore under slot {slot} for a miner")]
    NoResource { slot: usize },
    #[error("no such building")]
    UnknownBuilding,
}

impl WorldState {
    fn check_spot(
        &self,
        kind: BuildingKind,
        slot: usize,
        side: Side,
        moving: Option<BuildingId>,
    ) -> Result<(), PlacementRejected> {
        if slot >= self.lane_length() {
            return Err(PlacementRejected::OutOfRange {
                slot,
                lane_length: self.lane_length(),
            });
        }
        if let Some(existing) = self.building_at(slot, side)
            && Some(existing) != moving
        {
            return Err(PlacementRejected::Occupied { slot, side });
        }
        if kind == BuildingKind::Miner && self.resource_at(slot).is_none() {
            return Err(PlacementRejected::NoResource { slot });
        }
        Ok(())
    }

    /// Place a new building with a freshly rolled cycle time.
    pub fn place(
        &mut self,
        kind: BuildingKind,
        side: Side,
        slot: usize,
    ) -> Result<BuildingId, PlacementRejected> {
        if let Err(err) = self.check_spot(kind, slot, side, None) {
            debug!(%kind, slot, ?side, %err, "placement rejected");
            return Err(err);
        }
        let cycle_time = roll_cycle_time(kind, self.config.timing_jitter, &mut self.rng);
        let id = self
            .buildings
            .insert(Building::new(kind, side, slot, cycle_time));
        debug!(%kind, slot, ?side, cycle_time, "placed");
        Ok(id)
    }

    /// Remove a building, returning it. Held items go with it.
    pub fn remove(&mut self, id: BuildingId) -> Result<Building, PlacementRejected> {
        let building = self
            .buildings
            .remove(id)
            .ok_or(PlacementRejected::UnknownBuilding)?;
        debug!(kind = %building.kind, slot = building.slot, "removed");
        Ok(building)
    }

    /// Move a building to a new spot.
    ///
    /// The building keeps its id and lifetime count. Progress and held items
    /// are discarded and a new cycle time is rolled. Moving onto its own
    /// spot is allowed and still resets it.
    pub fn move_building(
        &mut self,
        id: BuildingId,
        slot: usize,
        side: Side,
    ) -> Result<(), PlacementRejected> {
        let kind = self
            .buildings
            .get(id)
            .map(|b| b.kind)
            .ok_or(PlacementRejected::UnknownBuilding)?;
        if let Err(err) = self.check_spot(kind, slot, side, Some(id)) {
            debug!(%kind, slot, ?side, %err, "move rejected");
            return Err(err);
        }
        let cycle_time = roll_cycle_time(kind, self.config.timing_jitter, &mut self.rng);
        let Some(building) = self.buildings.get_mut(id) else {
            return Err(PlacementRejected::UnknownBuilding);
        };
        building.slot = slot;
        building.side = side;
        building.progress = 0;
        building.held.clear();
        building.cycle_time = cycle_time;
        debug!(%kind, slot, ?side, cycle_time, "moved");
        Ok(())
    }
}
