//! Two-lane conveyor belt.
//!
//! Each lane is a fixed-length array of slots holding at most one item.
//! Every tick both lanes shift one slot toward the terminal end; whatever
//! occupied the terminal slot is lost to space.
//!
//! Buildings sit beside the belt at a slot index. A building on the
//! [`Side::Left`] writes to and first reads from the left lane, and the
//! other way round for [`Side::Right`].

use crate::item::Item;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which lane a building treats as home.
///
/// Ordering is significant: at equal slot index the left building is
/// processed before the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Home lane is the "up" lane.
    Left,
    /// Home lane is the "down" lane.
    Right,
}

impl Side {
    pub const fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// ---------------------------------------------------------------------------
// Lane
// ---------------------------------------------------------------------------

/// A single belt lane. Slot 0 is the entry; the last slot faces open space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lane {
    slots: Vec<Option<Item>>,
}

impl Lane {
    /// An empty lane with `len` slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Build a lane from explicit slot contents.
    pub fn from_slots(slots: Vec<Option<Item>>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<Item>] {
        &self.slots
    }

    /// Item at `slot`, or `None` if empty or out of range.
    pub fn get(&self, slot: usize) -> Option<Item> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn is_free(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(None))
    }

    /// Place `item` at `slot` if it is free. Never overwrites.
    ///
    /// Returns `false` when the slot is occupied or out of range.
    #[must_use = "a refused insert means the item is still in the caller's hand"]
    pub fn try_insert(&mut self, slot: usize, item: Item) -> bool {
        match self.slots.get_mut(slot) {
            Some(cell) if cell.is_none() => {
                *cell = Some(item);
                true
            }
            _ => false,
        }
    }

    /// Remove the item at `slot` if `wanted` accepts it.
    pub fn take_if(&mut self, slot: usize, wanted: impl Fn(Item) -> bool) -> Option<Item> {
        let cell = self.slots.get_mut(slot)?;
        match *cell {
            Some(item) if wanted(item) => cell.take(),
            _ => None,
        }
    }

    /// Shift every item one slot toward the terminal end.
    ///
    /// Slot 0 becomes empty. Returns the item that occupied the terminal
    /// slot, which is now gone.
    pub fn advance(&mut self) -> Option<Item> {
        let lost = self.slots.pop()?;
        self.slots.insert(0, None);
        lost
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Belts
// ---------------------------------------------------------------------------

/// Both lanes of the conveyor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Belts {
    /// Home lane of left-side buildings.
    pub up: Lane,
    /// Home lane of right-side buildings.
    pub down: Lane,
}

/// Items that fell off the terminal slot during one advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spill {
    pub up: Option<Item>,
    pub down: Option<Item>,
}

impl Spill {
    /// Number of items lost, 0 to 2.
    pub fn count(&self) -> u64 {
        self.up.is_some() as u64 + self.down.is_some() as u64
    }
}

impl Belts {
    pub fn new(lane_length: usize) -> Self {
        Self {
            up: Lane::new(lane_length),
            down: Lane::new(lane_length),
        }
    }

    pub fn lane(&self, side: Side) -> &Lane {
        match side {
            Side::Left => &self.up,
            Side::Right => &self.down,
        }
    }

    pub fn lane_mut(&mut self, side: Side) -> &mut Lane {
        match side {
            Side::Left => &mut self.up,
            Side::Right => &mut self.down,
        }
    }

    /// Advance both lanes in the same tick.
    pub fn advance(&mut self) -> Spill {
        Spill {
            up: self.up.advance(),
            down: self.down.advance(),
        }
    }

    /// Pull an item `wanted` accepts from `slot`, trying the home lane of
    /// `home` first and the other lane second.
    pub fn pull(&mut self, home: Side, slot: usize, wanted: impl Fn(Item) -> bool) -> Option<Item> {
        self.lane_mut(home)
            .take_if(slot, &wanted)
            .or_else(|| self.lane_mut(home.other()).take_if(slot, &wanted))
    }

    /// Total items on both lanes.
    pub fn item_count(&self) -> usize {
        self.up.occupied() + self.down.occupied()
    }
}
