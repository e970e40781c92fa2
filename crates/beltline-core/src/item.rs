//! Item and building taxonomy.
//!
//! Both sets are closed enumerations. Recipes and base timings are static
//! tables keyed by [`BuildingKind`]; nothing here carries runtime state
//! except [`HeldItems`], the per-building hand.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Every item that can sit on a belt slot or in a building's hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    IronOre,
    CopperOre,
    IronPlate,
    CopperPlate,
    Gear,
    Wire,
    Science,
}

impl Item {
    /// All items in declaration order.
    pub const ALL: [Item; 7] = [
        Item::IronOre,
        Item::CopperOre,
        Item::IronPlate,
        Item::CopperPlate,
        Item::Gear,
        Item::Wire,
        Item::Science,
    ];

    /// Number of item kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..Item::COUNT`, used for fixed-size per-item tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this item is a raw ore that a miner can extract.
    pub const fn is_ore(self) -> bool {
        matches!(self, Item::IronOre | Item::CopperOre)
    }

    /// Stable snake_case name, matching the serialized form.
    pub const fn name(self) -> &'static str {
        match self {
            Item::IronOre => "iron_ore",
            Item::CopperOre => "copper_ore",
            Item::IronPlate => "iron_plate",
            Item::CopperPlate => "copper_plate",
            Item::Gear => "gear",
            Item::Wire => "wire",
            Item::Science => "science",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-item counters, indexed by [`Item::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemCounts([u64; Item::COUNT]);

impl ItemCounts {
    pub fn get(&self, item: Item) -> u64 {
        self.0[item.index()]
    }

    pub fn increment(&mut self, item: Item) {
        self.0[item.index()] += 1;
    }

    /// Iterate `(item, count)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Item, u64)> + '_ {
        Item::ALL.iter().map(|&item| (item, self.get(item)))
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

// ---------------------------------------------------------------------------
// Held items
// ---------------------------------------------------------------------------

/// The items a building currently holds "in hand".
///
/// A bitset over [`Item`]: a building can hold at most one unit of any
/// kind, and the representation cannot express more.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeldItems(u8);

impl HeldItems {
    pub const EMPTY: HeldItems = HeldItems(0);

    pub const fn contains(self, item: Item) -> bool {
        self.0 & (1 << item as u8) != 0
    }

    /// Put one unit of `item` in hand. Holding it already is a no-op.
    pub fn insert(&mut self, item: Item) {
        self.0 |= 1 << item as u8;
    }

    /// Take `item` out of hand. Returns whether it was held.
    pub fn remove(&mut self, item: Item) -> bool {
        let held = self.contains(item);
        self.0 &= !(1 << item as u8);
        held
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bitset, bit `i` set when `Item::ALL[i]` is held.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// First held item among `candidates`, in the order given.
    pub fn first_of(self, candidates: &[Item]) -> Option<Item> {
        candidates.iter().copied().find(|&item| self.contains(item))
    }

    /// Iterate held items in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Item> {
        Item::ALL.into_iter().filter(move |&item| self.contains(item))
    }

    /// Whether the bitset only uses bits that map to an [`Item`].
    pub(crate) const fn is_well_formed(self) -> bool {
        self.0 >> Item::COUNT == 0
    }

    #[cfg(test)]
    pub(crate) const fn from_bits_unchecked(bits: u8) -> Self {
        Self(bits)
    }
}

impl FromIterator<Item> for HeldItems {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut held = HeldItems::EMPTY;
        for item in iter {
            held.insert(item);
        }
        held
    }
}

// ---------------------------------------------------------------------------
// Buildings and recipes
// ---------------------------------------------------------------------------

/// Every placeable building type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Miner,
    Furnace,
    GearAssembler,
    WireAssembler,
    ScienceAssembler,
    Lab,
}

/// What a building does with its inputs.
///
/// Enum dispatch over the four shapes of production in the game; the tick
/// engine matches on this rather than on [`BuildingKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    /// No inputs. Emits the ore of the resource under the building.
    Extract,
    /// One input from a set of alternatives, each mapping to one output.
    Convert(&'static [(Item, Item)]),
    /// Every input must be held before processing starts.
    Combine {
        inputs: &'static [Item],
        output: Item,
    },
    /// Consumes one input and emits nothing on the belt.
    Consume(Item),
}

const SMELTING: &[(Item, Item)] = &[
    (Item::IronOre, Item::IronPlate),
    (Item::CopperOre, Item::CopperPlate),
];
const GEAR_PRESSING: &[(Item, Item)] = &[(Item::IronPlate, Item::Gear)];
const WIRE_DRAWING: &[(Item, Item)] = &[(Item::CopperPlate, Item::Wire)];
const SCIENCE_INPUTS: &[Item] = &[Item::Gear, Item::Wire];

impl BuildingKind {
    pub const ALL: [BuildingKind; 6] = [
        BuildingKind::Miner,
        BuildingKind::Furnace,
        BuildingKind::GearAssembler,
        BuildingKind::WireAssembler,
        BuildingKind::ScienceAssembler,
        BuildingKind::Lab,
    ];

    pub const fn recipe(self) -> Recipe {
        match self {
            BuildingKind::Miner => Recipe::Extract,
            BuildingKind::Furnace => Recipe::Convert(SMELTING),
            BuildingKind::GearAssembler => Recipe::Convert(GEAR_PRESSING),
            BuildingKind::WireAssembler => Recipe::Convert(WIRE_DRAWING),
            BuildingKind::ScienceAssembler => Recipe::Combine {
                inputs: SCIENCE_INPUTS,
                output: Item::Science,
            },
            BuildingKind::Lab => Recipe::Consume(Item::Science),
        }
    }

    /// Base processing duration in ticks, before jitter.
    pub const fn base_ticks(self) -> u32 {
        match self {
            BuildingKind::Miner => 2,
            BuildingKind::Furnace => 4,
            BuildingKind::GearAssembler => 3,
            BuildingKind::WireAssembler => 3,
            BuildingKind::ScienceAssembler => 3,
            BuildingKind::Lab => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BuildingKind::Miner => "miner",
            BuildingKind::Furnace => "furnace",
            BuildingKind::GearAssembler => "gear_assembler",
            BuildingKind::WireAssembler => "wire_assembler",
            BuildingKind::ScienceAssembler => "science_assembler",
            BuildingKind::Lab => "lab",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Recipe {
    /// Items this recipe will accept from a belt.
    pub fn accepted_inputs(self) -> Vec<Item> {
        match self {
            Recipe::Extract => Vec::new(),
            Recipe::Convert(pairs) => pairs.iter().map(|&(input, _)| input).collect(),
            Recipe::Combine { inputs, .. } => inputs.to_vec(),
            Recipe::Consume(item) => vec![item],
        }
    }

    /// Items this recipe places on a belt once finished.
    pub fn belt_outputs(self) -> Vec<Item> {
        match self {
            Recipe::Extract | Recipe::Consume(_) => Vec::new(),
            Recipe::Convert(pairs) => pairs.iter().map(|&(_, output)| output).collect(),
            Recipe::Combine { output, .. } => vec![output],
        }
    }
}
