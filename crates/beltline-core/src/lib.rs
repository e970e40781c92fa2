//! Beltline Core -- the deterministic engine of a two-lane factory belt.
//!
//! Ore patches feed miners, miners feed a conveyor of two 40-slot lanes,
//! and furnaces, assemblers and labs along the belt turn ore into science.
//! Throughput is scored in science per minute.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::tick`] (or [`world::WorldState::step`] in place)
//! advances the world by one tick:
//!
//! 1. **Belt** -- both lanes shift one slot; items at the terminal slot are
//!    lost to space.
//! 2. **Buildings** -- every building runs its production state machine
//!    once, in ascending slot order with the left side first.
//! 3. **Bookkeeping** -- deliveries and lab completions are recorded and
//!    the tick counter increments.
//!
//! The tick draws no randomness. Each building's cycle time is rolled from
//! the world's [`rng::SimRng`] when it is placed or moved, then fixed.
//!
//! # Key Types
//!
//! - [`world::WorldState`] -- belts, buildings, resources, stats and clock.
//! - [`belt::Belts`] -- the two lanes and cross-lane pulls.
//! - [`item::BuildingKind`] / [`item::Recipe`] -- static recipe tables.
//! - [`engine::TickReport`] -- what happened during a tick.
//! - [`placement::PlacementRejected`] -- why a place/remove/move was refused.
//! - [`query::WorldSummary`] / [`query::BuildingView`] -- read-only views.
//! - [`serialize`] -- versioned bitcode snapshots with validation and
//!   fresh-world fallback.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point for deterministic math.

pub mod belt;
mod building;
pub mod config;
pub mod engine;
pub mod fixed;
pub mod hash;
pub mod id;
pub mod item;
pub mod placement;
pub mod query;
pub mod rng;
pub mod serialize;
pub mod stats;
pub mod timing;
pub mod validation;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use engine::{TickReport, tick, tick_with_report};
pub use world::WorldState;
