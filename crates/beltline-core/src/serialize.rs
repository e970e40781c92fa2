//! Versioned world snapshots.
//!
//! Snapshots are `bitcode` blobs carrying a [`SnapshotHeader`]. A snapshot
//! is only trusted after its header, lane lengths and every world invariant
//! check out; anything else is treated as if there were no save at all.
//! The run flag is never stored, so a restored world always starts paused.

use crate::belt::Belts;
use crate::config::SimConfig;
use crate::fixed::Fixed64;
use crate::id::BuildingId;
use crate::rng::SimRng;
use crate::stats::Stats;
use crate::validation::{ValidationError, validate_world};
use crate::world::{Building, Resource, WorldState};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a world snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xBE17_0001;

/// Current format version. Snapshots of any other version are discarded.
pub const FORMAT_VERSION: u32 = 5;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("snapshot failed validation: {0}")]
    Invalid(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick count at the time the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    /// Create a header for the current format version.
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    /// Validate the header. Returns `Ok(())` if valid.
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serializable world state
// ---------------------------------------------------------------------------

/// The persisted portion of a world. Excludes the config (supplied by the
/// loader) and the run flag.
#[derive(Debug, Serialize, Deserialize)]
struct WorldSnapshot {
    header: SnapshotHeader,
    belts: Belts,
    buildings: SlotMap<BuildingId, Building>,
    resources: Vec<Resource>,
    ticks: u64,
    stats: Stats,
    speed: Fixed64,
    rng: SimRng,
}

impl WorldState {
    /// Serialize this world to a binary blob via bitcode.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = WorldSnapshot {
            header: SnapshotHeader::new(self.ticks),
            belts: self.belts.clone(),
            buildings: self.buildings.clone(),
            resources: self.resources.clone(),
            ticks: self.ticks,
            stats: self.stats.clone(),
            speed: self.speed,
            rng: self.rng.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Restore a world from a blob produced by [`WorldState::serialize`].
    ///
    /// The header is checked first, then the whole world is validated
    /// against `config`. The restored world is always paused.
    pub fn deserialize(data: &[u8], config: &SimConfig) -> Result<Self, DeserializeError> {
        let snapshot: WorldSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        let world = WorldState {
            config: config.clone().normalized(),
            belts: snapshot.belts,
            buildings: snapshot.buildings,
            resources: snapshot.resources,
            ticks: snapshot.ticks,
            stats: snapshot.stats,
            running: false,
            speed: snapshot.speed,
            rng: snapshot.rng,
        };
        validate_world(&world)?;
        Ok(world)
    }

    /// Restore from `data` when present and valid, otherwise build a fresh
    /// world seeded with `seed`. Never fails.
    pub fn restore_or_fresh(data: Option<&[u8]>, config: &SimConfig, seed: u64) -> Self {
        let Some(data) = data else {
            info!("no saved world, starting fresh");
            return WorldState::new(config.clone(), SimRng::new(seed));
        };
        match WorldState::deserialize(data, config) {
            Ok(world) => {
                info!(tick = world.ticks(), buildings = world.building_count(), "restored world");
                world
            }
            Err(err) => {
                warn!(%err, "discarding saved world");
                WorldState::new(config.clone(), SimRng::new(seed))
            }
        }
    }
}
