//! Initial building layouts, loaded from RON.
//!
//! ```ron
//! (
//!     placements: [
//!         (kind: miner, side: left, slot: 0),
//!         (kind: furnace, side: left, slot: 3),
//!     ],
//! )
//! ```

use std::path::Path;

use beltline_core::belt::Side;
use beltline_core::id::BuildingId;
use beltline_core::item::BuildingKind;
use beltline_core::placement::PlacementRejected;
use beltline_core::world::WorldState;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RunnerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementEntry {
    pub kind: BuildingKind,
    pub side: Side,
    pub slot: usize,
}

/// An ordered list of placements applied to a fresh world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub placements: Vec<PlacementEntry>,
}

/// What happened when a layout was applied.
#[derive(Debug, Default)]
pub struct LayoutOutcome {
    pub placed: Vec<BuildingId>,
    pub rejected: Vec<(PlacementEntry, PlacementRejected)>,
}

impl Layout {
    pub fn from_ron_str(input: &str, file: &Path) -> Result<Self, RunnerError> {
        ron::from_str(input).map_err(|e| RunnerError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content, path)
    }

    /// Place every entry in order. Rejected entries are logged and skipped;
    /// the rest still apply.
    pub fn apply(&self, world: &mut WorldState) -> LayoutOutcome {
        let mut outcome = LayoutOutcome::default();
        for entry in &self.placements {
            match world.place(entry.kind, entry.side, entry.slot) {
                Ok(id) => outcome.placed.push(id),
                Err(err) => {
                    warn!(kind = %entry.kind, slot = entry.slot, side = ?entry.side, %err, "layout entry skipped");
                    outcome.rejected.push((entry.clone(), err));
                }
            }
        }
        outcome
    }
}
