//! On-disk save slot.
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous save intact. Failures are reported
//! to the caller or logged; they never touch the in-memory world.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use beltline_core::world::WorldState;
use tracing::{debug, warn};

use crate::error::RunnerError;

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Raw bytes of the current save, or `None` if there is none or it
    /// cannot be read.
    pub fn load(&self) -> Option<Vec<u8>> {
        match std::fs::read(&self.path) {
            Ok(data) => Some(data),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "could not read save");
                None
            }
        }
    }

    /// Write already-encoded snapshot bytes.
    pub fn write(&self, data: &[u8]) -> Result<(), RunnerError> {
        let tmp = self.temp_path();
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = data.len(), "saved");
        Ok(())
    }

    /// Encode and write `world`.
    pub fn save(&self, world: &WorldState) -> Result<(), RunnerError> {
        let data = world.serialize()?;
        self.write(&data)
    }

    /// Like [`SaveStore::save`], logging instead of returning failures.
    pub fn save_logged(&self, world: &WorldState) -> bool {
        match self.save(world) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "save failed");
                false
            }
        }
    }

    /// Like [`SaveStore::write`], logging instead of returning failures.
    pub fn write_logged(&self, data: &[u8]) -> bool {
        match self.write(data) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "save failed");
                false
            }
        }
    }

    /// Delete the save. A missing file is not an error.
    pub fn clear(&self) -> Result<(), RunnerError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
