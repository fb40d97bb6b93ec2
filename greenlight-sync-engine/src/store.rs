use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use greenlight_sync_core::LocalGameRecord;

use crate::error::SyncError;

const STATE_FILE: &str = "sync-state.json";

/// Persisted record of previously synced games, the source of truth the
/// sync plan is diffed against.
///
/// `save` writes to a temp file and renames it into place, so a crash at
/// any point leaves either the full new state or the intact prior one —
/// `load` never observes a torn file.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records; an absent file is an empty library.
    pub fn load(&self) -> Result<BTreeMap<String, LocalGameRecord>, SyncError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| SyncError::Storage {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| SyncError::CorruptState {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Persist the full record set atomically.
    pub fn save(&self, records: &BTreeMap<String, LocalGameRecord>) -> Result<(), SyncError> {
        let storage_err = |e: std::io::Error| SyncError::Storage {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let serialized =
            serde_json::to_string_pretty(records).map_err(|e| SyncError::Storage {
                path: self.path.clone(),
                source: std::io::Error::other(e),
            })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serialized).map_err(storage_err)?;
        std::fs::rename(&tmp, &self.path).map_err(storage_err)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
