//! On-disk cache for the mapped catalog.
//!
//! The provider's catalog changes at most a few times a day; re-running a
//! sync shortly after the last one should not refetch it. The cache file
//! holds the mapped [`CatalogEntry`] list as JSON and is considered fresh
//! while younger than its TTL. A missing, stale or corrupt cache is never
//! an error — the caller just fetches.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use greenlight_sync_core::CatalogEntry;

use crate::error::CatalogError;

/// Default cache lifetime: one day, matching how often the provider
/// rotates the catalog.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct CatalogCache {
    path: PathBuf,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached catalog if it exists, parses, and is younger
    /// than the TTL.
    pub fn load_fresh(&self) -> Option<Vec<CatalogEntry>> {
        let modified = std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age >= self.ttl {
            log::debug!("Catalog cache is stale ({}s old)", age.as_secs());
            return None;
        }

        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(entries) => Some(entries),
            Err(e) => {
                log::debug!("Ignoring corrupt catalog cache: {}", e);
                None
            }
        }
    }

    /// Persist the catalog, atomically.
    pub fn store(&self, entries: &[CatalogEntry]) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
