use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::asset::AssetKind;
use crate::catalog::CatalogEntry;

/// Persisted state for one synced game.
///
/// Created when a game is first synced, updated when its catalog entry
/// changes, removed when the game disappears from the remote catalog.
/// Carries enough metadata to rebuild the game's gamelist node without
/// refetching the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalGameRecord {
    /// Matches [`CatalogEntry::id`].
    pub id: String,
    pub title: String,
    pub sort_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    /// Successfully downloaded assets, by kind.
    pub asset_paths: BTreeMap<AssetKind, PathBuf>,
    /// Generated launch script.
    pub script_path: PathBuf,
    /// Fingerprint of the catalog entry this record was synced from.
    pub last_synced_hash: String,
}

impl LocalGameRecord {
    /// Build a record from a catalog entry and the sync results.
    pub fn from_entry(
        entry: &CatalogEntry,
        asset_paths: BTreeMap<AssetKind, PathBuf>,
        script_path: PathBuf,
    ) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            sort_title: entry.sort_title.clone(),
            release_date: entry.release_date.clone(),
            description: entry.description.clone(),
            developer: entry.developer.clone(),
            asset_paths,
            script_path,
            last_synced_hash: entry.fingerprint(),
        }
    }

    /// All files belonging to this game (assets plus launch script).
    pub fn local_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.asset_paths
            .values()
            .chain(std::iter::once(&self.script_path))
    }
}
