//! Per-game media downloads.
//!
//! Each asset kind is fetched independently: a 404 on the video never
//! costs the game its cover. Transient network failures are retried with
//! exponential backoff; bytes are promoted into the content-addressed
//! layout (`<assets_dir>/<subdir>/<id>.<ext>`) via temp-file-then-rename
//! so a crash mid-download never leaves a partial asset visible.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::time::Duration;

use greenlight_sync_catalog::{CatalogError, CatalogSource};
use greenlight_sync_core::{AssetKind, CatalogEntry, LocalGameRecord};

use crate::config::SyncConfig;
use crate::error::AssetError;
use crate::events::SyncEvent;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Final location of one asset.
pub fn asset_path(assets_dir: &Path, kind: AssetKind, id: &str) -> PathBuf {
    assets_dir
        .join(kind.subdir())
        .join(format!("{}.{}", id, kind.extension()))
}

/// Download every enabled asset kind for one game.
///
/// Returns the paths of the kinds that succeeded (including ones already
/// on disk, which are kept without a fetch unless force-redownloaded) and
/// the per-kind failures. Never fails as a whole.
pub async fn download_assets<S: CatalogSource>(
    source: &S,
    entry: &CatalogEntry,
    config: &SyncConfig,
    index: usize,
    events: &mpsc::UnboundedSender<SyncEvent>,
) -> (BTreeMap<AssetKind, PathBuf>, Vec<AssetError>) {
    let jobs = config.selection.kinds.iter().filter_map(|&kind| {
        let url = entry.url_for(kind)?;
        let dest = asset_path(&config.assets_dir, kind, &entry.id);
        let force = config.force_kinds.contains(&kind);
        Some(async move {
            if dest.exists() && !force {
                return (kind, Ok(dest));
            }
            match fetch_one(source, url, &dest).await {
                Ok(()) => {
                    let _ = events.send(SyncEvent::AssetDownloaded {
                        index,
                        id: entry.id.clone(),
                        kind,
                    });
                    (kind, Ok(dest))
                }
                Err(e) => (
                    kind,
                    Err(AssetError {
                        kind,
                        url: url.to_string(),
                        source: e,
                    }),
                ),
            }
        })
    });

    let mut paths = BTreeMap::new();
    let mut errors = Vec::new();
    for (kind, result) in join_all(jobs).await {
        match result {
            Ok(path) => {
                paths.insert(kind, path);
            }
            Err(e) => errors.push(e),
        }
    }
    (paths, errors)
}

/// Fetch one asset and promote it into place.
async fn fetch_one<S: CatalogSource>(
    source: &S,
    url: &str,
    dest: &Path,
) -> Result<(), CatalogError> {
    let bytes = fetch_with_retry(source, url).await?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = dest.with_extension("part");
    if let Err(e) = std::fs::write(&tmp, &bytes).and_then(|_| std::fs::rename(&tmp, dest)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

async fn fetch_with_retry<S: CatalogSource>(
    source: &S,
    url: &str,
) -> Result<Vec<u8>, CatalogError> {
    let mut attempt = 0u32;
    loop {
        match source.fetch_asset(url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if e.is_transient() && attempt + 1 < MAX_ATTEMPTS => {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                log::debug!(
                    "Transient failure fetching {} (attempt {}/{}), retrying in {}ms: {}",
                    url,
                    attempt + 1,
                    MAX_ATTEMPTS,
                    delay.as_millis(),
                    e,
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Delete all stored assets of the given kinds across every record.
///
/// The records themselves (and the store's id list) are untouched; the
/// next sync's missing-file check re-downloads what is still wanted.
/// Returns the number of files deleted; individual failures are logged,
/// never fatal.
pub fn clean_assets(records: &BTreeMap<String, LocalGameRecord>, kinds: &[AssetKind]) -> usize {
    let mut removed = 0;
    for record in records.values() {
        for kind in kinds {
            if let Some(path) = record.asset_paths.get(kind) {
                match std::fs::remove_file(path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => log::warn!("Could not delete {}: {}", path.display(), e),
                }
            }
        }
    }
    removed
}

#[cfg(test)]
#[path = "tests/assets_tests.rs"]
mod tests;
