//! The sync orchestrator.
//!
//! Single-threaded stages (catalog fetch, state load, removals, gamelist
//! write, state save) surround one parallel window in which a bounded
//! worker pool processes added and changed games. Per-game failures never
//! abort the run; only the checkpoint stages can, and each of them leaves
//! previously persisted files intact.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use greenlight_sync_catalog::{CatalogCache, CatalogSource, cache};
use greenlight_sync_core::{AssetKind, CatalogEntry, LocalGameRecord, compute_plan};
use greenlight_sync_frontend::gamelist;

use crate::assets;
use crate::config::SyncConfig;
use crate::error::{AssetError, SyncError};
use crate::events::{SyncEvent, SyncStage};
use crate::scripts;
use crate::store::StateStore;

const CATALOG_CACHE_FILE: &str = "catalog-cache.json";

/// Cooperative cancellation handle, checked between games in the worker
/// pool. In-flight work for a game runs to completion; everything not yet
/// started is skipped and the run finishes cleanly with whatever was done.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A game that could not be synced at all.
#[derive(Debug, Clone)]
pub struct GameFailure {
    pub id: String,
    pub title: String,
    pub reason: String,
}

/// A game that was kept, but with one or more asset kinds missing.
#[derive(Debug, Clone)]
pub struct PartialGame {
    pub id: String,
    pub title: String,
    pub failed_kinds: Vec<AssetKind>,
}

/// Outcome of one sync run. Partial games count toward `added`/`updated`
/// (success with warnings); `failed` games do not.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub failed: usize,
    /// Games skipped because the run was cancelled.
    pub skipped: usize,
    pub partial: Vec<PartialGame>,
    pub failures: Vec<GameFailure>,
    pub dry_run: bool,
}

impl SyncReport {
    /// True when every processed game fully succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.partial.is_empty()
    }
}

/// Internal result of processing a single game.
enum GameResult {
    Synced {
        record: LocalGameRecord,
        is_add: bool,
    },
    Partial {
        record: LocalGameRecord,
        is_add: bool,
        errors: Vec<AssetError>,
    },
    Failed {
        id: String,
        title: String,
        reason: String,
    },
    Skipped,
}

/// Run one full synchronization pass.
///
/// Re-running with no remote changes and all local files intact computes
/// an empty plan, downloads nothing and leaves the gamelist byte-identical.
/// The event sender is dropped on return, closing the consumer's channel.
pub async fn sync<S: CatalogSource>(
    source: &S,
    config: &SyncConfig,
    events: mpsc::UnboundedSender<SyncEvent>,
    cancel: &CancelFlag,
) -> Result<SyncReport, SyncError> {
    let _ = events.send(SyncEvent::FetchingCatalog);
    let cache = CatalogCache::new(config.state_dir.join(CATALOG_CACHE_FILE), cache::DEFAULT_TTL);
    let (entries, from_cache) = fetch_catalog(source, &cache, config.refresh).await?;
    let _ = events.send(SyncEvent::CatalogFetched {
        total: entries.len(),
        from_cache,
    });

    let store = StateStore::new(&config.state_dir);
    let existing = store.load()?;

    // Games needing a re-sync regardless of fingerprint: anything with a
    // missing local file, and everything when kinds are force-redownloaded.
    let mut refresh_ids: HashSet<String> = HashSet::new();
    for record in existing.values() {
        if !config.force_kinds.is_empty() || record.local_files().any(|p| !p.exists()) {
            refresh_ids.insert(record.id.clone());
        }
    }

    let plan = compute_plan(&entries, &existing, &refresh_ids);
    let _ = events.send(SyncEvent::PlanComputed {
        add: plan.to_add.len(),
        update: plan.to_update.len(),
        remove: plan.to_remove.len(),
    });

    let mut report = SyncReport {
        dry_run: config.dry_run,
        ..Default::default()
    };

    if config.dry_run {
        report.added = plan.to_add.len();
        report.updated = plan.to_update.len();
        report.removed = plan.to_remove.len();
        let _ = events.send(SyncEvent::Done);
        return Ok(report);
    }

    // Stage: removals. Per-file failures are logged inside, never fatal.
    let mut final_records = existing.clone();
    for id in &plan.to_remove {
        if let Some(record) = final_records.remove(id) {
            delete_game_files(&record);
            let _ = events.send(SyncEvent::GameRemoved {
                id: record.id,
                title: record.title,
            });
            report.removed += 1;
        }
    }
    let _ = events.send(SyncEvent::StageCompleted {
        stage: SyncStage::Removal,
        count: report.removed,
    });

    // Stage: the parallel window. Adds and updates run through a bounded
    // worker pool; each worker handles one game end-to-end.
    let by_id: BTreeMap<&str, &CatalogEntry> =
        entries.iter().map(|e| (e.id.as_str(), e)).collect();
    let add_ids: HashSet<&str> = plan.to_add.iter().map(|s| s.as_str()).collect();
    let work: Vec<(usize, &CatalogEntry, bool)> = plan
        .to_add
        .iter()
        .chain(plan.to_update.iter())
        .enumerate()
        .filter_map(|(index, id)| {
            by_id
                .get(id.as_str())
                .map(|entry| (index, *entry, add_ids.contains(id.as_str())))
        })
        .collect();

    let results: Vec<GameResult> = stream::iter(work)
        .map(|(index, entry, is_add)| {
            let events = events.clone();
            async move {
                if cancel.is_cancelled() {
                    return GameResult::Skipped;
                }
                process_game(source, entry, config, index, is_add, &events).await
            }
        })
        .buffer_unordered(config.workers.max(1))
        .collect()
        .await;

    let mut processed = 0usize;
    for result in results {
        match result {
            GameResult::Synced { record, is_add } => {
                if is_add {
                    report.added += 1;
                } else {
                    report.updated += 1;
                }
                final_records.insert(record.id.clone(), record);
                processed += 1;
            }
            GameResult::Partial {
                record,
                is_add,
                errors,
            } => {
                if is_add {
                    report.added += 1;
                } else {
                    report.updated += 1;
                }
                report.partial.push(PartialGame {
                    id: record.id.clone(),
                    title: record.title.clone(),
                    failed_kinds: errors.iter().map(|e| e.kind).collect(),
                });
                final_records.insert(record.id.clone(), record);
                processed += 1;
            }
            GameResult::Failed { id, title, reason } => {
                // Failed adds stay out of the record set; failed updates
                // keep their previous record (still in final_records).
                report.failed += 1;
                report.failures.push(GameFailure { id, title, reason });
            }
            GameResult::Skipped => report.skipped += 1,
        }
    }
    let _ = events.send(SyncEvent::StageCompleted {
        stage: SyncStage::Download,
        count: processed,
    });

    // Stage: gamelist merge. Managed ids cover everything this sync has
    // ever been responsible for, so stale nodes get dropped while foreign
    // entries survive untouched.
    let mut managed: HashSet<String> = existing.keys().cloned().collect();
    managed.extend(final_records.keys().cloned());
    gamelist::apply_diff(&config.gamelist_path, &final_records, &managed)?;
    let _ = events.send(SyncEvent::StageCompleted {
        stage: SyncStage::Gamelist,
        count: final_records.len(),
    });

    store.save(&final_records)?;

    let _ = events.send(SyncEvent::Done);
    Ok(report)
}

/// Fetch the catalog through the day-cache.
async fn fetch_catalog<S: CatalogSource>(
    source: &S,
    cache: &CatalogCache,
    refresh: bool,
) -> Result<(Vec<CatalogEntry>, bool), SyncError> {
    if !refresh {
        if let Some(entries) = cache.load_fresh() {
            log::debug!("Using cached catalog ({} entries)", entries.len());
            return Ok((entries, true));
        }
    }
    let entries = source.fetch().await?;
    if let Err(e) = cache.store(&entries) {
        // A failed cache write only costs the next run a refetch.
        log::warn!("Could not write catalog cache: {}", e);
    }
    Ok((entries, false))
}

/// Process one added or changed game: download assets, write the script.
async fn process_game<S: CatalogSource>(
    source: &S,
    entry: &CatalogEntry,
    config: &SyncConfig,
    index: usize,
    is_add: bool,
    events: &mpsc::UnboundedSender<SyncEvent>,
) -> GameResult {
    let _ = events.send(SyncEvent::GameStarted {
        index,
        id: entry.id.clone(),
        title: entry.title.clone(),
    });

    let (asset_paths, errors) = assets::download_assets(source, entry, config, index, events).await;

    // A game with every requested asset kind failing and nothing on disk
    // is a failure; anything less is partial at worst.
    let requested = config
        .selection
        .kinds
        .iter()
        .filter(|&&k| entry.url_for(k).is_some())
        .count();
    if requested > 0 && asset_paths.is_empty() {
        let reason = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let _ = events.send(SyncEvent::GameFailed {
            index,
            id: entry.id.clone(),
            title: entry.title.clone(),
            reason: reason.clone(),
        });
        return GameResult::Failed {
            id: entry.id.clone(),
            title: entry.title.clone(),
            reason,
        };
    }

    let script_path = match scripts::generate_script(entry, &config.scripts_dir) {
        Ok(path) => {
            let _ = events.send(SyncEvent::ScriptWritten {
                index,
                id: entry.id.clone(),
            });
            path
        }
        Err(e) => {
            let reason = format!("could not write launch script: {e}");
            let _ = events.send(SyncEvent::GameFailed {
                index,
                id: entry.id.clone(),
                title: entry.title.clone(),
                reason: reason.clone(),
            });
            return GameResult::Failed {
                id: entry.id.clone(),
                title: entry.title.clone(),
                reason,
            };
        }
    };

    let record = LocalGameRecord::from_entry(entry, asset_paths, script_path);
    if errors.is_empty() {
        let _ = events.send(SyncEvent::GameCompleted {
            index,
            id: entry.id.clone(),
            title: entry.title.clone(),
        });
        GameResult::Synced { record, is_add }
    } else {
        let failed_kinds: Vec<AssetKind> = errors.iter().map(|e| e.kind).collect();
        let _ = events.send(SyncEvent::GamePartial {
            index,
            id: entry.id.clone(),
            title: entry.title.clone(),
            failed_kinds,
        });
        GameResult::Partial {
            record,
            is_add,
            errors,
        }
    }
}

/// Delete a removed game's assets and launch script. Non-fatal per file.
fn delete_game_files(record: &LocalGameRecord) {
    for path in record.local_files() {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not delete {}: {}", path.display(), e),
        }
    }
}
