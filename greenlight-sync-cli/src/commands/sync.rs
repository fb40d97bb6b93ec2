use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use greenlight_sync_catalog::{CatalogClient, CatalogClientOptions};
use greenlight_sync_core::AssetSelection;
use greenlight_sync_engine::{
    CancelFlag, SyncConfig, SyncEvent, drive_with_events, settings,
};

use crate::commands::default_data_dir;
use crate::spinner::SpinnerPool;

pub(crate) struct SyncArgs {
    pub assets_dir: Option<PathBuf>,
    pub scripts_dir: Option<PathBuf>,
    pub gamelist: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub kinds: Option<Vec<String>>,
    pub skip_videos: bool,
    pub force_redownload: Option<Vec<String>>,
    pub workers: usize,
    pub refresh: bool,
    pub dry_run: bool,
    pub quiet: bool,
}

/// Run the sync command. Returns false on a fatal error.
pub(crate) fn run_sync(args: SyncArgs) -> bool {
    let config = build_config(&args);

    log::info!("Syncing Xbox Game Pass catalog");
    log::info!(
        "Scripts:  {}",
        config.scripts_dir.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!(
        "Assets:   {}",
        config.assets_dir.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!(
        "Gamelist: {}",
        config.gamelist_path.display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    if args.dry_run {
        log::info!(
            "{}",
            "Dry run: nothing will be downloaded or written"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let client_options = CatalogClientOptions {
            max_inflight: (args.workers * 2).max(4),
            ..Default::default()
        };
        let client = match CatalogClient::new(client_options) {
            Ok(c) => c,
            Err(e) => {
                log::error!(
                    "{} Could not create catalog client: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    e,
                );
                return false;
            }
        };

        // Ctrl-C requests cooperative cancellation; in-flight games finish,
        // the rest are skipped and all completed work is persisted.
        let cancel = CancelFlag::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Cancellation requested, finishing in-flight games...");
                    cancel.cancel();
                }
            });
        }

        let mut pool = SpinnerPool::new(args.workers.max(1), args.quiet);
        let mut work_total = 0usize;

        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<SyncEvent>();
        let sync_future =
            greenlight_sync_engine::sync(&client, &config, event_tx, &cancel);

        let result = drive_with_events(sync_future, event_rx, |event| match event {
            SyncEvent::FetchingCatalog => {
                pool.claim(usize::MAX, "Fetching catalog...".into());
            }
            SyncEvent::CatalogFetched { total, from_cache } => {
                pool.release(usize::MAX);
                let origin = if from_cache { " (cached)" } else { "" };
                log::info!(
                    "{} Catalog: {} games{}",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    total,
                    origin,
                );
            }
            SyncEvent::PlanComputed { add, update, remove } => {
                work_total = add + update;
                log::info!(
                    "{} Plan: {} to add, {} to update, {} to remove",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    add,
                    update,
                    remove,
                );
            }
            SyncEvent::GameRemoved { ref title, .. } => {
                log::info!(
                    "  {} removed {}",
                    "-".if_supports_color(Stdout, |t| t.yellow()),
                    title,
                );
            }
            SyncEvent::GameStarted { index, ref title, .. } => {
                pool.claim(index, format!("[{}/{}] {}", index + 1, work_total, title));
            }
            SyncEvent::AssetDownloaded { index, ref kind, .. } => {
                pool.update(
                    index,
                    format!("[{}/{}] Downloaded {}", index + 1, work_total, kind.subdir()),
                );
            }
            SyncEvent::ScriptWritten { index, .. } => {
                pool.update(index, format!("[{}/{}] Script written", index + 1, work_total));
            }
            SyncEvent::GameCompleted { index, ref title, .. } => {
                pool.update(index, format!("[{}/{}] {} done", index + 1, work_total, title));
                pool.release(index);
            }
            SyncEvent::GamePartial { index, ref title, ref failed_kinds, .. } => {
                let kinds: Vec<&str> = failed_kinds.iter().map(|k| k.subdir()).collect();
                log::warn!(
                    "  {} {}: missing {}",
                    "~".if_supports_color(Stdout, |t| t.yellow()),
                    title,
                    kinds.join(", "),
                );
                pool.release(index);
            }
            SyncEvent::GameFailed { index, ref title, ref reason, .. } => {
                log::warn!(
                    "  {} {} failed: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    title,
                    reason,
                );
                pool.release(index);
            }
            SyncEvent::StageCompleted { .. } => {}
            SyncEvent::Done => {}
        })
        .await;

        pool.clear_all();

        match result {
            Ok(report) => {
                log::info!("");
                log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
                log::info!(
                    "  {} {} added, {} updated, {} removed",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    report.added,
                    report.updated,
                    report.removed,
                );
                if !report.partial.is_empty() {
                    log::warn!(
                        "  {} {} games synced with missing media",
                        "~".if_supports_color(Stdout, |t| t.yellow()),
                        report.partial.len(),
                    );
                }
                if report.failed > 0 {
                    log::warn!(
                        "  {} {} failed",
                        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                        report.failed,
                    );
                    for failure in &report.failures {
                        log::warn!("      {}: {}", failure.title, failure.reason);
                    }
                }
                if report.skipped > 0 {
                    log::warn!("  {} skipped (cancelled)", report.skipped);
                }

                if !report.dry_run {
                    save_directories(&config);
                }
                true
            }
            Err(e) => {
                log::error!(
                    "{} Sync failed: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    e,
                );
                false
            }
        }
    })
}

fn build_config(args: &SyncArgs) -> SyncConfig {
    let data = default_data_dir();
    let assets_dir = settings::resolve_dir(args.assets_dir.clone(), "assets", || {
        data.join("assets")
    });
    let scripts_dir = settings::resolve_dir(args.scripts_dir.clone(), "scripts", || {
        data.join("roms")
    });
    let gamelist_path = settings::resolve_dir(args.gamelist.clone(), "gamelist", || {
        data.join("gamelists").join("greenlight").join("gamelist.xml")
    });
    let state_dir =
        settings::resolve_dir(args.state_dir.clone(), "state", || data.join("state"));

    let mut config = SyncConfig::new(assets_dir, scripts_dir, gamelist_path, state_dir);
    config.workers = args.workers;
    config.refresh = args.refresh;
    config.dry_run = args.dry_run;

    config.selection = match args.kinds {
        Some(ref names) => AssetSelection::from_names(names),
        None if args.skip_videos => AssetSelection::without_videos(),
        None => AssetSelection::default(),
    };
    if args.skip_videos {
        config
            .selection
            .kinds
            .retain(|k| *k != greenlight_sync_core::AssetKind::Video);
    }
    if let Some(ref names) = args.force_redownload {
        config.force_kinds = AssetSelection::from_names(names).kinds;
    }
    config
}

/// Persist the resolved directories so the next run (CLI or GUI) reuses them.
fn save_directories(config: &SyncConfig) {
    let pairs = [
        ("assets", &config.assets_dir),
        ("scripts", &config.scripts_dir),
        ("gamelist", &config.gamelist_path),
        ("state", &config.state_dir),
    ];
    for (key, path) in pairs {
        if let Err(e) = settings::save_dir(key, Some(path)) {
            log::warn!("Could not save {} directory to settings: {}", key, e);
        }
    }
}
