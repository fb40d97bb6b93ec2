use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use tempfile::TempDir;
use tokio::sync::mpsc;

use greenlight_sync_catalog::{CatalogError, CatalogSource};
use greenlight_sync_core::{AssetKind, CatalogEntry};
use greenlight_sync_engine::{
    CancelFlag, StateStore, SyncConfig, SyncEvent, SyncReport, clean_assets, sync,
};
use greenlight_sync_frontend::parse_gamelist;

/// Per-URL behavior of the stub provider.
enum StubAsset {
    Bytes(Vec<u8>),
    Status(u16),
    /// Fail with 503 this many times, then serve the bytes.
    FlakyThenBytes(usize, Vec<u8>),
}

struct StubSource {
    entries: Vec<CatalogEntry>,
    assets: HashMap<String, StubAsset>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StubSource {
    fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            assets: HashMap::new(),
            hits: Mutex::new(HashMap::new()),
        }
    }

    fn with_asset(mut self, url: &str, asset: StubAsset) -> Self {
        self.assets.insert(url.to_string(), asset);
        self
    }

    fn hits_for(&self, url: &str) -> usize {
        *self.hits.lock().unwrap().get(url).unwrap_or(&0)
    }
}

impl CatalogSource for StubSource {
    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.entries.clone())
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let count = {
            let mut hits = self.hits.lock().unwrap();
            let count = hits.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        match self.assets.get(url) {
            None => Err(CatalogError::Status { status: 404 }),
            Some(StubAsset::Bytes(bytes)) => Ok(bytes.clone()),
            Some(StubAsset::Status(status)) => Err(CatalogError::Status { status: *status }),
            Some(StubAsset::FlakyThenBytes(failures, bytes)) => {
                if count <= *failures {
                    Err(CatalogError::Status { status: 503 })
                } else {
                    Ok(bytes.clone())
                }
            }
        }
    }
}

fn entry(id: &str, title: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        title: title.to_string(),
        sort_title: title.to_string(),
        release_date: None,
        description: None,
        developer: None,
        logo_url: None,
        cover_url: None,
        fanart_url: None,
        video_url: None,
    }
}

fn config(root: &Path) -> SyncConfig {
    let mut config = SyncConfig::new(
        root.join("assets"),
        root.join("scripts"),
        root.join("gamelist").join("gamelist.xml"),
        root.join("state"),
    );
    // Tests drive the stub directly; the day-cache would mask catalog
    // changes between runs.
    config.refresh = true;
    config
}

async fn run(source: &StubSource, config: &SyncConfig) -> (SyncReport, Vec<SyncEvent>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let report = sync(source, config, tx, &CancelFlag::new()).await.unwrap();
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    (report, events)
}

#[tokio::test]
async fn two_game_catalog_then_removal() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let source = StubSource::new(vec![entry("g1", "A"), entry("g2", "B")]);
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 2);
    assert_eq!(report.updated, 0);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failed, 0);

    // Two records, two scripts, a gamelist with two nodes
    let records = StateStore::new(&config.state_dir).load().unwrap();
    assert_eq!(records.len(), 2);
    assert!(config.scripts_dir.join("g1.sh").exists());
    assert!(config.scripts_dir.join("g2.sh").exists());
    assert_eq!(parse_gamelist(&config.gamelist_path).unwrap().len(), 2);

    // g2 disappears from the catalog
    let source = StubSource::new(vec![entry("g1", "A")]);
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 0);
    assert_eq!(report.updated, 0);
    assert_eq!(report.removed, 1);
    assert_eq!(report.failed, 0);

    let records = StateStore::new(&config.state_dir).load().unwrap();
    assert_eq!(records.len(), 1);
    assert!(!config.scripts_dir.join("g2.sh").exists());
    assert_eq!(parse_gamelist(&config.gamelist_path).unwrap().len(), 1);
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://logo-g1".to_string());
    let source = StubSource::new(vec![g1, entry("g2", "B")])
        .with_asset("stub://logo-g1", StubAsset::Bytes(b"logo".to_vec()));

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 2);
    let first = std::fs::read(&config.gamelist_path).unwrap();
    assert_eq!(source.hits_for("stub://logo-g1"), 1);

    let (report, events) = run(&source, &config).await;
    assert_eq!(report.added + report.updated + report.removed + report.failed, 0);
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::PlanComputed {
            add: 0,
            update: 0,
            remove: 0
        }
    )));
    // No re-download, byte-identical gamelist
    assert_eq!(source.hits_for("stub://logo-g1"), 1);
    assert_eq!(std::fs::read(&config.gamelist_path).unwrap(), first);
}

#[tokio::test]
async fn partial_asset_failure_keeps_the_game() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://logo".to_string());
    g1.cover_url = Some("stub://cover".to_string());
    g1.video_url = Some("stub://video".to_string());
    let source = StubSource::new(vec![g1])
        .with_asset("stub://logo", StubAsset::Bytes(b"logo".to_vec()))
        .with_asset("stub://cover", StubAsset::Bytes(b"cover".to_vec()))
        .with_asset("stub://video", StubAsset::Status(404));

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1);
    assert_eq!(report.failed, 0);
    assert!(!report.is_clean());
    assert_eq!(report.partial.len(), 1);
    assert_eq!(report.partial[0].failed_kinds, vec![AssetKind::Video]);

    let records = StateStore::new(&config.state_dir).load().unwrap();
    let record = &records["g1"];
    assert!(record.asset_paths.contains_key(&AssetKind::Logo));
    assert!(record.asset_paths.contains_key(&AssetKind::Cover));
    assert!(!record.asset_paths.contains_key(&AssetKind::Video));

    // A 404 is permanent: no retries happened
    assert_eq!(source.hits_for("stub://video"), 1);
}

#[tokio::test]
async fn every_asset_failing_fails_the_game() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://logo".to_string());
    let source = StubSource::new(vec![g1, entry("g2", "B")]);

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1, "the url-less game still syncs");
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].id, "g1");

    // Failed adds stay out of state and gamelist
    let records = StateStore::new(&config.state_dir).load().unwrap();
    assert!(!records.contains_key("g1"));
    assert_eq!(parse_gamelist(&config.gamelist_path).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_backoff() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://flaky".to_string());
    let source = StubSource::new(vec![g1])
        .with_asset("stub://flaky", StubAsset::FlakyThenBytes(2, b"logo".to_vec()));

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1);
    assert!(report.is_clean());
    assert_eq!(source.hits_for("stub://flaky"), 3);

    let records = StateStore::new(&config.state_dir).load().unwrap();
    let logo = &records["g1"].asset_paths[&AssetKind::Logo];
    assert_eq!(std::fs::read(logo).unwrap(), b"logo");
    // No stray .part file after the rename
    assert!(!logo.with_extension("part").exists());
}

#[tokio::test(start_paused = true)]
async fn persistent_transient_failure_gives_up_after_three_attempts() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://down".to_string());
    let source =
        StubSource::new(vec![g1]).with_asset("stub://down", StubAsset::Status(503));

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.failed, 1);
    assert_eq!(source.hits_for("stub://down"), 3);
}

#[tokio::test]
async fn missing_local_file_is_repaired() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://logo".to_string());
    let source =
        StubSource::new(vec![g1]).with_asset("stub://logo", StubAsset::Bytes(b"logo".to_vec()));

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1);

    let records = StateStore::new(&config.state_dir).load().unwrap();
    let logo = records["g1"].asset_paths[&AssetKind::Logo].clone();
    std::fs::remove_file(&logo).unwrap();

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.updated, 1, "missing file forces a re-sync");
    assert!(logo.exists());
    assert_eq!(source.hits_for("stub://logo"), 2);
}

#[tokio::test]
async fn force_kinds_redownloads_existing_assets() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.logo_url = Some("stub://logo".to_string());
    let source =
        StubSource::new(vec![g1]).with_asset("stub://logo", StubAsset::Bytes(b"fresh".to_vec()));

    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1);
    let records = StateStore::new(&config.state_dir).load().unwrap();
    let logo = records["g1"].asset_paths[&AssetKind::Logo].clone();
    std::fs::write(&logo, b"stale").unwrap();

    config.force_kinds = vec![AssetKind::Logo];
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.updated, 1);
    assert_eq!(std::fs::read(&logo).unwrap(), b"fresh");
    assert_eq!(source.hits_for("stub://logo"), 2);
}

#[tokio::test]
async fn cancelled_run_skips_everything_cleanly() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());
    let source = StubSource::new(vec![entry("g1", "A"), entry("g2", "B")]);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let (tx, _rx) = mpsc::unbounded_channel();
    let report = sync(&source, &config, tx, &cancel).await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.added, 0);
    assert!(StateStore::new(&config.state_dir).load().unwrap().is_empty());
    assert!(!config.scripts_dir.join("g1.sh").exists());
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(tmp.path());
    config.dry_run = true;
    let source = StubSource::new(vec![entry("g1", "A")]);

    let (report, _) = run(&source, &config).await;
    assert!(report.dry_run);
    assert_eq!(report.added, 1);
    assert!(!config.gamelist_path.exists());
    assert!(!StateStore::new(&config.state_dir).path().exists());
    assert!(!config.scripts_dir.exists());
}

#[tokio::test]
async fn foreign_gamelist_entries_survive_removal() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let source = StubSource::new(vec![entry("g1", "A")]);
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1);

    // The user hand-adds an unrelated entry
    let contents = std::fs::read_to_string(&config.gamelist_path).unwrap();
    let manual = "  <game>\n    <path>./manual.sh</path>\n    <name>Manual</name>\n  </game>\n</gameList>";
    std::fs::write(
        &config.gamelist_path,
        contents.replace("</gameList>", manual),
    )
    .unwrap();

    // g1 disappears
    let source = StubSource::new(vec![entry("g2", "B")]);
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.removed, 1);
    assert_eq!(report.added, 1);

    let nodes = parse_gamelist(&config.gamelist_path).unwrap();
    let names: Vec<_> = nodes.iter().filter_map(|n| n.get("name")).collect();
    assert!(names.contains(&"Manual"));
    assert!(names.contains(&"B"));
    assert!(!names.contains(&"A"));
}

#[tokio::test]
async fn clean_assets_leaves_state_intact() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());

    let mut g1 = entry("g1", "A");
    g1.cover_url = Some("stub://cover".to_string());
    let source =
        StubSource::new(vec![g1]).with_asset("stub://cover", StubAsset::Bytes(b"cover".to_vec()));
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.added, 1);

    let store = StateStore::new(&config.state_dir);
    let records = store.load().unwrap();
    let cover = records["g1"].asset_paths[&AssetKind::Cover].clone();

    assert_eq!(clean_assets(&records, &[AssetKind::Cover]), 1);
    assert!(!cover.exists());
    // Records and id list untouched
    assert_eq!(store.load().unwrap().len(), 1);

    // The next sync repairs the hole
    let (report, _) = run(&source, &config).await;
    assert_eq!(report.updated, 1);
    assert!(cover.exists());
}
