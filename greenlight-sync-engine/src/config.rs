use std::path::PathBuf;

use greenlight_sync_core::{AssetKind, AssetSelection};

const DEFAULT_WORKERS: usize = 4;

/// Immutable configuration for one sync run.
///
/// Passed by value into [`sync`](crate::sync::sync); nothing in the
/// engine reads process-wide state.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base directory for downloaded media
    /// (`<assets_dir>/{logos,covers,fanart,videos}/<id>.<ext>`).
    pub assets_dir: PathBuf,
    /// Directory the launch scripts are written to (`<id>.sh`).
    pub scripts_dir: PathBuf,
    /// The frontend's gamelist.xml for this system.
    pub gamelist_path: PathBuf,
    /// Directory holding the state file and catalog cache.
    pub state_dir: PathBuf,
    /// Worker pool size for per-game processing.
    pub workers: usize,
    /// Which asset kinds to download (videos are skippable).
    pub selection: AssetSelection,
    /// Kinds to re-download even when fingerprints match and files exist.
    pub force_kinds: Vec<AssetKind>,
    /// Bypass the catalog day-cache.
    pub refresh: bool,
    /// Compute and report the plan without touching anything.
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn new(
        assets_dir: impl Into<PathBuf>,
        scripts_dir: impl Into<PathBuf>,
        gamelist_path: impl Into<PathBuf>,
        state_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            scripts_dir: scripts_dir.into(),
            gamelist_path: gamelist_path.into(),
            state_dir: state_dir.into(),
            workers: DEFAULT_WORKERS,
            selection: AssetSelection::default(),
            force_kinds: Vec::new(),
            refresh: false,
            dry_run: false,
        }
    }
}
