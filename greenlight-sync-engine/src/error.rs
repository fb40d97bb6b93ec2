use std::path::PathBuf;

use greenlight_sync_catalog::CatalogError;
use greenlight_sync_core::AssetKind;
use greenlight_sync_frontend::GamelistError;

/// Fatal errors from the three single-threaded checkpoints of a sync run
/// (catalog fetch, state store, gamelist write). Per-game problems are
/// never a `SyncError` — they end up in the report instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("catalog fetch failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt state file {path}: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("gamelist update failed: {0}")]
    Gamelist(#[from] GamelistError),
}

/// A single asset download failure. Recorded per kind; does not abort the
/// owning game nor the run.
#[derive(Debug, thiserror::Error)]
#[error("{} asset from {url}: {source}", .kind.subdir())]
pub struct AssetError {
    pub kind: AssetKind,
    pub url: String,
    #[source]
    pub source: CatalogError,
}
