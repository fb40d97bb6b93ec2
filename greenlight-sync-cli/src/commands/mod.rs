pub mod clean;
pub mod config;
pub mod integrate;
pub mod sync;

use std::path::PathBuf;

/// Base of all default directories: `<data_dir>/greenlight-sync`.
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("greenlight-sync")
}
