//! Shared application settings (sync directories, config file location).
//!
//! Both the CLI and any GUI front end use these functions so the settings
//! file is always `~/.config/greenlight-sync/settings.toml` and directory
//! resolution is consistent across front ends.

use std::io;
use std::path::{Path, PathBuf};

/// Canonical path to the shared settings file.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("greenlight-sync").join("settings.toml")
}

/// Resolve a configured directory using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. Saved `directories.<key>` in `settings.toml`
/// 3. The provided default
pub fn resolve_dir(
    cli_override: Option<PathBuf>,
    key: &str,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = load_dir(key) {
        return p;
    }
    default()
}

/// Read `directories.<key>` from `settings.toml`, if set.
fn load_dir(key: &str) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let dir = doc.get("directories")?.get(key)?.as_str()?;
    if dir.is_empty() {
        None
    } else {
        Some(PathBuf::from(dir))
    }
}

/// Save (or clear) a directory in `settings.toml`.
///
/// Uses `toml::Value` for a surgical update so unrelated fields added by
/// other front ends are preserved.
pub fn save_dir(key: &str, path: Option<&Path>) -> io::Result<()> {
    let settings = settings_path();
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(&settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let directories = table
        .entry("directories")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let dir_table = directories
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[directories] is not a table"))?;

    match path {
        Some(p) => {
            dir_table.insert(
                key.to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            dir_table.remove(key);
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, &settings)?;

    Ok(())
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}
