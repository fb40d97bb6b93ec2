//! Launch-script generation.
//!
//! Each synced game gets a small executable shell script the frontend
//! treats as the "ROM". The script starts the Greenlight streaming client
//! with the game's product id; the title only appears as a comment so a
//! rename on the provider side never changes what the script launches.

use std::path::{Path, PathBuf};

use greenlight_sync_core::CatalogEntry;

pub fn script_path(scripts_dir: &Path, id: &str) -> PathBuf {
    scripts_dir.join(format!("{id}.sh"))
}

/// Write the launch script for a game. Deterministic for a given entry;
/// overwrites any previous script for the same id.
pub fn generate_script(entry: &CatalogEntry, scripts_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(scripts_dir)?;
    let path = script_path(scripts_dir, &entry.id);
    std::fs::write(&path, script_body(entry))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

fn script_body(entry: &CatalogEntry) -> String {
    let mut body = String::new();
    body.push_str("#!/bin/bash\n");
    body.push_str(&format!("# {}\n", entry.title));
    body.push_str(&format!(
        "flatpak run --socket=wayland --env=ELECTRON_ENABLE_WAYLAND=1 io.github.unknownskl.greenlight --fullscreen --connect='{}'\n",
        entry.id
    ));
    body
}
