use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use greenlight_sync_engine::settings;
use greenlight_sync_frontend::ensure_system_entry;

use crate::commands::default_data_dir;

/// Run the integrate command: add the Greenlight system to an ES-DE
/// custom systems file so the synced library shows up in the frontend.
pub(crate) fn run_integrate(es_systems: &Path, scripts_dir: Option<PathBuf>) -> bool {
    let scripts_dir =
        settings::resolve_dir(scripts_dir, "scripts", || default_data_dir().join("roms"));

    match ensure_system_entry(es_systems, &scripts_dir) {
        Ok(true) => {
            log::info!(
                "{} Added the greenlight system to {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                es_systems.display(),
            );
            true
        }
        Ok(false) => {
            log::info!(
                "{} {} already contains a greenlight system",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                es_systems.display(),
            );
            true
        }
        Err(e) => {
            log::error!(
                "{} Could not update {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                es_systems.display(),
                e,
            );
            false
        }
    }
}
