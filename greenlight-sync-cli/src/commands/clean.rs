use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use greenlight_sync_core::AssetSelection;
use greenlight_sync_engine::{StateStore, clean_assets, settings};

use crate::commands::default_data_dir;

/// Run the clean command: delete stored assets of the given kinds across
/// all synced games. The state file's id list is left untouched; the next
/// sync re-downloads whatever is still wanted.
pub(crate) fn run_clean(kinds: Vec<String>, state_dir: Option<PathBuf>) -> bool {
    let selection = AssetSelection::from_names(&kinds);
    if selection.kinds.is_empty() {
        log::error!(
            "{} No valid asset kinds in '{}' (expected logos, covers, fanart or videos)",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            kinds.join(","),
        );
        return false;
    }

    let state_dir =
        settings::resolve_dir(state_dir, "state", || default_data_dir().join("state"));
    let store = StateStore::new(&state_dir);
    let records = match store.load() {
        Ok(r) => r,
        Err(e) => {
            log::error!(
                "{} Could not load sync state: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            return false;
        }
    };

    if records.is_empty() {
        log::info!("Nothing synced yet, nothing to clean.");
        return true;
    }

    let removed = clean_assets(&records, &selection.kinds);
    log::info!(
        "{} Deleted {} asset files across {} games",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        removed,
        records.len(),
    );
    true
}
