use greenlight_sync_engine::settings;

/// Show the current settings file contents.
pub(crate) fn run_show() -> bool {
    match settings::load_settings_string() {
        Some(contents) => {
            log::info!("{}", contents.trim_end());
            true
        }
        None => {
            log::info!(
                "No settings saved yet ({})",
                settings::settings_path().display(),
            );
            true
        }
    }
}

/// Print the settings file path.
pub(crate) fn run_path() -> bool {
    log::info!("{}", settings::settings_path().display());
    true
}
