use tracing::warn;

use crate::config::Settings;

/// Settings for this run. A broken or invalid config never blocks a scan.
pub fn load_settings() -> Settings {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            return Settings::default();
        }
    };
    match settings.validate() {
        Ok(()) => settings,
        Err(e) => {
            warn!(error = %e, "invalid config, using defaults");
            Settings::default()
        }
    }
}
