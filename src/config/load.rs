use std::{env, path::PathBuf};

use thiserror::Error;

use super::schema::Settings;

/// Why a loaded [`Settings`] cannot be used for a scan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSettings {
    #[error("covers.thumbnail_edge must be at least 1 pixel")]
    ZeroThumbnailEdge,

    #[error("library.extensions does not name any video extension")]
    NoVideoExtensions,
}

impl Settings {
    /// Layers `MARQUEE__*` variables over the config file found by
    /// [`resolve_config_path`]. Keys missing from both keep their defaults,
    /// and a missing file is not an error.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("MARQUEE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings a scan cannot run with.
    pub fn validate(&self) -> Result<(), InvalidSettings> {
        if self.covers.thumbnail_edge == 0 {
            return Err(InvalidSettings::ZeroThumbnailEdge);
        }
        if self.library.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(InvalidSettings::NoVideoExtensions);
        }
        Ok(())
    }

    /// Where item entries are kept: `cache.dir` if set, else the XDG cache dir.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache.dir.clone().or_else(default_cache_dir)
    }
}

/// `MARQUEE_CONFIG_PATH` when set, otherwise [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os("MARQUEE_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/marquee/config.toml`, or under `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("marquee").join("config.toml"))
}

/// `$XDG_CACHE_HOME/marquee`, or under `~/.cache`.
pub fn default_cache_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache").map(|d| d.join("marquee"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    env::var_os(var)
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback)))
}
