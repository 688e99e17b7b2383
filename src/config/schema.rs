use std::path::PathBuf;

use serde::Deserialize;

use crate::cover::DEFAULT_THUMBNAIL_EDGE;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/marquee/config.toml` or `~/.config/marquee/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MARQUEE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub cache: CacheSettings,
    pub covers: CoverSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as video (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: [
                "avi", "divx", "flv", "m2ts", "m4v", "mkv", "mov", "mp4", "mpeg", "mpg", "ogm",
                "ogv", "ts", "webm", "wmv",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Persist item entries between runs.
    pub enabled: bool,
    /// Cache directory. Defaults to `$XDG_CACHE_HOME/marquee` or `~/.cache/marquee`.
    pub dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverSettings {
    /// Resolve every item's cover in the background after a scan.
    pub resolve_on_scan: bool,
    /// Longest edge of generated cover thumbnails, in pixels.
    pub thumbnail_edge: u32,
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            resolve_on_scan: false,
            thumbnail_edge: DEFAULT_THUMBNAIL_EDGE,
        }
    }
}
