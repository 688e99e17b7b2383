//! Directory scanning: the folder layer that discovers video files and
//! builds their items.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use walkdir::WalkDir;

use crate::cache::{CacheStore, FileCache, NullCache};
use crate::config::LibrarySettings;
use crate::item::{ItemServices, VideoItem};
use crate::media_type::VideoType;
use crate::probe::MetadataProbe;

fn is_video_file(path: &Path, settings: &LibrarySettings) -> Option<VideoType> {
    let ext = path.extension().and_then(|s| s.to_str())?.to_ascii_lowercase();
    let wanted = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| !e.is_empty() && e == ext);
    if wanted { VideoType::from_extension(&ext) } else { None }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Discover video files under `dir` and build one item per file.
///
/// Items with a usable cache entry are restored from it; the rest start
/// uninitialized. Nothing is probed here. The result is sorted by base title,
/// case-insensitively.
pub fn scan(
    dir: &Path,
    settings: &LibrarySettings,
    probe: Arc<dyn MetadataProbe>,
    cache: Option<&Arc<FileCache>>,
) -> Vec<Arc<VideoItem>> {
    let mut items: Vec<Arc<VideoItem>> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let store: Arc<dyn CacheStore> = match cache {
        Some(cache) => Arc::clone(cache) as Arc<dyn CacheStore>,
        None => Arc::new(NullCache),
    };

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(kind) = is_video_file(path, settings) else {
            continue;
        };

        let cached = cache.and_then(|c| c.lookup(path, kind, Arc::clone(&probe)));
        let item = match cached {
            Some(item) => {
                debug!(path = %path.display(), "restored item from cache");
                item
            }
            None => VideoItem::new(
                path,
                kind,
                ItemServices::new(Arc::clone(&probe), Arc::clone(&store)),
            ),
        };
        items.push(Arc::new(item));
    }

    items.sort_by_key(|item| item.base_title().to_lowercase());
    items
}
