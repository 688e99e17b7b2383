//! Command-line entry point: scan a directory and list its video items.

use std::env;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::FileCache;
use crate::config::Settings;
use crate::library::scan;
use crate::probe::{LoftyProbe, MetadataProbe};

mod logging;
mod report;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });

    let cache = open_cache(&settings);
    let probe = default_probe();
    let items = scan(Path::new(&dir), &settings.library, probe, cache.as_ref());
    info!(dir = %dir, count = items.len(), "scan complete");

    let mut pending = Vec::new();
    for item in &items {
        println!("{}", report::item_line(item));

        if settings.covers.resolve_on_scan {
            if let Some(cover) = item.cover() {
                if !cover.is_resolved() {
                    pending.push(cover.spawn_resolve(settings.covers.thumbnail_edge));
                }
            }
        }
    }

    for handle in pending {
        if handle.join().is_err() {
            warn!("cover resolution thread panicked");
        }
    }

    Ok(())
}

#[cfg(feature = "ffmpeg")]
fn default_probe() -> Arc<dyn MetadataProbe> {
    match crate::probe::FfmpegProbe::new() {
        Ok(probe) => Arc::new(probe),
        Err(e) => {
            warn!(error = %e, "failed to initialize ffmpeg, falling back to lofty");
            Arc::new(LoftyProbe::new())
        }
    }
}

#[cfg(not(feature = "ffmpeg"))]
fn default_probe() -> Arc<dyn MetadataProbe> {
    Arc::new(LoftyProbe::new())
}

fn open_cache(settings: &Settings) -> Option<Arc<FileCache>> {
    if !settings.cache.enabled {
        return None;
    }
    let dir = settings.cache_dir()?;
    match FileCache::open(&dir) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            // The cache is an optimization; run without it.
            warn!(dir = %dir.display(), error = %e, "failed to open cache, continuing without it");
            None
        }
    }
}
