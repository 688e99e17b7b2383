//! Cache stores that keep persisted item entries in sync.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::PersistError;
use crate::item::{ItemServices, VideoItem};
use crate::media_type::VideoType;
use crate::probe::MetadataProbe;

/// Why an item asked for its entry to be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// Metadata extraction ran for the first time.
    Materialized,
    /// The item's cover finished resolving.
    CoverResolved,
}

/// Receives refresh signals from items. Signals are fire-and-forget: the
/// item neither waits for nor inspects the outcome.
pub trait CacheStore: Send + Sync {
    fn refresh_entry(&self, item: &VideoItem, reason: RefreshReason);
}

/// Drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl CacheStore for NullCache {
    fn refresh_entry(&self, _item: &VideoItem, _reason: RefreshReason) {}
}

/// One JSON file per item under a cache directory, named after the SHA-256
/// of the media path.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
    writes: Mutex<()>,
}

impl FileCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            writes: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, media: &Path) -> PathBuf {
        let hash = {
            let mut hasher = Sha256::new();
            hasher.update(media.to_string_lossy().as_bytes());
            hex::encode(hasher.finalize())
        };
        self.dir.join(format!("{hash}.json"))
    }

    /// Write the item's current state.
    ///
    /// Each write goes through its own temporary file and is renamed into
    /// place. Snapshots are taken and written under one lock, so the last
    /// writer always lands the newest state.
    pub fn store(&self, item: &VideoItem) -> Result<(), PersistError> {
        let dest = self.entry_path(item.path());
        let _writing = self.writes.lock();

        let bytes = item.encode()?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        Ok(())
    }

    /// Rebuild an item from its entry, if there is a usable one.
    ///
    /// Entries older than the media file are ignored, as are entries that
    /// fail to decode. The returned item reports back to this cache.
    pub fn lookup(
        self: &Arc<Self>,
        path: &Path,
        kind: VideoType,
        probe: Arc<dyn MetadataProbe>,
    ) -> Option<VideoItem> {
        let entry = self.entry_path(path);
        let entry_meta = fs::metadata(&entry).ok()?;
        if is_stale(path, &entry_meta) {
            debug!(path = %path.display(), "cache entry is older than media file");
            return None;
        }

        let bytes = match fs::read(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(entry = %entry.display(), error = %e, "failed to read cache entry");
                return None;
            }
        };

        let cache: Arc<dyn CacheStore> = Arc::clone(self) as Arc<dyn CacheStore>;
        match VideoItem::decode(&bytes, path, kind, ItemServices::new(probe, cache)) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(entry = %entry.display(), error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }
}

impl CacheStore for FileCache {
    fn refresh_entry(&self, item: &VideoItem, reason: RefreshReason) {
        match self.store(item) {
            Ok(()) => debug!(path = %item.path().display(), ?reason, "cache entry refreshed"),
            Err(e) => warn!(path = %item.path().display(), ?reason, error = %e, "failed to refresh cache entry"),
        }
    }
}

fn is_stale(media: &Path, entry: &fs::Metadata) -> bool {
    let media_mtime = fs::metadata(media).and_then(|m| m.modified());
    match (media_mtime, entry.modified()) {
        (Ok(media), Ok(entry)) => media > entry,
        _ => false,
    }
}
