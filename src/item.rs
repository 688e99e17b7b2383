//! The video item record.
//!
//! A [`VideoItem`] is created cheaply when its file is discovered and only
//! pays for metadata extraction the first time one of its descriptive
//! accessors is read. Whenever its known state grows (first materialization,
//! cover resolution) the owning [`CacheStore`] is told to refresh the entry.

mod materialize;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStore, RefreshReason};
use crate::cover::Cover;
use crate::error::MetadataError;
use crate::media_type::VideoType;
use crate::probe::MetadataProbe;

pub(crate) use materialize::normalize_duration;

/// Probed durations shorter than this are treated as unknown.
pub const MIN_DURATION: Duration = Duration::from_millis(100);

/// Joins the file-derived title and the tagged title in [`VideoItem::display_title`].
pub const TITLE_SEPARATOR: &str = " — ";

/// Collaborators an item reaches out to.
#[derive(Clone)]
pub struct ItemServices {
    pub probe: Arc<dyn MetadataProbe>,
    pub cache: Arc<dyn CacheStore>,
}

impl ItemServices {
    pub fn new(probe: Arc<dyn MetadataProbe>, cache: Arc<dyn CacheStore>) -> Self {
        Self { probe, cache }
    }
}

/// Everything materialization can learn about a file. Any field may be
/// absent when the probe could not provide it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub actors: Option<Vec<String>>,
    pub duration: Option<Duration>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub struct VideoItem {
    path: PathBuf,
    kind: VideoType,
    services: ItemServices,
    metadata: OnceLock<VideoMetadata>,
    /// Handle handed out by [`VideoItem::cover`], resolved or not.
    cover: Mutex<Option<Arc<Cover>>>,
    /// The cover once its artwork is known; this is what gets persisted.
    resolved_cover: Mutex<Option<Arc<Cover>>>,
}

impl fmt::Debug for VideoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoItem")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("metadata", &self.metadata.get())
            .finish_non_exhaustive()
    }
}

impl VideoItem {
    /// An uninitialized item; nothing is read from `path` yet.
    pub fn new(path: impl Into<PathBuf>, kind: VideoType, services: ItemServices) -> Self {
        Self {
            path: path.into(),
            kind,
            services,
            metadata: OnceLock::new(),
            cover: Mutex::new(None),
            resolved_cover: Mutex::new(None),
        }
    }

    /// An item whose metadata is already known. It is never probed.
    pub(crate) fn with_metadata(
        path: PathBuf,
        kind: VideoType,
        services: ItemServices,
        metadata: VideoMetadata,
        cover: Option<Cover>,
    ) -> Self {
        let cover = cover.map(Arc::new);
        Self {
            path,
            kind,
            services,
            metadata: OnceLock::from(metadata),
            cover: Mutex::new(cover.clone()),
            resolved_cover: Mutex::new(cover),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> VideoType {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.metadata.get().is_some()
    }

    /// The filesystem-derived title: the file stem, with any invalid UTF-8
    /// replaced.
    pub fn base_title(&self) -> Cow<'_, str> {
        match self.path.file_stem() {
            Some(stem) => stem.to_string_lossy(),
            None => Cow::Borrowed("UNKNOWN"),
        }
    }

    /// Run extraction if it has not run yet and return the result.
    ///
    /// Extraction runs at most once per item, even under concurrent first
    /// access, and never fails: whatever the probe could not provide stays
    /// absent. The cache store is signalled once the result is visible.
    pub fn ensure_materialized(&self) -> &VideoMetadata {
        if let Some(metadata) = self.metadata.get() {
            return metadata;
        }

        let mut fresh = false;
        let metadata = self.metadata.get_or_init(|| {
            fresh = true;
            materialize::extract(self.services.probe.as_ref(), &self.path)
        });
        if fresh {
            self.services
                .cache
                .refresh_entry(self, RefreshReason::Materialized);
        }
        metadata
    }

    /// Metadata as currently known, without triggering extraction.
    pub(crate) fn known_metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.get()
    }

    pub fn title(&self) -> Option<&str> {
        self.ensure_materialized().title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.ensure_materialized().description.as_deref()
    }

    pub fn director(&self) -> Option<&str> {
        self.ensure_materialized().director.as_deref()
    }

    pub fn actors(&self) -> Option<&[String]> {
        self.ensure_materialized().actors.as_deref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.ensure_materialized().duration
    }

    pub fn width(&self) -> Option<u32> {
        self.ensure_materialized().width
    }

    pub fn height(&self) -> Option<u32> {
        self.ensure_materialized().height
    }

    /// The tagged genre.
    ///
    /// Unlike every other accessor this one does not hand back absence: a
    /// missing or blank genre is reported as [`MetadataError::GenreUnsupported`],
    /// and callers must be ready for it.
    pub fn genre(&self) -> Result<&str, MetadataError> {
        match self.ensure_materialized().genre.as_deref() {
            Some(genre) if !genre.trim().is_empty() => Ok(genre),
            _ => Err(MetadataError::GenreUnsupported),
        }
    }

    /// `"<file stem> — <tagged title>"`, or just the file stem when the file
    /// carries no usable title.
    pub fn display_title(&self) -> String {
        match self.title() {
            Some(title) if !title.trim().is_empty() => {
                format!("{}{TITLE_SEPARATOR}{}", self.base_title(), title)
            }
            _ => self.base_title().into_owned(),
        }
    }

    /// The cover handle, created on first use.
    ///
    /// Creation failure yields `None` and is retried on the next call. Once a
    /// handle resolves, the item keeps it as its persisted cover and signals
    /// the cache store.
    pub fn cover(self: &Arc<Self>) -> Option<Arc<Cover>> {
        self.ensure_materialized();

        let mut slot = self.cover.lock();
        if let Some(cover) = slot.as_ref() {
            return Some(Arc::clone(cover));
        }

        let cover = match Cover::from_file(&self.path) {
            Ok(cover) => Arc::new(cover),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no cover for item");
                return None;
            }
        };
        *slot = Some(Arc::clone(&cover));
        drop(slot);

        let item: Weak<Self> = Arc::downgrade(self);
        cover.on_resolved(move |_| {
            if let Some(item) = item.upgrade() {
                item.cover_resolved();
            }
        });
        Some(cover)
    }

    /// The cover as persisted: only present once it has resolved.
    pub fn resolved_cover(&self) -> Option<Arc<Cover>> {
        self.resolved_cover.lock().clone()
    }

    fn cover_resolved(&self) {
        let handle = self.cover.lock().clone();
        *self.resolved_cover.lock() = handle;
        self.services
            .cache
            .refresh_entry(self, RefreshReason::CoverResolved);
    }
}

#[cfg(test)]
mod tests;
