//! Lazily resolved cover art.
//!
//! A [`Cover`] starts out as a handle to its source file. Resolution (embedded
//! artwork extraction and thumbnailing) happens on demand, possibly on another
//! thread, and is a single-fire transition: the first successful result is
//! kept and every registered listener runs exactly once.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoverError, ProbeError};

/// Longest edge of a generated thumbnail (DLNA `JPEG_TN`).
pub const DEFAULT_THUMBNAIL_EDGE: u32 = 160;

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub data: Vec<u8>,
}

type Listener = Box<dyn FnOnce(&Cover) + Send>;

pub struct Cover {
    source: PathBuf,
    art: OnceLock<CoverArt>,
    listeners: Mutex<Vec<Listener>>,
}

impl fmt::Debug for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cover")
            .field("source", &self.source)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl Cover {
    /// Create an unresolved cover for `path`. Fails when `path` is not a
    /// readable regular file.
    pub fn from_file(path: &Path) -> Result<Self, CoverError> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(CoverError::NotAFile(path.display().to_string()));
        }
        Ok(Self {
            source: path.to_path_buf(),
            art: OnceLock::new(),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// A cover whose artwork is already known, e.g. restored from the cache.
    pub fn resolved(source: PathBuf, art: CoverArt) -> Self {
        Self {
            source,
            art: OnceLock::from(art),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn art(&self) -> Option<&CoverArt> {
        self.art.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.art.get().is_some()
    }

    /// Run `f` once the cover resolves. Runs immediately if it already has.
    pub fn on_resolved(&self, f: impl FnOnce(&Cover) + Send + 'static) {
        let mut listeners = self.listeners.lock();
        if self.is_resolved() {
            drop(listeners);
            f(self);
        } else {
            listeners.push(Box::new(f));
        }
    }

    /// Resolve from the artwork embedded in the source file.
    pub fn resolve(&self, max_edge: u32) -> Result<&CoverArt, CoverError> {
        self.resolve_with(|path| extract_embedded_art(path, max_edge))
    }

    /// Resolve with a caller supplied loader. A failed load leaves the cover
    /// unresolved so a later call can try again.
    pub fn resolve_with<F>(&self, load: F) -> Result<&CoverArt, CoverError>
    where
        F: FnOnce(&Path) -> Result<CoverArt, CoverError>,
    {
        if let Some(art) = self.art.get() {
            return Ok(art);
        }

        let loaded = load(&self.source)?;
        let mut fresh = false;
        let art = self.art.get_or_init(|| {
            fresh = true;
            loaded
        });
        if fresh {
            self.notify();
        }
        Ok(art)
    }

    /// Resolve on a background thread.
    pub fn spawn_resolve(self: &Arc<Self>, max_edge: u32) -> JoinHandle<()> {
        let cover = Arc::clone(self);
        thread::spawn(move || {
            if let Err(e) = cover.resolve(max_edge) {
                debug!(path = %cover.source.display(), error = %e, "cover resolution failed");
            }
        })
    }

    fn notify(&self) {
        // Listeners may call back into the cover; never run them under the lock.
        let pending = std::mem::take(&mut *self.listeners.lock());
        for listener in pending {
            listener(self);
        }
    }
}

fn extract_embedded_art(path: &Path, max_edge: u32) -> Result<CoverArt, CoverError> {
    let tagged = Probe::open(path)
        .map_err(ProbeError::from)?
        .guess_file_type()?
        .read()
        .map_err(ProbeError::from)?;

    let picture = tagged
        .tags()
        .iter()
        .flat_map(|tag| tag.pictures())
        .next()
        .ok_or(CoverError::NoEmbeddedArt)?;

    thumbnail_jpeg(picture.data(), max_edge)
}

/// Decode `data`, shrink it to fit `max_edge` and re-encode it as JPEG.
pub fn thumbnail_jpeg(data: &[u8], max_edge: u32) -> Result<CoverArt, CoverError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let img = if img.width() > max_edge || img.height() > max_edge {
        img.thumbnail(max_edge, max_edge)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let mut jpeg_buf = Vec::new();
    let mut enc = JpegEncoder::new_with_quality(&mut jpeg_buf, JPEG_QUALITY);
    enc.encode_image(&rgb)?;

    Ok(CoverArt {
        width: rgb.width(),
        height: rgb.height(),
        mime_type: "image/jpeg".into(),
        data: jpeg_buf,
    })
}

/// Persisted form of a resolved cover, nested under the item's `c` key.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CoverRecord {
    #[serde(rename = "w")]
    width: u32,
    #[serde(rename = "h")]
    height: u32,
    #[serde(rename = "m")]
    mime_type: String,
    #[serde(rename = "d")]
    data: String,
}

impl CoverRecord {
    pub(crate) fn from_art(art: &CoverArt) -> Self {
        Self {
            width: art.width,
            height: art.height,
            mime_type: art.mime_type.clone(),
            data: STANDARD.encode(&art.data),
        }
    }

    pub(crate) fn into_cover(self, source: PathBuf) -> Result<Cover, CoverError> {
        let data = STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| CoverError::Encoding(e.to_string()))?;
        if data.is_empty() {
            return Err(CoverError::Encoding("empty image data".into()));
        }
        Ok(Cover::resolved(
            source,
            CoverArt {
                width: self.width,
                height: self.height,
                mime_type: self.mime_type,
                data,
            },
        ))
    }
}
