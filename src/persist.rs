//! Persisted item representation.
//!
//! Schema (JSON object, one short key per field):
//!
//! | key  | field       | type              | absent as      |
//! |------|-------------|-------------------|----------------|
//! | `v`  | version     | u8                | missing → 1    |
//! | `a`  | actors      | [string]          | null           |
//! | `de` | description | string            | null           |
//! | `di` | director    | string            | null           |
//! | `g`  | genre       | string            | null           |
//! | `t`  | title       | string            | null           |
//! | `w`  | width       | u32               | null           |
//! | `h`  | height      | u32               | null           |
//! | `du` | duration    | i64, 100 ns ticks | 0              |
//! | `c`  | cover       | object            | null           |
//!
//! The file path and container type are not stored; the caller supplies
//! them when decoding.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::cover::{Cover, CoverRecord};
use crate::error::{CoverError, PersistError};
use crate::item::{ItemServices, VideoItem, VideoMetadata, normalize_duration};
use crate::media_type::VideoType;

pub const RECORD_VERSION: u8 = 1;

const NANOS_PER_TICK: u128 = 100;

#[derive(Debug, Serialize, Deserialize)]
struct ItemRecord {
    #[serde(rename = "v", default = "first_version")]
    version: u8,
    #[serde(rename = "a", default)]
    actors: Option<Vec<String>>,
    #[serde(rename = "de", default)]
    description: Option<String>,
    #[serde(rename = "di", default)]
    director: Option<String>,
    #[serde(rename = "g", default)]
    genre: Option<String>,
    #[serde(rename = "t", default)]
    title: Option<String>,
    #[serde(rename = "w", default)]
    width: Option<u32>,
    #[serde(rename = "h", default)]
    height: Option<u32>,
    #[serde(rename = "du", default)]
    duration_ticks: i64,
    /// Kept untyped so a broken cover cannot fail the whole record.
    #[serde(rename = "c", default)]
    cover: Option<Value>,
}

fn first_version() -> u8 {
    1
}

/// Absent encodes as 0.
pub(crate) fn duration_to_ticks(duration: Option<Duration>) -> i64 {
    duration
        .map(|d| i64::try_from(d.as_nanos() / NANOS_PER_TICK).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// 0 (and anything else below the minimum duration) decodes as absent.
pub(crate) fn ticks_to_duration(ticks: i64) -> Option<Duration> {
    let ticks = u64::try_from(ticks).ok().filter(|t| *t > 0)?;
    normalize_duration(Duration::from_nanos(ticks.saturating_mul(100)))
}

impl VideoItem {
    /// Encode the item's current state.
    ///
    /// This does not trigger materialization: an item that has not been
    /// read yet encodes with every field absent.
    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        let metadata = self.known_metadata().cloned().unwrap_or_default();
        let cover = self
            .resolved_cover()
            .and_then(|cover| cover.art().map(CoverRecord::from_art))
            .map(serde_json::to_value)
            .transpose()?;

        let record = ItemRecord {
            version: RECORD_VERSION,
            actors: metadata.actors,
            description: metadata.description,
            director: metadata.director,
            genre: metadata.genre,
            title: metadata.title,
            width: metadata.width,
            height: metadata.height,
            duration_ticks: duration_to_ticks(metadata.duration),
            cover,
        };
        Ok(serde_json::to_vec(&record)?)
    }

    /// Rebuild an item from [`VideoItem::encode`] output.
    ///
    /// The result is initialized and will never probe its file. A cover that
    /// fails to decode is dropped on its own; the rest of the record is kept.
    pub fn decode(
        bytes: &[u8],
        path: impl Into<PathBuf>,
        kind: VideoType,
        services: ItemServices,
    ) -> Result<Self, PersistError> {
        let record: ItemRecord = serde_json::from_slice(bytes)?;
        if record.version > RECORD_VERSION {
            return Err(PersistError::UnsupportedVersion(record.version));
        }

        let path = path.into();
        let cover = record
            .cover
            .filter(|value| !value.is_null())
            .and_then(|value| decode_cover(value, &path));

        let metadata = VideoMetadata {
            title: record.title,
            description: record.description,
            director: record.director,
            genre: record.genre,
            actors: record.actors,
            duration: ticks_to_duration(record.duration_ticks),
            width: record.width,
            height: record.height,
        };

        Ok(Self::with_metadata(path, kind, services, metadata, cover))
    }
}

fn decode_cover(value: Value, path: &Path) -> Option<Cover> {
    let decoded = serde_json::from_value::<CoverRecord>(value)
        .map_err(|e| CoverError::Encoding(e.to_string()))
        .and_then(|record| record.into_cover(path.to_path_buf()));
    match decoded {
        Ok(cover) => Some(cover),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dropping undecodable cover");
            None
        }
    }
}
