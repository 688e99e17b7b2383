//! Metadata probing.
//!
//! A [`MetadataProbe`] opens a media file and hands back a [`ProbedMedia`]
//! exposing two independent fact groups: technical properties and
//! descriptive tags. Either group may fail without affecting the other.

#[cfg(feature = "ffmpeg")]
mod ffmpeg;
mod reader;

use std::path::Path;
use std::time::Duration;

use crate::error::ProbeError;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegProbe;
pub use reader::LoftyProbe;

/// Stream-level facts about an opened file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnicalProperties {
    pub duration: Duration,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Raw descriptive tags, as stored in the file.
///
/// Multi-value fields are empty when the tag is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptiveTags {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub composer: Option<String>,
    pub composer_sort: Option<String>,
    pub performers: Vec<String>,
    pub performers_sort: Vec<String>,
    pub album_artists: Vec<String>,
}

pub trait MetadataProbe: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn ProbedMedia>, ProbeError>;
}

pub trait ProbedMedia {
    fn properties(&self) -> Result<TechnicalProperties, ProbeError>;
    fn tags(&self) -> Result<DescriptiveTags, ProbeError>;
}

/// A probe that refuses every file. Items built with it stay empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProbe;

impl MetadataProbe for NoopProbe {
    fn open(&self, _path: &Path) -> Result<Box<dyn ProbedMedia>, ProbeError> {
        Err(ProbeError::Unsupported("metadata probe not enabled"))
    }
}
