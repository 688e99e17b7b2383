//! Lazily materialized video item metadata, kept in sync with a persisted
//! item cache.
//!
//! A [`VideoItem`] is built for every discovered file without touching it.
//! The first read of a descriptive attribute probes the file once, keeps
//! whatever could be extracted and signals its [`CacheStore`] so the richer
//! record gets persisted. Cover art resolves on its own schedule and signals
//! the store again when it lands.

pub mod cache;
pub mod config;
pub mod cover;
pub mod error;
pub mod item;
pub mod library;
pub mod media_type;
pub mod persist;
pub mod probe;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use cache::{CacheStore, FileCache, NullCache, RefreshReason};
pub use cover::{Cover, CoverArt};
pub use error::{CoverError, MetadataError, PersistError, ProbeError};
pub use item::{ItemServices, VideoItem, VideoMetadata};
pub use media_type::VideoType;
#[cfg(feature = "ffmpeg")]
pub use probe::FfmpegProbe;
pub use probe::{LoftyProbe, MetadataProbe, NoopProbe};
