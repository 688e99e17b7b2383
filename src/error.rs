//! Error types shared across the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The container could not be parsed: unknown format, truncated or corrupt.
    #[error("corrupt or unrecognized media file: {0}")]
    Corrupt(String),

    #[error("unreadable media file: {0}")]
    Unreadable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported by this probe: {0}")]
    Unsupported(&'static str),
}

impl ProbeError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

impl From<lofty::error::LoftyError> for ProbeError {
    fn from(err: lofty::error::LoftyError) -> Self {
        match err.kind() {
            lofty::error::ErrorKind::Io(_) => Self::Unreadable(err.to_string()),
            _ => Self::Corrupt(err.to_string()),
        }
    }
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for ProbeError {
    fn from(err: ffmpeg_next::Error) -> Self {
        use ffmpeg_next::Error;
        match err {
            Error::InvalidData
            | Error::DemuxerNotFound
            | Error::StreamNotFound
            | Error::DecoderNotFound
            | Error::Eof => Self::Corrupt(err.to_string()),
            _ => Self::Unreadable(err.to_string()),
        }
    }
}

/// Raised by descriptive accessors that cannot hand back absence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("genre is not available for this item")]
    GenreUnsupported,
}

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cover source is not a regular file: {0}")]
    NotAFile(String),

    #[error("no embedded artwork")]
    NoEmbeddedArt,

    #[error("failed to read artwork: {0}")]
    Probe(#[from] ProbeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid cover encoding: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
