use std::path::Path;

/// Container classification assigned by the folder layer at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoType {
    Avi,
    Flv,
    Mkv,
    Mov,
    Mp4,
    Mpeg,
    Ogv,
    Ts,
    Webm,
    Wmv,
}

impl VideoType {
    /// Classify by extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ty = match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "avi" | "divx" => Self::Avi,
            "flv" => Self::Flv,
            "mkv" => Self::Mkv,
            "mov" | "qt" => Self::Mov,
            "mp4" | "m4v" => Self::Mp4,
            "mpeg" | "mpg" | "mpe" => Self::Mpeg,
            "ogv" | "ogm" => Self::Ogv,
            "ts" | "m2ts" | "mts" => Self::Ts,
            "webm" => Self::Webm,
            "wmv" | "asf" => Self::Wmv,
            _ => return None,
        };
        Some(ty)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Avi => "video/x-msvideo",
            Self::Flv => "video/x-flv",
            Self::Mkv => "video/x-matroska",
            Self::Mov => "video/quicktime",
            Self::Mp4 => "video/mp4",
            Self::Mpeg => "video/mpeg",
            Self::Ogv => "video/ogg",
            Self::Ts => "video/mp2t",
            Self::Webm => "video/webm",
            Self::Wmv => "video/x-ms-wmv",
        }
    }
}
