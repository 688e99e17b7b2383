use std::path::Path;
use std::time::Duration;

use ffmpeg_next as ffmpeg;
use ffmpeg::format::context::Input;
use ffmpeg::format::stream::Disposition;
use tracing::debug;

use super::{DescriptiveTags, LoftyProbe, MetadataProbe, ProbedMedia, TechnicalProperties};
use crate::error::ProbeError;

/// Reads duration and video geometry through FFmpeg.
///
/// Tags come from lofty when it recognizes the container, otherwise from the
/// container's own metadata dictionary.
#[derive(Debug, Clone, Copy)]
pub struct FfmpegProbe {
    tags: LoftyProbe,
}

impl FfmpegProbe {
    /// Initializes FFmpeg. Safe to call more than once.
    pub fn new() -> Result<Self, ProbeError> {
        ffmpeg::init()?;
        Ok(Self {
            tags: LoftyProbe::new(),
        })
    }
}

impl MetadataProbe for FfmpegProbe {
    fn open(&self, path: &Path) -> Result<Box<dyn ProbedMedia>, ProbeError> {
        let input = ffmpeg::format::input(path)?;

        let properties = technical_properties(&input);
        let container = container_tags(input.metadata().iter());

        let lofty = match self.tags.open(path) {
            Ok(media) => Some(media),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "lofty cannot read tags, using container metadata");
                None
            }
        };

        Ok(Box::new(FfmpegMedia {
            properties,
            container,
            lofty,
        }))
    }
}

struct FfmpegMedia {
    properties: TechnicalProperties,
    container: DescriptiveTags,
    lofty: Option<Box<dyn ProbedMedia>>,
}

impl ProbedMedia for FfmpegMedia {
    fn properties(&self) -> Result<TechnicalProperties, ProbeError> {
        Ok(self.properties.clone())
    }

    fn tags(&self) -> Result<DescriptiveTags, ProbeError> {
        let Some(lofty) = &self.lofty else {
            return Ok(self.container.clone());
        };
        let tags = lofty.tags()?;
        if tags == DescriptiveTags::default() {
            Ok(self.container.clone())
        } else {
            Ok(tags)
        }
    }
}

fn technical_properties(input: &Input) -> TechnicalProperties {
    // AV_NOPTS_VALUE is negative, so unknown durations fall out here too.
    let duration = match input.duration() {
        d if d > 0 => Duration::from_secs_f64(d as f64 / ffmpeg::ffi::AV_TIME_BASE as f64),
        _ => Duration::ZERO,
    };
    let (width, height) = match best_video_geometry(input) {
        Some((w, h)) => (Some(w), Some(h)),
        None => (None, None),
    };

    TechnicalProperties {
        duration,
        width,
        height,
    }
}

/// Largest video stream by area, ignoring embedded cover pictures.
fn best_video_geometry(input: &Input) -> Option<(u32, u32)> {
    input
        .streams()
        .filter(|stream| !stream.disposition().contains(Disposition::ATTACHED_PIC))
        .filter_map(|stream| {
            let codec =
                ffmpeg::codec::context::Context::from_parameters(stream.parameters()).ok()?;
            if codec.medium() != ffmpeg::media::Type::Video {
                return None;
            }
            let video = codec.decoder().video().ok()?;
            Some((video.width(), video.height()))
        })
        .filter(|&(w, h)| w > 0 && h > 0)
        .max_by_key(|&(w, h)| u64::from(w) * u64::from(h))
}

/// Maps container metadata keys (matched case-insensitively) onto tags.
/// The first non-blank value for a single-valued key wins.
fn container_tags<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> DescriptiveTags {
    let mut tags = DescriptiveTags::default();

    for (key, value) in entries {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let slot = match key.to_ascii_lowercase().as_str() {
            "title" => &mut tags.title,
            "genre" => &mut tags.genre,
            "comment" | "description" => &mut tags.comment,
            "composer" => &mut tags.composer,
            "composersort" | "composer_sort" | "composer-sort" => &mut tags.composer_sort,
            "artist" | "performer" | "actor" => {
                push_all(&mut tags.performers, value);
                continue;
            }
            "artistsort" | "artist_sort" | "artist-sort" => {
                push_all(&mut tags.performers_sort, value);
                continue;
            }
            "album_artist" | "albumartist" | "album-artist" => {
                push_all(&mut tags.album_artists, value);
                continue;
            }
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    tags
}

fn push_all(list: &mut Vec<String>, value: &str) {
    list.extend(
        value
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
}
