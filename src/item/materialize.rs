use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{MIN_DURATION, VideoMetadata};
use crate::probe::{DescriptiveTags, MetadataProbe, TechnicalProperties};

/// Pull whatever the probe can give for `path`.
///
/// Opening the file, reading technical properties and reading tags fail
/// independently. A failed open leaves everything absent; a failed group
/// only leaves its own fields absent.
pub(super) fn extract(probe: &dyn MetadataProbe, path: &Path) -> VideoMetadata {
    let mut metadata = VideoMetadata::default();

    let media = match probe.open(path) {
        Ok(media) => media,
        Err(e) if e.is_corrupt() => {
            info!(path = %path.display(), error = %e, "failed to read metadata");
            return metadata;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unexpected error reading metadata");
            return metadata;
        }
    };

    match media.properties() {
        Ok(props) => apply_properties(&mut metadata, props),
        Err(e) => debug!(path = %path.display(), error = %e, "failed to read technical properties"),
    }

    match media.tags() {
        Ok(tags) => apply_tags(&mut metadata, tags),
        Err(e) => debug!(path = %path.display(), error = %e, "failed to read tags"),
    }

    metadata
}

fn apply_properties(metadata: &mut VideoMetadata, props: TechnicalProperties) {
    metadata.duration = normalize_duration(props.duration);
    metadata.width = props.width;
    metadata.height = props.height;
}

fn apply_tags(metadata: &mut VideoMetadata, tags: DescriptiveTags) {
    metadata.genre = tags.genre;
    metadata.title = tags.title;
    metadata.description = tags.comment;
    metadata.director = pick_director(tags.composer_sort, tags.composer);
    metadata.actors = Some(pick_actors(
        tags.performers_sort,
        tags.performers,
        tags.album_artists,
    ));
}

/// Durations under [`MIN_DURATION`] are indistinguishable from "unknown".
pub(crate) fn normalize_duration(duration: Duration) -> Option<Duration> {
    (duration >= MIN_DURATION).then_some(duration)
}

fn is_blank(s: Option<&str>) -> bool {
    s.is_none_or(|s| s.trim().is_empty())
}

/// Sort-form composer, unless blank.
fn pick_director(sorted: Option<String>, plain: Option<String>) -> Option<String> {
    if is_blank(sorted.as_deref()) { plain } else { sorted }
}

/// First non-empty list among sorted performers, performers and album
/// artists. Falls through to the (possibly empty) album artists.
fn pick_actors(
    performers_sort: Vec<String>,
    performers: Vec<String>,
    album_artists: Vec<String>,
) -> Vec<String> {
    [performers_sort, performers]
        .into_iter()
        .find(|list| !list.is_empty())
        .unwrap_or(album_artists)
}
