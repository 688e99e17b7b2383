use std::path::Path;

use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};

use super::{DescriptiveTags, MetadataProbe, ProbedMedia, TechnicalProperties};
use crate::error::ProbeError;

/// Reads properties and tags through lofty.
///
/// lofty does not expose video stream geometry, so `width` and `height` are
/// always reported as unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyProbe;

impl LoftyProbe {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataProbe for LoftyProbe {
    fn open(&self, path: &Path) -> Result<Box<dyn ProbedMedia>, ProbeError> {
        let tagged = Probe::open(path)?.guess_file_type()?.read()?;
        Ok(Box::new(LoftyMedia { tagged }))
    }
}

struct LoftyMedia {
    tagged: TaggedFile,
}

impl LoftyMedia {
    fn best_tag(&self) -> Option<&Tag> {
        self.tagged
            .primary_tag()
            .or_else(|| self.tagged.first_tag())
    }
}

impl ProbedMedia for LoftyMedia {
    fn properties(&self) -> Result<TechnicalProperties, ProbeError> {
        Ok(TechnicalProperties {
            duration: self.tagged.properties().duration(),
            width: None,
            height: None,
        })
    }

    fn tags(&self) -> Result<DescriptiveTags, ProbeError> {
        let Some(tag) = self.best_tag() else {
            return Ok(DescriptiveTags::default());
        };

        Ok(DescriptiveTags {
            title: tag.title().map(|s| s.into_owned()),
            genre: tag.genre().map(|s| s.into_owned()),
            comment: tag.comment().map(|s| s.into_owned()),
            composer: tag.get_string(&ItemKey::Composer).map(str::to_string),
            composer_sort: tag.get_string(&ItemKey::ComposerSortOrder).map(str::to_string),
            performers: strings(tag, &ItemKey::TrackArtist),
            performers_sort: strings(tag, &ItemKey::TrackArtistSortOrder),
            album_artists: strings(tag, &ItemKey::AlbumArtist),
        })
    }
}

fn strings(tag: &Tag, key: &ItemKey) -> Vec<String> {
    tag.get_strings(key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
