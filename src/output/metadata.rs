//! Translation of output metadata into tagger tags

use std::path::Path;

use crate::domain::model::OutputMetadata;
use crate::ports::MetadataTag;

/// Media kind written for anything that belongs to a series
pub const TV_SHOW_KIND: &str = "TV Show";

/// Tags for the metadata fields that are present, in tagging order
///
/// Artwork paths are resolved against `base_dir`. A series also marks the
/// file as a TV show.
pub fn metadata_tags(metadata: &OutputMetadata, base_dir: &Path) -> Vec<MetadataTag> {
    let mut tags = Vec::new();
    if let Some(artwork) = &metadata.artwork {
        tags.push(MetadataTag::Artwork(base_dir.join(artwork)));
    }
    if let Some(title) = &metadata.title {
        tags.push(MetadataTag::Title(title.clone()));
    }
    if let Some(author) = &metadata.author {
        tags.push(MetadataTag::Artist(author.clone()));
    }
    if let Some(season) = &metadata.season {
        tags.push(MetadataTag::TvSeasonNum(season.to_string()));
    }
    if let Some(episode) = &metadata.episode {
        tags.push(MetadataTag::TvEpisodeNum(episode.to_string()));
    }
    if let Some(series) = &metadata.series {
        tags.push(MetadataTag::TvShowName(series.clone()));
        tags.push(MetadataTag::MediaKind(TV_SHOW_KIND.to_string()));
    }
    tags
}
