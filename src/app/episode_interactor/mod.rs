// Episode interactor - Tagged, renamed copies of series episodes

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::app::container::Toolchain;
use crate::app::description::{description_dir, read_description};
use crate::domain::series::{episode_destination, EpisodeSpec, SeriesFile, SeriesSpec};
use crate::error::{MixtapeError, MixtapeResult};
use crate::ports::{MetadataTag, TagTarget};

/// Outcome of an episodes run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeReport {
    pub written: usize,
    pub failed: usize,
}

/// Interactor for the episode renaming use case
pub struct EpisodeInteractor {
    tools: Toolchain,
}

impl EpisodeInteractor {
    pub fn new(tools: Toolchain) -> Self {
        Self { tools }
    }

    /// Write a tagged copy of every episode described at `db_path`
    ///
    /// A failing episode is logged and counted; the others still run.
    pub fn execute(&self, db_path: &Path) -> MixtapeResult<EpisodeReport> {
        let file: SeriesFile = read_description(db_path)?;
        let base_dir = description_dir(db_path);
        let mut report = EpisodeReport::default();

        for series in file.into_vec() {
            for episode in &series.episodes {
                match self.tag_episode(&series, episode, db_path, &base_dir) {
                    Ok(copy) => {
                        info!("Wrote {}", copy.display());
                        report.written += 1;
                    }
                    Err(err) => {
                        error!("{} episode {}: {}", series.series, episode.name, err);
                        report.failed += 1;
                    }
                }
            }
        }

        info!("{} episode(s) written, {} failed", report.written, report.failed);
        Ok(report)
    }

    fn tag_episode(
        &self,
        series: &SeriesSpec,
        episode: &EpisodeSpec,
        db_path: &Path,
        base_dir: &Path,
    ) -> MixtapeResult<PathBuf> {
        let source = series
            .source_of(episode)
            .map(|s| base_dir.join(s))
            .ok_or_else(|| MixtapeError::InvalidConfig {
                path: db_path.to_path_buf(),
                message: format!("series {}: episode {} has no source", series.series, episode.name),
            })?;
        let copy = episode_destination(&source, &series.episode_file_name(episode));
        self.tools
            .tag
            .write_tags(&source, &episode_tags(series, episode), &TagTarget::Copy(copy.clone()))?;
        Ok(copy)
    }
}

/// Tags written into an episode copy
pub fn episode_tags(series: &SeriesSpec, episode: &EpisodeSpec) -> Vec<MetadataTag> {
    let mut tags = vec![
        MetadataTag::Title(series.episode_title(episode)),
        MetadataTag::TvShowName(series.series.clone()),
        MetadataTag::TvEpisode(episode.name.clone()),
    ];
    if let Some(season) = series.season_of(episode) {
        tags.push(MetadataTag::TvSeasonNum(season.to_string()));
    }
    if let Some(number) = &episode.episode {
        tags.push(MetadataTag::TvEpisodeNum(number.to_string()));
    }
    tags
}
