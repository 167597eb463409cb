// Combine interactor - Join whole files into one chaptered album

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::app::assemble_interactor::RUN_DIR_PREFIX;
use crate::app::container::Toolchain;
use crate::app::description::{description_dir, read_description, write_description};
use crate::domain::album::{AlbumFile, AlbumSpec};
use crate::domain::model::ComposedChapter;
use crate::error::{MixtapeError, MixtapeResult};
use crate::output::metadata::TV_SHOW_KIND;
use crate::output::{render_chapter_track, replace_file};
use crate::planner::{KeyframeIndex, KeyframeWindow};
use crate::ports::{MetadataTag, MuxRequest, TagTarget};

/// Album steps, in the order they run
///
/// Each step checks the album's progress fields first, so a re-run skips
/// whatever an earlier run already finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumStep {
    ProbeDurations,
    Join,
    LocateStarts,
    MarkChapters,
    Tag,
}

impl AlbumStep {
    pub const ALL: [AlbumStep; 5] = [
        AlbumStep::ProbeDurations,
        AlbumStep::Join,
        AlbumStep::LocateStarts,
        AlbumStep::MarkChapters,
        AlbumStep::Tag,
    ];
}

/// Interactor for the album use case
pub struct CombineInteractor {
    tools: Toolchain,
    window: KeyframeWindow,
}

impl CombineInteractor {
    pub fn new(tools: Toolchain, window: KeyframeWindow) -> Self {
        Self { tools, window }
    }

    /// Build every album described at `db_path`
    ///
    /// The description is saved after each step that changed it.
    pub fn execute(&self, db_path: &Path) -> MixtapeResult<()> {
        let mut file: AlbumFile = read_description(db_path)?;
        let base_dir = description_dir(db_path);
        let scratch = tempfile::Builder::new().prefix(RUN_DIR_PREFIX).tempdir()?;

        let count = file.items_mut().len();
        for index in 0..count {
            for step in AlbumStep::ALL {
                let album = &mut file.items_mut()[index];
                if album.chapters.is_empty() {
                    warn!("Album {} has no chapters; skipping", album.album);
                    break;
                }
                if self.run_step(step, album, db_path, &base_dir, &scratch)? {
                    write_description(db_path, &file)?;
                }
            }
        }
        Ok(())
    }

    /// Run one step; true when the album changed
    pub fn run_step(
        &self,
        step: AlbumStep,
        album: &mut AlbumSpec,
        db_path: &Path,
        base_dir: &Path,
        scratch: &TempDir,
    ) -> MixtapeResult<bool> {
        match step {
            AlbumStep::ProbeDurations => self.probe_durations(album, db_path, base_dir),
            AlbumStep::Join => self.join(album, db_path, base_dir, scratch.path()),
            AlbumStep::LocateStarts => self.locate_starts(album, base_dir),
            AlbumStep::MarkChapters => self.mark_chapters(album, base_dir, scratch.path()),
            AlbumStep::Tag => self.tag(album, base_dir),
        }
    }

    fn probe_durations(&self, album: &mut AlbumSpec, db_path: &Path, base_dir: &Path) -> MixtapeResult<bool> {
        let template = album.source.clone();
        let mut changed = false;
        for chapter in album.chapters.iter_mut().filter(|c| c.duration.is_none()) {
            let source = chapter
                .source_path(template.as_deref())
                .ok_or_else(|| missing_source(db_path, &album.album, &chapter.title))?;
            let duration = self.tools.probe.probe_duration(&base_dir.join(source))?;
            debug!("Chapter {} lasts {:.3}s", chapter.title, duration);
            chapter.duration = Some(duration);
            changed = true;
        }
        Ok(changed)
    }

    fn join(&self, album: &mut AlbumSpec, db_path: &Path, base_dir: &Path, scratch: &Path) -> MixtapeResult<bool> {
        if album.destination.is_some() {
            return Ok(false);
        }
        let sources = album
            .chapters
            .iter()
            .map(|chapter| {
                chapter
                    .source_path(album.source.as_deref())
                    .map(|source| base_dir.join(source))
                    .ok_or_else(|| missing_source(db_path, &album.album, &chapter.title))
            })
            .collect::<MixtapeResult<Vec<_>>>()?;

        let destination = album.default_destination();
        info!("Joining {} files into {}", sources.len(), destination.display());
        let list_file = scratch.join("album-concat.txt");
        replace_file(&base_dir.join(&destination), |staging| {
            self.tools.execute.concat(&sources, &list_file, staging)
        })?;
        album.destination = Some(destination);
        Ok(true)
    }

    /// Fill missing starts from the running total of durations
    ///
    /// Every start after the first is snapped to the nearest keyframe of
    /// the joined file unless the album is audio-only.
    fn locate_starts(&self, album: &mut AlbumSpec, base_dir: &Path) -> MixtapeResult<bool> {
        if album.chapters.iter().all(|c| c.start.is_some()) {
            return Ok(false);
        }
        let joined = base_dir.join(joined_file(album));

        let mut offset = 0.0;
        for chapter in album.chapters.iter_mut() {
            if chapter.start.is_none() {
                chapter.start = Some(self.snap(&joined, offset, album.audiobook)?);
            }
            offset += chapter.duration.unwrap_or(0.0);
        }
        Ok(true)
    }

    fn snap(&self, joined: &Path, target: f64, audio_only: bool) -> MixtapeResult<f64> {
        if target <= 0.0 || audio_only {
            return Ok(target.max(0.0));
        }
        let window = self.window.around(target);
        let index = KeyframeIndex::new(self.tools.probe.probe_keyframes(joined, &window)?);
        match index.locate(target) {
            Some(found) => {
                debug!("Album chapter at {:.3}s -> keyframe {:.3}s", target, found.timestamp);
                Ok(found.timestamp)
            }
            None => {
                warn!("No keyframes near {:.3}s in {}", target, joined.display());
                Ok(target)
            }
        }
    }

    fn mark_chapters(&self, album: &mut AlbumSpec, base_dir: &Path, scratch: &Path) -> MixtapeResult<bool> {
        if album.chaptered {
            return Ok(false);
        }
        let joined = base_dir.join(joined_file(album));
        let chapters = album_chapters(album);
        info!("Adding {} chapter markers to {}", chapters.len(), joined.display());

        let track = scratch.join("album-chapters.ttxt");
        fs::write(&track, render_chapter_track(&chapters))?;
        let request = MuxRequest {
            media: joined.clone(),
            has_video: !album.audiobook,
            chapter_track: track,
            subtitle_track: None,
        };
        replace_file(&joined, |staging| self.tools.mux.mux_text_tracks(&request, staging))?;
        album.chaptered = true;
        Ok(true)
    }

    fn tag(&self, album: &mut AlbumSpec, base_dir: &Path) -> MixtapeResult<bool> {
        if album.finished {
            return Ok(false);
        }
        let joined = base_dir.join(joined_file(album));
        info!("Tagging {}", joined.display());
        self.tools
            .tag
            .write_tags(&joined, &album_tags(album, base_dir), &TagTarget::InPlace)?;
        album.finished = true;
        Ok(true)
    }
}

fn missing_source(db_path: &Path, album: &str, title: &str) -> MixtapeError {
    MixtapeError::InvalidConfig {
        path: db_path.to_path_buf(),
        message: format!("album {}: chapter {} has no source and no source template", album, title),
    }
}

fn joined_file(album: &AlbumSpec) -> PathBuf {
    album
        .destination
        .clone()
        .unwrap_or_else(|| album.default_destination())
}

/// Chapter markers of the joined file
pub fn album_chapters(album: &AlbumSpec) -> Vec<ComposedChapter> {
    album
        .chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| ComposedChapter {
            title: chapter.title.clone(),
            chapter: index as u32 + 1,
            name: chapter.display_name().to_string(),
            start: chapter.start.unwrap_or(0.0),
            duration: chapter.duration.unwrap_or(0.0),
        })
        .collect()
}

/// Tags written once an album is complete
pub fn album_tags(album: &AlbumSpec, base_dir: &Path) -> Vec<MetadataTag> {
    let mut tags = Vec::new();
    if let Some(artwork) = &album.artwork {
        tags.push(MetadataTag::Artwork(base_dir.join(artwork)));
    }
    tags.push(MetadataTag::Title(album.album.clone()));
    if let Some(artist) = &album.artist {
        tags.push(MetadataTag::Artist(artist.clone()));
    }
    if let Some(season) = &album.tvsn {
        tags.push(MetadataTag::TvSeasonNum(season.to_string()));
    }
    if let Some(episode) = &album.tven {
        tags.push(MetadataTag::TvEpisodeNum(episode.to_string()));
    }
    if let Some(show) = &album.tvsh {
        tags.push(MetadataTag::TvShowName(show.clone()));
        tags.push(MetadataTag::MediaKind(TV_SHOW_KIND.to_string()));
    }
    if let Some(episode) = &album.tves {
        tags.push(MetadataTag::TvEpisode(episode.clone()));
    }
    tags
}
