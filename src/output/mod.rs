//! Output finishing: chapter-marker tracks, subtitle tracks and tags

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::model::ComposedOutput;
use crate::error::MixtapeResult;
use crate::ports::{MuxPort, MuxRequest, TagPort, TagTarget};

pub mod metadata;
pub mod text_track;
pub mod writer;

pub use metadata::metadata_tags;
pub use text_track::{render_chapter_track, render_subtitle_track};
pub use writer::replace_file;

/// Name of the chapter-marker track written for output `index`
pub fn chapter_track_path(run_dir: &Path, index: usize) -> PathBuf {
    run_dir.join(format!("chapters-{}.ttxt", index))
}

/// Embeds chapter markers and subtitles into a composed output and tags it
pub struct MetadataEmitter<'a> {
    mux: &'a dyn MuxPort,
    tag: &'a dyn TagPort,
}

impl<'a> MetadataEmitter<'a> {
    pub fn new(mux: &'a dyn MuxPort, tag: &'a dyn TagPort) -> Self {
        Self { mux, tag }
    }

    /// Mux the text tracks, then tag the file if it has any metadata
    pub fn emit(
        &self,
        index: usize,
        output: &mut ComposedOutput,
        has_video: bool,
        run_dir: &Path,
        base_dir: &Path,
    ) -> MixtapeResult<()> {
        self.add_chapter_markers(index, output, has_video, run_dir)?;
        if !output.metadata.is_empty() {
            self.add_metadata(output, base_dir)?;
        }
        Ok(())
    }

    /// Write the chapter-marker track and mux it (plus any subtitle track)
    /// into the output in place
    pub fn add_chapter_markers(
        &self,
        index: usize,
        output: &mut ComposedOutput,
        has_video: bool,
        run_dir: &Path,
    ) -> MixtapeResult<()> {
        info!("Adding chapter markers to file: {}", output.file.display());
        let track = chapter_track_path(run_dir, index);
        fs::write(&track, render_chapter_track(&output.chapters))?;

        let request = MuxRequest {
            media: output.file.clone(),
            has_video,
            chapter_track: track.clone(),
            subtitle_track: output.subtitles.clone(),
        };
        replace_file(&output.file, |staging| self.mux.mux_text_tracks(&request, staging))?;

        output.chapter_track = Some(track);
        Ok(())
    }

    /// Rewrite the output's tags in place
    pub fn add_metadata(&self, output: &ComposedOutput, base_dir: &Path) -> MixtapeResult<()> {
        info!("Adding metadata to file: {}", output.file.display());
        let tags = metadata_tags(&output.metadata, base_dir);
        self.tag.write_tags(&output.file, &tags, &TagTarget::InPlace)
    }
}
