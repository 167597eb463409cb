//! Output composition: offsets, re-timed cues and concatenation

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::model::{ComposedChapter, ComposedOutput, OutputSpec, ResolvedInput, SubtitleCue};
use crate::error::{MixtapeError, MixtapeResult};
use crate::output::{render_subtitle_track, replace_file};
use crate::ports::ExecutePort;

/// A decomposed chapter feeding an output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPart {
    pub title: String,
    pub chapter: u32,
    /// Decomposed chapter file; absent until decomposition ran
    pub file: Option<PathBuf>,
}

/// Everything needed to build one output file
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    /// Position of the output in the batch
    pub index: usize,
    pub output: ComposedOutput,
    pub parts: Vec<OutputPart>,
    /// Subtitle cues on the output timeline
    pub cues: Vec<SubtitleCue>,
    /// True when at least one part comes from a video input
    pub has_video: bool,
    /// Sum of all chapter durations
    pub total_duration: f64,
}

/// Lay out the chapters of output `index` on the output timeline
///
/// Each output chapter starts where the previous one ended. Names not
/// given on the output chapter come from the referenced input chapter, and
/// the referenced chapter's cues are shifted by the output chapter's start.
pub fn plan_output(
    index: usize,
    spec: &OutputSpec,
    inputs: &[ResolvedInput],
    base_dir: &Path,
) -> MixtapeResult<OutputPlan> {
    let mut offset = 0.0;
    let mut chapters = Vec::with_capacity(spec.chapters.len());
    let mut parts = Vec::with_capacity(spec.chapters.len());
    let mut cues = Vec::new();
    let mut has_video = false;

    for (chapter_index, reference) in spec.chapters.iter().enumerate() {
        let input = inputs
            .iter()
            .find(|i| i.title == reference.title)
            .ok_or_else(|| MixtapeError::UnknownInputReference {
                output_index: index,
                chapter_index,
                title: reference.title.clone(),
            })?;
        let chapter = input
            .chapter(reference.chapter)
            .ok_or_else(|| MixtapeError::UnknownChapterReference {
                output_index: index,
                chapter_index,
                title: reference.title.clone(),
                chapter: reference.chapter,
            })?;

        cues.extend(chapter.subtitles.iter().map(|cue| SubtitleCue {
            t: offset + cue.t,
            x: cue.x.clone(),
        }));

        let duration = chapter.duration();
        chapters.push(ComposedChapter {
            title: reference.title.clone(),
            chapter: reference.chapter,
            name: reference.name.clone().unwrap_or_else(|| chapter.name.clone()),
            start: offset,
            duration,
        });
        parts.push(OutputPart {
            title: reference.title.clone(),
            chapter: reference.chapter,
            file: chapter.file.clone(),
        });
        has_video |= !input.audiobook;
        offset += duration;
    }

    debug!(
        "Output {}: {} chapters, {:.3}s, {} cues",
        index,
        chapters.len(),
        offset,
        cues.len()
    );

    Ok(OutputPlan {
        index,
        output: ComposedOutput {
            file: base_dir.join(&spec.file),
            chapters,
            metadata: spec.metadata.clone(),
            subtitles: None,
            chapter_track: None,
        },
        parts,
        cues,
        has_video,
        total_duration: offset,
    })
}

/// Concat list written for output `index`
pub fn concat_list_path(run_dir: &Path, index: usize) -> PathBuf {
    run_dir.join(format!("concat-{}.txt", index))
}

/// Subtitle track written for output `index`
pub fn subtitle_track_path(run_dir: &Path, index: usize) -> PathBuf {
    run_dir.join(format!("cc-{}.ttxt", index))
}

/// Joins decomposed chapters into output files
pub struct OutputComposer<'a> {
    execute: &'a dyn ExecutePort,
}

impl<'a> OutputComposer<'a> {
    pub fn new(execute: &'a dyn ExecutePort) -> Self {
        Self { execute }
    }

    /// Concatenate the plan's parts into its destination and write its
    /// subtitle track when the batch has a subtitle header
    pub fn compose(
        &self,
        plan: &mut OutputPlan,
        run_dir: &Path,
        subtitle_header: Option<&str>,
    ) -> MixtapeResult<()> {
        info!("Composing output file: {}", plan.output.file.display());

        let files = plan
            .parts
            .iter()
            .map(|part| {
                part.file.clone().ok_or_else(|| MixtapeError::NotDecomposed {
                    title: part.title.clone(),
                    chapter: part.chapter,
                })
            })
            .collect::<MixtapeResult<Vec<_>>>()?;

        let list_file = concat_list_path(run_dir, plan.index);
        replace_file(&plan.output.file, |staging| {
            self.execute.concat(&files, &list_file, staging)
        })?;

        if let Some(header) = subtitle_header {
            if !plan.cues.is_empty() {
                let track = subtitle_track_path(run_dir, plan.index);
                fs::write(&track, render_subtitle_track(header, &plan.cues))?;
                debug!("Wrote {} subtitle cues to {}", plan.cues.len(), track.display());
                plan.output.subtitles = Some(track);
            }
        }

        Ok(())
    }
}
