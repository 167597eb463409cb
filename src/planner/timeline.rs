//! Chapter timeline resolution
//!
//! Turns the partially specified chapters of one input into a resolved
//! timeline in four passes: starts and names, keyframe alignment of every
//! non-initial start, ends, and finally subtitle cue extraction. Ends are
//! resolved only after every start has been aligned.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::model::{
    BatchSpec, ChapterPlan, EndSpec, InputSpec, ProbedChapter, ResolvedChapter, ResolvedInput,
    StartSpec,
};
use crate::error::{Boundary, ChapterLocation, MixtapeError, MixtapeResult};
use crate::planner::keyframe::KeyframeIndex;
use crate::planner::KeyframeWindow;
use crate::ports::ProbePort;
use crate::streams::subtitle_processor::{assign_cues, parse_text_track};

/// Everything learned while resolving one input
#[derive(Debug, Clone)]
pub struct InputResolution {
    pub input: ResolvedInput,
    /// Chapter marks embedded in the source container
    pub probed: Vec<ProbedChapter>,
    /// Merged keyframes, when alignment ran
    pub keyframes: Option<KeyframeIndex>,
    /// Raw exported subtitle track, when one was extracted
    pub text_track: Option<String>,
    /// Header of the extracted subtitle track
    pub subtitle_header: Option<String>,
}

/// Resolved inputs of one batch
#[derive(Debug, Clone)]
pub struct BatchTimeline {
    pub inputs: Vec<InputResolution>,
    /// Subtitle header shared by every generated subtitle track
    pub subtitle_header: Option<String>,
}

impl BatchTimeline {
    /// Resolved inputs in batch order
    pub fn resolved_inputs(&self) -> Vec<ResolvedInput> {
        self.inputs.iter().map(|r| r.input.clone()).collect()
    }
}

/// A chapter between the start and end passes
#[derive(Debug)]
struct PendingChapter {
    plan: ChapterPlan,
    location: ChapterLocation,
    start: f64,
    name: String,
    delta: Option<f64>,
}

/// Resolves chapter timelines against probe results
pub struct TimelineResolver<'a> {
    probe: &'a dyn ProbePort,
    window: KeyframeWindow,
}

impl<'a> TimelineResolver<'a> {
    pub fn new(probe: &'a dyn ProbePort, window: KeyframeWindow) -> Self {
        Self { probe, window }
    }

    /// Resolve every input of a batch, in order
    ///
    /// Subtitles are extracted from video inputs only while the batch has
    /// no subtitle header yet; the first extracted header is kept.
    pub fn resolve_batch(&self, batch: &BatchSpec, base_dir: &Path) -> MixtapeResult<BatchTimeline> {
        validate_batch(batch)?;
        let mut subtitle_header = batch.subtitles.clone();
        let mut inputs = Vec::with_capacity(batch.inputs.len());

        for (index, spec) in batch.inputs.iter().enumerate() {
            let resolution = self.resolve_input(index, spec, base_dir, subtitle_header.is_none())?;
            if subtitle_header.is_none() {
                subtitle_header = resolution.subtitle_header.clone();
            }
            inputs.push(resolution);
        }

        Ok(BatchTimeline {
            inputs,
            subtitle_header,
        })
    }

    /// Resolve the chapter timeline of one input
    ///
    /// Overlapping chapters are logged as warnings and kept; an end at or
    /// before its start is an error.
    pub fn resolve_input(
        &self,
        index: usize,
        spec: &InputSpec,
        base_dir: &Path,
        extract_subtitles: bool,
    ) -> MixtapeResult<InputResolution> {
        let file = base_dir.join(&spec.file);
        info!("Reading chapters of input file: {}", file.display());
        let probed = self.probe.probe_chapters(&file)?;
        debug!("Container has {} chapter marks", probed.len());

        let mut pending = self.resolve_starts(index, spec, &probed)?;

        let keyframes = if spec.audiobook {
            debug!("Input {} is audio-only; keeping nominal starts", spec.title);
            None
        } else {
            self.align_starts(&file, &mut pending)?
        };

        let mut chapters = resolve_ends(pending, &probed)?;
        warn_on_overlaps(&spec.title, &chapters);

        let mut text_track = None;
        let mut subtitle_header = None;
        if !spec.audiobook && extract_subtitles {
            if let Some(stream) = self.probe.find_subtitle_stream(&file)? {
                info!("Extracting subtitle stream {} of {}", stream, file.display());
                let document = self.probe.export_text_track(&file, stream + 1)?;
                let track = parse_text_track(&document)?;
                assign_cues(&mut chapters, &track.samples);
                subtitle_header = Some(track.header);
                text_track = Some(document);
            } else {
                debug!("No English mov_text stream in {}", file.display());
            }
        }

        Ok(InputResolution {
            input: ResolvedInput {
                title: spec.title.clone(),
                file,
                audiobook: spec.audiobook,
                chapters,
            },
            probed,
            keyframes,
            text_track,
            subtitle_header,
        })
    }

    fn resolve_starts(
        &self,
        index: usize,
        spec: &InputSpec,
        probed: &[ProbedChapter],
    ) -> MixtapeResult<Vec<PendingChapter>> {
        let mut seen = HashSet::new();
        let mut pending = Vec::with_capacity(spec.chapters.len());

        for (chapter_index, chapter_spec) in spec.chapters.iter().enumerate() {
            let location = ChapterLocation {
                title: spec.title.clone(),
                input_index: index,
                chapter: chapter_spec.chapter,
                chapter_index,
            };
            if !seen.insert(chapter_spec.chapter) {
                return Err(MixtapeError::DuplicateChapter { location });
            }

            let plan = ChapterPlan::from_spec(chapter_spec, &location)?;
            let mark = probed.iter().find(|p| p.chapter == plan.chapter);

            let start = match plan.start {
                StartSpec::Explicit(start) => start,
                StartSpec::Inherited => match mark {
                    Some(mark) => {
                        debug!("Chapter {} start inherited from container: {:.3}s", plan.chapter, mark.start);
                        mark.start
                    }
                    None => {
                        return Err(MixtapeError::UnresolvableBoundary {
                            location,
                            boundary: Boundary::Start,
                        })
                    }
                },
            };

            let name = plan
                .name
                .clone()
                .or_else(|| mark.map(|m| m.name.clone()))
                .unwrap_or_default();

            pending.push(PendingChapter {
                plan,
                location,
                start,
                name,
                delta: None,
            });
        }

        Ok(pending)
    }

    /// Snap every start after the origin to its nearest keyframe
    fn align_starts(
        &self,
        file: &Path,
        pending: &mut [PendingChapter],
    ) -> MixtapeResult<Option<KeyframeIndex>> {
        let targets: Vec<f64> = pending.iter().map(|p| p.start).filter(|s| *s > 0.0).collect();
        if targets.is_empty() {
            return Ok(None);
        }

        info!("Searching for keyframes nearest chapter starts in: {}", file.display());
        let mut raw = Vec::new();
        for target in &targets {
            raw.extend(self.probe.probe_keyframes(file, &self.window.around(*target))?);
        }
        let index = KeyframeIndex::new(raw);

        if index.is_empty() {
            warn!("No keyframes found in {}; chapter starts are not aligned", file.display());
            return Ok(Some(index));
        }

        for chapter in pending.iter_mut().filter(|p| p.start > 0.0) {
            if let Some(found) = index.locate(chapter.start) {
                debug!(
                    "Chapter {} start {:.3}s -> keyframe {:.3}s",
                    chapter.plan.chapter, chapter.start, found.timestamp
                );
                chapter.start = found.timestamp;
                chapter.delta = Some(found.delta);
            }
        }

        Ok(Some(index))
    }
}

/// Check every chapter of a batch against the schema before probing
///
/// Catches duplicate chapter numbers, chapters with both `end` and
/// `duration`, and malformed timecodes without touching any media file.
pub fn validate_batch(batch: &BatchSpec) -> MixtapeResult<()> {
    for (input_index, input) in batch.inputs.iter().enumerate() {
        let mut seen = HashSet::new();
        for (chapter_index, chapter) in input.chapters.iter().enumerate() {
            let location = ChapterLocation {
                title: input.title.clone(),
                input_index,
                chapter: chapter.chapter,
                chapter_index,
            };
            if !seen.insert(chapter.chapter) {
                return Err(MixtapeError::DuplicateChapter { location });
            }
            ChapterPlan::from_spec(chapter, &location)?;
        }
    }
    Ok(())
}

/// Probed value ending a chapter by back-reference
///
/// An offset of zero takes the end of the same container chapter; any
/// other offset takes the start of chapter `number + offset`. Lookups use
/// the container's marks, not aligned starts, so a back-referenced end may
/// sit up to one keyframe interval away from the next chapter's start.
fn back_reference_end(probed: &[ProbedChapter], number: u32, offset: i64) -> Option<f64> {
    if offset == 0 {
        return probed.iter().find(|p| p.chapter == number).map(|p| p.end);
    }
    let target = i64::from(number) + offset;
    probed
        .iter()
        .find(|p| i64::from(p.chapter) == target)
        .map(|p| p.start)
}

fn resolve_ends(pending: Vec<PendingChapter>, probed: &[ProbedChapter]) -> MixtapeResult<Vec<ResolvedChapter>> {
    pending
        .into_iter()
        .map(|chapter| {
            let end = match chapter.plan.end {
                EndSpec::Explicit(end) => end,
                EndSpec::Duration(duration) => chapter.start + duration,
                EndSpec::BackReference(offset) => {
                    match back_reference_end(probed, chapter.plan.chapter, offset) {
                        Some(end) => {
                            debug!(
                                "Chapter {} end from container chapter offset {}: {:.3}s",
                                chapter.plan.chapter, offset, end
                            );
                            end
                        }
                        None => {
                            return Err(MixtapeError::UnresolvableBoundary {
                                location: chapter.location,
                                boundary: Boundary::End,
                            })
                        }
                    }
                }
            };

            if end <= chapter.start {
                return Err(MixtapeError::EmptyInterval {
                    location: chapter.location,
                    start: chapter.start,
                    end,
                });
            }

            Ok(ResolvedChapter {
                chapter: chapter.plan.chapter,
                start: chapter.start,
                end,
                name: chapter.name,
                delta: chapter.delta,
                subtitles: Vec::new(),
                file: None,
            })
        })
        .collect()
}

fn warn_on_overlaps(title: &str, chapters: &[ResolvedChapter]) {
    let mut ordered: Vec<&ResolvedChapter> = chapters.iter().collect();
    ordered.sort_by_key(|c| c.chapter);
    for pair in ordered.windows(2) {
        if pair[1].start < pair[0].end {
            warn!(
                "Input {}: chapter {} ({:.3}s-{:.3}s) overlaps chapter {} starting at {:.3}s",
                title, pair[0].chapter, pair[0].start, pair[0].end, pair[1].chapter, pair[1].start
            );
        }
    }
}
