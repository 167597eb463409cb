//! Subtitle stream processing: TTXT parsing and per-chapter cue assignment

use tracing::{debug, warn};

use crate::domain::model::{ResolvedChapter, SubtitleCue};
use crate::error::{MixtapeError, MixtapeResult};
use crate::utils::time::parse_timecode;

/// A timed text sample at an absolute position in its source
#[derive(Debug, Clone, PartialEq)]
pub struct TextSample {
    /// Absolute time in seconds
    pub time: f64,
    /// Inner markup of the sample, on one line
    pub markup: String,
}

/// A parsed TTXT document
#[derive(Debug, Clone, PartialEq)]
pub struct TextTrack {
    /// Serialized `<TextStreamHeader>` element, reused verbatim for new tracks
    pub header: String,
    pub samples: Vec<TextSample>,
}

/// Parse a TTXT document as exported from an MP4 text track
///
/// Samples without content are dropped.
pub fn parse_text_track(document: &str) -> MixtapeResult<TextTrack> {
    let doc = roxmltree::Document::parse(document).map_err(|e| MixtapeError::TextTrack {
        message: format!("XML parse error: {}", e),
    })?;

    let header = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "TextStreamHeader")
        .map(|n| document[n.range()].to_string())
        .ok_or_else(|| MixtapeError::TextTrack {
            message: "missing <TextStreamHeader>".to_string(),
        })?;

    let mut samples = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "TextSample")
    {
        let time = match node.attribute("sampleTime") {
            Some(value) => parse_timecode(value)?,
            None => {
                warn!("Skipping <TextSample> without sampleTime");
                continue;
            }
        };

        let (first, last) = match (node.first_child(), node.last_child()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };
        let inner = &document[first.range().start..last.range().end];
        let markup = inner.replace("\r\n", " ").replace('\n', " ");

        samples.push(TextSample { time, markup });
    }

    debug!("Parsed text track: {} samples", samples.len());
    Ok(TextTrack { header, samples })
}

/// Attach samples to the chapters whose `[start, end]` contains them
///
/// Cue times become offsets from the owning chapter's start. Any cues a
/// chapter already carried are replaced.
pub fn assign_cues(chapters: &mut [ResolvedChapter], samples: &[TextSample]) {
    for chapter in chapters.iter_mut() {
        chapter.subtitles = samples
            .iter()
            .filter(|s| s.time >= chapter.start && s.time <= chapter.end)
            .map(|s| SubtitleCue {
                t: s.time - chapter.start,
                x: s.markup.clone(),
            })
            .collect();
        debug!(
            "Chapter {}: {} subtitle cues",
            chapter.chapter,
            chapter.subtitles.len()
        );
    }
}
