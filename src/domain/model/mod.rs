// Domain models - Batch description, boundary plans and resolved timelines

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ChapterLocation, MixtapeError, MixtapeResult};
use crate::utils::time::TimeValue;

/// Top level of a JSON description: one object or an array of them
///
/// The shape is kept so that a rewritten file looks like the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Normalize into a list
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    /// All items, mutably, in document order
    pub fn items_mut(&mut self) -> &mut [T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_mut(item),
        }
    }
}

/// Top level of a batch file
pub type BatchFile = OneOrMany<BatchSpec>;

impl BatchFile {
    /// Normalize into a list of batches
    pub fn into_batches(self) -> Vec<BatchSpec> {
        self.into_vec()
    }
}

/// Expand a `${title}` source template
pub fn expand_source_template(template: &str, title: &str) -> String {
    template.replace("${title}", title)
}

/// One batch: inputs to decompose and outputs to compose from them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSpec {
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    /// Text-track header shared by every generated subtitle track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,
}

/// A source file and the chapters to cut out of it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    /// Key used by output chapters to reference this input
    pub title: String,
    /// Source media file, relative to the batch file's directory
    #[serde(alias = "source")]
    pub file: PathBuf,
    pub chapters: Vec<InputChapterSpec>,
    /// Audio-only: no keyframe alignment, no subtitle extraction
    #[serde(default)]
    pub audiobook: bool,
}

/// Chapter timing as written in the batch file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputChapterSpec {
    pub chapter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TimeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<TimeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeValue>,
    /// Offset to the chapter whose probed start ends this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An output file assembled from input chapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub file: PathBuf,
    pub chapters: Vec<OutputChapterSpec>,
    #[serde(flatten)]
    pub metadata: OutputMetadata,
}

/// Reference from an output to one input chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputChapterSpec {
    /// Title of the referenced input
    pub title: String,
    /// Chapter number within that input
    pub chapter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Descriptive tags for an output file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<MetaValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<MetaValue>,
}

impl OutputMetadata {
    /// True when no tag would be written
    pub fn is_empty(&self) -> bool {
        self == &OutputMetadata::default()
    }
}

/// A tag value that may be written as a JSON number or string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Integer(value) => write!(f, "{}", value),
            MetaValue::Text(value) => write!(f, "{}", value),
        }
    }
}

/// A chapter mark embedded in the source container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbedChapter {
    /// 1-based chapter number
    pub chapter: u32,
    pub start: f64,
    pub end: f64,
    pub name: String,
}

/// Where a chapter's start comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartSpec {
    Explicit(f64),
    /// Taken from the probed chapter with the same number
    Inherited,
}

/// Where a chapter's end comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndSpec {
    Explicit(f64),
    /// Measured from the resolved (aligned) start
    Duration(f64),
    /// Looked up in the probed chapter list, `offset` chapters ahead
    BackReference(i64),
}

/// Decoded, validated timing plan for one input chapter
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterPlan {
    pub chapter: u32,
    pub start: StartSpec,
    pub end: EndSpec,
    pub name: Option<String>,
}

impl ChapterPlan {
    /// Validate a chapter specification and decode its timecodes
    ///
    /// Decoded times must not be negative.
    pub fn from_spec(spec: &InputChapterSpec, location: &ChapterLocation) -> MixtapeResult<Self> {
        if spec.end.is_some() && spec.duration.is_some() {
            return Err(MixtapeError::AmbiguousBoundary {
                location: location.clone(),
            });
        }

        let decode = |field: &'static str, value: &TimeValue| -> MixtapeResult<f64> {
            let seconds = value.to_seconds().map_err(|err| err.at(location))?;
            if seconds < 0.0 {
                return Err(MixtapeError::NegativeTime {
                    location: location.clone(),
                    field,
                    value: seconds,
                });
            }
            Ok(seconds)
        };

        let start = match &spec.start {
            Some(value) => StartSpec::Explicit(decode("start", value)?),
            None => StartSpec::Inherited,
        };

        let end = match (&spec.end, &spec.duration) {
            (Some(end), _) => EndSpec::Explicit(decode("end", end)?),
            (None, Some(duration)) => EndSpec::Duration(decode("duration", duration)?),
            (None, None) => EndSpec::BackReference(spec.next.unwrap_or(0)),
        };

        Ok(Self {
            chapter: spec.chapter,
            start,
            end,
            name: spec.name.clone(),
        })
    }
}

/// A subtitle cue, timed relative to the start of whatever owns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Offset in seconds
    pub t: f64,
    /// Inline text-sample markup
    pub x: String,
}

/// An input chapter with every boundary resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedChapter {
    pub chapter: u32,
    pub start: f64,
    pub end: f64,
    pub name: String,
    /// Distance the start moved when snapped to a keyframe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitles: Vec<SubtitleCue>,
    /// Decomposed chapter file inside the run directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl ResolvedChapter {
    /// Length of the chapter in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// An input with its resolved chapter timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedInput {
    pub title: String,
    pub file: PathBuf,
    #[serde(default)]
    pub audiobook: bool,
    pub chapters: Vec<ResolvedChapter>,
}

impl ResolvedInput {
    /// Look up a chapter by number
    pub fn chapter(&self, number: u32) -> Option<&ResolvedChapter> {
        self.chapters.iter().find(|c| c.chapter == number)
    }
}

/// An output chapter placed on the output timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedChapter {
    pub title: String,
    pub chapter: u32,
    pub name: String,
    /// Offset from the start of the output file
    pub start: f64,
    pub duration: f64,
}

/// An output with its resolved chapter list and generated tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedOutput {
    pub file: PathBuf,
    pub chapters: Vec<ComposedChapter>,
    #[serde(flatten)]
    pub metadata: OutputMetadata,
    /// Generated subtitle track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<PathBuf>,
    /// Generated chapter-marker track
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "chapterTrack")]
    pub chapter_track: Option<PathBuf>,
}

/// A batch after resolution and composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBatch {
    pub inputs: Vec<ResolvedInput>,
    pub outputs: Vec<ComposedOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,
}
