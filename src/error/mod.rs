//! Error handling module for Mixtape

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which edge of a chapter interval could not be derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => write!(f, "start"),
            Boundary::End => write!(f, "end"),
        }
    }
}

/// Position of an input chapter inside the batch description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLocation {
    /// Title of the owning input
    pub title: String,
    /// Index of the input in the `inputs` array
    pub input_index: usize,
    /// Chapter number as written in the JSON
    pub chapter: u32,
    /// Index of the chapter in the input's `chapters` array
    pub chapter_index: usize,
}

impl fmt::Display for ChapterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input title {} (index: {}), chapter: {} (index: {})",
            self.title, self.input_index, self.chapter, self.chapter_index
        )
    }
}

/// Main error type for Mixtape operations
#[derive(Error, Debug)]
pub enum MixtapeError {
    /// Timecode text that is neither seconds nor HH:MM:SS[.fff]
    #[error("{}Malformed timecode: {value}. Expected HH:MM:SS[.fff] or seconds", located(.location))]
    MalformedTimecode {
        value: String,
        location: Option<ChapterLocation>,
    },

    /// A chapter time field that decodes to less than zero seconds
    #[error("db.json schema violation: {location}: {field} must not be negative, got {value}")]
    NegativeTime {
        location: ChapterLocation,
        field: &'static str,
        value: f64,
    },

    /// Both `end` and `duration` were given for one chapter
    #[error("db.json schema violation: {location}: InputChapter must not define both end and duration")]
    AmbiguousBoundary { location: ChapterLocation },

    /// No explicit, probed or back-referenced value for a boundary
    #[error("db.json schema violation: {location}: cannot determine chapter {boundary}")]
    UnresolvableBoundary {
        location: ChapterLocation,
        boundary: Boundary,
    },

    /// The same chapter number appears twice within one input
    #[error("db.json schema violation: {location}: chapter number is already used by another chapter of this input")]
    DuplicateChapter { location: ChapterLocation },

    /// Resolved end does not come after the resolved start
    #[error("db.json schema violation: {location}: resolved end {end:.3}s is not after start {start:.3}s")]
    EmptyInterval {
        location: ChapterLocation,
        start: f64,
        end: f64,
    },

    /// An output chapter names an input title that does not exist
    #[error("db.json schema violation: output index: {output_index}, chapter index: {chapter_index} references non-existent input title #{title}")]
    UnknownInputReference {
        output_index: usize,
        chapter_index: usize,
        title: String,
    },

    /// An output chapter names a chapter number the input does not have
    #[error("db.json schema violation: output index: {output_index}, chapter index: {chapter_index} references non-existent chapter #{chapter} of input title #{title}")]
    UnknownChapterReference {
        output_index: usize,
        chapter_index: usize,
        title: String,
        chapter: u32,
    },

    /// Composition was requested before the chapter was cut out of its source
    #[error("Chapter {chapter} of input title #{title} has not been decomposed")]
    NotDecomposed { title: String, chapter: u32 },

    /// A delegated media tool failed to launch or exited non-zero
    #[error("{tool} failed ({status}): {output}")]
    ExternalToolFailure {
        tool: String,
        status: String,
        output: String,
    },

    /// A JSON description that does not deserialize or lacks a required field
    #[error("Invalid description {}: {message}", .path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// A tool settings file that does not deserialize
    #[error("Invalid settings {}: {message}", .path.display())]
    InvalidSettings { path: PathBuf, message: String },

    /// A text track document that cannot be parsed
    #[error("Text track error: {message}")]
    TextTrack { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Prefix naming the chapter a located error belongs to
fn located(location: &Option<ChapterLocation>) -> String {
    match location {
        Some(location) => format!("db.json schema violation: {}: ", location),
        None => String::new(),
    }
}

impl MixtapeError {
    /// Attach a chapter location to an error that can carry one
    pub fn at(self, at: &ChapterLocation) -> Self {
        match self {
            MixtapeError::MalformedTimecode { value, location: None } => MixtapeError::MalformedTimecode {
                value,
                location: Some(at.clone()),
            },
            other => other,
        }
    }

    /// Build an `ExternalToolFailure` for a process that could not be started
    pub fn launch_failure(tool: &str, error: &std::io::Error) -> Self {
        MixtapeError::ExternalToolFailure {
            tool: tool.to_string(),
            status: "not started".to_string(),
            output: format!("{}: not in path? ({})", tool, error),
        }
    }
}

/// Result type alias for Mixtape operations
pub type MixtapeResult<T> = std::result::Result<T, MixtapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> ChapterLocation {
        ChapterLocation {
            title: "Side A".to_string(),
            input_index: 1,
            chapter: 4,
            chapter_index: 3,
        }
    }

    #[test]
    fn test_ambiguous_boundary_message_names_chapter() {
        let err = MixtapeError::AmbiguousBoundary { location: location() };
        let message = err.to_string();
        assert!(message.contains("input title Side A (index: 1)"));
        assert!(message.contains("chapter: 4 (index: 3)"));
        assert!(message.contains("both end and duration"));
    }

    #[test]
    fn test_unresolvable_boundary_names_edge() {
        let err = MixtapeError::UnresolvableBoundary {
            location: location(),
            boundary: Boundary::End,
        };
        assert!(err.to_string().ends_with("cannot determine chapter end"));
    }

    #[test]
    fn test_malformed_timecode_gains_location() {
        let err = MixtapeError::MalformedTimecode {
            value: "1:30".to_string(),
            location: None,
        };
        assert!(err.to_string().starts_with("Malformed timecode: 1:30"));

        let message = err.at(&location()).to_string();
        assert!(message.contains("input title Side A (index: 1), chapter: 4 (index: 3)"));
        assert!(message.contains("Malformed timecode: 1:30"));
    }

    #[test]
    fn test_launch_failure_is_tool_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = MixtapeError::launch_failure("ffprobe", &io);
        match err {
            MixtapeError::ExternalToolFailure { tool, status, .. } => {
                assert_eq!(tool, "ffprobe");
                assert_eq!(status, "not started");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
