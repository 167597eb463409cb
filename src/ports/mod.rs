// Ports - Interface definitions (contracts) for the external media tools

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::domain::model::ProbedChapter;
use crate::error::MixtapeResult;

/// Captured result of one tool invocation
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Port for launching external programs
///
/// Implementations must turn a launch failure or non-zero exit into
/// `MixtapeError::ExternalToolFailure`.
pub trait ToolRunner: Send + Sync {
    /// Run `program` (reported as `tool`) with `args` and wait for it
    fn run(&self, tool: &str, program: &Path, args: &[OsString]) -> MixtapeResult<ToolOutput>;
}

/// Time range handed to the prober when scanning for keyframes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeWindow {
    /// Window start in seconds
    pub start: f64,
    /// Window length in seconds
    pub span: f64,
}

impl ProbeWindow {
    /// Window of `span` seconds starting `lead` seconds before `target`
    pub fn around(target: f64, lead: f64, span: f64) -> Self {
        Self {
            start: (target - lead).max(0.0),
            span,
        }
    }

    /// `-read_intervals` form understood by ffprobe
    pub fn to_interval(&self) -> String {
        format!("{:.3}%+{}", self.start, self.span)
    }
}

/// Port for media file probing
pub trait ProbePort: Send + Sync {
    /// Container duration in seconds
    fn probe_duration(&self, file: &Path) -> MixtapeResult<f64>;

    /// Chapter marks embedded in the container
    fn probe_chapters(&self, file: &Path) -> MixtapeResult<Vec<ProbedChapter>>;

    /// Video keyframe timestamps inside `window`, in probe order
    fn probe_keyframes(&self, file: &Path, window: &ProbeWindow) -> MixtapeResult<Vec<f64>>;

    /// Stream index of the English `mov_text` subtitle stream, if any
    fn find_subtitle_stream(&self, file: &Path) -> MixtapeResult<Option<usize>>;

    /// Export a text track (1-based track number) as a TTXT document
    fn export_text_track(&self, file: &Path, track: usize) -> MixtapeResult<String>;
}

/// Port for lossless cutting and concatenation
pub trait ExecutePort: Send + Sync {
    /// Copy `[start, end)` of `source` into `destination` without re-encoding
    fn cut(&self, source: &Path, start: f64, end: f64, destination: &Path) -> MixtapeResult<()>;

    /// Join same-codec `parts` into `destination` with a fast-start layout
    ///
    /// `list_file` is a scratch path for the concat list.
    fn concat(&self, parts: &[PathBuf], list_file: &Path, destination: &Path) -> MixtapeResult<()>;
}

/// Request to embed generated text tracks into a media file
#[derive(Debug, Clone, PartialEq)]
pub struct MuxRequest {
    /// File providing the audio (and video) tracks
    pub media: PathBuf,
    /// Whether `media` carries a video track to keep
    pub has_video: bool,
    /// Chapter-marker track (TTXT)
    pub chapter_track: PathBuf,
    /// Optional subtitle track (TTXT)
    pub subtitle_track: Option<PathBuf>,
}

/// Port for text-track muxing
pub trait MuxPort: Send + Sync {
    /// Write `request.media` plus the text tracks into `destination`
    fn mux_text_tracks(&self, request: &MuxRequest, destination: &Path) -> MixtapeResult<()>;
}

/// A single descriptive tag
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataTag {
    Artwork(PathBuf),
    Title(String),
    Artist(String),
    TvSeasonNum(String),
    TvEpisodeNum(String),
    TvShowName(String),
    TvEpisode(String),
    /// Media kind classification, e.g. "TV Show"
    MediaKind(String),
}

/// Where tagging writes its result
#[derive(Debug, Clone, PartialEq)]
pub enum TagTarget {
    InPlace,
    Copy(PathBuf),
}

/// Port for metadata tagging
pub trait TagPort: Send + Sync {
    /// Write `tags` into `file` (or a tagged copy of it)
    fn write_tags(&self, file: &Path, tags: &[MetadataTag], target: &TagTarget) -> MixtapeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_window_is_clamped_at_zero() {
        let window = ProbeWindow::around(5.0, 20.0, 40.0);
        assert_eq!(window.start, 0.0);
        assert_eq!(window.to_interval(), "0.000%+40");
    }

    #[test]
    fn test_probe_window_leads_target() {
        let window = ProbeWindow::around(125.5, 20.0, 40.0);
        assert_eq!(window.start, 105.5);
        assert_eq!(window.to_interval(), "105.500%+40");
    }
}
