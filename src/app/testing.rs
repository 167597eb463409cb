//! Recording fake for every tool port, shared by the interactor tests

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::app::Toolchain;
use crate::domain::model::ProbedChapter;
use crate::error::{MixtapeError, MixtapeResult};
use crate::ports::{
    ExecutePort, MetadataTag, MuxPort, MuxRequest, ProbePort, ProbeWindow, TagPort, TagTarget,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Duration(PathBuf),
    Chapters(PathBuf),
    Keyframes(PathBuf, ProbeWindow),
    SubtitleStream(PathBuf),
    Export(PathBuf, usize),
    Cut {
        source: PathBuf,
        start: f64,
        end: f64,
        destination: PathBuf,
    },
    Concat {
        parts: Vec<PathBuf>,
        destination: PathBuf,
    },
    Mux(MuxRequest),
    Tag {
        file: PathBuf,
        tags: Vec<MetadataTag>,
        target: TagTarget,
    },
}

/// Every port at once; writers create their destination files
#[derive(Default)]
pub struct FakeTools {
    pub durations: HashMap<PathBuf, f64>,
    pub chapters: HashMap<PathBuf, Vec<ProbedChapter>>,
    pub keyframes: Vec<f64>,
    pub subtitle_stream: Option<usize>,
    pub text_track: String,
    /// Tagging any file whose name contains this text fails
    pub failing_tag: Option<String>,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl FakeTools {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn into_toolchain(self) -> (Arc<FakeTools>, Toolchain) {
        let tools = Arc::new(self);
        let chain = Toolchain::new(tools.clone(), tools.clone(), tools.clone(), tools.clone());
        (tools, chain)
    }
}

pub fn mark(chapter: u32, start: f64, end: f64, name: &str) -> ProbedChapter {
    ProbedChapter {
        chapter,
        start,
        end,
        name: name.to_string(),
    }
}

impl ProbePort for FakeTools {
    fn probe_duration(&self, file: &Path) -> MixtapeResult<f64> {
        self.record(Call::Duration(file.to_path_buf()));
        Ok(self.durations.get(file).copied().unwrap_or(60.0))
    }

    fn probe_chapters(&self, file: &Path) -> MixtapeResult<Vec<ProbedChapter>> {
        self.record(Call::Chapters(file.to_path_buf()));
        Ok(self.chapters.get(file).cloned().unwrap_or_default())
    }

    fn probe_keyframes(&self, file: &Path, window: &ProbeWindow) -> MixtapeResult<Vec<f64>> {
        self.record(Call::Keyframes(file.to_path_buf(), *window));
        Ok(self
            .keyframes
            .iter()
            .copied()
            .filter(|k| *k >= window.start && *k <= window.start + window.span)
            .collect())
    }

    fn find_subtitle_stream(&self, file: &Path) -> MixtapeResult<Option<usize>> {
        self.record(Call::SubtitleStream(file.to_path_buf()));
        Ok(self.subtitle_stream)
    }

    fn export_text_track(&self, file: &Path, track: usize) -> MixtapeResult<String> {
        self.record(Call::Export(file.to_path_buf(), track));
        Ok(self.text_track.clone())
    }
}

impl ExecutePort for FakeTools {
    fn cut(&self, source: &Path, start: f64, end: f64, destination: &Path) -> MixtapeResult<()> {
        self.record(Call::Cut {
            source: source.to_path_buf(),
            start,
            end,
            destination: destination.to_path_buf(),
        });
        fs::write(destination, b"cut")?;
        Ok(())
    }

    fn concat(&self, parts: &[PathBuf], _list_file: &Path, destination: &Path) -> MixtapeResult<()> {
        self.record(Call::Concat {
            parts: parts.to_vec(),
            destination: destination.to_path_buf(),
        });
        fs::write(destination, b"joined")?;
        Ok(())
    }
}

impl MuxPort for FakeTools {
    fn mux_text_tracks(&self, request: &MuxRequest, destination: &Path) -> MixtapeResult<()> {
        self.record(Call::Mux(request.clone()));
        fs::write(destination, b"muxed")?;
        Ok(())
    }
}

impl TagPort for FakeTools {
    fn write_tags(&self, file: &Path, tags: &[MetadataTag], target: &TagTarget) -> MixtapeResult<()> {
        self.record(Call::Tag {
            file: file.to_path_buf(),
            tags: tags.to_vec(),
            target: target.clone(),
        });
        if let Some(failing) = &self.failing_tag {
            if file.to_string_lossy().contains(failing.as_str()) {
                return Err(MixtapeError::ExternalToolFailure {
                    tool: "AtomicParsley".to_string(),
                    status: "exit status: 1".to_string(),
                    output: "bad file".to_string(),
                });
            }
        }
        if let TagTarget::Copy(copy) = target {
            fs::write(copy, b"tagged")?;
        }
        Ok(())
    }
}
