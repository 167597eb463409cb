//! Source decomposition: one lossless cut per resolved input chapter

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::model::ResolvedInput;
use crate::error::MixtapeResult;
use crate::ports::ExecutePort;

/// Temporary file holding chapter `chapter_index` of input `input_index`
pub fn chapter_file_path(run_dir: &Path, input_index: usize, chapter_index: usize) -> PathBuf {
    run_dir.join(format!("t{}-c{}.mp4", input_index, chapter_index))
}

/// Cuts every resolved chapter out of its source file
pub struct SourceDecomposer<'a> {
    execute: &'a dyn ExecutePort,
}

impl<'a> SourceDecomposer<'a> {
    pub fn new(execute: &'a dyn ExecutePort) -> Self {
        Self { execute }
    }

    /// Cut every chapter of every input into `run_dir`, recording the paths
    pub fn decompose(&self, inputs: &mut [ResolvedInput], run_dir: &Path) -> MixtapeResult<()> {
        for (input_index, input) in inputs.iter_mut().enumerate() {
            info!("Decomposing input file: {}", input.file.display());
            for (chapter_index, chapter) in input.chapters.iter_mut().enumerate() {
                let destination = chapter_file_path(run_dir, input_index, chapter_index);
                self.execute
                    .cut(&input.file, chapter.start, chapter.end, &destination)?;
                chapter.file = Some(destination);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ResolvedChapter;
    use crate::error::MixtapeError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCutter {
        cuts: Mutex<Vec<(PathBuf, f64, f64, PathBuf)>>,
        fail_on: Option<usize>,
    }

    impl ExecutePort for RecordingCutter {
        fn cut(&self, source: &Path, start: f64, end: f64, destination: &Path) -> MixtapeResult<()> {
            let mut cuts = self.cuts.lock().unwrap();
            if self.fail_on == Some(cuts.len()) {
                return Err(MixtapeError::ExternalToolFailure {
                    tool: "ffmpeg".to_string(),
                    status: "exit status: 1".to_string(),
                    output: "boom".to_string(),
                });
            }
            cuts.push((source.to_path_buf(), start, end, destination.to_path_buf()));
            Ok(())
        }

        fn concat(&self, _parts: &[PathBuf], _list_file: &Path, _destination: &Path) -> MixtapeResult<()> {
            unreachable!("decomposition never concatenates")
        }
    }

    fn input(title: &str, spans: &[(f64, f64)]) -> ResolvedInput {
        ResolvedInput {
            title: title.to_string(),
            file: PathBuf::from(format!("/src/{}.mp4", title)),
            audiobook: false,
            chapters: spans
                .iter()
                .enumerate()
                .map(|(i, (start, end))| ResolvedChapter {
                    chapter: i as u32 + 1,
                    start: *start,
                    end: *end,
                    name: String::new(),
                    delta: None,
                    subtitles: Vec::new(),
                    file: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_every_chapter_gets_a_unique_file() {
        let cutter = RecordingCutter::default();
        let mut inputs = vec![input("a", &[(0.0, 10.0), (10.0, 25.0)]), input("b", &[(3.0, 9.0)])];

        SourceDecomposer::new(&cutter)
            .decompose(&mut inputs, Path::new("/run"))
            .unwrap();

        assert_eq!(inputs[0].chapters[1].file, Some(PathBuf::from("/run/t0-c1.mp4")));
        assert_eq!(inputs[1].chapters[0].file, Some(PathBuf::from("/run/t1-c0.mp4")));

        let cuts = cutter.cuts.lock().unwrap();
        assert_eq!(cuts.len(), 3);
        assert_eq!(cuts[1], (PathBuf::from("/src/a.mp4"), 10.0, 25.0, PathBuf::from("/run/t0-c1.mp4")));
    }

    #[test]
    fn test_cut_failure_is_fatal() {
        let cutter = RecordingCutter {
            fail_on: Some(1),
            ..Default::default()
        };
        let mut inputs = vec![input("a", &[(0.0, 10.0), (10.0, 25.0), (25.0, 30.0)])];

        let result = SourceDecomposer::new(&cutter).decompose(&mut inputs, Path::new("/run"));
        assert!(matches!(result, Err(MixtapeError::ExternalToolFailure { .. })));
        assert_eq!(cutter.cuts.lock().unwrap().len(), 1);
        assert!(inputs[0].chapters[2].file.is_none());
    }
}
