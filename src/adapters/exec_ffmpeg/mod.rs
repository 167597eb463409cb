//! FFmpeg execution adapter
//!
//! Lossless cutting and concatenation with `-codec copy`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::MixtapeResult;
use crate::ports::{ExecutePort, ToolRunner};

/// Concat demuxer list naming each part on its own line
///
/// Single quotes in paths are closed, escaped and reopened.
pub fn concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|part| format!("file '{}'", part.to_string_lossy().replace('\'', r"'\''")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    runner: Arc<dyn ToolRunner>,
    ffmpeg: PathBuf,
}

impl FFmpegAdapter {
    pub fn new(runner: Arc<dyn ToolRunner>, ffmpeg: PathBuf) -> Self {
        Self { runner, ffmpeg }
    }

    fn ffmpeg(&self, args: Vec<OsString>) -> MixtapeResult<()> {
        self.runner.run("ffmpeg", &self.ffmpeg, &args)?;
        Ok(())
    }
}

fn fast_start_copy(destination: &Path) -> Vec<OsString> {
    vec![
        "-c".into(),
        "copy".into(),
        "-movflags".into(),
        "+faststart".into(),
        destination.as_os_str().to_owned(),
    ]
}

impl ExecutePort for FFmpegAdapter {
    fn cut(&self, source: &Path, start: f64, end: f64, destination: &Path) -> MixtapeResult<()> {
        self.ffmpeg(vec![
            "-loglevel".into(),
            "fatal".into(),
            "-y".into(),
            "-ss".into(),
            start.to_string().into(),
            "-to".into(),
            end.to_string().into(),
            "-i".into(),
            source.as_os_str().to_owned(),
            "-codec".into(),
            "copy".into(),
            destination.as_os_str().to_owned(),
        ])
    }

    fn concat(&self, parts: &[PathBuf], list_file: &Path, destination: &Path) -> MixtapeResult<()> {
        let mut args: Vec<OsString> = vec![
            "-safe".into(),
            "0".into(),
            "-loglevel".into(),
            "fatal".into(),
            "-y".into(),
        ];

        if let [single] = parts {
            debug!("Single part; rewrapping {}", single.display());
            args.push("-i".into());
            args.push(single.as_os_str().to_owned());
        } else {
            fs::write(list_file, concat_list(parts))?;
            args.push("-f".into());
            args.push("concat".into());
            args.push("-i".into());
            args.push(list_file.as_os_str().to_owned());
        }

        args.extend(fast_start_copy(destination));
        self.ffmpeg(args)
    }
}
