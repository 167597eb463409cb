// MP4Box adapter - Text-track muxing

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::MixtapeResult;
use crate::ports::{MuxPort, MuxRequest, ToolRunner};

fn with_suffix(path: &Path, suffix: &str) -> OsString {
    let mut arg = path.as_os_str().to_owned();
    arg.push(suffix);
    arg
}

/// MP4Box-based muxing adapter
pub struct Mp4BoxAdapter {
    runner: Arc<dyn ToolRunner>,
    mp4box: PathBuf,
}

impl Mp4BoxAdapter {
    pub fn new(runner: Arc<dyn ToolRunner>, mp4box: PathBuf) -> Self {
        Self { runner, mp4box }
    }

    /// `-ipod` argument list for a mux request
    pub fn mux_args(request: &MuxRequest, destination: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-ipod".into()];
        if request.has_video {
            args.push("-add".into());
            args.push(with_suffix(&request.media, "#video"));
        }
        args.push("-add".into());
        args.push(with_suffix(&request.media, "#audio"));
        args.push("-add".into());
        args.push(with_suffix(&request.chapter_track, ":chap"));
        if let Some(subtitles) = &request.subtitle_track {
            args.push("-add".into());
            args.push(with_suffix(subtitles, ":lang=eng"));
        }
        args.push(destination.as_os_str().to_owned());
        args
    }
}

impl MuxPort for Mp4BoxAdapter {
    fn mux_text_tracks(&self, request: &MuxRequest, destination: &Path) -> MixtapeResult<()> {
        self.runner
            .run("mp4box", &self.mp4box, &Self::mux_args(request, destination))?;
        Ok(())
    }
}
