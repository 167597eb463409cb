//! FFprobe adapter for media file probing
//!
//! Durations, chapter marks, keyframes and stream layout come from
//! `ffprobe`; text tracks are exported as TTXT with `mp4box`.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::model::ProbedChapter;
use crate::error::{MixtapeError, MixtapeResult};
use crate::ports::{ProbePort, ProbeWindow, ToolRunner};

#[derive(Debug, Deserialize)]
struct ChaptersDocument {
    #[serde(default)]
    chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Deserialize)]
struct ChapterEntry {
    start_time: String,
    end_time: String,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StreamsDocument {
    #[serde(default)]
    streams: Vec<StreamEntry>,
}

#[derive(Debug, Deserialize)]
struct StreamEntry {
    index: usize,
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

fn parse_seconds(tool: &str, text: &str) -> MixtapeResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| MixtapeError::ExternalToolFailure {
            tool: tool.to_string(),
            status: "unparseable output".to_string(),
            output: format!("expected seconds, got {:?}", text.trim()),
        })
}

/// Chapter marks from `-show_chapters -print_format json` output
///
/// Chapters are numbered from 1 in container order.
pub fn parse_chapters(json: &str) -> MixtapeResult<Vec<ProbedChapter>> {
    let document: ChaptersDocument = serde_json::from_str(json)?;
    document
        .chapters
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            Ok(ProbedChapter {
                chapter: position as u32 + 1,
                start: parse_seconds("ffprobe", &entry.start_time)?,
                end: parse_seconds("ffprobe", &entry.end_time)?,
                name: entry.tags.get("title").cloned().unwrap_or_default(),
            })
        })
        .collect()
}

/// Keyframe timestamps from `pts_time,flags` CSV packet lines
pub fn parse_keyframe_packets(csv: &str) -> Vec<f64> {
    csv.lines()
        .filter_map(|line| {
            let mut fields = line.trim().split(',');
            let time = fields.next()?.parse::<f64>().ok()?;
            let flags = fields.last()?;
            flags.contains('K').then_some(time)
        })
        .collect()
}

/// Index of the first English `mov_text` stream in `-show_streams` JSON
pub fn find_english_mov_text(json: &str) -> MixtapeResult<Option<usize>> {
    let document: StreamsDocument = serde_json::from_str(json)?;
    Ok(document
        .streams
        .iter()
        .find(|s| {
            s.codec_name.as_deref() == Some("mov_text")
                && s.tags.get("language").map(String::as_str) == Some("eng")
        })
        .map(|s| s.index))
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    runner: Arc<dyn ToolRunner>,
    ffprobe: PathBuf,
    mp4box: PathBuf,
}

impl FFprobeAdapter {
    pub fn new(runner: Arc<dyn ToolRunner>, ffprobe: PathBuf, mp4box: PathBuf) -> Self {
        Self {
            runner,
            ffprobe,
            mp4box,
        }
    }

    fn ffprobe(&self, mut args: Vec<OsString>, file: &Path) -> MixtapeResult<String> {
        let mut full: Vec<OsString> = vec!["-v".into(), "error".into()];
        full.append(&mut args);
        full.push(file.as_os_str().to_owned());
        Ok(self.runner.run("ffprobe", &self.ffprobe, &full)?.stdout)
    }
}

impl ProbePort for FFprobeAdapter {
    fn probe_duration(&self, file: &Path) -> MixtapeResult<f64> {
        let stdout = self.ffprobe(
            vec![
                "-show_entries".into(),
                "format=duration".into(),
                "-of".into(),
                "default=noprint_wrappers=1:nokey=1".into(),
            ],
            file,
        )?;
        let duration = parse_seconds("ffprobe", &stdout)?;
        debug!("Duration of {}: {:.3}s", file.display(), duration);
        Ok(duration)
    }

    fn probe_chapters(&self, file: &Path) -> MixtapeResult<Vec<ProbedChapter>> {
        let stdout = self.ffprobe(
            vec!["-show_chapters".into(), "-print_format".into(), "json".into()],
            file,
        )?;
        parse_chapters(&stdout)
    }

    fn probe_keyframes(&self, file: &Path, window: &ProbeWindow) -> MixtapeResult<Vec<f64>> {
        let stdout = self.ffprobe(
            vec![
                "-select_streams".into(),
                "v:0".into(),
                "-show_packets".into(),
                "-show_entries".into(),
                "packet=pts_time,flags".into(),
                "-of".into(),
                "csv=print_section=0".into(),
                "-read_intervals".into(),
                window.to_interval().into(),
            ],
            file,
        )?;
        let keyframes = parse_keyframe_packets(&stdout);
        debug!("{} keyframes in {}", keyframes.len(), window.to_interval());
        Ok(keyframes)
    }

    fn find_subtitle_stream(&self, file: &Path) -> MixtapeResult<Option<usize>> {
        let stdout = self.ffprobe(
            vec!["-show_streams".into(), "-print_format".into(), "json".into()],
            file,
        )?;
        find_english_mov_text(&stdout)
    }

    fn export_text_track(&self, file: &Path, track: usize) -> MixtapeResult<String> {
        let args: Vec<OsString> = vec![
            "-stdb".into(),
            "-ttxt".into(),
            track.to_string().into(),
            file.as_os_str().to_owned(),
        ];
        Ok(self.runner.run("mp4box", &self.mp4box, &args)?.stdout)
    }
}
