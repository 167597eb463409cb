use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mixtape_cli::app::{AssembleInteractor, AssembleOptions, Toolchain};
use mixtape_cli::domain::model::ProbedChapter;
use mixtape_cli::planner::KeyframeWindow;
use mixtape_cli::ports::*;
use mixtape_cli::{MixtapeError, MixtapeResult};
use tempfile::TempDir;

/// Test utilities: one recording fake standing in for every media tool
mod test_utils {
    use super::*;

    const TEXT_TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<TextStream version="1.1">
<TextStreamHeader width="480" height="368" layer="0" translation_x="0" translation_y="0">
<TextSampleDescription horizontalJustification="center" verticalJustification="bottom" backColor="0 0 0 0" verticalText="no" fillTextRegion="no" continousKaraoke="no" scroll="None">
<FontTable><FontTableEntry fontName="Arial" fontID="1"/></FontTable>
</TextSampleDescription>
</TextStreamHeader>
<TextSample sampleTime="00:00:30.000" xml:space="preserve">before the chapter</TextSample>
<TextSample sampleTime="00:01:05.000" xml:space="preserve">Hello there</TextSample>
<TextSample sampleTime="00:06:00.000" xml:space="preserve">after the chapter</TextSample>
</TextStream>
"#;

    /// Tool calls, named by file
    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        Chapters(String),
        Keyframes(String),
        SubtitleStream(String),
        Export(String, usize),
        Cut(String, f64, f64),
        Concat(usize),
        Mux { has_video: bool, subtitles: Option<String> },
        Tag(Vec<MetadataTag>),
    }

    #[derive(Default)]
    pub struct MediaTools {
        events: Mutex<Vec<Event>>,
    }

    fn name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl MediaTools {
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ProbePort for MediaTools {
        fn probe_duration(&self, _file: &Path) -> MixtapeResult<f64> {
            Ok(600.0)
        }

        fn probe_chapters(&self, file: &Path) -> MixtapeResult<Vec<ProbedChapter>> {
            self.push(Event::Chapters(name(file)));
            if name(file) == "show.mp4" {
                Ok(vec![
                    ProbedChapter {
                        chapter: 1,
                        start: 0.0,
                        end: 60.0,
                        name: "Cold Open".to_string(),
                    },
                    ProbedChapter {
                        chapter: 2,
                        start: 60.0,
                        end: 300.0,
                        name: "Act One".to_string(),
                    },
                ])
            } else {
                Ok(Vec::new())
            }
        }

        fn probe_keyframes(&self, file: &Path, _window: &ProbeWindow) -> MixtapeResult<Vec<f64>> {
            self.push(Event::Keyframes(name(file)));
            Ok(vec![58.0, 61.0, 70.0])
        }

        fn find_subtitle_stream(&self, file: &Path) -> MixtapeResult<Option<usize>> {
            self.push(Event::SubtitleStream(name(file)));
            Ok(Some(2))
        }

        fn export_text_track(&self, file: &Path, track: usize) -> MixtapeResult<String> {
            self.push(Event::Export(name(file), track));
            Ok(TEXT_TRACK.to_string())
        }
    }

    impl ExecutePort for MediaTools {
        fn cut(&self, source: &Path, start: f64, end: f64, destination: &Path) -> MixtapeResult<()> {
            self.push(Event::Cut(name(source), start, end));
            fs::write(destination, b"chapter")?;
            Ok(())
        }

        fn concat(&self, parts: &[PathBuf], _list_file: &Path, destination: &Path) -> MixtapeResult<()> {
            self.push(Event::Concat(parts.len()));
            fs::write(destination, b"joined")?;
            Ok(())
        }
    }

    impl MuxPort for MediaTools {
        fn mux_text_tracks(&self, request: &MuxRequest, destination: &Path) -> MixtapeResult<()> {
            let subtitles = match &request.subtitle_track {
                Some(track) => Some(fs::read_to_string(track)?),
                None => None,
            };
            self.push(Event::Mux {
                has_video: request.has_video,
                subtitles,
            });
            fs::write(destination, b"muxed")?;
            Ok(())
        }
    }

    impl TagPort for MediaTools {
        fn write_tags(&self, _file: &Path, tags: &[MetadataTag], _target: &TagTarget) -> MixtapeResult<()> {
            self.push(Event::Tag(tags.to_vec()));
            Ok(())
        }
    }

    pub fn toolchain() -> (Arc<MediaTools>, Toolchain) {
        let tools = Arc::new(MediaTools::default());
        let chain = Toolchain::new(tools.clone(), tools.clone(), tools.clone(), tools.clone());
        (tools, chain)
    }
}

use test_utils::Event;

const MIXED_BATCH: &str = r#"[
    {
        "inputs": [
            { "title": "show", "file": "show.mp4", "chapters": [ { "chapter": 2 } ] },
            {
                "title": "book",
                "source": "book.m4a",
                "audiobook": true,
                "chapters": [ { "chapter": 1, "start": "00:00:10.000", "end": 40, "name": "Prologue" } ]
            }
        ],
        "outputs": [
            {
                "file": "mix.mp4",
                "series": "Mixes",
                "season": 1,
                "chapters": [
                    { "title": "show", "chapter": 2 },
                    { "title": "book", "chapter": 1 }
                ]
            }
        ]
    }
]"#;

fn write_db(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("db.json");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_video_and_audiobook_inputs_combined() {
    let dir = TempDir::new().unwrap();
    let db = write_db(dir.path(), MIXED_BATCH);
    let (tools, chain) = test_utils::toolchain();

    let batches = AssembleInteractor::new(chain, KeyframeWindow::default())
        .execute(&db, AssembleOptions::default())
        .unwrap();
    let batch = &batches[0];

    // Video input: start snapped from 60.0 to the keyframe at 61.0
    let show = &batch.inputs[0].chapters[0];
    assert_eq!(show.start, 61.0);
    assert_eq!(show.delta, Some(1.0));
    assert_eq!(show.end, 300.0);
    assert_eq!(show.name, "Act One");
    assert_eq!(show.subtitles.len(), 1);
    assert_eq!(show.subtitles[0].t, 4.0);

    // Audio-only input: nominal start kept, no cues
    let book = &batch.inputs[1].chapters[0];
    assert_eq!(book.start, 10.0);
    assert_eq!(book.delta, None);
    assert!(book.subtitles.is_empty());

    let output = &batch.outputs[0];
    let starts: Vec<f64> = output.chapters.iter().map(|c| c.start).collect();
    assert_eq!(starts, vec![0.0, 239.0]);
    assert_eq!(output.chapters[1].name, "Prologue");

    let events = tools.events();
    assert!(events.contains(&Event::Keyframes("show.mp4".to_string())));
    assert!(!events.contains(&Event::Keyframes("book.m4a".to_string())));
    assert!(events.contains(&Event::Export("show.mp4".to_string(), 3)));
    assert!(!events.contains(&Event::SubtitleStream("book.m4a".to_string())));
    assert!(events.contains(&Event::Cut("show.mp4".to_string(), 61.0, 300.0)));
    assert!(events.contains(&Event::Cut("book.m4a".to_string(), 10.0, 40.0)));
    assert!(events.contains(&Event::Concat(2)));

    let mux = events
        .iter()
        .find_map(|e| match e {
            Event::Mux { has_video, subtitles } => Some((*has_video, subtitles.clone())),
            _ => None,
        })
        .unwrap();
    assert!(mux.0);
    let subtitles = mux.1.unwrap();
    assert!(subtitles.contains("<TextStreamHeader"));
    assert!(subtitles.contains(r#"<TextSample sampleTime="00:00:04.000" xml:space="preserve">Hello there</TextSample>"#));

    assert!(events.contains(&Event::Tag(vec![
        MetadataTag::TvSeasonNum("1".to_string()),
        MetadataTag::TvShowName("Mixes".to_string()),
        MetadataTag::MediaKind("TV Show".to_string()),
    ])));
    assert_eq!(fs::read(dir.path().join("mix.mp4")).unwrap(), b"muxed");
}

#[test]
fn test_dry_run_plans_without_writing() {
    let dir = TempDir::new().unwrap();
    let db = write_db(dir.path(), MIXED_BATCH);
    let (tools, chain) = test_utils::toolchain();
    let options = AssembleOptions {
        dry_run: true,
        ..Default::default()
    };

    let batches = AssembleInteractor::new(chain, KeyframeWindow::default())
        .execute(&db, options)
        .unwrap();

    assert_eq!(batches[0].outputs[0].chapters[1].start, 239.0);
    assert!(!dir.path().join("mix.mp4").exists());
    assert!(!tools
        .events()
        .iter()
        .any(|e| matches!(e, Event::Cut(..) | Event::Concat(_) | Event::Mux { .. } | Event::Tag(_))));
}

#[test]
fn test_unknown_chapter_reference_aborts() {
    let dir = TempDir::new().unwrap();
    let db = write_db(
        dir.path(),
        &MIXED_BATCH.replace(r#"{ "title": "book", "chapter": 1 }"#, r#"{ "title": "book", "chapter": 9 }"#),
    );
    let (_tools, chain) = test_utils::toolchain();

    let err = AssembleInteractor::new(chain, KeyframeWindow::default())
        .execute(&db, AssembleOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        MixtapeError::UnknownChapterReference { chapter: 9, .. }
    ));
    assert!(!dir.path().join("mix.mp4").exists());
}
