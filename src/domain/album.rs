// Album descriptions - whole files joined into one chaptered file

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::model::{expand_source_template, MetaValue, OneOrMany};

fn is_false(value: &bool) -> bool {
    !*value
}

/// One album: its chapters are complete source files
///
/// Progress fields (`destination`, `chaptered`, `finished` and the
/// resolved chapter timings) are written back after every step so that a
/// later run resumes where this one stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumSpec {
    pub album: String,
    /// Source path template containing `${title}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub chapters: Vec<AlbumChapter>,
    /// Joined file, relative to the description; set once joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<PathBuf>,
    /// TV show name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvsh: Option<String>,
    /// TV season number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvsn: Option<MetaValue>,
    /// TV episode number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tven: Option<MetaValue>,
    /// TV episode name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tves: Option<String>,
    /// Sources carry no video track
    #[serde(default, skip_serializing_if = "is_false")]
    pub audiobook: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub chaptered: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub finished: bool,
    /// Fields this tool does not know about, preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A source file that becomes one chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumChapter {
    pub title: String,
    /// Explicit source path, overriding the album template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Chapter marker text; defaults to the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Seconds; probed when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Seconds into the joined file; located when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlbumChapter {
    /// Source path (relative to the description) of this chapter
    pub fn source_path(&self, template: Option<&str>) -> Option<PathBuf> {
        match (&self.source, template) {
            (Some(source), _) => Some(PathBuf::from(source)),
            (None, Some(template)) => Some(PathBuf::from(expand_source_template(template, &self.title))),
            (None, None) => None,
        }
    }

    /// Marker text shown for this chapter
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.title)
    }
}

impl AlbumSpec {
    /// Default joined file name
    pub fn default_destination(&self) -> PathBuf {
        PathBuf::from(format!("{}.mp4", self.album))
    }
}

/// Top level of an album description
pub type AlbumFile = OneOrMany<AlbumSpec>;

#[cfg(test)]
mod tests {
    use super::*;

    const ALBUM: &str = r#"{
        "album": "Road Trip",
        "source": "tracks/${title}.m4a",
        "artist": "Various",
        "tvsn": 1,
        "comment": "kept as is",
        "chapters": [
            { "title": "01 Intro" },
            { "title": "02 Drive", "name": "Drive", "source": "bonus/drive.m4a", "duration": 200.5 }
        ]
    }"#;

    #[test]
    fn test_parse_album() {
        let album: AlbumSpec = serde_json::from_str(ALBUM).unwrap();
        assert_eq!(album.album, "Road Trip");
        assert!(!album.chaptered);
        assert_eq!(album.tvsn, Some(MetaValue::Integer(1)));
        assert_eq!(album.chapters[1].duration, Some(200.5));
        assert_eq!(album.default_destination(), PathBuf::from("Road Trip.mp4"));
    }

    #[test]
    fn test_source_template_and_override() {
        let album: AlbumSpec = serde_json::from_str(ALBUM).unwrap();
        let template = album.source.as_deref();
        assert_eq!(album.chapters[0].source_path(template), Some(PathBuf::from("tracks/01 Intro.m4a")));
        assert_eq!(album.chapters[1].source_path(template), Some(PathBuf::from("bonus/drive.m4a")));
        assert_eq!(album.chapters[0].source_path(None), None);
    }

    #[test]
    fn test_display_name_defaults_to_title() {
        let album: AlbumSpec = serde_json::from_str(ALBUM).unwrap();
        assert_eq!(album.chapters[0].display_name(), "01 Intro");
        assert_eq!(album.chapters[1].display_name(), "Drive");
    }

    #[test]
    fn test_unknown_fields_survive_rewrite() {
        let mut album: AlbumSpec = serde_json::from_str(ALBUM).unwrap();
        album.finished = true;
        let value = serde_json::to_value(&album).unwrap();
        assert_eq!(value["comment"], "kept as is");
        assert_eq!(value["finished"], true);
        assert!(value.get("chaptered").is_none());
    }

    #[test]
    fn test_album_file_keeps_its_shape() {
        let file: AlbumFile = serde_json::from_str(ALBUM).unwrap();
        assert!(matches!(file, OneOrMany::One(_)));
        let value = serde_json::to_value(&file).unwrap();
        assert!(value.is_object());
    }
}
