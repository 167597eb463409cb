// Series descriptions - episodes to rename and tag

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::model::{expand_source_template, MetaValue, OneOrMany};

/// A series and its episode files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub series: String,
    /// Season shared by every episode unless overridden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<MetaValue>,
    /// Source path template containing `${title}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub episodes: Vec<EpisodeSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One episode file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSpec {
    /// Key substituted into the series source template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Episode name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<MetaValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<MetaValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Zero-pad numeric values to two digits; text passes through
fn two_digit(value: &MetaValue) -> String {
    match value {
        MetaValue::Integer(n) => format!("{:02}", n),
        MetaValue::Text(text) => match text.trim().parse::<i64>() {
            Ok(n) => format!("{:02}", n),
            Err(_) => text.clone(),
        },
    }
}

impl SeriesSpec {
    /// Season of `episode`, falling back to the series season
    pub fn season_of<'a>(&'a self, episode: &'a EpisodeSpec) -> Option<&'a MetaValue> {
        episode.season.as_ref().or(self.season.as_ref())
    }

    /// Source path (relative to the description) of `episode`
    pub fn source_of(&self, episode: &EpisodeSpec) -> Option<PathBuf> {
        if let Some(source) = &episode.source {
            return Some(PathBuf::from(source));
        }
        match (&self.source, &episode.title) {
            (Some(template), Some(title)) => Some(PathBuf::from(expand_source_template(template, title))),
            _ => None,
        }
    }

    /// File name of the tagged copy
    ///
    /// `"<series> S01E02 <name>.mp4"`, or `"<series> - <name>.mp4"` when
    /// neither season nor episode is known.
    pub fn episode_file_name(&self, episode: &EpisodeSpec) -> String {
        let mut marker = String::new();
        if let Some(season) = self.season_of(episode) {
            marker.push('S');
            marker.push_str(&two_digit(season));
        }
        if let Some(number) = &episode.episode {
            marker.push('E');
            marker.push_str(&two_digit(number));
        }
        if marker.is_empty() {
            format!("{} - {}.mp4", self.series, episode.name)
        } else {
            format!("{} {} {}.mp4", self.series, marker, episode.name)
        }
    }

    /// Title tag of `episode`
    pub fn episode_title(&self, episode: &EpisodeSpec) -> String {
        format!("{} - {}", self.series, episode.name)
    }
}

/// Tagged copy path: same directory as the source
pub fn episode_destination(source: &Path, file_name: &str) -> PathBuf {
    source
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Top level of a series description
pub type SeriesFile = OneOrMany<SeriesSpec>;
