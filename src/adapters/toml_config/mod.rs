// TOML config adapter - Tool settings stored in TOML files

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MixtapeError, MixtapeResult};
use crate::planner::KeyframeWindow;
use crate::utils::logging::LoggingConfig;

/// Default settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "mixtape.toml";

/// Program paths of the external tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub mp4box: PathBuf,
    pub atomicparsley: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            mp4box: PathBuf::from("mp4box"),
            atomicparsley: PathBuf::from("atomicparsley"),
        }
    }
}

/// All tool settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolPaths,
    pub keyframes: KeyframeWindow,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Parse settings from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str, origin: &Path) -> MixtapeResult<Self> {
        let settings: Settings = toml::from_str(content).map_err(|e| MixtapeError::InvalidSettings {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate(origin)?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> MixtapeResult<Self> {
        info!("Loading settings from: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    fn validate(&self, origin: &Path) -> MixtapeResult<()> {
        let window = &self.keyframes;
        if !(window.lead_seconds >= 0.0 && window.span_seconds > 0.0) {
            return Err(MixtapeError::InvalidSettings {
                path: origin.to_path_buf(),
                message: format!(
                    "keyframe window needs lead_seconds >= 0 and span_seconds > 0, got {} and {}",
                    window.lead_seconds, window.span_seconds
                ),
            });
        }
        Ok(())
    }
}
