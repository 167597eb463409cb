//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::adapters::toml_config::{Settings, DEFAULT_SETTINGS_FILE};
use crate::cli::Cli;

/// Environment variables overriding tool paths
pub const TOOL_ENV_VARIABLES: [&str; 4] = [
    "MIXTAPE_FFMPEG",
    "MIXTAPE_FFPROBE",
    "MIXTAPE_MP4BOX",
    "MIXTAPE_ATOMICPARSLEY",
];

/// Initialize settings following precedence: CLI > Env > File > Defaults
pub fn initialize_settings(cli: &Cli) -> Result<Settings> {
    initialize_settings_with(cli, Path::new("."), |key| std::env::var(key).ok())
}

/// Same as [`initialize_settings`] with an explicit working directory and
/// environment lookup
pub fn initialize_settings_with<F>(cli: &Cli, work_dir: &Path, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1 and 2: defaults, then the settings file if there is one
    let mut settings = match settings_file(cli, work_dir) {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    // Step 3: environment
    apply_environment(&mut settings, env);

    // Step 4: command line
    apply_cli_overrides(&mut settings, cli);

    Ok(settings)
}

/// Explicit `--settings` file, else `mixtape.toml` in `work_dir` if present
fn settings_file(cli: &Cli, work_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = &cli.settings {
        return Some(path.clone());
    }
    let default = work_dir.join(DEFAULT_SETTINGS_FILE);
    default.is_file().then_some(default)
}

fn apply_environment<F>(settings: &mut Settings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let [ffmpeg, ffprobe, mp4box, atomicparsley] = TOOL_ENV_VARIABLES;
    let tools = &mut settings.tools;
    for (key, slot) in [
        (ffmpeg, &mut tools.ffmpeg),
        (ffprobe, &mut tools.ffprobe),
        (mp4box, &mut tools.mp4box),
        (atomicparsley, &mut tools.atomicparsley),
    ] {
        if let Some(value) = env(key).filter(|v| !v.is_empty()) {
            *slot = PathBuf::from(value);
        }
    }
}

fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    let tools = &mut settings.tools;
    for (flag, slot) in [
        (&cli.ffmpeg, &mut tools.ffmpeg),
        (&cli.ffprobe, &mut tools.ffprobe),
        (&cli.mp4box, &mut tools.mp4box),
        (&cli.atomicparsley, &mut tools.atomicparsley),
    ] {
        if let Some(path) = flag {
            *slot = path.clone();
        }
    }

    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
}
