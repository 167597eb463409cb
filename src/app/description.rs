// JSON description files - reading and writing back in place

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{MixtapeError, MixtapeResult};

/// Read and parse a JSON description
///
/// Syntax and schema errors are reported against the file.
pub fn read_description<T: DeserializeOwned>(path: &Path) -> MixtapeResult<T> {
    debug!("Reading description: {}", path.display());
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| MixtapeError::InvalidConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a description back, tab-indented, with a trailing newline
pub fn write_description<T: Serialize>(path: &Path, value: &T) -> MixtapeResult<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    fs::write(path, buffer)?;
    debug!("Saved description: {}", path.display());
    Ok(())
}

/// Directory relative paths in a description are resolved against
pub fn description_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
