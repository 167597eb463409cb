//! In-place file replacement through a staging file

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::MixtapeResult;

/// Staging and backup names used while replacing `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPaths {
    /// Where the producer writes, beside the destination
    pub staging: PathBuf,
    /// Where the previous destination is parked during the swap
    pub backup: PathBuf,
}

impl StagingPaths {
    pub fn new(destination: &Path, stamp: i64) -> Self {
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self {
            staging: dir.join(format!("tmp-{}.mp4", stamp)),
            backup: dir.join(format!("tmp-{}-orig.mp4", stamp)),
        }
    }
}

/// Produce a new version of `destination` without leaving a partial file
///
/// `produce` writes to a staging path. Only when it succeeds is the old
/// destination (if any) moved aside, the staging file renamed into place
/// and the old copy removed. A failing producer leaves the destination
/// untouched.
pub fn replace_file<F>(destination: &Path, produce: F) -> MixtapeResult<()>
where
    F: FnOnce(&Path) -> MixtapeResult<()>,
{
    let paths = StagingPaths::new(destination, chrono::Utc::now().timestamp_millis());
    debug!("Staging {} as {}", destination.display(), paths.staging.display());

    if let Err(err) = produce(&paths.staging) {
        if paths.staging.exists() {
            if let Err(cleanup) = fs::remove_file(&paths.staging) {
                warn!("Failed to remove staging file {}: {}", paths.staging.display(), cleanup);
            }
        }
        return Err(err);
    }

    let had_previous = destination.exists();
    if had_previous {
        fs::rename(destination, &paths.backup)?;
    }
    if let Err(err) = fs::rename(&paths.staging, destination) {
        if had_previous {
            fs::rename(&paths.backup, destination)?;
        }
        return Err(err.into());
    }
    if had_previous {
        fs::remove_file(&paths.backup)?;
    }
    Ok(())
}
