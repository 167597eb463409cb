// Assemble interactor - Resolve, decompose and recompose chaptered files

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::app::container::Toolchain;
use crate::app::description::{description_dir, read_description};
use crate::domain::model::{BatchFile, BatchSpec, ComposedOutput, ResolvedBatch};
use crate::engine::{plan_output, OutputComposer, SourceDecomposer};
use crate::error::MixtapeResult;
use crate::output::MetadataEmitter;
use crate::planner::timeline::BatchTimeline;
use crate::planner::{KeyframeWindow, TimelineResolver};

/// Prefix of every run-scoped temporary directory
pub const RUN_DIR_PREFIX: &str = "mixtapes-";

/// Switches for one assemble run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Keep the run directory and write diagnostics into it
    pub debug: bool,
    /// Resolve and plan only; never cut, join, mux or tag
    pub dry_run: bool,
}

/// Scratch directory of one batch
///
/// Removed when dropped, on success and on error, unless kept for
/// debugging.
pub enum RunDirectory {
    Scoped(TempDir),
    Kept(PathBuf),
}

impl RunDirectory {
    pub fn create(keep: bool) -> MixtapeResult<Self> {
        let dir = tempfile::Builder::new().prefix(RUN_DIR_PREFIX).tempdir()?;
        if keep {
            let path = dir.into_path();
            info!("Keeping run directory: {}", path.display());
            Ok(RunDirectory::Kept(path))
        } else {
            Ok(RunDirectory::Scoped(dir))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            RunDirectory::Scoped(dir) => dir.path(),
            RunDirectory::Kept(path) => path,
        }
    }
}

/// Interactor for the chapter assembly use case
pub struct AssembleInteractor {
    tools: Toolchain,
    window: KeyframeWindow,
}

impl AssembleInteractor {
    pub fn new(tools: Toolchain, window: KeyframeWindow) -> Self {
        Self { tools, window }
    }

    /// Assemble every batch of the description at `db_path`, in order
    ///
    /// Relative paths in the description are resolved against its
    /// directory. The first error aborts the run; outputs already written
    /// by earlier batches stay in place.
    pub fn execute(&self, db_path: &Path, options: AssembleOptions) -> MixtapeResult<Vec<ResolvedBatch>> {
        let file: BatchFile = read_description(db_path)?;
        let base_dir = description_dir(db_path);
        let batches = file.into_batches();
        info!("Assembling {} batch(es) from {}", batches.len(), db_path.display());

        let mut resolved = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            debug!("Starting batch {}", index);
            let run_dir = RunDirectory::create(options.debug)?;
            resolved.push(self.assemble_batch(batch, &base_dir, run_dir.path(), options)?);
        }
        Ok(resolved)
    }

    /// Run the whole pipeline for one batch inside `run_dir`
    pub fn assemble_batch(
        &self,
        batch: &BatchSpec,
        base_dir: &Path,
        run_dir: &Path,
        options: AssembleOptions,
    ) -> MixtapeResult<ResolvedBatch> {
        let resolver = TimelineResolver::new(self.tools.probe.as_ref(), self.window);
        let timeline = resolver.resolve_batch(batch, base_dir)?;
        let mut inputs = timeline.resolved_inputs();

        if options.debug {
            write_diagnostics(run_dir, &timeline)?;
        }

        if options.dry_run {
            let outputs = batch
                .outputs
                .iter()
                .enumerate()
                .map(|(index, spec)| plan_output(index, spec, &inputs, base_dir).map(|plan| plan.output))
                .collect::<MixtapeResult<Vec<_>>>()?;
            return Ok(ResolvedBatch {
                inputs,
                outputs,
                subtitles: timeline.subtitle_header,
            });
        }

        SourceDecomposer::new(self.tools.execute.as_ref()).decompose(&mut inputs, run_dir)?;

        let composer = OutputComposer::new(self.tools.execute.as_ref());
        let emitter = MetadataEmitter::new(self.tools.mux.as_ref(), self.tools.tag.as_ref());
        let header = timeline.subtitle_header.as_deref();
        let mut outputs: Vec<ComposedOutput> = Vec::with_capacity(batch.outputs.len());

        for (index, spec) in batch.outputs.iter().enumerate() {
            let mut plan = plan_output(index, spec, &inputs, base_dir)?;
            if plan.parts.is_empty() {
                warn!("Output {} has no chapters; skipping", plan.output.file.display());
                continue;
            }
            composer.compose(&mut plan, run_dir, header)?;
            emitter.emit(index, &mut plan.output, plan.has_video, run_dir, base_dir)?;
            info!(
                "Wrote {} ({} chapters, {:.3}s)",
                plan.output.file.display(),
                plan.output.chapters.len(),
                plan.total_duration
            );
            outputs.push(plan.output);
        }

        let resolved = ResolvedBatch {
            inputs,
            outputs,
            subtitles: timeline.subtitle_header.clone(),
        };
        if options.debug {
            write_json(&run_dir.join("db.json"), &resolved)?;
        }
        Ok(resolved)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> MixtapeResult<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Dump what resolution learned about each input
fn write_diagnostics(run_dir: &Path, timeline: &BatchTimeline) -> MixtapeResult<()> {
    let resolved = ResolvedBatch {
        inputs: timeline.resolved_inputs(),
        outputs: Vec::new(),
        subtitles: timeline.subtitle_header.clone(),
    };
    write_json(&run_dir.join("db.json"), &resolved)?;

    for (index, input) in timeline.inputs.iter().enumerate() {
        write_json(&run_dir.join(format!("chapters_in_file-{}.json", index)), &input.probed)?;
        if let Some(keyframes) = &input.keyframes {
            write_json(&run_dir.join(format!("keyframes-{}.json", index)), keyframes.timestamps())?;
        }
        if let Some(track) = &input.text_track {
            let stem = input
                .input
                .file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("input-{}", index));
            fs::write(run_dir.join(format!("{}.ttxt", stem)), track)?;
        }
    }
    Ok(())
}
