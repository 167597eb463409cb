//! Command implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::app::{AppContainer, AssembleOptions};
use crate::cli::args::{AssembleArgs, CombineArgs, EpisodesArgs};
use crate::cli::Commands;

/// Run a parsed command against the application container
pub fn execute(container: &dyn AppContainer, command: Commands) -> Result<()> {
    match command {
        Commands::Assemble(args) => assemble(container, args),
        Commands::Combine(args) => combine(container, args),
        Commands::Episodes(args) => episodes(container, args),
    }
}

fn locate_description(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Cannot open description {}", path.display()))
}

/// Execute the assemble command
pub fn assemble(container: &dyn AppContainer, args: AssembleArgs) -> Result<()> {
    let db_path = locate_description(&args.db_json)?;
    let options = AssembleOptions {
        debug: args.debug,
        dry_run: args.dry_run,
    };
    info!("Assembling from {} (dry run: {})", db_path.display(), options.dry_run);

    let batches = container
        .assemble_interactor()
        .execute(&db_path, options)
        .with_context(|| format!("Failed to assemble {}", db_path.display()))?;

    let resolved = serde_json::to_string_pretty(&batches).context("Failed to serialize resolved batches")?;
    if options.dry_run {
        println!("{}", resolved);
    }
    if let Some(path) = &args.emit_resolved {
        fs::write(path, &resolved)
            .with_context(|| format!("Failed to write resolved description {}", path.display()))?;
        info!("Resolved description written to {}", path.display());
    }
    Ok(())
}

/// Execute the combine command
pub fn combine(container: &dyn AppContainer, args: CombineArgs) -> Result<()> {
    let db_path = locate_description(&args.db_json)?;
    container
        .combine_interactor()
        .execute(&db_path)
        .with_context(|| format!("Failed to combine {}", db_path.display()))?;
    info!("Albums in {} are complete", db_path.display());
    Ok(())
}

/// Execute the episodes command
pub fn episodes(container: &dyn AppContainer, args: EpisodesArgs) -> Result<()> {
    let db_path = locate_description(&args.db_json)?;
    let report = container
        .episode_interactor()
        .execute(&db_path)
        .with_context(|| format!("Failed to process episodes in {}", db_path.display()))?;
    if report.failed > 0 {
        bail!(
            "{} of {} episode(s) failed",
            report.failed,
            report.failed + report.written
        );
    }
    Ok(())
}
