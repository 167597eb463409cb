//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the assemble command
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Batch description (JSON)
    pub db_json: PathBuf,

    /// Keep the temporary directory and write diagnostics into it
    #[arg(long)]
    pub debug: bool,

    /// Resolve and plan only; print the result as JSON
    #[arg(long)]
    pub dry_run: bool,

    /// Write the resolved description to this file after a successful run
    #[arg(long, value_name = "FILE")]
    pub emit_resolved: Option<PathBuf>,
}

/// Arguments for the combine command
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Album description (JSON); progress is written back into it
    pub db_json: PathBuf,
}

/// Arguments for the episodes command
#[derive(Args, Debug)]
pub struct EpisodesArgs {
    /// Series description (JSON)
    pub db_json: PathBuf,
}
