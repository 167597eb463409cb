//! Mixtape chapter assembler
//!
//! Builds chaptered MP4 files from a JSON description: chapters are cut out
//! of their sources without re-encoding, joined, and given a chapter-marker
//! track, optional subtitles and tags.
//!
//! # Usage
//!
//! ```bash
//! mixtape assemble db.json
//! mixtape assemble --dry-run db.json
//! mixtape combine album.json
//! mixtape episodes series.json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use mixtape_cli::app::DefaultAppContainer;
use mixtape_cli::cli::{commands, Cli};
use mixtape_cli::config_initialization::initialize_settings;

/// Main entry point for the Mixtape CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = initialize_settings(&cli)?;
    settings.logging.initialize()?;
    info!("Starting Mixtape");

    let container = DefaultAppContainer::new(&settings);
    let result = commands::execute(&container, cli.command);
    match &result {
        Ok(()) => info!("Mixtape completed successfully"),
        Err(err) => error!("{:#}", err),
    }
    result
}
