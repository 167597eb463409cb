//! CLI module for Mixtape
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::{AssembleArgs, CombineArgs, EpisodesArgs};

/// Mixtape chapter assembler
///
/// Cuts chapters out of MP4 sources without re-encoding and joins them
/// into new files with chapter markers, subtitles and tags.
#[derive(Parser, Debug)]
#[command(name = "mixtape")]
#[command(about = "Mixtape - Assemble chaptered MP4 files from a JSON plan")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level or filter directive [default: info]
    #[arg(long, env = "MIXTAPE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log output format [default: pretty]
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// TOML tool settings file [default: ./mixtape.toml if present]
    #[arg(long, env = "MIXTAPE_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// ffmpeg program
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe program
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// MP4Box program
    #[arg(long, global = true)]
    pub mp4box: Option<PathBuf>,

    /// AtomicParsley program
    #[arg(long, global = true)]
    pub atomicparsley: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut input chapters and assemble them into chaptered outputs
    Assemble(AssembleArgs),
    /// Join whole files into one chaptered album
    Combine(CombineArgs),
    /// Write tagged, renamed copies of series episodes
    Episodes(EpisodesArgs),
}
