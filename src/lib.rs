//! Mixtape Library
//!
//! Assembles chaptered MP4 files from a JSON description. Inputs are split
//! into chapters at keyframe-aligned boundaries, the chapters are joined
//! into outputs without re-encoding, and every output gets a chapter-marker
//! track, optional subtitles and descriptive tags. All media work is
//! delegated to external tools behind the traits in [`ports`].

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod streams;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{BatchSpec, ResolvedBatch};
pub use error::{MixtapeError, MixtapeResult};
