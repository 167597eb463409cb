// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod mux_mp4box;
pub mod probe_ffprobe;
pub mod process_runner;
pub mod tag_atomicparsley;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use mux_mp4box::Mp4BoxAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use process_runner::ProcessRunner;
pub use tag_atomicparsley::AtomicParsleyAdapter;
pub use toml_config::{Settings, ToolPaths};
