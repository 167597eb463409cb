//! Embedded stream handling

pub mod subtitle_processor;

pub use subtitle_processor::{assign_cues, parse_text_track, TextSample, TextTrack};
