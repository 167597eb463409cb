//! Common utilities and helpers

pub mod argv;
pub mod logging;
pub mod time;

pub use argv::format_argv;
pub use time::{format_timecode, parse_timecode, TimeValue};
