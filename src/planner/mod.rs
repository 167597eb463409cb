//! Chapter timeline planning and keyframe alignment module

use serde::{Deserialize, Serialize};

pub mod keyframe;
pub mod timeline;

pub use keyframe::{KeyframeIndex, KeyframeMatch};
pub use timeline::{validate_batch, BatchTimeline, InputResolution, TimelineResolver};

use crate::ports::ProbeWindow;

/// Geometry of the keyframe probe window around a nominal boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeWindow {
    /// Seconds scanned before the boundary
    pub lead_seconds: f64,
    /// Total seconds scanned
    pub span_seconds: f64,
}

impl Default for KeyframeWindow {
    fn default() -> Self {
        Self {
            lead_seconds: 20.0,
            span_seconds: 40.0,
        }
    }
}

impl KeyframeWindow {
    /// Probe window for a boundary at `target`
    pub fn around(&self, target: f64) -> ProbeWindow {
        ProbeWindow::around(target, self.lead_seconds, self.span_seconds)
    }
}
