//! Keyframe lookup for chapter boundaries

use tracing::debug;

/// A keyframe matched to a nominal boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeMatch {
    /// Keyframe timestamp in seconds
    pub timestamp: f64,
    /// Absolute distance from the nominal boundary
    pub delta: f64,
}

/// Sorted, de-duplicated keyframe timestamps gathered from probe windows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeIndex {
    timestamps: Vec<f64>,
}

impl KeyframeIndex {
    /// Build from raw probe output (any order, duplicates allowed)
    pub fn new(mut timestamps: Vec<f64>) -> Self {
        timestamps.retain(|t| t.is_finite());
        timestamps.sort_by(f64::total_cmp);
        timestamps.dedup();
        Self { timestamps }
    }

    /// All timestamps, ascending
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Keyframe nearest `target`, scanning from the left
    ///
    /// Walks forward while the distance to `target` strictly decreases and
    /// stops at the first index where it does not. On an ascending list the
    /// distance is unimodal, so this first local minimum is the nearest
    /// keyframe; on a tie the earlier keyframe wins.
    pub fn locate(&self, target: f64) -> Option<KeyframeMatch> {
        let first = *self.timestamps.first()?;
        let mut best = KeyframeMatch {
            timestamp: first,
            delta: (first - target).abs(),
        };

        for &timestamp in &self.timestamps[1..] {
            let delta = (timestamp - target).abs();
            if delta < best.delta {
                best = KeyframeMatch { timestamp, delta };
            } else {
                break;
            }
        }

        debug!(
            "Keyframe for {:.3}s: {:.3}s (delta {:.3}s)",
            target, best.timestamp, best.delta
        );
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_first_local_minimum() {
        let index = KeyframeIndex::new(vec![10.0, 10.5, 11.2, 13.0]);
        let found = index.locate(11.0).unwrap();
        assert_eq!(found.timestamp, 11.2);
        assert!((found.delta - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_locate_before_first_keyframe() {
        let index = KeyframeIndex::new(vec![4.0, 6.0, 8.0]);
        assert_eq!(index.locate(1.0).unwrap().timestamp, 4.0);
    }

    #[test]
    fn test_locate_after_last_keyframe() {
        let index = KeyframeIndex::new(vec![4.0, 6.0, 8.0]);
        assert_eq!(index.locate(30.0).unwrap().timestamp, 8.0);
    }

    #[test]
    fn test_locate_exact_match_has_zero_delta() {
        let index = KeyframeIndex::new(vec![2.0, 4.0, 6.0]);
        let found = index.locate(4.0).unwrap();
        assert_eq!(found.timestamp, 4.0);
        assert_eq!(found.delta, 0.0);
    }

    #[test]
    fn test_tie_prefers_earlier_keyframe() {
        let index = KeyframeIndex::new(vec![2.0, 4.0, 6.0]);
        assert_eq!(index.locate(5.0).unwrap().timestamp, 4.0);
    }

    #[test]
    fn test_new_sorts_and_dedups_merged_windows() {
        let index = KeyframeIndex::new(vec![42.0, 40.0, 2.0, 40.0, 0.0, 2.0]);
        assert_eq!(index.timestamps(), &[0.0, 2.0, 40.0, 42.0]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_empty_index_has_no_match() {
        let index = KeyframeIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.locate(3.0).is_none());
    }
}
