//! Fixed-width window occupancy: frames per identifier per time bucket.

use super::{FeatureComputation, FeatureKind, FeatureLookup, FeatureValue};
use crate::config::DEFAULT_WINDOW_SECONDS;
use crate::timeline::{FrameKey, StreamId, TimelineIndex};
use std::collections::HashMap;

/// Bucket of `timestamp` for windows `window_seconds` wide.
pub fn window_index(timestamp: f64, window_seconds: f64) -> i64 {
    (timestamp / window_seconds).floor() as i64
}

pub struct WindowOccupancy {
    window_seconds: f64,
}

impl WindowOccupancy {
    pub fn new(window_seconds: f64) -> Self {
        let window_seconds = if window_seconds.is_finite() && window_seconds > 0.0 {
            window_seconds
        } else {
            tracing::warn!(
                window_seconds,
                default = DEFAULT_WINDOW_SECONDS,
                "invalid window width, using default"
            );
            DEFAULT_WINDOW_SECONDS
        };
        Self { window_seconds }
    }

    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }
}

impl Default for WindowOccupancy {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECONDS)
    }
}

/// Population counts per (identifier, window). A frame's value is the final
/// count of its own bucket, itself included.
#[derive(Debug, Clone, Default)]
pub struct WindowOccupancyTable {
    counts: HashMap<(StreamId, i64), u64>,
    /// Window of every frame, per stream, by ordinal
    frame_windows: Vec<Vec<i64>>,
}

impl FeatureComputation for WindowOccupancy {
    type Output = WindowOccupancyTable;

    fn provides(&self) -> &'static [FeatureKind] {
        &[FeatureKind::WindowCount]
    }

    fn compute(&self, index: &TimelineIndex) -> WindowOccupancyTable {
        let mut table = WindowOccupancyTable {
            counts: HashMap::new(),
            frame_windows: vec![Vec::new(); index.streams().len()],
        };
        for (key, frame) in index.iter() {
            let w = window_index(frame.timestamp, self.window_seconds);
            *table.counts.entry((key.stream, w)).or_insert(0) += 1;
            table.frame_windows[key.stream.0].push(w);
        }
        table
    }
}

impl WindowOccupancyTable {
    pub fn count(&self, stream: StreamId, window: i64) -> u64 {
        self.counts.get(&(stream, window)).copied().unwrap_or(0)
    }

    pub fn window_of(&self, key: FrameKey) -> Option<i64> {
        self.frame_windows.get(key.stream.0)?.get(key.ordinal).copied()
    }

    /// Occupied windows of one identifier, ascending.
    pub fn windows(&self, stream: StreamId) -> Vec<(i64, u64)> {
        let mut out: Vec<(i64, u64)> = self
            .counts
            .iter()
            .filter(|((s, _), _)| *s == stream)
            .map(|((_, w), c)| (*w, *c))
            .collect();
        out.sort_unstable();
        out
    }

    pub fn total(&self, stream: StreamId) -> u64 {
        self.counts
            .iter()
            .filter(|((s, _), _)| *s == stream)
            .map(|(_, c)| *c)
            .sum()
    }
}

impl FeatureLookup for WindowOccupancyTable {
    fn get(&self, kind: FeatureKind, key: FrameKey) -> Option<FeatureValue> {
        if kind != FeatureKind::WindowCount {
            return None;
        }
        let w = self.window_of(key)?;
        self.counts
            .get(&(key.stream, w))
            .map(|&c| FeatureValue::Count(c))
    }
}
