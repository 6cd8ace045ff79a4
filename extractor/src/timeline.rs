//! Per-identifier timeline over the accepted frames.
//!
//! Every frame receives a [`FrameKey`] once, at build time: the identifier's
//! stream and the frame's ordinal inside it. Feature tables are addressed by
//! that key, so emitting rows in arrival order is a plain lookup.

use crate::error::{PipelineError, Result};
use crate::frames::Frame;
use std::collections::HashMap;

/// Index of an identifier's stream, in order of first appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub stream: StreamId,
    pub ordinal: usize,
}

#[derive(Debug, Clone)]
pub struct Stream {
    pub identifier: String,
    /// Arrival positions of this identifier's frames, in log order
    pub positions: Vec<usize>,
}

#[derive(Debug)]
pub struct TimelineIndex {
    frames: Vec<Frame>,
    keys: Vec<FrameKey>,
    streams: Vec<Stream>,
    by_identifier: HashMap<String, StreamId>,
}

impl TimelineIndex {
    /// Partition `frames` by identifier. Fails when there is nothing to index.
    pub fn build(frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(PipelineError::EmptyInput { lines: 0, rejected: 0 });
        }
        let mut streams: Vec<Stream> = Vec::new();
        let mut by_identifier: HashMap<String, StreamId> = HashMap::new();
        let mut keys = Vec::with_capacity(frames.len());

        for (pos, frame) in frames.iter().enumerate() {
            let id = *by_identifier
                .entry(frame.identifier.clone())
                .or_insert_with(|| {
                    streams.push(Stream {
                        identifier: frame.identifier.clone(),
                        positions: Vec::new(),
                    });
                    StreamId(streams.len() - 1)
                });
            let stream = &mut streams[id.0];
            keys.push(FrameKey {
                stream: id,
                ordinal: stream.positions.len(),
            });
            stream.positions.push(pos);
        }

        Ok(Self {
            frames,
            keys,
            streams,
            by_identifier,
        })
    }

    /// All frames in arrival order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Key of the frame at arrival position `pos`.
    pub fn key(&self, pos: usize) -> FrameKey {
        self.keys[pos]
    }

    /// Frames paired with their keys, in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameKey, &Frame)> + '_ {
        self.keys.iter().copied().zip(self.frames.iter())
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn stream(&self, id: StreamId) -> &Stream {
        &self.streams[id.0]
    }

    pub fn stream_id(&self, identifier: &str) -> Option<StreamId> {
        self.by_identifier.get(identifier).copied()
    }

    /// An identifier's frames in log order.
    pub fn stream_frames(&self, id: StreamId) -> impl Iterator<Item = &Frame> + '_ {
        self.streams[id.0].positions.iter().map(|&p| &self.frames[p])
    }

    /// An identifier's timestamps in log order.
    pub fn timestamps(&self, id: StreamId) -> Vec<f64> {
        self.stream_frames(id).map(|f| f.timestamp).collect()
    }
}
