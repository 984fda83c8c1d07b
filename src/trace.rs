//! Diagnostics hooks for the wire codec.
//!
//! Library code never prints. Callers that want to see what the codec does
//! pass a [`WireTrace`] sink to [`Serializer::with_trace`](crate::Serializer::with_trace)
//! or [`Deserializer::with_trace`](crate::Deserializer::with_trace). Every
//! hook has a no-op default, so a sink only implements what it cares about.
//!
//! ```rust
//! use polyvalue::{Deserializer, TypeTag, WireTrace};
//!
//! #[derive(Default)]
//! struct CountFrames(usize);
//!
//! impl WireTrace for CountFrames {
//!     fn on_frame_read(&mut self, _tag: TypeTag, _size: u32, _depth: usize) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let bytes = polyvalue::to_vec(&polyvalue::value!({ "a": 1u8, "b": 2u8 })).unwrap();
//! let mut frames = CountFrames::default();
//! Deserializer::from_slice(&bytes)
//!     .with_trace(&mut frames)
//!     .deserialize()
//!     .unwrap();
//! assert_eq!(frames.0, 3);
//! ```

use crate::tag::TypeTag;

/// Receives events from the serializer and deserializer.
///
/// `size` is the `TotalSize` prefix of the frame; `depth` is 0 for the
/// top-level value.
pub trait WireTrace {
    fn on_frame_written(&mut self, tag: TypeTag, size: u32, depth: usize) {
        let _ = (tag, size, depth);
    }

    fn on_frame_read(&mut self, tag: TypeTag, size: u32, depth: usize) {
        let _ = (tag, size, depth);
    }

    /// A map on the wire repeated `key`; the later entry replaced the earlier.
    fn on_duplicate_key(&mut self, key: &str, depth: usize) {
        let _ = (key, depth);
    }
}

/// Sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTrace;

impl WireTrace for NoTrace {}

impl<T: WireTrace + ?Sized> WireTrace for &mut T {
    fn on_frame_written(&mut self, tag: TypeTag, size: u32, depth: usize) {
        (**self).on_frame_written(tag, size, depth);
    }

    fn on_frame_read(&mut self, tag: TypeTag, size: u32, depth: usize) {
        (**self).on_frame_read(tag, size, depth);
    }

    fn on_duplicate_key(&mut self, key: &str, depth: usize) {
        (**self).on_duplicate_key(key, depth);
    }
}

/// Sink that records every event in order; useful in tests and tooling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

/// One event recorded by [`TraceLog`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    FrameWritten { tag: TypeTag, size: u32, depth: usize },
    FrameRead { tag: TypeTag, size: u32, depth: usize },
    DuplicateKey { key: String, depth: usize },
}

impl TraceLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys reported as duplicates, in the order they were seen.
    #[must_use]
    pub fn duplicate_keys(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::DuplicateKey { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl WireTrace for TraceLog {
    fn on_frame_written(&mut self, tag: TypeTag, size: u32, depth: usize) {
        self.events.push(TraceEvent::FrameWritten { tag, size, depth });
    }

    fn on_frame_read(&mut self, tag: TypeTag, size: u32, depth: usize) {
        self.events.push(TraceEvent::FrameRead { tag, size, depth });
    }

    fn on_duplicate_key(&mut self, key: &str, depth: usize) {
        self.events.push(TraceEvent::DuplicateKey {
            key: key.to_string(),
            depth,
        });
    }
}
