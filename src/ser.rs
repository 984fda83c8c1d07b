//! Wire serialization.
//!
//! A [`Serializer`] writes one [`Value`] per call into any [`io::Write`]
//! sink. Scalars and vectors are written as their encoded block, byte for
//! byte. A map is written as a fresh map header frame carrying the current
//! entry count, followed by each entry in key order:
//!
//! ```text
//! MapEntry := KeyLength(u32 LE) KeyBytes Frame
//! ```
//!
//! ## Usage
//!
//! Most callers use [`to_vec`](crate::to_vec) or
//! [`serialize`](crate::serialize). The serializer itself is useful for
//! writing several values into one sink, or for attaching a trace sink:
//!
//! ```rust
//! use polyvalue::{Serializer, TraceLog, Value};
//!
//! let mut log = TraceLog::new();
//! let mut ser = Serializer::new(Vec::new()).with_trace(&mut log);
//! ser.serialize(&Value::from(1u8)).unwrap();
//! ser.serialize(&Value::from(vec![1u8, 2])).unwrap();
//! assert_eq!(ser.bytes_written(), 6 + 11);
//!
//! let bytes = ser.into_inner();
//! assert_eq!(bytes.len(), 17);
//! assert_eq!(log.events.len(), 2);
//! ```
//!
//! A failed call may already have written part of the value; the sink should
//! be treated as corrupted afterwards.

use crate::block;
use crate::tag::TypeTag;
use crate::trace::{NoTrace, WireTrace};
use crate::{Error, Result, Value, WireOptions};
use std::io;

/// Writes values to a byte sink.
pub struct Serializer<W, S = NoTrace> {
    writer: W,
    options: WireOptions,
    trace: S,
    written: usize,
}

impl<W: io::Write> Serializer<W> {
    /// Creates a serializer with default limits and no tracing.
    pub fn new(writer: W) -> Self {
        Serializer {
            writer,
            options: WireOptions::default(),
            trace: NoTrace,
            written: 0,
        }
    }
}

impl<W: io::Write, S: WireTrace> Serializer<W, S> {
    /// Replaces the limits checked while writing.
    #[must_use]
    pub fn with_options(mut self, options: WireOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a trace sink, replacing the current one.
    pub fn with_trace<T: WireTrace>(self, trace: T) -> Serializer<W, T> {
        Serializer {
            writer: self.writer,
            options: self.options,
            trace,
            written: self.written,
        }
    }

    /// Writes one value and returns the number of bytes it took.
    ///
    /// # Errors
    ///
    /// - [`Error::UninitializedValue`] if the value, or any map entry, is
    ///   empty.
    /// - [`Error::ResourceLimitExceeded`] if a key, map, frame or the nesting
    ///   depth is over the configured limits.
    /// - [`Error::CountMismatch`] for a bare map header buffer declaring
    ///   entries it does not carry.
    /// - [`Error::Io`] if the sink fails.
    pub fn serialize(&mut self, value: &Value) -> Result<usize> {
        let start = self.written;
        self.write_value(value, 0)?;
        Ok(self.written - start)
    }

    /// Total bytes written by this serializer so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &WireOptions {
        &self.options
    }

    /// Unwraps the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::limit(
                "nesting depth",
                depth as u64,
                self.options.max_depth as u64,
            ));
        }

        match value {
            Value::Empty => Err(Error::UninitializedValue),
            Value::Buffer(buffer) => {
                let tag = buffer.tag()?;
                if tag == TypeTag::MapHeader {
                    let declared = buffer.map_count()?;
                    if declared != 0 {
                        return Err(Error::CountMismatch {
                            declared: u64::from(declared),
                            actual: 0,
                        });
                    }
                }
                self.write_frame(tag, buffer.raw_bytes(), depth)
            }
            Value::Map(map) => {
                let map = map.borrow();
                let limit = self.options.max_map_entries;
                let count = u32::try_from(map.len())
                    .ok()
                    .filter(|count| *count <= limit)
                    .ok_or_else(|| Error::limit("map entry count", map.len() as u64, u64::from(limit)))?;

                let header = block::encode_map_header(count);
                self.write_frame(TypeTag::MapHeader, &header, depth)?;

                let mut entries: u32 = 0;
                for (key, child) in map.iter() {
                    self.write_key(key)?;
                    self.write_value(child, depth + 1)?;
                    entries += 1;
                }

                if entries != count {
                    return Err(Error::CountMismatch {
                        declared: u64::from(count),
                        actual: u64::from(entries),
                    });
                }
                Ok(())
            }
        }
    }

    fn write_frame(&mut self, tag: TypeTag, frame: &[u8], depth: usize) -> Result<()> {
        let size = frame.len() - block::SIZE_PREFIX_LEN;
        let limit = self.options.max_frame_size;
        let size = u32::try_from(size)
            .ok()
            .filter(|size| *size <= limit)
            .ok_or_else(|| Error::limit("frame size", size as u64, u64::from(limit)))?;

        self.write_all(frame)?;
        self.trace.on_frame_written(tag, size, depth);
        Ok(())
    }

    fn write_key(&mut self, key: &str) -> Result<()> {
        let limit = self.options.max_key_len;
        let len = u32::try_from(key.len())
            .ok()
            .filter(|len| *len <= limit)
            .ok_or_else(|| Error::limit("key length", key.len() as u64, u64::from(limit)))?;

        self.write_all(&len.to_le_bytes())?;
        self.write_all(key.as_bytes())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::io(&e.to_string()))?;
        self.written += bytes.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceEvent, TraceLog};
    use crate::TypedBuffer;
    use std::rc::Rc;

    fn write(value: &Value) -> Result<Vec<u8>> {
        let mut ser = Serializer::new(Vec::new());
        ser.serialize(value)?;
        Ok(ser.into_inner())
    }

    #[test]
    fn test_scalar_written_verbatim() {
        let value = Value::from(0x0102i16);
        assert_eq!(write(&value).unwrap(), vec![3, 0, 0, 0, 6, 0x02, 0x01]);
    }

    #[test]
    fn test_map_layout() {
        let value = Value::map();
        value.insert("b", Value::from(2u8)).unwrap();
        value.insert("a", Value::from(1u8)).unwrap();

        let bytes = write(&value).unwrap();
        #[rustfmt::skip]
        let expected = vec![
            5, 0, 0, 0, 25, 2, 0, 0, 0,
            1, 0, 0, 0, b'a', 2, 0, 0, 0, 9, 1,
            1, 0, 0, 0, b'b', 2, 0, 0, 0, 9, 2,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_empty_map_is_a_bare_header() {
        assert_eq!(write(&Value::map()).unwrap(), vec![5, 0, 0, 0, 25, 0, 0, 0, 0]);
    }

    #[test]
    fn test_returns_bytes_written() {
        let mut ser = Serializer::new(Vec::new());
        assert_eq!(ser.serialize(&Value::from(1u32)).unwrap(), 9);
        assert_eq!(ser.serialize(&Value::from(vec![1u8])).unwrap(), 10);
        assert_eq!(ser.bytes_written(), 19);
    }

    #[test]
    fn test_empty_values_rejected() {
        assert_eq!(write(&Value::Empty), Err(Error::UninitializedValue));

        let map = Value::map();
        map.insert("hole", Value::Empty).unwrap();
        assert_eq!(write(&map), Err(Error::UninitializedValue));

        let bare = Value::Buffer(Rc::new(TypedBuffer::default()));
        assert_eq!(write(&bare), Err(Error::UninitializedBuffer));
    }

    #[test]
    fn test_bare_header_with_entries_rejected() {
        let header = Value::Buffer(Rc::new(TypedBuffer::map_header(3)));
        assert_eq!(
            write(&header),
            Err(Error::CountMismatch {
                declared: 3,
                actual: 0
            })
        );
    }

    #[test]
    fn test_limits() {
        let map = Value::map();
        map.insert("long key", Value::from(1u8)).unwrap();

        let mut ser = Serializer::new(Vec::new()).with_options(WireOptions::new().with_max_key_len(4));
        assert!(matches!(
            ser.serialize(&map),
            Err(Error::ResourceLimitExceeded { what: "key length", found: 8, limit: 4 })
        ));

        let mut ser = Serializer::new(Vec::new()).with_options(WireOptions::new().with_max_map_entries(0));
        assert!(matches!(
            ser.serialize(&map),
            Err(Error::ResourceLimitExceeded { what: "map entry count", .. })
        ));

        let mut ser = Serializer::new(Vec::new()).with_options(WireOptions::new().with_max_frame_size(4));
        assert!(matches!(
            ser.serialize(&Value::from(1u64)),
            Err(Error::ResourceLimitExceeded { what: "frame size", found: 9, limit: 4 })
        ));

        let mut ser = Serializer::new(Vec::new()).with_options(WireOptions::new().with_max_depth(0));
        assert!(matches!(
            ser.serialize(&map),
            Err(Error::ResourceLimitExceeded { what: "nesting depth", .. })
        ));
    }

    #[test]
    fn test_cycle_stops_at_depth_limit() {
        let map = Value::map();
        map.insert("loop", map.clone()).unwrap();
        assert!(matches!(
            write(&map),
            Err(Error::ResourceLimitExceeded { what: "nesting depth", .. })
        ));
        map.remove("loop").unwrap();
    }

    #[test]
    fn test_io_errors_are_reported() {
        struct Broken;

        impl io::Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut ser = Serializer::new(Broken);
        assert_eq!(
            ser.serialize(&Value::from(1u8)),
            Err(Error::Io("disk full".to_string()))
        );
    }

    #[test]
    fn test_trace_reports_frames() {
        let value = Value::map();
        value.insert("v", Value::from(vec![1u16])).unwrap();

        let mut log = TraceLog::new();
        Serializer::new(Vec::new())
            .with_trace(&mut log)
            .serialize(&value)
            .unwrap();
        assert_eq!(
            log.events,
            vec![
                TraceEvent::FrameWritten {
                    tag: TypeTag::MapHeader,
                    size: 5,
                    depth: 0
                },
                TraceEvent::FrameWritten {
                    tag: TypeTag::VectorUInt16,
                    size: 7,
                    depth: 1
                },
            ]
        );
    }
}
