//! Wire deserialization.
//!
//! A [`Deserializer`] reads one [`Value`] per call from any [`io::Read`]
//! source. Every length field on the wire is treated as untrusted:
//!
//! - A frame size above [`WireOptions::max_frame_size`], a map count above
//!   [`WireOptions::max_map_entries`], a key longer than
//!   [`WireOptions::max_key_len`] and nesting deeper than
//!   [`WireOptions::max_depth`] all fail with
//!   [`Error::ResourceLimitExceeded`] before anything is allocated for them.
//! - When the input length is known ([`Deserializer::from_slice`]), a length
//!   that cannot fit in what is left fails with [`Error::StreamTruncated`]
//!   immediately. Otherwise bytes are read incrementally and a short read
//!   fails with the same error.
//!
//! A map that repeats a key keeps the last entry; each repeat is reported to
//! the trace sink. No partially read value is ever returned.
//!
//! ```rust
//! use polyvalue::{Deserializer, Error, Value};
//!
//! let mut bytes = polyvalue::to_vec(&Value::from(3u8)).unwrap();
//! bytes.extend(polyvalue::to_vec(&Value::from(4u8)).unwrap());
//!
//! let mut de = Deserializer::from_slice(&bytes);
//! assert_eq!(de.deserialize().unwrap(), Value::from(3u8));
//! assert_eq!(de.end(), Err(Error::TrailingBytes { count: 6 }));
//! assert_eq!(de.deserialize().unwrap(), Value::from(4u8));
//! assert!(de.end().is_ok());
//! ```

use crate::block::{self, COUNT_LEN, SIZE_PREFIX_LEN};
use crate::buffer::TypedBuffer;
use crate::tag::TypeTag;
use crate::trace::{NoTrace, WireTrace};
use crate::{Error, Result, Value, ValueMap, WireOptions};
use indexmap::IndexMap;
use std::io::{self, Read};
use std::rc::Rc;

/// Smallest possible map entry: an empty key and a payload-less frame.
const MIN_ENTRY_LEN: u64 = (4 + block::MIN_BLOCK_LEN) as u64;

/// Upper bound on map slots reserved before entries arrive from a stream of
/// unknown length.
const PREALLOCATED_ENTRIES: usize = 256;

/// Reads values from a byte source.
pub struct Deserializer<R, S = NoTrace> {
    reader: R,
    options: WireOptions,
    trace: S,
    offset: u64,
    remaining: Option<u64>,
}

impl<R: Read> Deserializer<R> {
    /// Creates a deserializer over a source of unknown length.
    pub fn from_reader(reader: R) -> Self {
        Deserializer {
            reader,
            options: WireOptions::default(),
            trace: NoTrace,
            offset: 0,
            remaining: None,
        }
    }
}

impl<'a> Deserializer<&'a [u8]> {
    /// Creates a deserializer over an in-memory buffer.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Deserializer {
            remaining: Some(bytes.len() as u64),
            ..Deserializer::from_reader(bytes)
        }
    }
}

impl<R: Read, S: WireTrace> Deserializer<R, S> {
    /// Replaces the limits checked while reading.
    #[must_use]
    pub fn with_options(mut self, options: WireOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a trace sink, replacing the current one.
    pub fn with_trace<T: WireTrace>(self, trace: T) -> Deserializer<R, T> {
        Deserializer {
            reader: self.reader,
            options: self.options,
            trace,
            offset: self.offset,
            remaining: self.remaining,
        }
    }

    /// Reads one complete value.
    ///
    /// # Errors
    ///
    /// - [`Error::StreamTruncated`] if the input ends inside the value.
    /// - [`Error::ResourceLimitExceeded`] if a size, count or the nesting
    ///   depth is over the configured limits.
    /// - [`Error::MalformedBlock`] or [`Error::UnsupportedType`] for an
    ///   inconsistent frame or an unknown tag.
    /// - [`Error::InvalidKey`] for a key that is not UTF-8.
    /// - [`Error::Io`] if the source fails.
    pub fn deserialize(&mut self) -> Result<Value> {
        self.read_value(0)
    }

    /// Checks that the input is exhausted.
    ///
    /// For sources of unknown length this drains the reader.
    ///
    /// # Errors
    ///
    /// [`Error::TrailingBytes`] if anything is left.
    pub fn end(&mut self) -> Result<()> {
        let count = match self.remaining {
            Some(remaining) => remaining,
            None => io::copy(&mut self.reader, &mut io::sink()).map_err(|e| Error::io(&e.to_string()))?,
        };
        if count == 0 {
            Ok(())
        } else {
            Err(Error::TrailingBytes { count })
        }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Unwraps the source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_value(&mut self, depth: usize) -> Result<Value> {
        if depth > self.options.max_depth {
            return Err(Error::limit(
                "nesting depth",
                depth as u64,
                self.options.max_depth as u64,
            ));
        }

        let buffer = self.read_frame()?;
        let tag = buffer.tag()?;
        self.trace
            .on_frame_read(tag, (buffer.size() - SIZE_PREFIX_LEN) as u32, depth);

        if tag != TypeTag::MapHeader {
            return Ok(Value::Buffer(Rc::new(buffer)));
        }

        let count = buffer.map_count()?;
        if count > self.options.max_map_entries {
            return Err(Error::limit(
                "map entry count",
                u64::from(count),
                u64::from(self.options.max_map_entries),
            ));
        }
        self.ensure_available(u64::from(count) * MIN_ENTRY_LEN)?;

        let capacity = match self.remaining {
            Some(_) => count as usize,
            None => (count as usize).min(PREALLOCATED_ENTRIES),
        };
        // Entries arrive in any order; sort once at the end.
        let mut entries = IndexMap::with_capacity(capacity);
        for _ in 0..count {
            let key = self.read_key()?;
            let child = self.read_value(depth + 1)?;
            if entries.contains_key(&key) {
                self.trace.on_duplicate_key(&key, depth);
            }
            entries.insert(key, child);
        }
        Ok(Value::from(ValueMap::from_unsorted(entries)))
    }

    fn read_frame(&mut self) -> Result<TypedBuffer> {
        let at = self.offset;
        let prefix = self.read_u32()?;
        if prefix > self.options.max_frame_size {
            return Err(Error::limit(
                "frame size",
                u64::from(prefix),
                u64::from(self.options.max_frame_size),
            ));
        }
        if prefix == 0 {
            return Err(Error::malformed(format!("frame at offset {} has no tag", at)));
        }

        let mut frame = prefix.to_le_bytes().to_vec();
        self.read_into(&mut frame, u64::from(prefix))?;
        TypedBuffer::from_bytes(frame)
    }

    fn read_key(&mut self) -> Result<String> {
        let len = self.read_u32()?;
        if len > self.options.max_key_len {
            return Err(Error::limit(
                "key length",
                u64::from(len),
                u64::from(self.options.max_key_len),
            ));
        }
        let at = self.offset;
        let mut bytes = Vec::new();
        self.read_into(&mut bytes, u64::from(len))?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidKey { at })
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut bytes = Vec::with_capacity(COUNT_LEN);
        self.read_into(&mut bytes, COUNT_LEN as u64)?;
        let mut buf = [0_u8; 4];
        buf.copy_from_slice(&bytes);
        Ok(u32::from_le_bytes(buf))
    }

    fn ensure_available(&self, need: u64) -> Result<()> {
        match self.remaining {
            Some(remaining) if need > remaining => Err(Error::truncated(self.offset, need, remaining)),
            _ => Ok(()),
        }
    }

    /// Appends exactly `len` bytes to `out`.
    ///
    /// The buffer grows as bytes arrive, so a hostile length on a stream of
    /// unknown size cannot force a large allocation.
    fn read_into(&mut self, out: &mut Vec<u8>, len: u64) -> Result<()> {
        self.ensure_available(len)?;
        if self.remaining.is_some() {
            out.reserve(len as usize);
        }
        let got = (&mut self.reader)
            .take(len)
            .read_to_end(out)
            .map_err(|e| Error::io(&e.to_string()))? as u64;
        if got < len {
            return Err(Error::truncated(self.offset, len, got));
        }
        self.offset += len;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= len;
        }
        Ok(())
    }
}
