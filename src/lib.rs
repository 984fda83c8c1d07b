//! # polyvalue
//!
//! Dynamically typed numeric values with a compact, self-describing binary
//! encoding.
//!
//! A [`Value`] is a numeric scalar, a numeric vector, or a map from string
//! keys to further values. Twelve element types are supported: `f32`, `f64`,
//! complex numbers of both widths, and signed and unsigned integers from 8 to
//! 64 bits. Every scalar and vector lives in one encoded block that travels
//! over the wire unchanged, so values can be exchanged between components
//! without any schema negotiation.
//!
//! ## Key Features
//!
//! - **Self-describing**: each block carries its own size and type tag
//! - **Zero-copy access**: typed views decode elements straight out of the block
//! - **Exact semantics**: comparisons never coerce between element types
//! - **Hostile-input safe**: every length on the wire is bounded before use
//!   (see [`WireOptions`])
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use polyvalue::{from_slice, to_vec, value, Vector};
//!
//! let reading = value!({
//!     "sensor": 12u16,
//!     "samples": [0.5f32, 0.75, 1.0],
//!     "calibration": { "offset": (-0.125f64) }
//! });
//!
//! let bytes = to_vec(&reading).unwrap();
//! let back = from_slice(&bytes).unwrap();
//! assert_eq!(back, reading);
//!
//! let samples = Vector::<f32>::try_from(&back.get("samples").unwrap()).unwrap();
//! assert_eq!(samples.to_vec(), vec![0.5, 0.75, 1.0]);
//! ```
//!
//! ## Wire Format
//!
//! All integers are little-endian.
//!
//! ```text
//! Frame    := TotalSize(u32) Tag(u8) Payload       TotalSize = 1 + len(Payload)
//! MapEntry := KeyLength(u32) KeyBytes Frame
//! MapFrame := Frame MapEntry*                      entry count from the header payload
//! ```
//!
//! See [`block`] for payload layouts and [`TypeTag`] for tag bytes.
//!
//! ## Sharing
//!
//! Cloning a [`Value`] shares the underlying buffer or map; maps mutated
//! through one handle change for every clone. Values are single-threaded
//! (`!Send`); serialize them to move data between threads.

pub mod block;
pub mod buffer;
pub mod de;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod family;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod tag;
pub mod trace;
pub mod value;

pub use buffer::{TypedBuffer, VectorView};
pub use de::Deserializer;
pub use dispatch::{equals, format, NativeEq};
pub use element::{Element, Number};
pub use error::{Error, Result};
pub use family::{Scalar, Vector};
pub use map::ValueMap;
pub use options::WireOptions;
pub use ser::Serializer;
pub use tag::{ElementKind, Shape, TypeTag};
pub use trace::{NoTrace, TraceEvent, TraceLog, WireTrace};
pub use value::{SharedMap, Value};

pub use num_complex::{Complex32, Complex64};

use std::io;

/// Writes `value` to `writer` and returns the number of bytes written.
///
/// # Examples
///
/// ```rust
/// use polyvalue::{serialize, Value};
///
/// let mut out = Vec::new();
/// let written = serialize(&Value::from(vec![1u8, 2, 3]), &mut out).unwrap();
/// assert_eq!(written, 12);
/// assert_eq!(out, vec![8, 0, 0, 0, 21, 3, 0, 0, 0, 1, 2, 3]);
/// ```
///
/// # Errors
///
/// See [`Serializer::serialize`].
pub fn serialize<W: io::Write>(value: &Value, writer: W) -> Result<usize> {
    serialize_with_options(value, writer, WireOptions::default())
}

/// Writes `value` to `writer`, checking the given limits.
///
/// # Errors
///
/// See [`Serializer::serialize`].
pub fn serialize_with_options<W: io::Write>(
    value: &Value,
    writer: W,
    options: WireOptions,
) -> Result<usize> {
    Serializer::new(writer)
        .with_options(options)
        .serialize(value)
}

/// Serializes `value` into a new byte vector.
///
/// # Errors
///
/// See [`Serializer::serialize`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut serializer = Serializer::new(Vec::new());
    serializer.serialize(value)?;
    Ok(serializer.into_inner())
}

/// Reads one value from `reader`.
///
/// Bytes after the value are left unread.
///
/// # Examples
///
/// ```rust
/// use polyvalue::{deserialize, Value};
/// use std::io::Cursor;
///
/// let value = deserialize(Cursor::new(vec![2, 0, 0, 0, 5, 0xff])).unwrap();
/// assert_eq!(value, Value::from(-1i8));
/// ```
///
/// # Errors
///
/// See [`Deserializer::deserialize`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn deserialize<R: io::Read>(reader: R) -> Result<Value> {
    deserialize_with_options(reader, WireOptions::default())
}

/// Reads one value from `reader` under the given limits.
///
/// # Errors
///
/// See [`Deserializer::deserialize`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn deserialize_with_options<R: io::Read>(reader: R, options: WireOptions) -> Result<Value> {
    Deserializer::from_reader(reader)
        .with_options(options)
        .deserialize()
}

/// Reads exactly one value from `bytes`.
///
/// # Errors
///
/// As [`Deserializer::deserialize`], plus [`Error::TrailingBytes`] if input
/// is left after the value.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(bytes: &[u8]) -> Result<Value> {
    from_slice_with_options(bytes, WireOptions::default())
}

/// Reads exactly one value from `bytes` under the given limits.
///
/// # Errors
///
/// See [`from_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with_options(bytes: &[u8], options: WireOptions) -> Result<Value> {
    let mut deserializer = Deserializer::from_slice(bytes).with_options(options);
    let value = deserializer.deserialize()?;
    deserializer.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_round_trip_nested_map() {
        let original = value!({
            "id": 7u32,
            "iq": [Complex32::new(1.0, -1.0), Complex32::new(0.0, 0.5)],
            "stats": { "min": (-2i64), "max": 9i64 }
        });
        let bytes = to_vec(&original).unwrap();
        assert_eq!(from_slice(&bytes).unwrap(), original);
        assert_eq!(deserialize(&bytes[..]).unwrap(), original);
    }

    #[test]
    fn test_serialize_reports_length() {
        let value = value!({ "k": 1u8 });
        let mut out = Vec::new();
        let written = serialize(&value, &mut out).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(written, 9 + 4 + 1 + 6);
    }

    #[test]
    fn test_from_slice_rejects_trailing_bytes() {
        let mut bytes = to_vec(&Value::from(1u8)).unwrap();
        bytes.push(0);
        assert_eq!(from_slice(&bytes), Err(Error::TrailingBytes { count: 1 }));
        assert!(deserialize(&bytes[..]).is_ok());
    }

    #[test]
    fn test_options_apply_both_ways() {
        let value = value!({ "a": { "b": 1u8 } });
        let tight = WireOptions::new().with_max_depth(1);
        assert!(serialize_with_options(&value, Vec::new(), tight.clone()).is_err());

        let bytes = to_vec(&value).unwrap();
        assert!(from_slice_with_options(&bytes, tight.clone()).is_err());
        assert!(deserialize_with_options(&bytes[..], tight).is_err());
        assert!(from_slice_with_options(&bytes, WireOptions::new().with_max_depth(2)).is_ok());
    }
}
