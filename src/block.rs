//! Encoded block layout.
//!
//! Every scalar, vector and map header travels as one self-describing block:
//!
//! ```text
//! Block     := TotalSize(u32 LE) Tag(u8) Payload      TotalSize = 1 + len(Payload)
//! None      : Payload = (empty)
//! Scalar<T> : Payload = T
//! Vector<T> : Payload = Count(u32 LE) T{Count}
//! MapHeader : Payload = Count(u32 LE)
//! ```
//!
//! Elements are little-endian; complex elements store the real part first.
//! The size prefix does not count itself, so a block is `4 + TotalSize` bytes.

use crate::element::Element;
use crate::tag::{Shape, TypeTag};
use crate::{Error, Result};

/// Width of the leading size prefix.
pub const SIZE_PREFIX_LEN: usize = 4;

/// Offset of the tag byte.
pub const TAG_OFFSET: usize = SIZE_PREFIX_LEN;

/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = SIZE_PREFIX_LEN + 1;

/// Smallest well-formed block: a size prefix and a tag.
pub const MIN_BLOCK_LEN: usize = PAYLOAD_OFFSET;

/// Width of the element count in vector and map header payloads.
pub const COUNT_LEN: usize = 4;

fn start(tag: TypeTag, payload_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(PAYLOAD_OFFSET + payload_len);
    // Callers bound payload_len well below u32::MAX.
    out.extend_from_slice(&((payload_len + 1) as u32).to_le_bytes());
    out.push(tag.as_u8());
    out
}

/// Encodes a block carrying no payload.
#[must_use]
pub fn encode_none() -> Vec<u8> {
    start(TypeTag::None, 0)
}

/// Encodes a single element.
///
/// # Examples
///
/// ```rust
/// use polyvalue::block;
///
/// let bytes = block::encode_scalar(7u8);
/// assert_eq!(bytes, vec![2, 0, 0, 0, 9, 7]);
/// ```
#[must_use]
pub fn encode_scalar<T: Element>(value: T) -> Vec<u8> {
    let mut out = start(TypeTag::scalar(T::KIND), T::SIZE);
    value.write_le(&mut out);
    out
}

/// Encodes a vector of elements.
///
/// # Errors
///
/// Returns [`Error::ResourceLimitExceeded`] if the element count or the
/// encoded size does not fit the `u32` fields of the layout.
pub fn encode_vector<T: Element>(values: &[T]) -> Result<Vec<u8>> {
    let max_elements = (u32::MAX as usize - 1 - COUNT_LEN) / T::SIZE;
    if values.len() > max_elements {
        return Err(Error::limit(
            "vector length",
            values.len() as u64,
            max_elements as u64,
        ));
    }
    let mut out = start(TypeTag::vector(T::KIND), COUNT_LEN + values.len() * T::SIZE);
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for value in values {
        value.write_le(&mut out);
    }
    Ok(out)
}

/// Encodes a map header declaring `count` entries.
#[must_use]
pub fn encode_map_header(count: u32) -> Vec<u8> {
    let mut out = start(TypeTag::MapHeader, COUNT_LEN);
    out.extend_from_slice(&count.to_le_bytes());
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0_u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

/// Reads the tag byte of a block without validating the payload.
///
/// # Errors
///
/// [`Error::UninitializedBuffer`] for an empty slice,
/// [`Error::MalformedBlock`] if the slice is shorter than a block header and
/// [`Error::UnsupportedType`] for an unknown tag byte.
pub fn decode_tag(bytes: &[u8]) -> Result<TypeTag> {
    if bytes.is_empty() {
        return Err(Error::UninitializedBuffer);
    }
    if bytes.len() < MIN_BLOCK_LEN {
        return Err(Error::malformed(format!(
            "block of {} bytes is shorter than the {}-byte header",
            bytes.len(),
            MIN_BLOCK_LEN
        )));
    }
    let byte = bytes[TAG_OFFSET];
    TypeTag::from_u8(byte).ok_or_else(|| Error::unsupported_type(format!("tag byte {}", byte)))
}

/// Checks that a block is internally consistent and returns its tag.
///
/// The size prefix must equal the number of bytes after it and the payload
/// length must be exactly what the tag requires.
///
/// # Errors
///
/// See [`decode_tag`]; inconsistent lengths are [`Error::MalformedBlock`].
pub fn validate(bytes: &[u8]) -> Result<TypeTag> {
    let tag = decode_tag(bytes)?;
    let declared = read_u32(bytes, 0) as usize;
    if declared != bytes.len() - SIZE_PREFIX_LEN {
        return Err(Error::malformed(format!(
            "size prefix {} does not match {} bytes of block",
            declared,
            bytes.len() - SIZE_PREFIX_LEN
        )));
    }

    let payload = &bytes[PAYLOAD_OFFSET..];
    let expected: u64 = match (tag.shape(), tag.element()) {
        (Shape::Scalar, Some(kind)) => kind.size() as u64,
        (Shape::Vector, Some(kind)) => {
            if payload.len() < COUNT_LEN {
                return Err(Error::malformed(format!(
                    "{} payload is missing its element count",
                    tag
                )));
            }
            // Cannot overflow: count < 2^32 and size <= 16.
            COUNT_LEN as u64 + u64::from(read_u32(payload, 0)) * kind.size() as u64
        }
        (Shape::Map, _) => COUNT_LEN as u64,
        _ => 0,
    };

    if payload.len() as u64 != expected {
        return Err(Error::malformed(format!(
            "{} payload is {} bytes, expected {}",
            tag,
            payload.len(),
            expected
        )));
    }
    Ok(tag)
}

/// The payload bytes of a block, after the tag.
#[inline]
#[must_use]
pub fn payload(bytes: &[u8]) -> &[u8] {
    bytes.get(PAYLOAD_OFFSET..).unwrap_or(&[])
}

/// Reads the element or entry count of a validated vector or map header.
#[inline]
#[must_use]
pub(crate) fn count(bytes: &[u8]) -> u32 {
    read_u32(bytes, PAYLOAD_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    #[test]
    fn test_scalar_layout() {
        let bytes = encode_scalar(-1i32);
        assert_eq!(bytes, vec![5, 0, 0, 0, 7, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(validate(&bytes).unwrap(), TypeTag::ScalarInt32);
    }

    #[test]
    fn test_vector_layout() {
        let bytes = encode_vector(&[1u16, 2]).unwrap();
        assert_eq!(bytes, vec![9, 0, 0, 0, 22, 2, 0, 0, 0, 1, 0, 2, 0]);
        assert_eq!(validate(&bytes).unwrap(), TypeTag::VectorUInt16);
        assert_eq!(count(&bytes), 2);
    }

    #[test]
    fn test_empty_vector_layout() {
        let bytes = encode_vector::<Complex32>(&[]).unwrap();
        assert_eq!(bytes, vec![5, 0, 0, 0, 15, 0, 0, 0, 0]);
        assert_eq!(validate(&bytes).unwrap(), TypeTag::VectorComplex64);
    }

    #[test]
    fn test_map_header_and_none() {
        let bytes = encode_map_header(3);
        assert_eq!(bytes, vec![5, 0, 0, 0, 25, 3, 0, 0, 0]);
        assert_eq!(validate(&bytes).unwrap(), TypeTag::MapHeader);
        assert_eq!(count(&bytes), 3);

        assert_eq!(encode_none(), vec![1, 0, 0, 0, 0]);
        assert_eq!(validate(&encode_none()).unwrap(), TypeTag::None);
    }

    #[test]
    fn test_decode_tag_errors() {
        assert_eq!(decode_tag(&[]), Err(Error::UninitializedBuffer));
        assert!(matches!(decode_tag(&[1, 0, 0]), Err(Error::MalformedBlock(_))));
        assert!(matches!(
            decode_tag(&[1, 0, 0, 0, 99]),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_lengths() {
        let mut bytes = encode_scalar(1u64);
        bytes.pop();
        assert!(matches!(validate(&bytes), Err(Error::MalformedBlock(_))));

        // Size prefix fixed up, payload still one byte short for a u64.
        let short = [8, 0, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(validate(&short), Err(Error::MalformedBlock(_))));

        // Vector claiming more elements than it carries.
        let lying = [9, 0, 0, 0, 19, 5, 0, 0, 0, 1, 0, 0, 0];
        assert!(matches!(validate(&lying), Err(Error::MalformedBlock(_))));

        // Vector with no count at all.
        let countless = [3, 0, 0, 0, 19, 0, 0];
        assert!(matches!(validate(&countless), Err(Error::MalformedBlock(_))));
    }

    #[test]
    fn test_payload_slice() {
        let bytes = encode_scalar(9u8);
        assert_eq!(payload(&bytes), &[9]);
        assert_eq!(payload(&[]), &[] as &[u8]);
    }
}
