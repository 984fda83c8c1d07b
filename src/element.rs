//! Native element types and their little-endian encoding.
//!
//! [`Element`] is implemented for the twelve native types that can appear in
//! a scalar or vector block: `f32`, `f64`, [`Complex32`], [`Complex64`] and
//! the signed and unsigned integers from 8 to 64 bits. The trait is sealed.
//!
//! [`Number`] is the dynamically typed form of one element. Its equality is
//! exact: values of different element kinds never compare equal, so
//! `Number::from(1i32) != Number::from(1.0f32)`.

use crate::tag::ElementKind;
use num_complex::{Complex32, Complex64};
use serde::{Serialize, Serializer};
use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// A native element type with a fixed little-endian encoding.
pub trait Element:
    Copy + PartialEq + fmt::Debug + fmt::Display + sealed::Sealed + 'static
{
    /// The element kind recorded in tags.
    const KIND: ElementKind;

    /// Encoded width in bytes.
    const SIZE: usize;

    /// Appends the little-endian encoding of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decodes one element from the first [`Self::SIZE`] bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`Self::SIZE`]. Callers only pass
    /// slices of validated blocks.
    fn read_le(bytes: &[u8]) -> Self;

    /// The dynamically typed form of this element.
    fn into_number(self) -> Number;
}

macro_rules! impl_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0_u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(buf)
                }

                #[inline]
                fn into_number(self) -> Number {
                    Number::$kind(self)
                }
            }

            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$kind(value)
                }
            }
        )*
    };
}

impl_element! {
    f32 => Float32,
    f64 => Float64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
}

macro_rules! impl_complex_element {
    ($($ty:ty => $kind:ident, $part:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            // Real part first, then imaginary.
            impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;
                const SIZE: usize = 2 * std::mem::size_of::<$part>();

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    self.re.write_le(out);
                    self.im.write_le(out);
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let half = std::mem::size_of::<$part>();
                    <$ty>::new(<$part>::read_le(bytes), <$part>::read_le(&bytes[half..]))
                }

                #[inline]
                fn into_number(self) -> Number {
                    Number::$kind(self)
                }
            }

            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$kind(value)
                }
            }
        )*
    };
}

impl_complex_element! {
    Complex32 => Complex64, f32,
    Complex64 => Complex128, f64,
}

/// One element of any kind.
///
/// # Examples
///
/// ```rust
/// use polyvalue::{ElementKind, Number};
///
/// let n = Number::from(7u16);
/// assert_eq!(n.kind(), ElementKind::UInt16);
/// assert_eq!(n.to_string(), "7");
/// assert_ne!(Number::from(1i32), Number::from(1i64));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Float32(f32),
    Float64(f64),
    Complex64(Complex32),
    Complex128(Complex64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
}

impl Number {
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Number::Float32(_) => ElementKind::Float32,
            Number::Float64(_) => ElementKind::Float64,
            Number::Complex64(_) => ElementKind::Complex64,
            Number::Complex128(_) => ElementKind::Complex128,
            Number::Int8(_) => ElementKind::Int8,
            Number::Int16(_) => ElementKind::Int16,
            Number::Int32(_) => ElementKind::Int32,
            Number::Int64(_) => ElementKind::Int64,
            Number::UInt8(_) => ElementKind::UInt8,
            Number::UInt16(_) => ElementKind::UInt16,
            Number::UInt32(_) => ElementKind::UInt32,
            Number::UInt64(_) => ElementKind::UInt64,
        }
    }

    /// Returns `true` for the two complex kinds.
    #[inline]
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self, Number::Complex64(_) | Number::Complex128(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Float32(v) => write!(f, "{}", v),
            Number::Float64(v) => write!(f, "{}", v),
            Number::Complex64(v) => write!(f, "{}", v),
            Number::Complex128(v) => write!(f, "{}", v),
            Number::Int8(v) => write!(f, "{}", v),
            Number::Int16(v) => write!(f, "{}", v),
            Number::Int32(v) => write!(f, "{}", v),
            Number::Int64(v) => write!(f, "{}", v),
            Number::UInt8(v) => write!(f, "{}", v),
            Number::UInt16(v) => write!(f, "{}", v),
            Number::UInt32(v) => write!(f, "{}", v),
            Number::UInt64(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Number::Float32(v) => serializer.serialize_f32(*v),
            Number::Float64(v) => serializer.serialize_f64(*v),
            Number::Complex64(v) => (v.re, v.im).serialize(serializer),
            Number::Complex128(v) => (v.re, v.im).serialize(serializer),
            Number::Int8(v) => serializer.serialize_i8(*v),
            Number::Int16(v) => serializer.serialize_i16(*v),
            Number::Int32(v) => serializer.serialize_i32(*v),
            Number::Int64(v) => serializer.serialize_i64(*v),
            Number::UInt8(v) => serializer.serialize_u8(*v),
            Number::UInt16(v) => serializer.serialize_u16(*v),
            Number::UInt32(v) => serializer.serialize_u32(*v),
            Number::UInt64(v) => serializer.serialize_u64(*v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: Element>(value: T) -> Vec<u8> {
        let mut out = Vec::new();
        value.write_le(&mut out);
        out
    }

    #[test]
    fn test_sizes_match_kinds() {
        assert_eq!(f32::SIZE, ElementKind::Float32.size());
        assert_eq!(f64::SIZE, ElementKind::Float64.size());
        assert_eq!(Complex32::SIZE, ElementKind::Complex64.size());
        assert_eq!(Complex64::SIZE, ElementKind::Complex128.size());
        assert_eq!(i8::SIZE, ElementKind::Int8.size());
        assert_eq!(u64::SIZE, ElementKind::UInt64.size());
    }

    #[test]
    fn test_little_endian_layout() {
        assert_eq!(encode(0x0102_0304u32), vec![4, 3, 2, 1]);
        assert_eq!(encode(-2i16), vec![0xfe, 0xff]);
        assert_eq!(encode(1.0f32), vec![0, 0, 0x80, 0x3f]);
    }

    #[test]
    fn test_complex_real_part_first() {
        let bytes = encode(Complex32::new(1.0, -1.0));
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-1.0f32).to_le_bytes());
        assert_eq!(Complex32::read_le(&bytes), Complex32::new(1.0, -1.0));
    }

    #[test]
    fn test_read_back() {
        assert_eq!(i64::read_le(&encode(i64::MIN)), i64::MIN);
        assert_eq!(f64::read_le(&encode(2.5f64)), 2.5);
        let c = Complex64::new(3.0, 4.0);
        assert_eq!(Complex64::read_le(&encode(c)), c);
    }

    #[test]
    fn test_number_equality_is_exact() {
        assert_eq!(Number::from(3i32), 3i32.into_number());
        assert_ne!(Number::from(3i32), Number::from(3u32));
        assert_ne!(Number::from(1.0f32), Number::from(1.0f64));
        assert!(Number::from(Complex32::new(0.0, 1.0)).is_complex());
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::from(1.5f64).to_string(), "1.5");
        assert_eq!(Number::from(-8i8).to_string(), "-8");
        assert_eq!(Number::from(Complex64::new(1.0, 2.0)).to_string(), "1+2i");
    }

    #[test]
    fn test_number_serialize() {
        let json = serde_json::to_string(&Number::from(Complex32::new(1.0, 2.0))).unwrap();
        assert_eq!(json, "[1.0,2.0]");
        assert_eq!(serde_json::to_string(&Number::from(5u8)).unwrap(), "5");
    }
}
