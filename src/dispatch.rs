//! Tag-driven formatting and comparison.
//!
//! Both operations resolve the runtime [`TypeTag`] of a value to the
//! statically typed family it encodes with one exhaustive `match`, so adding
//! a tag without handling it here fails to compile.
//!
//! ## Formatting
//!
//! ```rust
//! use polyvalue::{format, value};
//!
//! let v = value!({ "b": [1i32, 2, 3], "a": 1i32 });
//! assert_eq!(format(&v).unwrap(), "{ a: 1, b: [1, 2, 3] }");
//! ```
//!
//! ## Comparing against natives
//!
//! [`equals`] is exact. A value only equals a native of the same element
//! type and shape; there is no numeric promotion.
//!
//! ```rust
//! use polyvalue::{equals, Value};
//!
//! let v = Value::from(vec![1i32, 2, 3]);
//! assert!(equals(&v, &vec![1i32, 2, 3]).unwrap());
//! assert!(!equals(&v, &vec![1i64, 2, 3]).unwrap());
//! assert!(!equals(&Value::from(1.0f32), &1i32).unwrap());
//! ```

use crate::buffer::{TypedBuffer, VectorView};
use crate::element::Element;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::tag::TypeTag;
use crate::{Error, Result, Value, ValueMap};
use num_complex::{Complex32, Complex64};

/// Renders a value as text.
///
/// Scalars use their `Display` form (complex numbers as `re+imi`), vectors
/// render as `[a, b, c]` and maps as `{ key: value, ... }` in key order. An
/// empty map renders as `{ }`.
///
/// # Errors
///
/// - [`Error::UninitializedValue`] for an empty value, at any depth.
/// - [`Error::UnsupportedType`] for `None` blocks and bare map headers.
/// - [`Error::ResourceLimitExceeded`] for maps nested deeper than
///   [`DEFAULT_MAX_DEPTH`].
pub fn format(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value, 0)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<()> {
    if depth > DEFAULT_MAX_DEPTH {
        return Err(Error::limit(
            "nesting depth",
            depth as u64,
            DEFAULT_MAX_DEPTH as u64,
        ));
    }
    match value {
        Value::Empty => Err(Error::UninitializedValue),
        Value::Buffer(buffer) => write_buffer(out, buffer),
        Value::Map(map) => {
            out.push('{');
            for (i, (key, child)) in map.borrow().iter().enumerate() {
                out.push_str(if i == 0 { " " } else { ", " });
                out.push_str(key);
                out.push_str(": ");
                write_value(out, child, depth + 1)?;
            }
            out.push_str(" }");
            Ok(())
        }
    }
}

fn write_buffer(out: &mut String, buffer: &TypedBuffer) -> Result<()> {
    match buffer.tag()? {
        TypeTag::None => Err(Error::unsupported_type("cannot format a none block")),
        TypeTag::MapHeader => Err(Error::unsupported_type("cannot format a bare map header")),
        TypeTag::ScalarFloat32 => write_scalar(out, buffer.scalar::<f32>()?),
        TypeTag::ScalarFloat64 => write_scalar(out, buffer.scalar::<f64>()?),
        TypeTag::ScalarComplex64 => write_scalar(out, buffer.scalar::<Complex32>()?),
        TypeTag::ScalarComplex128 => write_scalar(out, buffer.scalar::<Complex64>()?),
        TypeTag::ScalarInt8 => write_scalar(out, buffer.scalar::<i8>()?),
        TypeTag::ScalarInt16 => write_scalar(out, buffer.scalar::<i16>()?),
        TypeTag::ScalarInt32 => write_scalar(out, buffer.scalar::<i32>()?),
        TypeTag::ScalarInt64 => write_scalar(out, buffer.scalar::<i64>()?),
        TypeTag::ScalarUInt8 => write_scalar(out, buffer.scalar::<u8>()?),
        TypeTag::ScalarUInt16 => write_scalar(out, buffer.scalar::<u16>()?),
        TypeTag::ScalarUInt32 => write_scalar(out, buffer.scalar::<u32>()?),
        TypeTag::ScalarUInt64 => write_scalar(out, buffer.scalar::<u64>()?),
        TypeTag::VectorFloat32 => write_vector(out, buffer.vector::<f32>()?),
        TypeTag::VectorFloat64 => write_vector(out, buffer.vector::<f64>()?),
        TypeTag::VectorComplex64 => write_vector(out, buffer.vector::<Complex32>()?),
        TypeTag::VectorComplex128 => write_vector(out, buffer.vector::<Complex64>()?),
        TypeTag::VectorInt8 => write_vector(out, buffer.vector::<i8>()?),
        TypeTag::VectorInt16 => write_vector(out, buffer.vector::<i16>()?),
        TypeTag::VectorInt32 => write_vector(out, buffer.vector::<i32>()?),
        TypeTag::VectorInt64 => write_vector(out, buffer.vector::<i64>()?),
        TypeTag::VectorUInt8 => write_vector(out, buffer.vector::<u8>()?),
        TypeTag::VectorUInt16 => write_vector(out, buffer.vector::<u16>()?),
        TypeTag::VectorUInt32 => write_vector(out, buffer.vector::<u32>()?),
        TypeTag::VectorUInt64 => write_vector(out, buffer.vector::<u64>()?),
    }
}

fn write_scalar<T: Element>(out: &mut String, value: T) -> Result<()> {
    out.push_str(&value.to_string());
    Ok(())
}

fn write_vector<T: Element>(out: &mut String, values: VectorView<'_, T>) -> Result<()> {
    out.push('[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&value.to_string());
    }
    out.push(']');
    Ok(())
}

/// A native value that a [`Value`] can be compared against.
///
/// Implemented for the twelve element types, for slices, `Vec`s and arrays
/// of them, and for [`ValueMap`].
pub trait NativeEq {
    /// Compares against a scalar value holding `value`.
    fn eq_scalar<T: Element>(&self, value: T) -> Result<bool>;

    /// Compares against a vector value holding `values`.
    fn eq_vector<T: Element>(&self, values: VectorView<'_, T>) -> Result<bool>;

    /// Compares against a map value.
    fn eq_map(&self, map: &ValueMap) -> Result<bool> {
        let _ = map;
        Err(Error::unsupported_comparison(
            "a map value only compares against a ValueMap",
        ))
    }
}

macro_rules! impl_native_eq_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NativeEq for $ty {
                fn eq_scalar<T: Element>(&self, value: T) -> Result<bool> {
                    Ok(value.into_number() == self.into_number())
                }

                fn eq_vector<T: Element>(&self, _values: VectorView<'_, T>) -> Result<bool> {
                    Ok(false)
                }
            }

            impl PartialEq<$ty> for Value {
                fn eq(&self, other: &$ty) -> bool {
                    equals(self, other).unwrap_or(false)
                }
            }
        )*
    };
}

impl_native_eq_element!(f32, f64, Complex32, Complex64, i8, i16, i32, i64, u8, u16, u32, u64);

impl<U: Element> NativeEq for [U] {
    fn eq_scalar<T: Element>(&self, _value: T) -> Result<bool> {
        Ok(false)
    }

    fn eq_vector<T: Element>(&self, values: VectorView<'_, T>) -> Result<bool> {
        Ok(T::KIND == U::KIND
            && values.len() == self.len()
            && values
                .iter()
                .zip(self)
                .all(|(a, b)| a.into_number() == b.into_number()))
    }
}

impl<U: Element> NativeEq for Vec<U> {
    fn eq_scalar<T: Element>(&self, value: T) -> Result<bool> {
        self.as_slice().eq_scalar(value)
    }

    fn eq_vector<T: Element>(&self, values: VectorView<'_, T>) -> Result<bool> {
        self.as_slice().eq_vector(values)
    }
}

impl<U: Element, const N: usize> NativeEq for [U; N] {
    fn eq_scalar<T: Element>(&self, value: T) -> Result<bool> {
        self[..].eq_scalar(value)
    }

    fn eq_vector<T: Element>(&self, values: VectorView<'_, T>) -> Result<bool> {
        self[..].eq_vector(values)
    }
}

impl NativeEq for ValueMap {
    fn eq_scalar<T: Element>(&self, _value: T) -> Result<bool> {
        Err(Error::unsupported_comparison(
            "a scalar value never compares against a map",
        ))
    }

    fn eq_vector<T: Element>(&self, _values: VectorView<'_, T>) -> Result<bool> {
        Err(Error::unsupported_comparison(
            "a vector value never compares against a map",
        ))
    }

    fn eq_map(&self, map: &ValueMap) -> Result<bool> {
        Ok(map == self)
    }
}

/// Compares a value against a native value with exact type semantics.
///
/// Returns `Ok(false)` when the element type or shape differs. Scalars never
/// equal vectors, even of length one.
///
/// # Errors
///
/// - [`Error::UninitializedValue`] for an empty value.
/// - [`Error::UnsupportedComparison`] when a map meets a numeric native or a
///   scalar or vector meets a [`ValueMap`].
/// - [`Error::UnsupportedType`] for a `None` block.
pub fn equals<N: NativeEq + ?Sized>(value: &Value, native: &N) -> Result<bool> {
    match value {
        Value::Empty => Err(Error::UninitializedValue),
        Value::Map(map) => native.eq_map(&map.borrow()),
        Value::Buffer(buffer) => equals_buffer(buffer, native),
    }
}

fn equals_buffer<N: NativeEq + ?Sized>(buffer: &TypedBuffer, native: &N) -> Result<bool> {
    match buffer.tag()? {
        TypeTag::None => Err(Error::unsupported_type("cannot compare a none block")),
        TypeTag::MapHeader => Err(Error::unsupported_type("cannot compare a bare map header")),
        TypeTag::ScalarFloat32 => native.eq_scalar(buffer.scalar::<f32>()?),
        TypeTag::ScalarFloat64 => native.eq_scalar(buffer.scalar::<f64>()?),
        TypeTag::ScalarComplex64 => native.eq_scalar(buffer.scalar::<Complex32>()?),
        TypeTag::ScalarComplex128 => native.eq_scalar(buffer.scalar::<Complex64>()?),
        TypeTag::ScalarInt8 => native.eq_scalar(buffer.scalar::<i8>()?),
        TypeTag::ScalarInt16 => native.eq_scalar(buffer.scalar::<i16>()?),
        TypeTag::ScalarInt32 => native.eq_scalar(buffer.scalar::<i32>()?),
        TypeTag::ScalarInt64 => native.eq_scalar(buffer.scalar::<i64>()?),
        TypeTag::ScalarUInt8 => native.eq_scalar(buffer.scalar::<u8>()?),
        TypeTag::ScalarUInt16 => native.eq_scalar(buffer.scalar::<u16>()?),
        TypeTag::ScalarUInt32 => native.eq_scalar(buffer.scalar::<u32>()?),
        TypeTag::ScalarUInt64 => native.eq_scalar(buffer.scalar::<u64>()?),
        TypeTag::VectorFloat32 => native.eq_vector(buffer.vector::<f32>()?),
        TypeTag::VectorFloat64 => native.eq_vector(buffer.vector::<f64>()?),
        TypeTag::VectorComplex64 => native.eq_vector(buffer.vector::<Complex32>()?),
        TypeTag::VectorComplex128 => native.eq_vector(buffer.vector::<Complex64>()?),
        TypeTag::VectorInt8 => native.eq_vector(buffer.vector::<i8>()?),
        TypeTag::VectorInt16 => native.eq_vector(buffer.vector::<i16>()?),
        TypeTag::VectorInt32 => native.eq_vector(buffer.vector::<i32>()?),
        TypeTag::VectorInt64 => native.eq_vector(buffer.vector::<i64>()?),
        TypeTag::VectorUInt8 => native.eq_vector(buffer.vector::<u8>()?),
        TypeTag::VectorUInt16 => native.eq_vector(buffer.vector::<u16>()?),
        TypeTag::VectorUInt32 => native.eq_vector(buffer.vector::<u32>()?),
        TypeTag::VectorUInt64 => native.eq_vector(buffer.vector::<u64>()?),
    }
}

impl<U: Element> PartialEq<[U]> for Value {
    fn eq(&self, other: &[U]) -> bool {
        equals(self, other).unwrap_or(false)
    }
}

impl<U: Element> PartialEq<Vec<U>> for Value {
    fn eq(&self, other: &Vec<U>) -> bool {
        equals(self, other).unwrap_or(false)
    }
}

impl<U: Element, const N: usize> PartialEq<[U; N]> for Value {
    fn eq(&self, other: &[U; N]) -> bool {
        equals(self, other).unwrap_or(false)
    }
}

impl PartialEq<ValueMap> for Value {
    fn eq(&self, other: &ValueMap) -> bool {
        equals(self, other).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn nested(depth: usize) -> Value {
        let mut value = Value::from(0u8);
        for _ in 0..depth {
            let map = Value::map();
            map.insert("n", value).unwrap();
            value = map;
        }
        value
    }

    #[test]
    fn test_format_scalars() {
        assert_eq!(format(&Value::from(1i32)).unwrap(), "1");
        assert_eq!(format(&Value::from(2.5f64)).unwrap(), "2.5");
        assert_eq!(format(&Value::from(u64::MAX)).unwrap(), "18446744073709551615");
        assert_eq!(
            format(&Value::from(Complex64::new(1.0, 2.0))).unwrap(),
            "1+2i"
        );
        assert_eq!(
            format(&Value::from(Complex32::new(1.5, -0.5))).unwrap(),
            "1.5-0.5i"
        );
    }

    #[test]
    fn test_format_vectors() {
        assert_eq!(format(&Value::from(vec![1i8, -2, 3])).unwrap(), "[1, -2, 3]");
        assert_eq!(format(&Value::from(Vec::<f32>::new())).unwrap(), "[]");
        assert_eq!(format(&Value::from(vec![7u16])).unwrap(), "[7]");
    }

    #[test]
    fn test_format_maps() {
        let map = Value::map();
        assert_eq!(format(&map).unwrap(), "{ }");

        map.insert("b", Value::from(vec![1i32, 2, 3])).unwrap();
        map.insert("a", Value::from(1i32)).unwrap();
        assert_eq!(format(&map).unwrap(), "{ a: 1, b: [1, 2, 3] }");

        let outer = Value::map();
        outer.insert("inner", map).unwrap();
        assert_eq!(
            format(&outer).unwrap(),
            "{ inner: { a: 1, b: [1, 2, 3] } }"
        );
        assert_eq!(outer.to_string(), "{ inner: { a: 1, b: [1, 2, 3] } }");
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(format(&Value::Empty), Err(Error::UninitializedValue));
        let none = Value::Buffer(Rc::new(TypedBuffer::none()));
        assert!(matches!(format(&none), Err(Error::UnsupportedType(_))));
        let header = Value::Buffer(Rc::new(TypedBuffer::map_header(0)));
        assert!(matches!(format(&header), Err(Error::UnsupportedType(_))));

        let map = Value::map();
        map.insert("gap", Value::Empty).unwrap();
        assert_eq!(format(&map), Err(Error::UninitializedValue));
    }

    #[test]
    fn test_format_depth_limit() {
        assert!(format(&nested(DEFAULT_MAX_DEPTH)).is_ok());
        assert!(matches!(
            format(&nested(DEFAULT_MAX_DEPTH + 1)),
            Err(Error::ResourceLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_format_cycle_stops_at_depth_limit() {
        let map = Value::map();
        map.insert("self", map.clone()).unwrap();
        assert!(matches!(
            format(&map),
            Err(Error::ResourceLimitExceeded { .. })
        ));
        // Break the cycle so the map is freed.
        map.remove("self").unwrap();
    }

    #[test]
    fn test_equals_scalars() {
        assert!(equals(&Value::from(5i32), &5i32).unwrap());
        assert!(!equals(&Value::from(5i32), &6i32).unwrap());
        assert!(!equals(&Value::from(1.0f32), &1i32).unwrap());
        assert!(!equals(&Value::from(1.0f32), &1.0f64).unwrap());
        assert!(equals(&Value::from(Complex32::new(0.0, 1.0)), &Complex32::new(0.0, 1.0)).unwrap());
        assert!(!equals(&Value::from(f64::NAN), &f64::NAN).unwrap());
    }

    #[test]
    fn test_equals_vectors() {
        let v = Value::from(vec![1i32, 2, 3]);
        assert!(equals(&v, &vec![1i32, 2, 3]).unwrap());
        assert!(equals(&v, &[1i32, 2, 3]).unwrap());
        assert!(equals(&v, &[1i32, 2, 3][..]).unwrap());
        assert!(!equals(&v, &vec![1i32, 2]).unwrap());
        assert!(!equals(&v, &vec![1u32, 2, 3]).unwrap());
        assert!(equals(&Value::from(Vec::<u8>::new()), &Vec::<u8>::new()).unwrap());
    }

    #[test]
    fn test_scalar_never_equals_vector() {
        assert!(!equals(&Value::from(1u8), &vec![1u8]).unwrap());
        assert!(!equals(&Value::from(vec![1u8]), &1u8).unwrap());
    }

    #[test]
    fn test_equals_errors() {
        assert_eq!(equals(&Value::Empty, &1i32), Err(Error::UninitializedValue));
        assert!(matches!(
            equals(&Value::map(), &1i32),
            Err(Error::UnsupportedComparison(_))
        ));
        assert!(matches!(
            equals(&Value::map(), &vec![1i32]),
            Err(Error::UnsupportedComparison(_))
        ));
        assert!(matches!(
            equals(&Value::from(1i32), &ValueMap::new()),
            Err(Error::UnsupportedComparison(_))
        ));
        let none = Value::Buffer(Rc::new(TypedBuffer::none()));
        assert!(matches!(equals(&none, &0u8), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_equals_maps() {
        let mut expected = ValueMap::new();
        expected.insert("x", Value::from(1u16));
        let value = Value::map();
        value.insert("x", Value::from(1u16)).unwrap();
        assert!(equals(&value, &expected).unwrap());

        expected.insert("y", Value::from(2u16));
        assert!(!equals(&value, &expected).unwrap());
    }

    fn assert_dispatches<T, O>(native: T, other_kind: O, scalar_text: &str, vector_text: &str)
    where
        T: Element + NativeEq,
        O: Element + NativeEq,
        Value: From<T> + From<Vec<T>>,
    {
        let scalar = Value::from(native);
        assert_eq!(scalar.data_type().unwrap(), TypeTag::scalar(T::KIND));
        assert_eq!(equals(&scalar, &native), Ok(true), "{}", scalar_text);
        assert_eq!(equals(&scalar, &other_kind), Ok(false), "{}", scalar_text);
        assert_eq!(equals(&scalar, &vec![native]), Ok(false), "{}", scalar_text);
        assert_eq!(format(&scalar).unwrap(), scalar_text);

        let vector = Value::from(vec![native, native]);
        assert_eq!(vector.data_type().unwrap(), TypeTag::vector(T::KIND));
        assert_eq!(equals(&vector, &vec![native, native]), Ok(true), "{}", vector_text);
        assert_eq!(equals(&vector, &[native, native]), Ok(true), "{}", vector_text);
        assert_eq!(
            equals(&vector, &vec![other_kind, other_kind]),
            Ok(false),
            "{}",
            vector_text
        );
        assert_eq!(equals(&vector, &vec![native]), Ok(false), "{}", vector_text);
        assert_eq!(equals(&vector, &native), Ok(false), "{}", vector_text);
        assert_eq!(format(&vector).unwrap(), vector_text);
    }

    #[test]
    fn test_every_element_type_formats_and_compares() {
        assert_dispatches(2.5f32, 2.5f64, "2.5", "[2.5, 2.5]");
        assert_dispatches(-0.25f64, -0.25f32, "-0.25", "[-0.25, -0.25]");
        assert_dispatches(
            Complex32::new(1.5, -0.5),
            Complex64::new(1.5, -0.5),
            "1.5-0.5i",
            "[1.5-0.5i, 1.5-0.5i]",
        );
        assert_dispatches(
            Complex64::new(-1.0, 2.0),
            Complex32::new(-1.0, 2.0),
            "-1+2i",
            "[-1+2i, -1+2i]",
        );
        assert_dispatches(-8i8, -8i16, "-8", "[-8, -8]");
        assert_dispatches(-300i16, -300i32, "-300", "[-300, -300]");
        assert_dispatches(70_000i32, 70_000i64, "70000", "[70000, 70000]");
        assert_dispatches(
            i64::MIN,
            i64::MIN as f64,
            "-9223372036854775808",
            "[-9223372036854775808, -9223372036854775808]",
        );
        assert_dispatches(200u8, 200i16, "200", "[200, 200]");
        assert_dispatches(60_000u16, 60_000u32, "60000", "[60000, 60000]");
        assert_dispatches(
            4_000_000_000u32,
            4_000_000_000u64,
            "4000000000",
            "[4000000000, 4000000000]",
        );
        assert_dispatches(7u64, 7u8, "7", "[7, 7]");
    }

    #[test]
    fn test_partial_eq_with_natives() {
        assert!(Value::from(3u64) == 3u64);
        assert!(Value::from(vec![0.5f32]) == vec![0.5f32]);
        assert!(Value::from([1i16, 2]) == [1i16, 2]);
        assert!(Value::Empty != 0u8);
        assert!(Value::map() == ValueMap::new());
    }
}
