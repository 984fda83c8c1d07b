//! The dynamically typed value handle.
//!
//! A [`Value`] is in exactly one of three states:
//!
//! - [`Value::Empty`]: holds nothing; most operations fail with
//!   [`Error::UninitializedValue`].
//! - [`Value::Buffer`]: a scalar or vector, backed by an `Rc<TypedBuffer>`.
//! - [`Value::Map`]: a [`SharedMap`] of string keys to child values.
//!
//! ## Aliasing
//!
//! Cloning a `Value` is cheap and **shallow**: the clone points at the same
//! buffer or map. Buffers are immutable so this is invisible for scalars and
//! vectors, but a map mutated through one handle changes for every clone:
//!
//! ```rust
//! use polyvalue::Value;
//!
//! let a = Value::map();
//! let b = a.clone();
//! a.insert("x", Value::from(1i32)).unwrap();
//! assert_eq!(b.get("x"), Some(Value::from(1i32)));
//!
//! // deep_clone breaks the link.
//! let c = a.deep_clone();
//! a.insert("y", Value::from(2i32)).unwrap();
//! assert_eq!(c.len(), Some(1));
//! ```
//!
//! Values are built on `Rc` and `RefCell` and are therefore neither `Send`
//! nor `Sync`. To hand data to another thread, serialize it.
//!
//! Maps must not contain their own ancestors. This is not checked when
//! inserting; a cycle makes serialization and formatting stop with
//! [`Error::ResourceLimitExceeded`] at the depth limit and leaks the cycle.
//!
//! ## Creating Values
//!
//! ```rust
//! use polyvalue::{TypeTag, Value};
//! use num_complex::Complex64;
//!
//! let scalar = Value::from(2.5f32);
//! let vector = Value::from(vec![1u8, 2, 3]);
//! let complex = Value::from_native(Complex64::new(0.0, 1.0));
//!
//! assert_eq!(scalar.data_type().unwrap(), TypeTag::ScalarFloat32);
//! assert_eq!(vector.data_type().unwrap(), TypeTag::VectorUInt8);
//! assert_eq!(complex.data_type().unwrap(), TypeTag::ScalarComplex128);
//! assert!(Value::Empty.data_type().is_err());
//! ```

use crate::buffer::TypedBuffer;
use crate::dispatch;
use crate::element::Element;
use crate::tag::TypeTag;
use crate::{Error, Result, ValueMap};
use num_complex::{Complex32, Complex64};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// A reference-counted, interior-mutable map shared between value handles.
///
/// Borrowing follows `RefCell` rules: holding a [`SharedMap::borrow`] guard
/// while inserting into the same map panics.
#[derive(Clone, Default)]
pub struct SharedMap(Rc<RefCell<ValueMap>>);

impl SharedMap {
    #[must_use]
    pub fn new(map: ValueMap) -> Self {
        SharedMap(Rc::new(RefCell::new(map)))
    }

    /// Read access to the entries.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, ValueMap> {
        self.0.borrow()
    }

    /// Write access to the entries, visible through every alias.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, ValueMap> {
        self.0.borrow_mut()
    }

    /// Returns `true` if both handles point at the same map.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedMap) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(map) => f.debug_map().entries(map.iter()).finish(),
            Err(_) => f.write_str("SharedMap(<borrowed>)"),
        }
    }
}

/// A dynamically typed scalar, vector or map.
///
/// See the [module documentation](self) for ownership and aliasing rules.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Empty,
    /// A scalar or vector block.
    Buffer(Rc<TypedBuffer>),
    Map(SharedMap),
}

impl Value {
    /// Creates a value holding an empty map.
    #[must_use]
    pub fn map() -> Self {
        Value::Map(SharedMap::default())
    }

    /// Converts any supported native value.
    ///
    /// Same as `Value::from(native)`.
    #[must_use]
    pub fn from_native<N: Into<Value>>(native: N) -> Self {
        native.into()
    }

    /// Encodes a slice as a vector value.
    ///
    /// The fallible form of `Value::from(&[T])`.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceLimitExceeded`] if the encoded block would not fit
    /// its `u32` size field.
    pub fn try_from_slice<T: Element>(values: &[T]) -> Result<Self> {
        Ok(Value::Buffer(Rc::new(TypedBuffer::vector_of(values)?)))
    }

    /// Wraps a freshly encoded buffer.
    ///
    /// A map header buffer becomes a map value; since it carries no entries,
    /// it must declare zero of them.
    ///
    /// # Errors
    ///
    /// [`Error::UninitializedBuffer`] for an empty buffer and
    /// [`Error::CountMismatch`] for a map header with a non-zero count.
    pub fn from_buffer(buffer: TypedBuffer) -> Result<Self> {
        if buffer.tag()? == TypeTag::MapHeader {
            return Value::from_map_parts(&buffer, ValueMap::new());
        }
        Ok(Value::Buffer(Rc::new(buffer)))
    }

    /// Builds a map value from a header buffer and its entries.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if `header` is not a map header and
    /// [`Error::CountMismatch`] if its count differs from `entries.len()`.
    pub fn from_map_parts(header: &TypedBuffer, entries: ValueMap) -> Result<Self> {
        let declared = header.map_count()?;
        if u64::from(declared) != entries.len() as u64 {
            return Err(Error::CountMismatch {
                declared: u64::from(declared),
                actual: entries.len() as u64,
            });
        }
        Ok(Value::Map(SharedMap::new(entries)))
    }

    /// The tag describing this value; `MapHeader` for maps.
    ///
    /// # Errors
    ///
    /// [`Error::UninitializedValue`] for [`Value::Empty`].
    pub fn data_type(&self) -> Result<TypeTag> {
        match self {
            Value::Empty => Err(Error::UninitializedValue),
            Value::Buffer(buffer) => buffer.tag(),
            Value::Map(_) => Ok(TypeTag::MapHeader),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.data_type().map_or(false, TypeTag::is_scalar)
    }

    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.data_type().map_or(false, TypeTag::is_vector)
    }

    #[inline]
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// The backing buffer of a scalar or vector.
    #[must_use]
    pub fn as_buffer(&self) -> Option<&Rc<TypedBuffer>> {
        match self {
            Value::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// The shared map of a map value.
    #[must_use]
    pub fn as_map(&self) -> Option<&SharedMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Inserts into a map value. The change is visible through every alias.
    ///
    /// # Errors
    ///
    /// [`Error::UninitializedValue`] for an empty value and
    /// [`Error::TypeMismatch`] for scalars and vectors.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Result<Option<Value>> {
        Ok(self.expect_map()?.borrow_mut().insert(key, value))
    }

    /// Removes a key from a map value.
    ///
    /// # Errors
    ///
    /// As for [`Value::insert`].
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.expect_map()?.borrow_mut().remove(key))
    }

    /// Looks up a key, returning an aliasing handle to the child.
    ///
    /// Returns `None` for missing keys and for non-map values.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_map()?.borrow().get(key).cloned()
    }

    /// Number of entries of a map value.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        self.as_map().map(|map| map.borrow().len())
    }

    /// Keys of a map value, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.as_map()
            .map(|map| map.borrow().keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if both handles share the same buffer or map, or are
    /// both empty.
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Buffer(a), Value::Buffer(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Copies the map structure so that no map is shared with `self`.
    ///
    /// Buffers are immutable and stay shared.
    #[must_use]
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::Map(map) => Value::Map(SharedMap::new(
                map.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.deep_clone()))
                    .collect(),
            )),
            other => other.clone(),
        }
    }

    fn expect_map(&self) -> Result<&SharedMap> {
        match self {
            Value::Map(map) => Ok(map),
            Value::Empty => Err(Error::UninitializedValue),
            Value::Buffer(buffer) => Err(Error::type_mismatch(TypeTag::MapHeader, buffer.tag()?)),
        }
    }
}

/// Structural equality: byte-identical buffers, or maps with equal keys and
/// equal children.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Buffer(a), Value::Buffer(b)) => a.raw_bytes() == b.raw_bytes(),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

/// Formats through [`dispatch::format`]. Values that cannot be formatted
/// (empty values, `None` blocks) produce a formatting error.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&dispatch::format(self).map_err(|_| fmt::Error)?)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error as _;

        match self {
            Value::Empty => serializer.serialize_unit(),
            Value::Map(map) => {
                let map = map.borrow();
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Buffer(buffer) => {
                let tag = buffer.tag().map_err(S::Error::custom)?;
                if tag == TypeTag::None {
                    return serializer.serialize_unit();
                }
                let numbers = buffer.numbers().map_err(S::Error::custom)?;
                match (tag.is_scalar(), numbers.first()) {
                    (true, Some(number)) => number.serialize(serializer),
                    _ => {
                        let mut seq = serializer.serialize_seq(Some(numbers.len()))?;
                        for number in &numbers {
                            seq.serialize_element(number)?;
                        }
                        seq.end()
                    }
                }
            }
        }
    }
}

macro_rules! impl_from_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Buffer(Rc::new(TypedBuffer::scalar_of(value)))
                }
            }

            /// # Panics
            ///
            /// Panics if the slice holds more than `u32::MAX` bytes of
            /// elements; use [`Value::try_from_slice`] to handle that case.
            impl From<&[$ty]> for Value {
                fn from(values: &[$ty]) -> Self {
                    match Value::try_from_slice(values) {
                        Ok(value) => value,
                        Err(err) => panic!("cannot encode vector: {}", err),
                    }
                }
            }

            impl From<Vec<$ty>> for Value {
                fn from(values: Vec<$ty>) -> Self {
                    Value::from(values.as_slice())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Value {
                fn from(values: [$ty; N]) -> Self {
                    Value::from(&values[..])
                }
            }
        )*
    };
}

impl_from_element!(f32, f64, Complex32, Complex64, i8, i16, i32, i64, u8, u16, u32, u64);

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(SharedMap::new(map))
    }
}

impl From<SharedMap> for Value {
    fn from(map: SharedMap) -> Self {
        Value::Map(map)
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::from(ValueMap::from(map))
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(map: HashMap<K, V>) -> Self {
        Value::from(ValueMap::from(map))
    }
}
