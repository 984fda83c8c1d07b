//! Owned, self-describing encoded blocks.
//!
//! A [`TypedBuffer`] exclusively owns one validated block (see [`crate::block`])
//! and never changes after construction. Values share buffers through `Rc`,
//! so immutability is what makes aliasing safe.
//!
//! ## Typed access
//!
//! [`TypedBuffer::payload_as`] returns a [`VectorView`] that decodes elements
//! straight out of the block on demand; nothing is copied. The view checks
//! the tag first, so asking for the wrong element type is an
//! [`Error::TypeMismatch`], never a misread.
//!
//! ```rust
//! use polyvalue::{block, TypedBuffer, TypeTag};
//!
//! let buf = TypedBuffer::from_bytes(block::encode_vector(&[1i32, 2, 3]).unwrap()).unwrap();
//! assert_eq!(buf.tag().unwrap(), TypeTag::VectorInt32);
//!
//! let view = buf.payload_as::<i32>().unwrap();
//! assert_eq!(view.len(), 3);
//! assert_eq!(view.get(1), Some(2));
//! assert!(buf.payload_as::<u32>().is_err());
//! ```

use crate::block::{self, COUNT_LEN};
use crate::element::{Element, Number};
use crate::tag::{ElementKind, Shape, TypeTag};
use crate::{Error, Result};
use std::fmt;
use std::marker::PhantomData;

/// One encoded block, `[total-size: u32][tag: u8][payload]`.
///
/// A default-constructed buffer owns no bytes; every accessor on it fails
/// with [`Error::UninitializedBuffer`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TypedBuffer {
    bytes: Box<[u8]>,
}

impl TypedBuffer {
    /// Takes ownership of an already framed block.
    ///
    /// # Errors
    ///
    /// Fails if the block is shorter than the 5-byte header, carries an
    /// unknown tag, or its lengths disagree with its tag.
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        block::validate(&bytes)?;
        Ok(TypedBuffer { bytes })
    }

    /// Encodes a single element.
    #[must_use]
    pub fn scalar_of<T: Element>(value: T) -> Self {
        TypedBuffer {
            bytes: block::encode_scalar(value).into_boxed_slice(),
        }
    }

    /// Encodes a slice of elements.
    ///
    /// # Errors
    ///
    /// See [`block::encode_vector`].
    pub fn vector_of<T: Element>(values: &[T]) -> Result<Self> {
        Ok(TypedBuffer {
            bytes: block::encode_vector(values)?.into_boxed_slice(),
        })
    }

    /// Encodes a map header declaring `count` entries.
    #[must_use]
    pub fn map_header(count: u32) -> Self {
        TypedBuffer {
            bytes: block::encode_map_header(count).into_boxed_slice(),
        }
    }

    /// Encodes a block with the `None` tag.
    #[must_use]
    pub fn none() -> Self {
        TypedBuffer {
            bytes: block::encode_none().into_boxed_slice(),
        }
    }

    /// The tag of this block.
    ///
    /// # Errors
    ///
    /// [`Error::UninitializedBuffer`] if the buffer owns no bytes.
    pub fn tag(&self) -> Result<TypeTag> {
        block::decode_tag(&self.bytes)
    }

    /// Returns `true` if the buffer owns no bytes.
    #[inline]
    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Total block length, size prefix included.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The whole block exactly as it goes on the wire.
    #[inline]
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The payload bytes after the tag, uninterpreted.
    #[inline]
    #[must_use]
    pub fn payload_bytes(&self) -> &[u8] {
        block::payload(&self.bytes)
    }

    /// A zero-copy view of the elements of a scalar (one element) or vector
    /// block of `T`.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if the block is not a scalar or vector of `T`,
    /// [`Error::UninitializedBuffer`] if the buffer owns no bytes.
    pub fn payload_as<T: Element>(&self) -> Result<VectorView<'_, T>> {
        let tag = self.tag()?;
        if tag.element() != Some(T::KIND) {
            return Err(Error::type_mismatch(
                format_args!("scalar or vector {}", T::KIND),
                tag,
            ));
        }
        let payload = self.payload_bytes();
        let elements = match tag.shape() {
            Shape::Vector => &payload[COUNT_LEN..],
            _ => payload,
        };
        Ok(VectorView::new(elements))
    }

    /// Reads the element of a scalar block of `T`.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the tag is exactly `Scalar<T>`.
    pub fn scalar<T: Element>(&self) -> Result<T> {
        self.expect_tag(TypeTag::scalar(T::KIND))?;
        Ok(T::read_le(self.payload_bytes()))
    }

    /// A view of a vector block of `T`.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the tag is exactly `Vector<T>`.
    pub fn vector<T: Element>(&self) -> Result<VectorView<'_, T>> {
        self.expect_tag(TypeTag::vector(T::KIND))?;
        self.payload_as()
    }

    /// Element view of a buffer already known to hold a vector.
    pub(crate) fn vector_elements<T: Element>(&self) -> VectorView<'_, T> {
        VectorView::new(self.payload_bytes().get(COUNT_LEN..).unwrap_or(&[]))
    }

    /// The entry count declared by a map header block.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the tag is `MapHeader`.
    pub fn map_count(&self) -> Result<u32> {
        self.expect_tag(TypeTag::MapHeader)?;
        Ok(block::count(&self.bytes))
    }

    /// Decodes every element into its dynamic form.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] for `None` and map header blocks.
    pub fn numbers(&self) -> Result<Vec<Number>> {
        fn collect<T: Element>(buf: &TypedBuffer) -> Result<Vec<Number>> {
            Ok(buf.payload_as::<T>()?.iter().map(Element::into_number).collect())
        }

        let tag = self.tag()?;
        match tag.element() {
            Some(ElementKind::Float32) => collect::<f32>(self),
            Some(ElementKind::Float64) => collect::<f64>(self),
            Some(ElementKind::Complex64) => collect::<num_complex::Complex32>(self),
            Some(ElementKind::Complex128) => collect::<num_complex::Complex64>(self),
            Some(ElementKind::Int8) => collect::<i8>(self),
            Some(ElementKind::Int16) => collect::<i16>(self),
            Some(ElementKind::Int32) => collect::<i32>(self),
            Some(ElementKind::Int64) => collect::<i64>(self),
            Some(ElementKind::UInt8) => collect::<u8>(self),
            Some(ElementKind::UInt16) => collect::<u16>(self),
            Some(ElementKind::UInt32) => collect::<u32>(self),
            Some(ElementKind::UInt64) => collect::<u64>(self),
            None => Err(Error::type_mismatch("scalar or vector", tag)),
        }
    }

    fn expect_tag(&self, expected: TypeTag) -> Result<()> {
        let found = self.tag()?;
        if found == expected {
            Ok(())
        } else {
            Err(Error::type_mismatch(expected, found))
        }
    }
}

impl fmt::Debug for TypedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Ok(tag) => f
                .debug_struct("TypedBuffer")
                .field("tag", &tag)
                .field("size", &self.size())
                .finish(),
            Err(_) => f.write_str("TypedBuffer(uninitialized)"),
        }
    }
}

/// Borrowed, zero-copy sequence of `T` decoded from little-endian bytes.
///
/// Valid only while the owning [`TypedBuffer`] is alive.
#[derive(Clone, Copy)]
pub struct VectorView<'a, T> {
    bytes: &'a [u8],
    _element: PhantomData<T>,
}

impl<'a, T: Element> VectorView<'a, T> {
    fn new(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len() % T::SIZE, 0, "view over a partial element");
        VectorView {
            bytes,
            _element: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() / T::SIZE
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The element at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::SIZE)?;
        let end = start.checked_add(T::SIZE)?;
        self.bytes.get(start..end).map(T::read_le)
    }

    /// Iterates the elements in storage order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + 'a {
        self.bytes.chunks_exact(T::SIZE).map(T::read_le)
    }

    /// Copies the elements out.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// The raw element bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<T: Element> PartialEq<[T]> for VectorView<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == *b)
    }
}

impl<T: Element> PartialEq<Vec<T>> for VectorView<'_, T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self == other.as_slice()
    }
}

impl<T: Element> fmt::Debug for VectorView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
