//! Typed element families over shared buffers.
//!
//! [`Scalar<T>`] and [`Vector<T>`] are the statically typed faces of a
//! scalar or vector [`Value`]. They hold the same `Rc<TypedBuffer>` as the
//! value they came from, so converting back and forth never copies the
//! encoded block.
//!
//! ```rust
//! use polyvalue::{Scalar, Value, Vector};
//!
//! let value = Value::from(vec![1i32, 2, 3]);
//! let vector = Vector::<i32>::try_from(&value).unwrap();
//! assert_eq!(vector.len(), 3);
//! assert_eq!(vector.to_string(), "[1, 2, 3]");
//!
//! // Wrong element type: rejected, not reinterpreted.
//! assert!(Vector::<u32>::try_from(&value).is_err());
//! assert!(Scalar::<i32>::try_from(&value).is_err());
//! ```

use crate::buffer::{TypedBuffer, VectorView};
use crate::element::Element;
use crate::tag::TypeTag;
use crate::{Error, Result, Value};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

fn check_tag(buffer: &TypedBuffer, expected: TypeTag) -> Result<()> {
    let found = buffer.tag()?;
    if found == expected {
        Ok(())
    } else {
        Err(Error::type_mismatch(expected, found))
    }
}

fn buffer_of(value: &Value, expected: TypeTag) -> Result<Rc<TypedBuffer>> {
    match value {
        Value::Empty => Err(Error::UninitializedValue),
        Value::Map(_) => Err(Error::type_mismatch(expected, TypeTag::MapHeader)),
        Value::Buffer(buffer) => Ok(Rc::clone(buffer)),
    }
}

/// A single element of type `T`.
#[derive(Clone)]
pub struct Scalar<T> {
    buffer: Rc<TypedBuffer>,
    _element: PhantomData<T>,
}

impl<T: Element> Scalar<T> {
    /// Encodes `value` into a fresh buffer.
    #[must_use]
    pub fn new(value: T) -> Self {
        Scalar {
            buffer: Rc::new(TypedBuffer::scalar_of(value)),
            _element: PhantomData,
        }
    }

    /// Wraps an existing buffer.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the buffer holds exactly `Scalar<T>`.
    pub fn from_buffer(buffer: Rc<TypedBuffer>) -> Result<Self> {
        check_tag(&buffer, TypeTag::scalar(T::KIND))?;
        Ok(Scalar {
            buffer,
            _element: PhantomData,
        })
    }

    /// Decodes the element.
    #[must_use]
    pub fn get(&self) -> T {
        T::read_le(self.buffer.payload_bytes())
    }

    /// The shared buffer backing this scalar.
    #[must_use]
    pub fn buffer(&self) -> &Rc<TypedBuffer> {
        &self.buffer
    }
}

impl<T: Element> TryFrom<&Value> for Scalar<T> {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Scalar::from_buffer(buffer_of(value, TypeTag::scalar(T::KIND))?)
    }
}

impl<T: Element> From<Scalar<T>> for Value {
    fn from(scalar: Scalar<T>) -> Self {
        Value::Buffer(scalar.buffer)
    }
}

impl<T: Element> PartialEq<T> for Scalar<T> {
    fn eq(&self, other: &T) -> bool {
        self.get() == *other
    }
}

impl<T: Element> fmt::Display for Scalar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

impl<T: Element> fmt::Debug for Scalar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scalar").field(&self.get()).finish()
    }
}

/// An ordered run of elements of type `T`.
#[derive(Clone)]
pub struct Vector<T> {
    buffer: Rc<TypedBuffer>,
    _element: PhantomData<T>,
}

impl<T: Element> Vector<T> {
    /// Encodes `values` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceLimitExceeded`] if the slice is too long for the
    /// block layout.
    pub fn new(values: &[T]) -> Result<Self> {
        Ok(Vector {
            buffer: Rc::new(TypedBuffer::vector_of(values)?),
            _element: PhantomData,
        })
    }

    /// Wraps an existing buffer.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the buffer holds exactly `Vector<T>`.
    pub fn from_buffer(buffer: Rc<TypedBuffer>) -> Result<Self> {
        check_tag(&buffer, TypeTag::vector(T::KIND))?;
        Ok(Vector {
            buffer,
            _element: PhantomData,
        })
    }

    /// A zero-copy view of the elements.
    #[must_use]
    pub fn view(&self) -> VectorView<'_, T> {
        // Tag checked on construction; buffers never change.
        self.buffer.vector_elements()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.view().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.view().get(index)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.view().to_vec()
    }

    /// The shared buffer backing this vector.
    #[must_use]
    pub fn buffer(&self) -> &Rc<TypedBuffer> {
        &self.buffer
    }
}

impl<T: Element> TryFrom<&Value> for Vector<T> {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Vector::from_buffer(buffer_of(value, TypeTag::vector(T::KIND))?)
    }
}

impl<T: Element> From<Vector<T>> for Value {
    fn from(vector: Vector<T>) -> Self {
        Value::Buffer(vector.buffer)
    }
}

impl<T: Element> PartialEq<[T]> for Vector<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.view() == *other
    }
}

impl<T: Element> PartialEq<Vec<T>> for Vector<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.view() == *other
    }
}

impl<T: Element> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.view().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(&element, f)?;
        }
        f.write_str("]")
    }
}

impl<T: Element> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Vector").field(&self.view()).finish()
    }
}
