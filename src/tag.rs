//! Type tags naming every concrete representation a block can hold.
//!
//! [`TypeTag`] is a closed enumeration: adding an element kind forces every
//! `match` in the dispatch layer to be updated. On the wire a tag is a single
//! byte, see [`TypeTag::as_u8`].

use std::fmt;

/// Element kinds shared by the scalar and vector families.
///
/// `Complex64` is a pair of `f32` and `Complex128` a pair of `f64`, named by
/// their total width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Float32,
    Float64,
    Complex64,
    Complex128,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

impl ElementKind {
    /// Every element kind, in tag order.
    pub const ALL: [ElementKind; 12] = [
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::Complex64,
        ElementKind::Complex128,
        ElementKind::Int8,
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::UInt8,
        ElementKind::UInt16,
        ElementKind::UInt32,
        ElementKind::UInt64,
    ];

    /// Encoded width of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::UInt8 => 1,
            ElementKind::Int16 | ElementKind::UInt16 => 2,
            ElementKind::Float32 | ElementKind::Int32 | ElementKind::UInt32 => 4,
            ElementKind::Float64
            | ElementKind::Complex64
            | ElementKind::Int64
            | ElementKind::UInt64 => 8,
            ElementKind::Complex128 => 16,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Complex64 => "complex64",
            ElementKind::Complex128 => "complex128",
            ElementKind::Int8 => "int8",
            ElementKind::Int16 => "int16",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::UInt8 => "uint8",
            ElementKind::UInt16 => "uint16",
            ElementKind::UInt32 => "uint32",
            ElementKind::UInt64 => "uint64",
        }
    }

    const fn index(self) -> u8 {
        match self {
            ElementKind::Float32 => 0,
            ElementKind::Float64 => 1,
            ElementKind::Complex64 => 2,
            ElementKind::Complex128 => 3,
            ElementKind::Int8 => 4,
            ElementKind::Int16 => 5,
            ElementKind::Int32 => 6,
            ElementKind::Int64 => 7,
            ElementKind::UInt8 => 8,
            ElementKind::UInt16 => 9,
            ElementKind::UInt32 => 10,
            ElementKind::UInt64 => 11,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the payload of a tagged block is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    None,
    Scalar,
    Vector,
    Map,
}

/// The tag stored in every encoded block.
///
/// The tag alone determines how the payload bytes that follow it are
/// interpreted.
///
/// # Examples
///
/// ```rust
/// use polyvalue::{ElementKind, Shape, TypeTag};
///
/// let tag = TypeTag::vector(ElementKind::Int32);
/// assert_eq!(tag, TypeTag::VectorInt32);
/// assert_eq!(tag.shape(), Shape::Vector);
/// assert_eq!(TypeTag::from_u8(tag.as_u8()), Some(tag));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    None = 0,
    ScalarFloat32 = 1,
    ScalarFloat64 = 2,
    ScalarComplex64 = 3,
    ScalarComplex128 = 4,
    ScalarInt8 = 5,
    ScalarInt16 = 6,
    ScalarInt32 = 7,
    ScalarInt64 = 8,
    ScalarUInt8 = 9,
    ScalarUInt16 = 10,
    ScalarUInt32 = 11,
    ScalarUInt64 = 12,
    VectorFloat32 = 13,
    VectorFloat64 = 14,
    VectorComplex64 = 15,
    VectorComplex128 = 16,
    VectorInt8 = 17,
    VectorInt16 = 18,
    VectorInt32 = 19,
    VectorInt64 = 20,
    VectorUInt8 = 21,
    VectorUInt16 = 22,
    VectorUInt32 = 23,
    VectorUInt64 = 24,
    MapHeader = 25,
}

const SCALAR_TAGS: [TypeTag; 12] = [
    TypeTag::ScalarFloat32,
    TypeTag::ScalarFloat64,
    TypeTag::ScalarComplex64,
    TypeTag::ScalarComplex128,
    TypeTag::ScalarInt8,
    TypeTag::ScalarInt16,
    TypeTag::ScalarInt32,
    TypeTag::ScalarInt64,
    TypeTag::ScalarUInt8,
    TypeTag::ScalarUInt16,
    TypeTag::ScalarUInt32,
    TypeTag::ScalarUInt64,
];

const VECTOR_TAGS: [TypeTag; 12] = [
    TypeTag::VectorFloat32,
    TypeTag::VectorFloat64,
    TypeTag::VectorComplex64,
    TypeTag::VectorComplex128,
    TypeTag::VectorInt8,
    TypeTag::VectorInt16,
    TypeTag::VectorInt32,
    TypeTag::VectorInt64,
    TypeTag::VectorUInt8,
    TypeTag::VectorUInt16,
    TypeTag::VectorUInt32,
    TypeTag::VectorUInt64,
];

impl TypeTag {
    /// The scalar tag for an element kind.
    #[must_use]
    pub const fn scalar(kind: ElementKind) -> Self {
        SCALAR_TAGS[kind.index() as usize]
    }

    /// The vector tag for an element kind.
    #[must_use]
    pub const fn vector(kind: ElementKind) -> Self {
        VECTOR_TAGS[kind.index() as usize]
    }

    /// The wire byte for this tag.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a wire byte, returning `None` for bytes outside the tag range.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TypeTag::None),
            1..=12 => Some(SCALAR_TAGS[usize::from(byte - 1)]),
            13..=24 => Some(VECTOR_TAGS[usize::from(byte - 13)]),
            25 => Some(TypeTag::MapHeader),
            _ => None,
        }
    }

    #[must_use]
    pub const fn shape(self) -> Shape {
        match self {
            TypeTag::None => Shape::None,
            TypeTag::MapHeader => Shape::Map,
            _ if (self as u8) <= 12 => Shape::Scalar,
            _ => Shape::Vector,
        }
    }

    /// The element kind of a scalar or vector tag.
    #[must_use]
    pub const fn element(self) -> Option<ElementKind> {
        match self.shape() {
            Shape::Scalar => Some(ElementKind::ALL[(self as u8 - 1) as usize]),
            Shape::Vector => Some(ElementKind::ALL[(self as u8 - 13) as usize]),
            Shape::None | Shape::Map => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self.shape(), Shape::Scalar)
    }

    #[inline]
    #[must_use]
    pub const fn is_vector(self) -> bool {
        matches!(self.shape(), Shape::Vector)
    }

    #[inline]
    #[must_use]
    pub const fn is_map(self) -> bool {
        matches!(self, TypeTag::MapHeader)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.shape(), self.element()) {
            (Shape::Scalar, Some(kind)) => write!(f, "scalar {}", kind),
            (Shape::Vector, Some(kind)) => write!(f, "vector {}", kind),
            (Shape::Map, _) => f.write_str("map header"),
            _ => f.write_str("none"),
        }
    }
}
