//! # Encodable Shapes
//!
//! Host types describe themselves to the encoder through [`Encode::shape`],
//! which returns a borrowed [`Shape`] view. The encoder dispatches on the shape
//! in a fixed order: null, exact scalars, indirection, sequence, mapping, and
//! finally records looked up in the handler registry by runtime type.
//!
//! Implementations are provided for the standard scalars, strings, `bytes`
//! buffers, references and smart pointers, the common sequence and map
//! collections, and [`Value`]. Application records opt in with
//! [`Shape::record`]:
//!
//! ```rust
//! use bolt_values::core::shape::{Encode, Shape};
//!
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Encode for Point {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::record(self)
//!     }
//! }
//! ```
//!
//! `Vec<u8>` is a sequence of integers; wrap raw bytes in [`bytes::Bytes`] or
//! [`ByteSlice`] to encode them as a Bytes value.

use crate::value::Value;
use bytes::{Bytes, BytesMut};
use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Iterator over sequence elements
pub type ShapeIter<'a> = Box<dyn ExactSizeIterator<Item = Shape<'a>> + 'a>;

/// Iterator over mapping entries
pub type EntryIter<'a> = Box<dyn ExactSizeIterator<Item = (Shape<'a>, Shape<'a>)> + 'a>;

/// Borrowed structural view of a host value
pub enum Shape<'a> {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Unsigned integer, narrowed to i64 by the encoder
    Unsigned(u64),
    Float(f64),
    String(&'a str),
    Bytes(&'a [u8]),
    /// One level of indirection. `None` is a reference whose target is gone,
    /// such as a released handle or an expired weak pointer.
    Indirect(Option<Box<Shape<'a>>>),
    Sequence(ShapeIter<'a>),
    Mapping(EntryIter<'a>),
    /// Opaque application value, encoded through the handler registry
    Record {
        value: &'a dyn Any,
        type_name: &'static str,
    },
    /// A value with no encodable representation
    Unsupported { type_name: &'static str },
}

impl<'a> Shape<'a> {
    /// Shape of an application record of type `T`
    pub fn record<T: Any>(value: &'a T) -> Self {
        Shape::Record {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Shape of a value of type `T` that cannot be encoded
    pub fn unsupported<T: ?Sized>() -> Self {
        Shape::Unsupported {
            type_name: std::any::type_name::<T>(),
        }
    }

    fn indirect<T: Encode + ?Sized>(inner: &'a T) -> Self {
        Shape::Indirect(Some(Box::new(inner.shape())))
    }

    fn sequence<T, I>(items: I) -> Self
    where
        T: Encode + 'a,
        I: ExactSizeIterator<Item = &'a T> + 'a,
    {
        Shape::Sequence(Box::new(items.map(|item| item.shape())))
    }

    fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Encode + 'a,
        V: Encode + 'a,
        I: ExactSizeIterator<Item = (&'a K, &'a V)> + 'a,
    {
        Shape::Mapping(Box::new(
            entries.map(|(key, value)| (key.shape(), value.shape())),
        ))
    }
}

/// A host value the encoder can convert into a tagged value
///
/// Byte collections are not special-cased: `Vec<u8>`, `[u8; N]` and `&[u8]`
/// encode as a List of Integers. Use [`bytes::Bytes`], [`bytes::BytesMut`] or
/// [`ByteSlice`] to produce a Bytes value.
///
/// Mapping keys must resolve to text (`str`, `String`, `Cow<str>` or a
/// reference or pointer to one). Any other key fails the encode with
/// `UnsupportedType`.
///
/// ```rust
/// use bolt_values::tagged::{Kind, OwnedAllocator, TaggedValue};
/// use bolt_values::{ByteSlice, ValueSystem};
///
/// let system = ValueSystem::new(OwnedAllocator);
/// assert_eq!(system.encode(&vec![1u8, 2]).unwrap().kind(), Kind::List);
/// assert_eq!(system.encode(&ByteSlice(&[1, 2])).unwrap().kind(), Kind::Bytes);
/// ```
pub trait Encode {
    fn shape(&self) -> Shape<'_>;
}

/// Borrowed raw bytes that encode as a Bytes value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSlice<'a>(pub &'a [u8]);

impl Encode for ByteSlice<'_> {
    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self.0)
    }
}

impl Encode for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Null
    }
}

impl Encode for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Boolean(*self)
    }
}

macro_rules! encode_signed {
    ($($ty:ty),*) => {
        $(impl Encode for $ty {
            fn shape(&self) -> Shape<'_> {
                Shape::Integer(i64::from(*self))
            }
        })*
    };
}

macro_rules! encode_unsigned {
    ($($ty:ty),*) => {
        $(impl Encode for $ty {
            fn shape(&self) -> Shape<'_> {
                Shape::Unsigned(u64::from(*self))
            }
        })*
    };
}

encode_signed!(i8, i16, i32, i64);
encode_unsigned!(u8, u16, u32, u64);

impl Encode for isize {
    fn shape(&self) -> Shape<'_> {
        match i64::try_from(*self) {
            Ok(i) => Shape::Integer(i),
            Err(_) => Shape::unsupported::<isize>(),
        }
    }
}

impl Encode for usize {
    fn shape(&self) -> Shape<'_> {
        match u64::try_from(*self) {
            Ok(u) => Shape::Unsigned(u),
            Err(_) => Shape::unsupported::<usize>(),
        }
    }
}

impl Encode for f32 {
    fn shape(&self) -> Shape<'_> {
        Shape::Float(f64::from(*self))
    }
}

impl Encode for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Float(*self)
    }
}

impl Encode for str {
    fn shape(&self) -> Shape<'_> {
        Shape::String(self)
    }
}

impl Encode for String {
    fn shape(&self) -> Shape<'_> {
        Shape::String(self)
    }
}

impl Encode for Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::String(self)
    }
}

impl Encode for Bytes {
    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self)
    }
}

impl Encode for BytesMut {
    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn shape(&self) -> Shape<'_> {
        Shape::indirect(&**self)
    }
}

impl<T: Encode + ?Sized> Encode for &mut T {
    fn shape(&self) -> Shape<'_> {
        Shape::indirect(&**self)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::indirect(&**self)
    }
}

impl<T: Encode + ?Sized> Encode for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::indirect(&**self)
    }
}

impl<T: Encode + ?Sized> Encode for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::indirect(&**self)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(inner) => Shape::indirect(inner),
            None => Shape::Null,
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::sequence(self.iter())
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::sequence(self.iter())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::sequence(self.iter())
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::sequence(self.iter())
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::mapping(self.iter())
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::mapping(self.iter())
    }
}

impl Encode for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Boolean(b) => Shape::Boolean(*b),
            Value::Integer(i) => Shape::Integer(*i),
            Value::Float(f) => Shape::Float(*f),
            Value::String(s) => Shape::String(s),
            Value::Bytes(b) => Shape::Bytes(b),
            Value::List(items) => Shape::sequence(items.iter()),
            Value::Map(map) => Shape::mapping(map.iter()),
            Value::Record(record) => Shape::Record {
                value: record.as_any(),
                type_name: record.type_name(),
            },
        }
    }
}
