//! # Tagged Values
//!
//! The primitive interface over the protocol's tagged value representation.
//!
//! A tagged value is a handle carrying a kind discriminator plus a kind-specific
//! payload. The transport owns the concrete representation; this crate only
//! reads and formats handles through [`TaggedValue`] and obtains fresh ones
//! through an [`Allocator`].
//!
//! ## Kinds
//! ```text
//! Null | Boolean | Integer(i64) | Float(f64) | String(bytes) | Bytes(bytes)
//! List[size] | Dictionary[size](key, value) | Structure(signature)[size]
//! ```
//!
//! [`owned::OwnedValue`] is an in-memory implementation for callers without a
//! native transport handle (tests, tooling, loopback).

pub mod owned;

pub use owned::{OwnedAllocator, OwnedValue};

/// Kind discriminator of a tagged value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
    List,
    Dictionary,
    Structure,
    /// A raw tag this layer does not understand (newer protocol revision)
    Unknown(u8),
}

impl Kind {
    /// Wire tag byte used by the native value representation
    pub fn tag(self) -> u8 {
        match self {
            Kind::Null => 0,
            Kind::Boolean => 1,
            Kind::Integer => 2,
            Kind::Float => 3,
            Kind::String => 4,
            Kind::Dictionary => 5,
            Kind::List => 6,
            Kind::Bytes => 7,
            Kind::Structure => 8,
            Kind::Unknown(tag) => tag,
        }
    }

    /// Map a native tag byte to a kind
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Kind::Null,
            1 => Kind::Boolean,
            2 => Kind::Integer,
            3 => Kind::Float,
            4 => Kind::String,
            5 => Kind::Dictionary,
            6 => Kind::List,
            7 => Kind::Bytes,
            8 => Kind::Structure,
            other => Kind::Unknown(other),
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Boolean => "Boolean",
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::String => "String",
            Kind::Bytes => "Bytes",
            Kind::List => "List",
            Kind::Dictionary => "Dictionary",
            Kind::Structure => "Structure",
            Kind::Unknown(_) => "Unknown",
        }
    }
}

/// Get/format primitives on a tagged value handle.
///
/// Getters return `None` when the handle's kind does not carry the requested
/// payload. Child accessors return `None` for an out-of-range index.
/// `format_as_*` replaces whatever the handle held before; composite formats
/// create `size` Null children that are then written in place.
pub trait TaggedValue {
    fn kind(&self) -> Kind;

    /// Element count for composites, byte length for String and Bytes, 0 otherwise
    fn size(&self) -> usize;

    /// Structure signature, 0 for any other kind
    fn signature(&self) -> i8;

    fn get_boolean(&self) -> Option<bool>;
    fn get_integer(&self) -> Option<i64>;
    fn get_float(&self) -> Option<f64>;
    /// String payload with its exact declared length
    fn string_bytes(&self) -> Option<&[u8]>;
    fn all_bytes(&self) -> Option<&[u8]>;

    fn list_element(&self, index: usize) -> Option<&Self>;
    fn dictionary_key(&self, index: usize) -> Option<&Self>;
    fn dictionary_value(&self, index: usize) -> Option<&Self>;
    fn structure_field(&self, index: usize) -> Option<&Self>;

    fn list_element_mut(&mut self, index: usize) -> Option<&mut Self>;
    /// Key and value slots of one dictionary entry
    fn dictionary_entry_mut(&mut self, index: usize) -> Option<(&mut Self, &mut Self)>;
    fn structure_field_mut(&mut self, index: usize) -> Option<&mut Self>;

    fn format_as_null(&mut self);
    fn format_as_boolean(&mut self, value: bool);
    fn format_as_integer(&mut self, value: i64);
    fn format_as_float(&mut self, value: f64);
    fn format_as_string(&mut self, value: &[u8]);
    fn format_as_bytes(&mut self, value: &[u8]);
    fn format_as_list(&mut self, size: usize);
    fn format_as_dictionary(&mut self, size: usize);
    fn format_as_structure(&mut self, signature: i8, size: usize);
}

/// Source of fresh tagged value handles for encoding.
///
/// Handles are released by dropping them.
pub trait Allocator: Send + Sync {
    type Value: TaggedValue;

    fn allocate(&self) -> Self::Value;
}
