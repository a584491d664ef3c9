//! In-memory tagged value handles.
//!
//! `OwnedValue` keeps the payload in ordinary Rust collections. It mirrors the
//! native handle semantics: composites are formatted with a fixed size and
//! their Null children are then written in place.

use super::{Allocator, Kind, TaggedValue};

#[derive(Debug, Clone, PartialEq, Default)]
enum Payload {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Vec<u8>),
    Bytes(Vec<u8>),
    List(Vec<OwnedValue>),
    Dictionary(Vec<(OwnedValue, OwnedValue)>),
    Structure {
        signature: i8,
        fields: Vec<OwnedValue>,
    },
    Raw(u8),
}

/// Tagged value handle backed by heap collections
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OwnedValue {
    payload: Payload,
}

impl OwnedValue {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            payload: Payload::Boolean(value),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            payload: Payload::Integer(value),
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            payload: Payload::Float(value),
        }
    }

    /// String from raw bytes; no UTF-8 validation happens at this layer
    pub fn string(value: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Payload::String(value.into()),
        }
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Payload::Bytes(value.into()),
        }
    }

    pub fn list(items: Vec<OwnedValue>) -> Self {
        Self {
            payload: Payload::List(items),
        }
    }

    /// Dictionary with entries in wire order; duplicate keys are kept
    pub fn dictionary(entries: Vec<(OwnedValue, OwnedValue)>) -> Self {
        Self {
            payload: Payload::Dictionary(entries),
        }
    }

    pub fn structure(signature: i8, fields: Vec<OwnedValue>) -> Self {
        Self {
            payload: Payload::Structure { signature, fields },
        }
    }

    /// A handle carrying a kind tag outside the known set.
    ///
    /// Known tags map to an empty value of that kind instead.
    pub fn with_raw_kind(tag: u8) -> Self {
        match Kind::from_tag(tag) {
            Kind::Unknown(tag) => Self {
                payload: Payload::Raw(tag),
            },
            _ => {
                let mut value = Self::default();
                value.reset_to(Kind::from_tag(tag));
                value
            }
        }
    }

    fn reset_to(&mut self, kind: Kind) {
        self.payload = match kind {
            Kind::Null => Payload::Null,
            Kind::Boolean => Payload::Boolean(false),
            Kind::Integer => Payload::Integer(0),
            Kind::Float => Payload::Float(0.0),
            Kind::String => Payload::String(Vec::new()),
            Kind::Bytes => Payload::Bytes(Vec::new()),
            Kind::List => Payload::List(Vec::new()),
            Kind::Dictionary => Payload::Dictionary(Vec::new()),
            Kind::Structure => Payload::Structure {
                signature: 0,
                fields: Vec::new(),
            },
            Kind::Unknown(tag) => Payload::Raw(tag),
        };
    }
}

fn nulls(size: usize) -> Vec<OwnedValue> {
    vec![OwnedValue::null(); size]
}

impl TaggedValue for OwnedValue {
    fn kind(&self) -> Kind {
        match &self.payload {
            Payload::Null => Kind::Null,
            Payload::Boolean(_) => Kind::Boolean,
            Payload::Integer(_) => Kind::Integer,
            Payload::Float(_) => Kind::Float,
            Payload::String(_) => Kind::String,
            Payload::Bytes(_) => Kind::Bytes,
            Payload::List(_) => Kind::List,
            Payload::Dictionary(_) => Kind::Dictionary,
            Payload::Structure { .. } => Kind::Structure,
            Payload::Raw(tag) => Kind::Unknown(*tag),
        }
    }

    fn size(&self) -> usize {
        match &self.payload {
            Payload::String(bytes) | Payload::Bytes(bytes) => bytes.len(),
            Payload::List(items) => items.len(),
            Payload::Dictionary(entries) => entries.len(),
            Payload::Structure { fields, .. } => fields.len(),
            _ => 0,
        }
    }

    fn signature(&self) -> i8 {
        match &self.payload {
            Payload::Structure { signature, .. } => *signature,
            _ => 0,
        }
    }

    fn get_boolean(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(value) => Some(value),
            _ => None,
        }
    }

    fn get_integer(&self) -> Option<i64> {
        match self.payload {
            Payload::Integer(value) => Some(value),
            _ => None,
        }
    }

    fn get_float(&self) -> Option<f64> {
        match self.payload {
            Payload::Float(value) => Some(value),
            _ => None,
        }
    }

    fn string_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    fn all_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    fn list_element(&self, index: usize) -> Option<&Self> {
        match &self.payload {
            Payload::List(items) => items.get(index),
            _ => None,
        }
    }

    fn dictionary_key(&self, index: usize) -> Option<&Self> {
        match &self.payload {
            Payload::Dictionary(entries) => entries.get(index).map(|(key, _)| key),
            _ => None,
        }
    }

    fn dictionary_value(&self, index: usize) -> Option<&Self> {
        match &self.payload {
            Payload::Dictionary(entries) => entries.get(index).map(|(_, value)| value),
            _ => None,
        }
    }

    fn structure_field(&self, index: usize) -> Option<&Self> {
        match &self.payload {
            Payload::Structure { fields, .. } => fields.get(index),
            _ => None,
        }
    }

    fn list_element_mut(&mut self, index: usize) -> Option<&mut Self> {
        match &mut self.payload {
            Payload::List(items) => items.get_mut(index),
            _ => None,
        }
    }

    fn dictionary_entry_mut(&mut self, index: usize) -> Option<(&mut Self, &mut Self)> {
        match &mut self.payload {
            Payload::Dictionary(entries) => entries.get_mut(index).map(|(k, v)| (k, v)),
            _ => None,
        }
    }

    fn structure_field_mut(&mut self, index: usize) -> Option<&mut Self> {
        match &mut self.payload {
            Payload::Structure { fields, .. } => fields.get_mut(index),
            _ => None,
        }
    }

    fn format_as_null(&mut self) {
        self.payload = Payload::Null;
    }

    fn format_as_boolean(&mut self, value: bool) {
        self.payload = Payload::Boolean(value);
    }

    fn format_as_integer(&mut self, value: i64) {
        self.payload = Payload::Integer(value);
    }

    fn format_as_float(&mut self, value: f64) {
        self.payload = Payload::Float(value);
    }

    fn format_as_string(&mut self, value: &[u8]) {
        self.payload = Payload::String(value.to_vec());
    }

    fn format_as_bytes(&mut self, value: &[u8]) {
        self.payload = Payload::Bytes(value.to_vec());
    }

    fn format_as_list(&mut self, size: usize) {
        self.payload = Payload::List(nulls(size));
    }

    fn format_as_dictionary(&mut self, size: usize) {
        self.payload = Payload::Dictionary(
            (0..size)
                .map(|_| (OwnedValue::null(), OwnedValue::null()))
                .collect(),
        );
    }

    fn format_as_structure(&mut self, signature: i8, size: usize) {
        self.payload = Payload::Structure {
            signature,
            fields: nulls(size),
        };
    }
}

/// Allocator handing out Null `OwnedValue` handles
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnedAllocator;

impl Allocator for OwnedAllocator {
    type Value = OwnedValue;

    fn allocate(&self) -> OwnedValue {
        OwnedValue::null()
    }
}
