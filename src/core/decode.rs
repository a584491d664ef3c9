//! # Decode Engine
//!
//! Converts a tagged value into a [`Value`] by structural recursion over its
//! kind tag. Lists and dictionaries are decoded element by element; a
//! structure has its fields decoded first and is then handed to the handler
//! registered for its signature.
//!
//! The first failure anywhere in the tree aborts the conversion. Nothing is
//! returned for the enclosing composites.

use crate::config::LimitsConfig;
use crate::error::{constants, ConversionError, Result};
use crate::registry::Registry;
use crate::tagged::{Kind, TaggedValue};
use crate::utils::metrics::Metrics;
use crate::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Tagged value → host value converter bound to a registry
pub struct Decoder<'a> {
    registry: &'a Registry,
    limits: LimitsConfig,
    metrics: Option<&'a Metrics>,
}

impl<'a> Decoder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            limits: LimitsConfig::default(),
            metrics: None,
        }
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Decode a tagged value and everything below it
    pub fn decode<V: TaggedValue>(&self, value: &V) -> Result<Value> {
        self.decode_at(value, 0)
    }

    fn decode_at<V: TaggedValue>(&self, value: &V, depth: usize) -> Result<Value> {
        self.limits.check_depth(depth)?;

        match value.kind() {
            Kind::Null => Ok(Value::Null),
            Kind::Boolean => value
                .get_boolean()
                .map(Value::Boolean)
                .ok_or_else(|| ConversionError::malformed(constants::ERR_KIND_MISMATCH)),
            Kind::Integer => value
                .get_integer()
                .map(Value::Integer)
                .ok_or_else(|| ConversionError::malformed(constants::ERR_KIND_MISMATCH)),
            Kind::Float => value
                .get_float()
                .map(Value::Float)
                .ok_or_else(|| ConversionError::malformed(constants::ERR_KIND_MISMATCH)),
            Kind::String => self.decode_string(value).map(Value::String),
            Kind::Bytes => {
                let bytes = value
                    .all_bytes()
                    .ok_or_else(|| ConversionError::malformed(constants::ERR_KIND_MISMATCH))?;
                self.limits.check_string(bytes.len())?;
                Ok(Value::Bytes(Bytes::copy_from_slice(bytes)))
            }
            Kind::List => self.decode_list(value, depth).map(Value::List),
            Kind::Dictionary => self.decode_dictionary(value, depth).map(Value::Map),
            Kind::Structure => self.decode_structure(value, depth),
            Kind::Unknown(tag) => {
                warn!(tag, "Unsupported tagged value kind");
                Err(ConversionError::UnsupportedType(format!(
                    "tagged value kind {tag:#04x}"
                )))
            }
        }
    }

    /// Read a string using its declared length; embedded zero bytes are kept
    fn decode_string<V: TaggedValue>(&self, value: &V) -> Result<String> {
        let bytes = value
            .string_bytes()
            .ok_or_else(|| ConversionError::malformed(constants::ERR_KIND_MISMATCH))?;
        self.limits.check_string(bytes.len())?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn decode_list<V: TaggedValue>(&self, value: &V, depth: usize) -> Result<Vec<Value>> {
        let size = value.size();
        self.limits.check_collection(size)?;

        let mut list = Vec::with_capacity(size);
        for index in 0..size {
            let element = value
                .list_element(index)
                .ok_or_else(|| ConversionError::malformed(constants::ERR_MISSING_LIST_ELEMENT))?;
            list.push(self.decode_at(element, depth + 1)?);
        }
        Ok(list)
    }

    fn decode_dictionary<V: TaggedValue>(
        &self,
        value: &V,
        depth: usize,
    ) -> Result<BTreeMap<String, Value>> {
        let size = value.size();
        self.limits.check_collection(size)?;

        let mut map = BTreeMap::new();
        for index in 0..size {
            let key = value
                .dictionary_key(index)
                .ok_or_else(|| ConversionError::malformed(constants::ERR_MISSING_DICTIONARY_KEY))?;
            if key.kind() != Kind::String {
                return Err(ConversionError::malformed(
                    constants::ERR_DICTIONARY_KEY_NOT_STRING,
                ));
            }
            let key = self.decode_string(key)?;

            let entry = value.dictionary_value(index).ok_or_else(|| {
                ConversionError::malformed(constants::ERR_MISSING_DICTIONARY_VALUE)
            })?;
            // Duplicate keys: the last entry on the wire wins
            map.insert(key, self.decode_at(entry, depth + 1)?);
        }
        Ok(map)
    }

    fn decode_structure<V: TaggedValue>(&self, value: &V, depth: usize) -> Result<Value> {
        let signature = value.signature();

        let Some(handler) = self.registry.lookup_by_signature(signature) else {
            warn!(signature, "No handler registered for structure signature");
            if let Some(metrics) = self.metrics {
                metrics.unsupported_structure();
            }
            return Err(ConversionError::UnsupportedStructure(signature));
        };

        let size = value.size();
        self.limits.check_collection(size)?;

        let mut fields = Vec::with_capacity(size);
        for index in 0..size {
            let field = value
                .structure_field(index)
                .ok_or_else(|| ConversionError::malformed(constants::ERR_MISSING_STRUCTURE_FIELD))?;
            fields.push(self.decode_at(field, depth + 1)?);
        }

        trace!(
            signature,
            fields = fields.len(),
            handler = handler.name(),
            "Decoding structure"
        );
        let decoded = handler.read(signature, fields)?;

        if let Some(metrics) = self.metrics {
            metrics.structure_decoded();
        }
        Ok(decoded)
    }
}
