//! # Encode Engine
//!
//! Converts any [`Encode`] host value into a freshly allocated tagged value.
//!
//! ## Dispatch order
//! 1. Null
//! 2. Exact scalars (integers narrowed to i64, floats widened to f64)
//! 3. Indirection, sequence, mapping
//! 4. Records, through the registry's runtime-type index
//! 5. Anything else fails with `UnsupportedType`
//!
//! The destination handle is only returned when the whole value converted.
//! On failure it is dropped here, so a half-written handle never reaches the
//! caller. The source value is only borrowed.

use super::shape::{Encode, Shape};
use crate::config::LimitsConfig;
use crate::error::{constants, ConversionError, Result};
use crate::registry::Registry;
use crate::tagged::{Allocator, TaggedValue};
use crate::utils::metrics::Metrics;
use std::any::Any;
use tracing::{trace, warn};

/// Host value → tagged value converter bound to a registry and allocator
pub struct Encoder<'a, A: Allocator> {
    registry: &'a Registry,
    allocator: &'a A,
    limits: LimitsConfig,
    metrics: Option<&'a Metrics>,
}

impl<'a, A: Allocator> Encoder<'a, A> {
    pub fn new(registry: &'a Registry, allocator: &'a A) -> Self {
        Self {
            registry,
            allocator,
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

    /// Encode a host value into a newly allocated tagged value
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> Result<A::Value> {
        let mut target = self.allocator.allocate();
        self.write(&mut target, value.shape(), 0)?;
        Ok(target)
    }

    /// Encode a host value into an existing handle, replacing its contents
    pub fn encode_into<T: Encode + ?Sized>(&self, target: &mut A::Value, value: &T) -> Result<()> {
        self.write(target, value.shape(), 0)
    }

    fn write(&self, target: &mut A::Value, shape: Shape<'_>, depth: usize) -> Result<()> {
        self.limits.check_depth(depth)?;

        match shape {
            Shape::Null => target.format_as_null(),
            Shape::Boolean(b) => target.format_as_boolean(b),
            Shape::Integer(i) => target.format_as_integer(i),
            Shape::Unsigned(u) => {
                let i = i64::try_from(u).map_err(|_| ConversionError::IntegerOverflow(u))?;
                target.format_as_integer(i);
            }
            Shape::Float(f) => target.format_as_float(f),
            Shape::String(s) => {
                self.limits.check_string(s.len())?;
                target.format_as_string(s.as_bytes());
            }
            Shape::Bytes(b) => {
                self.limits.check_string(b.len())?;
                target.format_as_bytes(b);
            }
            // Dereferencing does not count as a nesting level
            Shape::Indirect(Some(inner)) => self.write(target, *inner, depth)?,
            Shape::Indirect(None) => {
                return Err(ConversionError::UnsupportedType(
                    constants::ERR_DANGLING_REFERENCE.to_string(),
                ));
            }
            Shape::Sequence(items) => {
                let size = items.len();
                self.limits.check_collection(size)?;
                target.format_as_list(size);
                for (index, item) in items.enumerate() {
                    let slot = target.list_element_mut(index).ok_or_else(|| {
                        ConversionError::malformed(constants::ERR_MISSING_LIST_ELEMENT)
                    })?;
                    self.write(slot, item, depth + 1)?;
                }
            }
            Shape::Mapping(entries) => {
                let size = entries.len();
                self.limits.check_collection(size)?;
                target.format_as_dictionary(size);
                for (index, (key, value)) in entries.enumerate() {
                    let (key_slot, value_slot) =
                        target.dictionary_entry_mut(index).ok_or_else(|| {
                            ConversionError::malformed(constants::ERR_MISSING_DICTIONARY_VALUE)
                        })?;
                    let key = dictionary_key(key)?;
                    self.limits.check_string(key.len())?;
                    key_slot.format_as_string(key.as_bytes());
                    self.write(value_slot, value, depth + 1)?;
                }
            }
            Shape::Record { value, type_name } => {
                self.write_record(target, value, type_name, depth)?
            }
            Shape::Unsupported { type_name } => {
                warn!(type_name, "Value has no tagged representation");
                return Err(ConversionError::UnsupportedType(type_name.to_string()));
            }
        }
        Ok(())
    }

    fn write_record(
        &self,
        target: &mut A::Value,
        value: &dyn Any,
        type_name: &'static str,
        depth: usize,
    ) -> Result<()> {
        let Some(handler) = self.registry.lookup_by_type(value.type_id()) else {
            warn!(type_name, "No handler registered for record type");
            return Err(ConversionError::UnsupportedType(type_name.to_string()));
        };

        let (signature, fields) = handler.write(value)?;
        self.limits.check_collection(fields.len())?;

        trace!(
            signature,
            fields = fields.len(),
            type_name,
            handler = handler.name(),
            "Encoding structure"
        );

        target.format_as_structure(signature, fields.len());
        for (index, field) in fields.iter().enumerate() {
            let slot = target.structure_field_mut(index).ok_or_else(|| {
                ConversionError::malformed(constants::ERR_MISSING_STRUCTURE_FIELD)
            })?;
            self.write(slot, field.shape(), depth + 1)?;
        }

        if let Some(metrics) = self.metrics {
            metrics.structure_encoded();
        }
        Ok(())
    }
}

/// Resolve a mapping key through any indirection; only text keys are allowed
fn dictionary_key(shape: Shape<'_>) -> Result<&str> {
    match shape {
        Shape::String(key) => Ok(key),
        Shape::Indirect(Some(inner)) => dictionary_key(*inner),
        Shape::Indirect(None) => Err(ConversionError::UnsupportedType(
            constants::ERR_DANGLING_REFERENCE.to_string(),
        )),
        _ => Err(ConversionError::UnsupportedType(
            constants::ERR_DICTIONARY_KEY_NOT_STRING.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagged::{Kind, OwnedAllocator, OwnedValue};
    use bytes::Bytes;
    use std::collections::BTreeMap;

    fn encode<T: Encode + ?Sized>(value: &T) -> Result<OwnedValue> {
        let registry = Registry::new();
        Encoder::new(&registry, &OwnedAllocator).encode(value)
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_integer_widths_normalize() {
        assert_eq!(encode(&-3i8).expect("i8"), OwnedValue::integer(-3));
        assert_eq!(encode(&300u16).expect("u16"), OwnedValue::integer(300));
        assert_eq!(encode(&u32::MAX).expect("u32"), OwnedValue::integer(u32::MAX.into()));
        assert_eq!(encode(&7usize).expect("usize"), OwnedValue::integer(7));
        assert_eq!(encode(&isize::MIN).expect("isize"), OwnedValue::integer(i64::MIN));
        assert_eq!(encode(&1.5f32).expect("f32"), OwnedValue::float(1.5));
    }

    #[test]
    fn test_u64_overflow_rejected() {
        let result = encode(&u64::MAX);
        assert!(matches!(result, Err(ConversionError::IntegerOverflow(u64::MAX))));
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_vec_u8_is_a_list_and_bytes_are_bytes() {
        let list = encode(&vec![1u8, 2]).expect("vec");
        assert_eq!(list.kind(), Kind::List);

        let bytes = encode(&Bytes::from_static(b"\x01\x02")).expect("bytes");
        assert_eq!(bytes, OwnedValue::bytes(vec![1, 2]));
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_indirection_is_transparent() {
        let boxed: Box<dyn Encode> = Box::new(String::from("hi"));
        assert_eq!(encode(&boxed).expect("box"), OwnedValue::string("hi"));
        assert_eq!(encode(&Some(&5i32)).expect("option"), OwnedValue::integer(5));
        assert_eq!(encode(&None::<i32>).expect("none"), OwnedValue::null());
    }

    struct Released;

    impl Encode for Released {
        fn shape(&self) -> Shape<'_> {
            Shape::Indirect(None)
        }
    }

    #[test]
    fn test_dangling_reference_fails() {
        assert!(matches!(
            encode(&Released),
            Err(ConversionError::UnsupportedType(_))
        ));
    }

    #[test]
    #[allow(clippy::panic)]
    fn test_non_text_map_keys_rejected() {
        let map = BTreeMap::from([(1i64, "a"), (2, "b")]);
        match encode(&map) {
            Err(ConversionError::UnsupportedType(detail)) => {
                assert_eq!(detail, constants::ERR_DICTIONARY_KEY_NOT_STRING)
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        let nested = vec![BTreeMap::from([(Some(true), 1)])];
        assert!(matches!(
            encode(&nested),
            Err(ConversionError::UnsupportedType(_))
        ));
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_text_map_keys_through_references() {
        let key = String::from("k");
        let map = BTreeMap::from([(&key, 1i32)]);
        assert_eq!(
            encode(&map).expect("map"),
            OwnedValue::dictionary(vec![(OwnedValue::string("k"), OwnedValue::integer(1))])
        );
    }

    #[test]
    fn test_collection_limit() {
        let registry = Registry::new();
        let limits = LimitsConfig {
            max_collection_len: Some(2),
            ..LimitsConfig::default()
        };
        let result = Encoder::new(&registry, &OwnedAllocator)
            .with_limits(limits)
            .encode(&[1, 2, 3]);
        assert!(matches!(
            result,
            Err(ConversionError::LimitExceeded {
                limit: "max_collection_len",
                max: 2,
                actual: 3
            })
        ));
    }
}
