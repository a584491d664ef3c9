#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests: malformed handles, limits, deep nesting and failure
//! propagation out of nested composites

use bolt_values::tagged::{Allocator, Kind, OwnedAllocator, OwnedValue, TaggedValue};
use bolt_values::{
    ConversionConfig, ConversionError, Decoder, Encode, Encoder, LimitsConfig, Registry, Shape,
    Value, ValueSystem,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// DECODE EDGE CASES
// ============================================================================

#[test]
fn test_decode_unknown_kind_inside_dictionary() {
    let system = ValueSystem::new(OwnedAllocator);
    let tagged = OwnedValue::dictionary(vec![
        (OwnedValue::string("ok"), OwnedValue::integer(1)),
        (OwnedValue::string("bad"), OwnedValue::with_raw_kind(0xEE)),
    ]);

    match system.decode(&tagged) {
        Err(ConversionError::UnsupportedType(detail)) => assert!(detail.contains("0xee")),
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn test_decode_deeply_nested_list() {
    let mut tagged = OwnedValue::integer(7);
    for _ in 0..200 {
        tagged = OwnedValue::list(vec![tagged]);
    }

    let system = ValueSystem::new(OwnedAllocator);
    let mut decoded = system.decode(&tagged).unwrap();
    let mut depth = 0;
    while let Value::List(mut items) = decoded {
        assert_eq!(items.len(), 1);
        decoded = items.remove(0);
        depth += 1;
    }
    assert_eq!(depth, 200);
    assert_eq!(decoded, Value::Integer(7));
}

/// A handle whose declared size is larger than the children it can produce
struct Truncated {
    kind: Kind,
    inner: OwnedValue,
}

impl TaggedValue for Truncated {
    fn kind(&self) -> Kind {
        self.kind
    }
    fn size(&self) -> usize {
        self.inner.size() + 1
    }
    fn signature(&self) -> i8 {
        self.inner.signature()
    }
    fn get_boolean(&self) -> Option<bool> {
        None
    }
    fn get_integer(&self) -> Option<i64> {
        None
    }
    fn get_float(&self) -> Option<f64> {
        None
    }
    fn string_bytes(&self) -> Option<&[u8]> {
        None
    }
    fn all_bytes(&self) -> Option<&[u8]> {
        None
    }
    fn list_element(&self, _index: usize) -> Option<&Self> {
        None
    }
    fn dictionary_key(&self, _index: usize) -> Option<&Self> {
        None
    }
    fn dictionary_value(&self, _index: usize) -> Option<&Self> {
        None
    }
    fn structure_field(&self, _index: usize) -> Option<&Self> {
        None
    }
    fn list_element_mut(&mut self, _index: usize) -> Option<&mut Self> {
        None
    }
    fn dictionary_entry_mut(&mut self, _index: usize) -> Option<(&mut Self, &mut Self)> {
        None
    }
    fn structure_field_mut(&mut self, _index: usize) -> Option<&mut Self> {
        None
    }
    fn format_as_null(&mut self) {
        self.kind = Kind::Null;
    }
    fn format_as_boolean(&mut self, _value: bool) {
        self.kind = Kind::Boolean;
    }
    fn format_as_integer(&mut self, _value: i64) {
        self.kind = Kind::Integer;
    }
    fn format_as_float(&mut self, _value: f64) {
        self.kind = Kind::Float;
    }
    fn format_as_string(&mut self, _value: &[u8]) {
        self.kind = Kind::String;
    }
    fn format_as_bytes(&mut self, _value: &[u8]) {
        self.kind = Kind::Bytes;
    }
    fn format_as_list(&mut self, _size: usize) {
        self.kind = Kind::List;
    }
    fn format_as_dictionary(&mut self, _size: usize) {
        self.kind = Kind::Dictionary;
    }
    fn format_as_structure(&mut self, _signature: i8, _size: usize) {
        self.kind = Kind::Structure;
    }
}

struct TruncatedAllocator;

impl Allocator for TruncatedAllocator {
    type Value = Truncated;

    fn allocate(&self) -> Truncated {
        Truncated {
            kind: Kind::Null,
            inner: OwnedValue::null(),
        }
    }
}

#[test]
fn test_missing_children_are_malformed_not_panics() {
    let registry = Registry::new();
    let decoder = Decoder::new(&registry);

    for kind in [Kind::List, Kind::Dictionary, Kind::Integer, Kind::String] {
        let handle = Truncated {
            kind,
            inner: OwnedValue::null(),
        };
        assert!(
            matches!(decoder.decode(&handle), Err(ConversionError::Malformed(_))),
            "kind {kind:?} should be malformed"
        );
    }
}

#[test]
fn test_encode_into_handle_without_slots_fails() {
    let registry = Registry::new();
    let encoder = Encoder::new(&registry, &TruncatedAllocator);

    assert!(encoder.encode(&42i64).is_ok());
    assert!(matches!(
        encoder.encode(&vec![1, 2]),
        Err(ConversionError::Malformed(_))
    ));
}

// ============================================================================
// ENCODE FAILURE PROPAGATION
// ============================================================================

/// Counts how often the encoder asked for its shape
struct Probe<'a>(&'a AtomicUsize);

impl Encode for Probe<'_> {
    fn shape(&self) -> Shape<'_> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Shape::Integer(1)
    }
}

struct Unencodable;

impl Encode for Unencodable {
    fn shape(&self) -> Shape<'_> {
        Shape::unsupported::<Self>()
    }
}

#[test]
fn test_failure_stops_at_first_bad_element() {
    let calls = AtomicUsize::new(0);
    let values: Vec<Box<dyn Encode + '_>> = vec![
        Box::new(Probe(&calls)),
        Box::new(Unencodable),
        Box::new(Probe(&calls)),
    ];

    let system = ValueSystem::new(OwnedAllocator);
    assert!(matches!(
        system.encode(&values),
        Err(ConversionError::UnsupportedType(_))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_encode_into_replaces_existing_contents() {
    let registry = Registry::new();
    let encoder = Encoder::new(&registry, &OwnedAllocator);

    let mut target = OwnedValue::list(vec![OwnedValue::integer(1); 4]);
    encoder.encode_into(&mut target, "replaced").unwrap();
    assert_eq!(target, OwnedValue::string("replaced"));
}

#[test]
fn test_encode_does_not_mutate_source() {
    let system = ValueSystem::new(OwnedAllocator);
    let mut map = BTreeMap::new();
    map.insert("k".to_string(), Value::List(vec![Value::Integer(1)]));
    let source = Value::Map(map);
    let copy = source.clone();

    system.encode(&source).unwrap();
    assert_eq!(source, copy);
}

// ============================================================================
// LIMITS
// ============================================================================

fn limited(limits: LimitsConfig) -> ValueSystem<OwnedAllocator> {
    let config = ConversionConfig::default_with_overrides(|c| c.limits = limits);
    ValueSystem::with_config(OwnedAllocator, config).unwrap()
}

#[test]
fn test_string_limit_applies_both_ways() {
    let system = limited(LimitsConfig {
        max_string_len: Some(3),
        ..LimitsConfig::default()
    });

    assert!(system.encode("abc").is_ok());
    assert!(matches!(
        system.encode("abcd"),
        Err(ConversionError::LimitExceeded { limit: "max_string_len", .. })
    ));
    assert!(matches!(
        system.decode(&OwnedValue::bytes(vec![0; 4])),
        Err(ConversionError::LimitExceeded { limit: "max_string_len", .. })
    ));
}

#[test]
fn test_depth_limit_counts_composites_not_references() {
    let system = limited(LimitsConfig {
        max_depth: Some(1),
        ..LimitsConfig::default()
    });

    // Level 0 list holding level 1 scalars, reached through three references
    assert!(system.encode(&&&&vec![1, 2]).is_ok());
    assert!(matches!(
        system.encode(&vec![vec![1]]),
        Err(ConversionError::LimitExceeded { limit: "max_depth", .. })
    ));
}

#[test]
fn test_collection_limit_on_decode() {
    let system = limited(LimitsConfig {
        max_collection_len: Some(2),
        ..LimitsConfig::default()
    });

    let tagged = OwnedValue::dictionary(vec![
        (OwnedValue::string("a"), OwnedValue::null()),
        (OwnedValue::string("b"), OwnedValue::null()),
        (OwnedValue::string("c"), OwnedValue::null()),
    ]);
    assert!(matches!(
        system.decode(&tagged),
        Err(ConversionError::LimitExceeded {
            limit: "max_collection_len",
            max: 2,
            actual: 3
        })
    ));
    assert_eq!(system.metrics().snapshot().decodes_failed, 1);
}

#[test]
fn test_invalid_limits_rejected_at_construction() {
    let zero_depth = ConversionConfig::default_with_overrides(|c| c.limits.max_depth = Some(0));
    match ValueSystem::with_config(OwnedAllocator, zero_depth) {
        Err(ConversionError::ConfigError(msg)) => assert!(msg.contains("max_depth")),
        Err(other) => panic!("Unexpected error: {other:?}"),
        Ok(_) => panic!("zero depth limit should be rejected"),
    }

    let oversized = ConversionConfig::default_with_overrides(|c| {
        c.limits.max_string_len = Some(usize::MAX);
    });
    assert!(ValueSystem::with_config(OwnedAllocator, oversized).is_err());

    let recommended = ConversionConfig::default_with_overrides(|c| {
        c.limits = LimitsConfig::recommended();
    });
    assert!(ValueSystem::with_config(OwnedAllocator, recommended).is_ok());
}
