#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use bolt_values::tagged::{OwnedAllocator, OwnedValue};
use bolt_values::{
    ConversionError, HandlerError, Record, RecordHandler, StructHandler, TypeDescriptor, Value,
    ValueSystem,
};
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct Tick(i64);

impl Record for Tick {
    const SIGNATURE: i8 = 0x54;

    fn from_fields(fields: Vec<Value>) -> Result<Self, HandlerError> {
        match fields.as_slice() {
            [Value::Integer(n)] => Ok(Tick(*n)),
            _ => Err(HandlerError::new("tick expects one integer")),
        }
    }

    fn to_fields(&self) -> Vec<Value> {
        vec![Value::Integer(self.0)]
    }
}

/// Handler for a signature nobody sends, registered while conversions run
struct Filler(i8);

impl StructHandler for Filler {
    fn readable_signatures(&self) -> Vec<i8> {
        vec![self.0]
    }

    fn writable_types(&self) -> Vec<TypeDescriptor> {
        Vec::new()
    }

    fn read(&self, _signature: i8, _fields: Vec<Value>) -> Result<Value, HandlerError> {
        Ok(Value::Null)
    }

    fn write(&self, _value: &dyn Any) -> Result<(i8, Vec<Value>), HandlerError> {
        Err(HandlerError::not_supported())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_decode_encode_heavy() {
    use tokio::task::JoinSet;

    let iterations = 2_000i64;
    let system = Arc::new(ValueSystem::new(OwnedAllocator));
    system
        .register_handler(Arc::new(RecordHandler::<Tick>::new()))
        .unwrap();

    let mut tasks = JoinSet::new();
    for worker in 0..8i64 {
        let system = Arc::clone(&system);
        tasks.spawn(async move {
            for i in 0..iterations {
                let n = worker * iterations + i;
                let tagged = OwnedValue::list(vec![
                    OwnedValue::structure(0x54, vec![OwnedValue::integer(n)]),
                    OwnedValue::string(format!("item-{n}")),
                ]);

                let decoded = system.decode(&tagged).unwrap();
                let items = decoded.as_list().unwrap();
                assert_eq!(items[0].downcast_record::<Tick>(), Some(&Tick(n)));

                let reencoded = system.encode(&decoded).unwrap();
                assert_eq!(reencoded, tagged);
            }
        });
    }

    // Registrations publish new snapshots while the workers convert
    let registrar = {
        let system = Arc::clone(&system);
        tokio::task::spawn_blocking(move || {
            for signature in 0x60..0x70i8 {
                system.register_handler(Arc::new(Filler(signature))).unwrap();
            }
        })
    };

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
    registrar.await.unwrap();

    let snapshot = system.metrics().snapshot();
    assert_eq!(snapshot.decodes_total, 8 * iterations as u64);
    assert_eq!(snapshot.encodes_total, 8 * iterations as u64);
    assert_eq!(snapshot.decodes_failed, 0);
    assert_eq!(snapshot.handlers_registered, 17);
    assert_eq!(system.registry().unwrap().len(), 17);
}

#[test]
fn registry_snapshot_is_stable_across_registration() {
    let system = ValueSystem::new(OwnedAllocator);
    let before = system.registry().unwrap();

    system
        .register_handler(Arc::new(RecordHandler::<Tick>::new()))
        .unwrap();

    assert!(before.lookup_by_signature(0x54).is_none());
    assert!(system.registry().unwrap().lookup_by_signature(0x54).is_some());

    let tagged = OwnedValue::structure(0x54, vec![OwnedValue::string("bad")]);
    let err = system.decode(&tagged).unwrap_err();
    assert!(matches!(err, ConversionError::Handler(_)));
}

#[test]
fn value_system_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ValueSystem<OwnedAllocator>>();
    assert_send_sync::<Value>();
}
