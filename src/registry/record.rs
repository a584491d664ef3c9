//! Typed handlers for application records.
//!
//! Implementing [`Record`] for a type and registering a [`RecordHandler`] for
//! it removes the `Any` downcasting a hand-written [`StructHandler`] needs.
//!
//! ```rust
//! use bolt_values::error::HandlerError;
//! use bolt_values::registry::{Record, RecordHandler, Registry};
//! use bolt_values::value::Value;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Point {
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl Record for Point {
//!     const SIGNATURE: i8 = 0x58;
//!
//!     fn from_fields(fields: Vec<Value>) -> Result<Self, HandlerError> {
//!         match fields.as_slice() {
//!             [Value::Float(x), Value::Float(y)] => Ok(Point { x: *x, y: *y }),
//!             _ => Err(HandlerError::new("point expects two floats")),
//!         }
//!     }
//!
//!     fn to_fields(&self) -> Vec<Value> {
//!         vec![Value::Float(self.x), Value::Float(self.y)]
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(Arc::new(RecordHandler::<Point>::new())).unwrap();
//! assert!(registry.lookup_by_signature(0x58).is_some());
//! ```

use super::handler::{StructHandler, TypeDescriptor};
use crate::error::{constants, HandlerError};
use crate::value::Value;
use std::any::Any;
use std::marker::PhantomData;

/// Application type carried on the wire as a structure
pub trait Record: Any + Send + Sync + Sized {
    /// Structure signature identifying this record type
    const SIGNATURE: i8;

    fn from_fields(fields: Vec<Value>) -> Result<Self, HandlerError>;

    fn to_fields(&self) -> Vec<Value>;
}

/// [`StructHandler`] for a single [`Record`] type
pub struct RecordHandler<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordHandler<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T: Record> Default for RecordHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> StructHandler for RecordHandler<T> {
    fn readable_signatures(&self) -> Vec<i8> {
        vec![T::SIGNATURE]
    }

    fn writable_types(&self) -> Vec<TypeDescriptor> {
        vec![TypeDescriptor::of::<T>()]
    }

    fn read(&self, signature: i8, fields: Vec<Value>) -> Result<Value, HandlerError> {
        if signature != T::SIGNATURE {
            return Err(HandlerError::not_supported());
        }
        T::from_fields(fields).map(Value::record)
    }

    fn write(&self, value: &dyn Any) -> Result<(i8, Vec<Value>), HandlerError> {
        let record = value
            .downcast_ref::<T>()
            .ok_or_else(|| HandlerError::new(constants::ERR_WRONG_RECORD_TYPE))?;
        Ok((T::SIGNATURE, record.to_fields()))
    }

    fn name(&self) -> &str {
        std::any::type_name::<T>()
    }
}
