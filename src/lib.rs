//! # bolt-values
//!
//! Bidirectional conversion between host values and the tagged value
//! representation used by a binary network protocol.
//!
//! ## Overview
//! - **Decode**: walk a tagged value handle and materialize a [`Value`] tree
//! - **Encode**: turn any [`Encode`] host value into a freshly allocated handle
//! - **Structures**: extension types identified by a one-byte signature,
//!   converted by pluggable [`StructHandler`]s held in a [`Registry`]
//!
//! The transport owns the tagged value representation. This crate talks to it
//! only through the [`tagged::TaggedValue`] and [`tagged::Allocator`] traits;
//! [`tagged::OwnedValue`] is an in-memory implementation.
//!
//! ## Example
//! ```rust
//! use bolt_values::error::HandlerError;
//! use bolt_values::registry::{Record, RecordHandler};
//! use bolt_values::tagged::{OwnedAllocator, OwnedValue};
//! use bolt_values::{Encode, Shape, Value, ValueSystem};
//! use std::sync::Arc;
//!
//! #[derive(Debug, PartialEq)]
//! struct Node {
//!     id: i64,
//!     label: String,
//! }
//!
//! impl Record for Node {
//!     const SIGNATURE: i8 = 0x4E;
//!
//!     fn from_fields(fields: Vec<Value>) -> Result<Self, HandlerError> {
//!         match fields.as_slice() {
//!             [Value::Integer(id), Value::String(label)] => Ok(Node {
//!                 id: *id,
//!                 label: label.clone(),
//!             }),
//!             _ => Err(HandlerError::new("node expects (id, label)")),
//!         }
//!     }
//!
//!     fn to_fields(&self) -> Vec<Value> {
//!         vec![Value::Integer(self.id), Value::String(self.label.clone())]
//!     }
//! }
//!
//! impl Encode for Node {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::record(self)
//!     }
//! }
//!
//! let system = ValueSystem::new(OwnedAllocator);
//! system.register_handler(Arc::new(RecordHandler::<Node>::new())).unwrap();
//!
//! let tagged = system.encode(&Node { id: 7, label: "Person".into() }).unwrap();
//! assert_eq!(
//!     tagged,
//!     OwnedValue::structure(0x4E, vec![OwnedValue::integer(7), OwnedValue::string("Person")])
//! );
//!
//! let decoded = system.decode(&tagged).unwrap();
//! assert_eq!(
//!     decoded.downcast_record::<Node>(),
//!     Some(&Node { id: 7, label: "Person".into() })
//! );
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod config;
pub mod core;
pub mod error;
pub mod registry;
pub mod tagged;
pub mod utils;
pub mod value;

pub use crate::config::{ConversionConfig, LimitsConfig};
pub use crate::core::decode::Decoder;
pub use crate::core::encode::Encoder;
pub use crate::core::shape::{ByteSlice, Encode, Shape};
pub use crate::core::system::ValueSystem;
pub use crate::error::{ConversionError, HandlerError, Result};
pub use crate::registry::{ConflictPolicy, Record, RecordHandler, Registry, StructHandler, TypeDescriptor};
pub use crate::value::{RecordRef, Value};
