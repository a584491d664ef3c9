//! # Structure Handler Registry
//!
//! Holds the registered [`StructHandler`]s and two indices derived from them:
//! signature → handler for decoding and runtime type → handler for encoding.
//!
//! Handlers are kept in registration order and both indices are rebuilt from
//! that list after every registration, so a later handler claiming a signature
//! or type already claimed by an earlier one takes it over. With
//! [`ConflictPolicy::Reject`] such a registration fails instead and the
//! registry is left untouched.
//!
//! A registry is plain data; it is not synchronized. Share a finished registry
//! behind an `Arc`, or go through [`crate::core::system::ValueSystem`], which
//! publishes a fresh snapshot on every registration.

pub mod handler;
pub mod record;


pub use handler::{StructHandler, TypeDescriptor};
pub use record::{Record, RecordHandler};

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do when a handler claims a signature or type that is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// The later registration wins
    #[default]
    Override,
    /// The later registration fails with `HandlerConflict`
    Reject,
}

impl std::str::FromStr for ConflictPolicy {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "override" => Ok(ConflictPolicy::Override),
            "reject" => Ok(ConflictPolicy::Reject),
            other => Err(ConversionError::ConfigError(format!(
                "Unknown conflict policy: {other}"
            ))),
        }
    }
}

/// Ordered handler set with signature and type indices
#[derive(Clone, Default)]
pub struct Registry {
    policy: ConflictPolicy,
    handlers: Vec<Arc<dyn StructHandler>>,
    by_signature: HashMap<i8, Arc<dyn StructHandler>>,
    by_type: HashMap<TypeId, Arc<dyn StructHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Add a handler and rebuild both indices
    pub fn register(&mut self, handler: Arc<dyn StructHandler>) -> Result<()> {
        let signatures = handler.readable_signatures();
        let types = handler.writable_types();

        for signature in &signatures {
            if let Some(previous) = self.by_signature.get(signature) {
                self.on_conflict(format!("signature {signature:#04x}"), previous.name())?;
            }
        }
        for ty in &types {
            if let Some(previous) = self.by_type.get(&ty.id()) {
                self.on_conflict(format!("type {}", ty.name()), previous.name())?;
            }
        }

        debug!(
            handler = handler.name(),
            signatures = ?signatures,
            types = ?types,
            "Registering structure handler"
        );

        self.handlers.push(handler);
        self.rebuild_indices();
        Ok(())
    }

    fn on_conflict(&self, what: String, previous: &str) -> Result<()> {
        match self.policy {
            ConflictPolicy::Override => {
                warn!(%what, previous, "Handler registration overrides an earlier handler");
                Ok(())
            }
            ConflictPolicy::Reject => Err(ConversionError::HandlerConflict { what }),
        }
    }

    /// Derive both indices from the handler list in registration order
    fn rebuild_indices(&mut self) {
        self.by_signature.clear();
        self.by_type.clear();

        for handler in &self.handlers {
            for signature in handler.readable_signatures() {
                self.by_signature.insert(signature, Arc::clone(handler));
            }
            for ty in handler.writable_types() {
                self.by_type.insert(ty.id(), Arc::clone(handler));
            }
        }
    }

    pub fn lookup_by_signature(&self, signature: i8) -> Option<&Arc<dyn StructHandler>> {
        self.by_signature.get(&signature)
    }

    pub fn lookup_by_type(&self, type_id: TypeId) -> Option<&Arc<dyn StructHandler>> {
        self.by_type.get(&type_id)
    }

    /// Number of registered handlers, including overridden ones
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Signatures with a handler, ascending
    pub fn signatures(&self) -> Vec<i8> {
        let mut signatures: Vec<i8> = self.by_signature.keys().copied().collect();
        signatures.sort_unstable();
        signatures
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("policy", &self.policy)
            .field("handlers", &self.handlers.len())
            .field("signatures", &self.signatures())
            .field("types", &self.by_type.len())
            .finish()
    }
}
