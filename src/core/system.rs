//! # Value System
//!
//! The entry point callers hold on to: one allocator, one handler registry,
//! one configuration and one metrics collector.
//!
//! Registrations are copy-on-write. Each `register_handler` call builds a new
//! registry from the current one and publishes it as a fresh `Arc` snapshot.
//! Conversions grab the current snapshot and release the lock before doing any
//! work, so a conversion never blocks registration and always sees one
//! consistent pair of indices.
//!
//! ## Usage
//! ```rust
//! use bolt_values::core::system::ValueSystem;
//! use bolt_values::tagged::OwnedAllocator;
//! use bolt_values::value::Value;
//!
//! let system = ValueSystem::new(OwnedAllocator);
//! let tagged = system.encode(&vec!["a", "b"]).unwrap();
//! let decoded = system.decode(&tagged).unwrap();
//! assert_eq!(decoded, Value::List(vec!["a".into(), "b".into()]));
//! ```

use super::decode::Decoder;
use super::encode::Encoder;
use super::shape::Encode;
use crate::config::ConversionConfig;
use crate::error::{constants, ConversionError, Result};
use crate::registry::{Registry, StructHandler};
use crate::tagged::Allocator;
use crate::utils::metrics::Metrics;
use crate::value::Value;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument, warn};

/// Decode/encode facade over a shared handler registry
pub struct ValueSystem<A: Allocator> {
    allocator: A,
    config: ConversionConfig,
    registry: RwLock<Arc<Registry>>,
    metrics: Metrics,
}

impl<A: Allocator> ValueSystem<A> {
    pub fn new(allocator: A) -> Self {
        Self::build(allocator, ConversionConfig::default())
    }

    /// Create a value system from a configuration, rejecting invalid limits
    pub fn with_config(allocator: A, config: ConversionConfig) -> Result<Self> {
        if let Err(e) = config.validate_strict() {
            warn!(error = %e, "Rejected value system configuration");
            return Err(e);
        }
        Ok(Self::build(allocator, config))
    }

    fn build(allocator: A, config: ConversionConfig) -> Self {
        let registry = Registry::with_policy(config.registry.conflict_policy);
        Self {
            allocator,
            config,
            registry: RwLock::new(Arc::new(registry)),
            metrics: Metrics::new(),
        }
    }

    /// Register a structure handler and publish the rebuilt indices
    pub fn register_handler(&self, handler: Arc<dyn StructHandler>) -> Result<()> {
        let mut current = self
            .registry
            .write()
            .map_err(|_| ConversionError::LockPoisoned(constants::ERR_REGISTRY_WRITE_LOCK))?;

        let mut next = Registry::clone(&current);
        next.register(handler)?;
        *current = Arc::new(next);

        self.metrics.handler_registered();
        debug!(handlers = current.len(), "Published registry snapshot");
        Ok(())
    }

    /// Current registry snapshot
    pub fn registry(&self) -> Result<Arc<Registry>> {
        self.registry
            .read()
            .map(|registry| Arc::clone(&registry))
            .map_err(|_| ConversionError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))
    }

    /// Convert a tagged value into a host value
    #[instrument(level = "trace", skip_all)]
    pub fn decode(&self, value: &A::Value) -> Result<Value> {
        let registry = self.registry()?;
        let result = Decoder::new(&registry)
            .with_limits(self.config.limits)
            .with_metrics(&self.metrics)
            .decode(value);

        self.metrics.decode_finished(result.is_ok());
        result
    }

    /// Convert a host value into a newly allocated tagged value
    #[instrument(level = "trace", skip_all)]
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> Result<A::Value> {
        let registry = self.registry()?;
        let result = Encoder::new(&registry, &self.allocator)
            .with_limits(self.config.limits)
            .with_metrics(&self.metrics)
            .encode(value);

        self.metrics.encode_finished(result.is_ok());
        result
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}
