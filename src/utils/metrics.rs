//! Observability and Metrics
//!
//! Counters for conversion traffic, shared by every call made through one
//! [`crate::core::system::ValueSystem`].
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Conversion metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Total decode calls
    pub decodes_total: AtomicU64,
    /// Decode calls that failed
    pub decodes_failed: AtomicU64,
    /// Total encode calls
    pub encodes_total: AtomicU64,
    /// Encode calls that failed
    pub encodes_failed: AtomicU64,
    /// Structures handed to a handler's read
    pub structures_decoded: AtomicU64,
    /// Records written through a handler
    pub structures_encoded: AtomicU64,
    /// Structures whose signature had no handler
    pub unsupported_structures: AtomicU64,
    /// Handler registrations
    pub handlers_registered: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            decodes_total: AtomicU64::new(0),
            decodes_failed: AtomicU64::new(0),
            encodes_total: AtomicU64::new(0),
            encodes_failed: AtomicU64::new(0),
            structures_decoded: AtomicU64::new(0),
            structures_encoded: AtomicU64::new(0),
            unsupported_structures: AtomicU64::new(0),
            handlers_registered: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record the outcome of a top-level decode
    pub fn decode_finished(&self, ok: bool) {
        self.decodes_total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.decodes_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record the outcome of a top-level encode
    pub fn encode_finished(&self, ok: bool) {
        self.encodes_total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.encodes_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn structure_decoded(&self) {
        self.structures_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn structure_encoded(&self) {
        self.structures_encoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unsupported_structure(&self) {
        self.unsupported_structures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handler_registered(&self) {
        self.handlers_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            decodes_total: self.decodes_total.load(Ordering::Relaxed),
            decodes_failed: self.decodes_failed.load(Ordering::Relaxed),
            encodes_total: self.encodes_total.load(Ordering::Relaxed),
            encodes_failed: self.encodes_failed.load(Ordering::Relaxed),
            structures_decoded: self.structures_decoded.load(Ordering::Relaxed),
            structures_encoded: self.structures_encoded.load(Ordering::Relaxed),
            unsupported_structures: self.unsupported_structures.load(Ordering::Relaxed),
            handlers_registered: self.handlers_registered.load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    /// Log current metrics summary
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            decodes = snapshot.decodes_total,
            decode_failures = snapshot.decodes_failed,
            encodes = snapshot.encodes_total,
            encode_failures = snapshot.encodes_failed,
            structures_decoded = snapshot.structures_decoded,
            structures_encoded = snapshot.structures_encoded,
            unsupported_structures = snapshot.unsupported_structures,
            handlers = snapshot.handlers_registered,
            uptime_secs = snapshot.uptime_seconds,
            "Conversion metrics summary"
        );
    }

    /// Reset all counters (useful for testing)
    pub fn reset(&self) {
        self.decodes_total.store(0, Ordering::Relaxed);
        self.decodes_failed.store(0, Ordering::Relaxed);
        self.encodes_total.store(0, Ordering::Relaxed);
        self.encodes_failed.store(0, Ordering::Relaxed);
        self.structures_decoded.store(0, Ordering::Relaxed);
        self.structures_encoded.store(0, Ordering::Relaxed);
        self.unsupported_structures.store(0, Ordering::Relaxed);
        self.handlers_registered.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub decodes_total: u64,
    pub decodes_failed: u64,
    pub encodes_total: u64,
    pub encodes_failed: u64,
    pub structures_decoded: u64,
    pub structures_encoded: u64,
    pub unsupported_structures: u64,
    pub handlers_registered: u64,
    pub uptime_seconds: u64,
}
