//! # Utility Modules
//!
//! Supporting utilities shared by the conversion engines.
//!
//! ## Components
//! - **Metrics**: Thread-safe conversion counters

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
