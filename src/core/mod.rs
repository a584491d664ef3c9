//! # Core Conversion Components
//!
//! The two conversion directions and the facade tying them to a registry.
//!
//! ## Components
//! - **Decode**: tagged value → host [`crate::value::Value`]
//! - **Encode**: any [`shape::Encode`] host value → tagged value
//! - **Shape**: capability view host types expose to the encoder
//! - **System**: [`system::ValueSystem`], decode/encode/register in one place
//!
//! ## Dispatch
//! ```text
//! decode: kind tag ─┬─ scalars / List / Dictionary ── direct
//!                   └─ Structure ── registry[signature].read(fields)
//! encode: shape ────┬─ scalars / indirection / sequence / mapping ── direct
//!                   └─ Record ── registry[TypeId].write(value) → Structure
//! ```
//!
//! Neither direction limits nesting depth or collection size unless
//! [`crate::config::LimitsConfig`] says so.

pub mod decode;
pub mod encode;
pub mod shape;
pub mod system;
