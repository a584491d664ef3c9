//! # Error Types
//!
//! Error handling for value conversion in both directions.
//!
//! Every failure encountered while decoding or encoding a value is returned
//! from the top-level call. A failure inside a composite aborts the whole
//! conversion; no partially converted value is ever handed back.
//!
//! ## Error Categories
//! - **Unsupported input**: unknown wire kinds, unconvertible host types,
//!   structures with no registered handler
//! - **Handler errors**: messages produced by a registered handler, surfaced verbatim
//! - **Malformed values**: tagged handles whose contents disagree with their kind
//! - **Configuration**: invalid limits, conflicting handler registrations
//!
//! ## Example Usage
//! ```rust
//! use bolt_values::error::{ConversionError, Result};
//! use tracing::error;
//!
//! fn require_signature(signature: i8) -> Result<()> {
//!     if signature != 0x01 {
//!         return Err(ConversionError::UnsupportedStructure(signature));
//!     }
//!     Ok(())
//! }
//!
//! if let Err(e) = require_signature(0x7F) {
//!     error!(error = %e, "Structure rejected");
//! }
//! ```

use std::string::FromUtf8Error;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Registry lock errors
    pub const ERR_REGISTRY_WRITE_LOCK: &str = "Failed to acquire write lock on registry";
    pub const ERR_REGISTRY_READ_LOCK: &str = "Failed to acquire read lock on registry";

    /// Handler errors
    pub const ERR_NOT_SUPPORTED: &str = "not supported";
    pub const ERR_WRONG_RECORD_TYPE: &str = "value is not of the handler's record type";

    /// Malformed tagged values
    pub const ERR_MISSING_LIST_ELEMENT: &str = "list element missing";
    pub const ERR_MISSING_DICTIONARY_KEY: &str = "dictionary key missing";
    pub const ERR_MISSING_DICTIONARY_VALUE: &str = "dictionary value missing";
    pub const ERR_MISSING_STRUCTURE_FIELD: &str = "structure field missing";
    pub const ERR_DICTIONARY_KEY_NOT_STRING: &str = "dictionary key is not a string";
    pub const ERR_KIND_MISMATCH: &str = "payload does not match declared kind";

    /// Encode failures
    pub const ERR_DANGLING_REFERENCE: &str = "dangling reference";
}

/// Error returned by a structure handler's own read/write logic.
///
/// The message is surfaced to callers exactly as the handler supplied it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A handler declined a signature or value it nominally claims.
    pub fn not_supported() -> Self {
        Self::new(constants::ERR_NOT_SUPPORTED)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// ConversionError is the primary error type for all conversion operations
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("unsupported data type: {0}")]
    UnsupportedType(String),

    #[error("unsupported struct type {0:#04x} received")]
    UnsupportedStructure(i8),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("invalid UTF-8 in string value: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("malformed tagged value: {0}")]
    Malformed(String),

    #[error("integer {0} does not fit in a signed 64-bit value")]
    IntegerOverflow(u64),

    #[error("handler conflict: {what} already claimed by an earlier handler")]
    HandlerConflict { what: String },

    #[error("limit exceeded: {limit} (max {max}, got {actual})")]
    LimitExceeded {
        limit: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Synchronization primitive poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ConversionError {
    pub(crate) fn malformed(detail: &str) -> Self {
        ConversionError::Malformed(detail.to_string())
    }

    /// Whether re-running the same conversion could succeed after the caller
    /// changes the registry (only a missing structure handler qualifies).
    pub fn is_resolvable_by_registration(&self) -> bool {
        matches!(self, ConversionError::UnsupportedStructure(_))
    }
}

/// Type alias for Results using ConversionError
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_structure_display() {
        let err = ConversionError::UnsupportedStructure(0x7F);
        assert_eq!(err.to_string(), "unsupported struct type 0x7f received");
    }

    #[test]
    fn test_handler_error_is_verbatim() {
        let err: ConversionError = HandlerError::new("point needs two fields").into();
        assert_eq!(err.to_string(), "point needs two fields");
    }

    #[test]
    fn test_not_supported_message() {
        assert_eq!(HandlerError::not_supported().message(), "not supported");
    }

    #[test]
    fn test_resolvable_by_registration() {
        assert!(ConversionError::UnsupportedStructure(1).is_resolvable_by_registration());
        assert!(!ConversionError::UnsupportedType("fn".into()).is_resolvable_by_registration());
    }
}
