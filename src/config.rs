//! # Configuration Management
//!
//! Centralized configuration for the value conversion layer.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Resource Limits
//! Conversion recurses eagerly through every nested value. All limits are
//! off by default; set them when decoding input from peers you do not trust.

use crate::error::{ConversionError, Result};
use crate::registry::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Upper bound accepted for any configured limit
pub const MAX_CONFIGURABLE_LIMIT: usize = 1 << 31;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ConversionConfig {
    /// Size and nesting limits applied during decode and encode
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Handler registry behaviour
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl ConversionConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ConversionError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ConversionError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ConversionError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(val) = env_usize("BOLT_VALUES_MAX_DEPTH")? {
            config.limits.max_depth = Some(val);
        }

        if let Some(val) = env_usize("BOLT_VALUES_MAX_COLLECTION_LEN")? {
            config.limits.max_collection_len = Some(val);
        }

        if let Some(val) = env_usize("BOLT_VALUES_MAX_STRING_LEN")? {
            config.limits.max_string_len = Some(val);
        }

        if let Ok(policy) = std::env::var("BOLT_VALUES_CONFLICT_POLICY") {
            config.registry.conflict_policy = policy.parse()?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        let example = Self::default_with_overrides(|config| {
            config.limits = LimitsConfig::recommended();
        });
        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConversionError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ConversionError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.limits.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConversionError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConversionError::ConfigError(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Size and nesting limits; `None` disables a check
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Deepest nesting level allowed; the root value is level 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Most elements in a single list, dictionary or structure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_collection_len: Option<usize>,

    /// Longest string or byte payload, in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_string_len: Option<usize>,
}

impl LimitsConfig {
    /// Limits suited to values received from untrusted peers
    pub fn recommended() -> Self {
        Self {
            max_depth: Some(64),
            max_collection_len: Some(1 << 20),
            max_string_len: Some(16 * 1024 * 1024),
        }
    }

    /// Validate limits configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, limit) in [
            ("max_depth", self.max_depth),
            ("max_collection_len", self.max_collection_len),
            ("max_string_len", self.max_string_len),
        ] {
            if let Some(value) = limit {
                if value > MAX_CONFIGURABLE_LIMIT {
                    errors.push(format!(
                        "{name} too large: {value} (maximum: {MAX_CONFIGURABLE_LIMIT})"
                    ));
                }
            }
        }

        if self.max_depth == Some(0) {
            errors.push("max_depth of 0 rejects every list, dictionary and structure".to_string());
        }

        errors
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        check("max_depth", self.max_depth, depth)
    }

    pub(crate) fn check_collection(&self, len: usize) -> Result<()> {
        check("max_collection_len", self.max_collection_len, len)
    }

    pub(crate) fn check_string(&self, len: usize) -> Result<()> {
        check("max_string_len", self.max_string_len, len)
    }
}

fn check(limit: &'static str, max: Option<usize>, actual: usize) -> Result<()> {
    match max {
        Some(max) if actual > max => Err(ConversionError::LimitExceeded { limit, max, actual }),
        _ => Ok(()),
    }
}

/// Handler registry configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Whether a later handler may take over a claimed signature or type
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}
