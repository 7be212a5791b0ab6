//! Configuration for embedding applications.
//!
//! Loaded from TOML; every section and key is optional and unknown keys are
//! rejected. Codec bit widths are compile-time constants and not
//! configurable here.
//!
//! ```toml
//! [logging]
//! profile = "production"
//!
//! [snapshot]
//! reference_policy = "tolerate_dangling"
//!
//! [diff]
//! interrupt_check_interval = 1024
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{GeoAtlasError, Result};
use crate::logging_facility::Profile;
use crate::rules::validation::ReferencePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoAtlasConfig {
    pub logging: LoggingConfig,
    pub snapshot: SnapshotConfig,
    pub diff: DiffConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Development,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Policy applied by `SnapshotBuilder::build`
    pub reference_policy: ReferencePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Identifiers processed between interrupt checks
    pub interrupt_check_interval: u64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            interrupt_check_interval: default_interrupt_check_interval(),
        }
    }
}

fn default_interrupt_check_interval() -> u64 {
    1
}

impl GeoAtlasConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// `Config` when the text is not valid TOML, holds unknown keys, or a
    /// value has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GeoAtlasError::Config {
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// `Config` when the file cannot be read or fails to parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GeoAtlasError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML text.
    ///
    /// # Errors
    ///
    /// `Serialization` if encoding fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| GeoAtlasError::Serialization {
            message: e.to_string(),
        })
    }
}
