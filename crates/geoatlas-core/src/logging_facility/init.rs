//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use serde::{Deserialize, Serialize};

use crate::config::LoggingConfig;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Bare registry; tests attach their own capture layer
    Test,
}

const DEVELOPMENT_FILTER: &str = "geoatlas_core=debug";
const PRODUCTION_FILTER: &str = "geoatlas_core=info";

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has an effect; later calls (with any profile) are
/// ignored. `RUST_LOG` overrides the profile's default filter.
///
/// # Profiles
///
/// - **Development**: human-readable logs, `geoatlas_core=debug`
/// - **Production**: JSON structured logs, `geoatlas_core=info`
/// - **Test**: registry only; see [`super::test_capture`]
///
/// # Example
///
/// ```
/// use geoatlas_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = |default: &str| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
        };
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter(DEVELOPMENT_FILTER))
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter(PRODUCTION_FILTER))
                    .init();
            }
            Profile::Test => {
                tracing_subscriber::registry().init();
            }
        }
    });
}

/// Initialize with the profile named in `config`
pub fn init_from_config(config: &LoggingConfig) {
    init(config.profile);
}
