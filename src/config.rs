//! Configuration for transformation runs.
//!
//! All ambient settings (store root, raw input keys, batch size) live in an
//! explicit struct handed to each transformer, never in process globals.
//! Values come from defaults, overridden by environment variables at startup.

use crate::constants::{
    DEFAULT_CHUNK_SIZE, RAW_COMPLAINTS_KEY, RAW_DEMOGRAPHICS_KEY, RAW_WEATHER_PREFIX,
};
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming the store root directory
pub const ENV_DATA_ROOT: &str = "NYC311_DATA_ROOT";
/// Environment variable overriding the raw complaint key
pub const ENV_COMPLAINTS_KEY: &str = "NYC311_COMPLAINTS_KEY";
/// Environment variable overriding the raw demographics key
pub const ENV_DEMOGRAPHICS_KEY: &str = "NYC311_DEMOGRAPHICS_KEY";
/// Environment variable overriding the raw weather prefix
pub const ENV_WEATHER_PREFIX: &str = "NYC311_WEATHER_PREFIX";
/// Environment variable overriding the complaint batch size
pub const ENV_CHUNK_SIZE: &str = "NYC311_CHUNK_SIZE";

/// Settings for one pipeline run
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    /// Root directory backing the key->blob store
    pub data_root: PathBuf,

    /// Key of the raw complaint extract
    pub complaints_key: String,

    /// Prefix under which raw weather blobs are partitioned
    pub weather_prefix: String,

    /// Key of the raw demographics spreadsheet
    pub demographics_key: String,

    /// Rows per batch when reading the complaint file
    pub chunk_size: usize,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            complaints_key: RAW_COMPLAINTS_KEY.to_string(),
            weather_prefix: RAW_WEATHER_PREFIX.to_string(),
            demographics_key: RAW_DEMOGRAPHICS_KEY.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl EtlConfig {
    /// Build a config from defaults overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(root) = std::env::var(ENV_DATA_ROOT) {
            config.data_root = PathBuf::from(root);
        }
        if let Ok(key) = std::env::var(ENV_COMPLAINTS_KEY) {
            config.complaints_key = key;
        }
        if let Ok(key) = std::env::var(ENV_DEMOGRAPHICS_KEY) {
            config.demographics_key = key;
        }
        if let Ok(prefix) = std::env::var(ENV_WEATHER_PREFIX) {
            config.weather_prefix = prefix;
        }
        if let Ok(size) = std::env::var(ENV_CHUNK_SIZE) {
            config.chunk_size = size.parse().map_err(|_| {
                EtlError::configuration(format!("{} must be a positive integer", ENV_CHUNK_SIZE))
            })?;
        }

        config.validate()?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Check the settings for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(EtlError::configuration(
                "chunk_size must be greater than zero",
            ));
        }
        if self.weather_prefix.is_empty() {
            return Err(EtlError::configuration("weather_prefix must not be empty"));
        }
        if self.complaints_key.is_empty() || self.demographics_key.is_empty() {
            return Err(EtlError::configuration("raw input keys must not be empty"));
        }
        Ok(())
    }
}
