//! Batch transformation pipeline for an NYC 311 analytics warehouse.
//!
//! Three independent transformers turn raw extracts held in a key->blob
//! data store into the CSV tables of a star schema:
//!
//! - 311 service requests -> `fact_complaints` + `dim_time`
//! - NOAA daily weather observations -> `dim_weather`
//! - community-district demographics spreadsheet -> `dim_demographics`
//!
//! Each transformer reads its raw key(s), applies the cleaning and shaping
//! rules, and full-overwrites its processed key(s), so reruns over the same
//! inputs are idempotent. An external scheduler drives the binary; each
//! subcommand is one schedulable task.

pub mod cli {
    pub mod args;
    pub mod commands;
}
pub mod config;
pub mod constants;
pub mod error;
pub mod mappers;
pub mod models;
pub mod store;
pub mod transform;

pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use models::TransformStats;
pub use store::FsStore;
