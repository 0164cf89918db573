//! Shared types, error model, and configuration for linksorter.
//!
//! This crate is the foundation depended on by all other linksorter crates.
//! It provides:
//! - [`LinkSorterError`]: the unified error type
//! - Domain types ([`CategoryMap`], [`seed_categories`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, OracleConfig, ServerConfig, api_key, config_dir, config_file_path,
    init_config, init_config_at, load_config, load_config_from, validate_api_key,
};
pub use error::{LinkSorterError, Result};
pub use types::{CategoryMap, seed_categories};
