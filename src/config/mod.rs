//! Configuration loading and management for the Contract Engine.
//!
//! This module loads the default contract terms and per-document settings
//! from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use contract_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Default hour band: {}-{}", config.defaults().hour_from, config.defaults().hour_to);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ContractDefaults, DocumentSettings, DocumentsConfig, EngineConfig};
