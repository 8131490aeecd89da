//! Configuration module for Wave-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wave_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("At most {} fetches in flight", config.fetch.max_concurrent);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, NamingConfig, PathsConfig, ProxyConfig, ThrottleConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
