//! Wave-Harvest: a batch image retrieval pipeline
//!
//! This crate reads numbered lists of `(resource, destination)` pairs, fetches
//! every resource over HTTP with a bounded number of in-flight requests, stores
//! image payloads under a sanitized local path, and records failures per list
//! so they can be retried later.

pub mod config;
pub mod harvest;
pub mod output;
pub mod paths;
pub mod range;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Wave-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxy { url: String, source: reqwest::Error },

    #[error("Cannot read input list {}: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write failure log {} ({dropped} records not written): {source}", .path.display())]
    FailureLog {
        path: PathBuf,
        dropped: usize,
        source: std::io::Error,
    },

    #[error("Cannot create directory {}: {source}", .path.display())]
    Provision {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot append to run log {}: {source}", .path.display())]
    RunLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid index range: {0}")]
    InvalidRange(String),

    #[error("Worker pool closed unexpectedly")]
    PoolClosed,

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Wave-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Engine, FailureRecorder, WaveReport, WorkItem};
pub use paths::{sanitize, Sanitized};
pub use range::IndexRange;
