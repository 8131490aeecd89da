use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Wave-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fetch: FetchConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Overall per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum number of simultaneous fetches
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    /// Route every request through `url` when set
    #[serde(default)]
    pub enabled: bool,

    /// Proxy URL, e.g. `http://127.0.0.1:7890`
    #[serde(default)]
    pub url: Option<String>,
}

impl ProxyConfig {
    /// Returns the proxy URL only when the proxy is enabled
    pub fn active_url(&self) -> Option<&str> {
        if self.enabled {
            self.url.as_deref()
        } else {
            None
        }
    }
}

/// Filesystem roots
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the numbered input lists
    #[serde(rename = "urls-path")]
    pub urls_path: PathBuf,

    /// Directory receiving one failure log per input list
    #[serde(rename = "fail-path")]
    pub fail_path: PathBuf,

    /// Root under which downloaded images are written
    #[serde(rename = "storage-path")]
    pub storage_path: PathBuf,

    /// Directory receiving the run log
    #[serde(rename = "log-path")]
    pub log_path: PathBuf,
}

/// Template mapping a numeric index to an input list name
#[derive(Debug, Clone, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Zero-padded width of the index
    #[serde(default = "default_width")]
    pub width: usize,

    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            width: default_width(),
            suffix: default_suffix(),
        }
    }
}

fn default_prefix() -> String {
    "train-".to_string()
}

fn default_width() -> usize {
    5
}

fn default_suffix() -> String {
    "-of-03550".to_string()
}

/// Round-boundary stop heuristic configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Two consecutive waves finishing closer than this stop the run
    #[serde(rename = "min-round-interval-secs", default = "default_min_round_interval")]
    pub min_round_interval_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_round_interval_secs: default_min_round_interval(),
        }
    }
}

impl ThrottleConfig {
    pub fn min_round_interval(&self) -> Duration {
        Duration::from_secs(self.min_round_interval_secs)
    }
}

fn default_min_round_interval() -> u64 {
    300
}
