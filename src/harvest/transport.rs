//! Shared HTTP transport
//!
//! One client is built at startup and shared by every fetch of every wave,
//! so its connection pool is reused across input lists.

use crate::config::{FetchConfig, ProxyConfig};
use crate::HarvestError;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Browser identity sent with every request
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// How long an idle pooled connection is kept
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(20);

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 1000;

/// Bound on TCP connect plus TLS handshake
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the shared HTTP client
///
/// Every request carries [`BROWSER_USER_AGENT`]. When the proxy is enabled
/// all traffic goes through it; otherwise requests go direct and
/// environment proxy variables are ignored.
///
/// # Errors
///
/// * [`HarvestError::InvalidProxy`] - the enabled proxy URL is not usable
/// * [`HarvestError::ClientBuild`] - the TLS backend could not be initialized
///
/// # Example
///
/// ```no_run
/// use wave_harvest::config::{FetchConfig, ProxyConfig};
/// use wave_harvest::harvest::build_http_client;
///
/// let fetch = FetchConfig { timeout_secs: 30, max_concurrent: 64 };
/// let client = build_http_client(&fetch, &ProxyConfig::default()).unwrap();
/// ```
pub fn build_http_client(fetch: &FetchConfig, proxy: &ProxyConfig) -> Result<Client, HarvestError> {
    let mut builder = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(fetch.timeout());

    builder = match proxy.active_url() {
        Some(url) => {
            tracing::info!("Using proxy: {}", url);
            let resolved = Proxy::all(url).map_err(|source| HarvestError::InvalidProxy {
                url: url.to_string(),
                source,
            })?;
            builder.proxy(resolved)
        }
        None => {
            tracing::info!("Not using a proxy");
            builder.no_proxy()
        }
    };

    builder.build().map_err(HarvestError::ClientBuild)
}
