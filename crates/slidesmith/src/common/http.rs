//! HTTP Client Utilities
//!
//! Shared HTTP client creation with consistent configuration.

use std::time::Duration;

use super::error::Error;

/// Create a reqwest HTTP client with standard configuration
///
/// - 30 second request timeout
/// - 10 second connect timeout
pub fn create_http_client() -> Result<reqwest::Client, Error> {
    create_http_client_with_timeout(30)
}

/// Create a reqwest HTTP client with custom timeout
pub fn create_http_client_with_timeout(timeout_secs: u64) -> Result<reqwest::Client, Error> {
    let builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10));

    // Loopback test servers must not be routed through a system proxy.
    #[cfg(test)]
    let builder = builder.no_proxy();

    builder
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}
