// # HTTP IP Source
//
// This crate provides HTTP-based IP sources for the DDNS reconciler.
//
// ## Architecture
//
// Each `HttpIpSource` wraps one IP echo service (e.g., api.ipify.org,
// ipv4.icanhazip.com). A source issues one plain GET per call and parses
// the trimmed body as an address. Ordering and fallback between sources are
// owned by `ddns_core::IpDiscoverer`.
//
// ## Response Handling
//
// Only the body matters. A service that answers with an error status and
// an empty or non-address body simply fails to parse; headers and status
// nuances are otherwise ignored.

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// HTTP echo-service IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client (shared between sources)
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source with its own client
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `timeout`: Timeout for each request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(url, build_client(timeout)?))
    }

    /// Create a source that reuses an existing client
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(&self.url, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(&self.url, format!("Failed to read response: {}", e)))?;

        parse_ip(body.trim()).ok_or_else(|| {
            Error::ip_source(
                &self.url,
                format!("Invalid IP address {:?} (status {})", body.trim(), status),
            )
        })
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("{} reported {}", self.url, ip);
        Ok(ip)
    }

    fn describe(&self) -> &str {
        &self.url
    }
}

/// Build the ordered source chain for `urls`, sharing one client
///
/// # Parameters
///
/// - `urls`: Service URLs in priority order
/// - `timeout`: Timeout applied to each individual request
pub fn sources_from_urls<S: AsRef<str>>(
    urls: &[S],
    timeout: Duration,
) -> Result<Vec<Box<dyn IpSource>>> {
    let client = build_client(timeout)?;

    Ok(urls
        .iter()
        .map(|url| {
            Box::new(HttpIpSource::with_client(url.as_ref(), client.clone())) as Box<dyn IpSource>
        })
        .collect())
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

fn parse_ip(text: &str) -> Option<IpAddr> {
    text.parse().ok()
}
