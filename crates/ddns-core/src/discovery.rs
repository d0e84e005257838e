//! Public IP discovery
//!
//! The discoverer walks its sources strictly in configured order and
//! returns the first usable IPv4 answer. A failing source is logged and
//! skipped; only when every source has failed does discovery itself fail.
//! Sources are never queried concurrently.

use crate::error::{Error, Result};
use crate::traits::IpSource;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

/// Ordered fallback chain of IP sources
pub struct IpDiscoverer {
    /// Sources in priority order
    sources: Vec<Box<dyn IpSource>>,
}

impl IpDiscoverer {
    /// Create a discoverer over `sources`, highest priority first
    pub fn new(sources: Vec<Box<dyn IpSource>>) -> Self {
        Self { sources }
    }

    /// Number of configured sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Discover the public IPv4 address
    ///
    /// Stops at the first source whose answer is usable as IPv4; later
    /// sources are not contacted.
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The first usable address
    /// - `Err(Error::DiscoveryExhausted)`: Every source failed
    pub async fn discover(&self) -> Result<Ipv4Addr> {
        for source in &self.sources {
            debug!("Querying IP source {}", source.describe());

            let ip = match source.current().await {
                Ok(ip) => ip,
                Err(e) => {
                    warn!("IP source {} failed: {}", source.describe(), e);
                    continue;
                }
            };

            match as_ipv4(ip) {
                Some(ipv4) => return Ok(ipv4),
                None => warn!("Non-IPv4 address {} from {}", ip, source.describe()),
            }
        }

        Err(Error::DiscoveryExhausted {
            attempted: self.sources.len(),
        })
    }
}

/// IPv4 form of `ip`, accepting IPv4-mapped IPv6 addresses
fn as_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}
