// # IP Source Trait
//
// Defines the interface for asking one external service for the host's
// public address.
//
// ## Implementations
//
// - HTTP echo services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ip = source.current().await?;
//     println!("{} says {}", source.describe(), ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP source implementations
///
/// A source answers with whatever address the service reported, IPv4 or
/// IPv6. Deciding whether that answer is usable belongs to the
/// [`IpDiscoverer`](crate::IpDiscoverer), which also owns the fallback
/// order across sources.
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform exactly one request to its own service per call
/// - ✅ Parse the service's response
///
/// ## Forbidden Capabilities
/// - ❌ Retry or fall back to other services (owned by `IpDiscoverer`)
/// - ❌ Cache answers between calls
/// - ❌ Spawn tasks
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Ask the service for the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The address the service reported
    /// - `Err(Error::IpSource)`: Transport failure or a body that is not an address
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Human-readable identity of the source (typically its URL), for logs
    fn describe(&self) -> &str;
}
