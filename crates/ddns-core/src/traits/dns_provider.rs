// # DNS Provider Trait
//
// Defines the interface for reading and republishing the managed address
// record via a provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordConfig};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let desired = RecordConfig::new("zone-id", "home.example.com");
//
//     let record = provider.fetch_record(&desired).await?;
//     provider
//         .update_record(&desired, &record.id, "203.0.113.10".parse()?)
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::config::RecordConfig;

/// A DNS record as held by the provider
///
/// Owned by the remote side: the reconciler reads it and requests updates,
/// it never creates or deletes records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record type (e.g., "A")
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content; an IPv4 address for A records
    pub content: String,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: u32,
    /// Whether the record is proxied through the provider's edge
    #[serde(default)]
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// Providers are isolated and single-shot:
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed call ends the pass)
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Create missing records
/// - ❌ Spawn tasks or cache state between calls
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Retrieve the single record matching the zone, name and type in `desired`
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The first matching record
    /// - `Err(Error::NotFound)`: No record matches
    /// - `Err(Error::ProviderRequest)`: Transport or HTTP status failure
    /// - `Err(Error::ProviderRejected)`: The provider flagged the request as failed
    /// - `Err(Error::Decode)`: Malformed response body
    async fn fetch_record(&self, desired: &RecordConfig) -> Result<DnsRecord, crate::Error>;

    /// Republish the record `record_id` with `content` and the rest of `desired`
    ///
    /// The request always carries the full desired state (type, name,
    /// content, TTL, proxied), never only the changed field.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error)`: Same failure kinds as [`DnsProvider::fetch_record`]
    async fn update_record(
        &self,
        desired: &RecordConfig,
        record_id: &str,
        content: Ipv4Addr,
    ) -> Result<(), crate::Error>;

    /// A static string identifying the provider (e.g., "cloudflare")
    fn provider_name(&self) -> &'static str;
}
