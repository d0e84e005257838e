//! Reconciliation driver
//!
//! The Reconciler performs exactly one pass per call:
//!
//! ```text
//! DiscoverIP ──▶ FetchRecord ──▶ Compare ──┬──▶ Unchanged            (content == ip)
//!                                          ├──▶ Update ──▶ Updated   (live)
//!                                          └──▶ WouldUpdate          (dry-run)
//! ```
//!
//! No state is revisited and nothing is retried. Any error aborts the pass
//! before a mutation is attempted, or is the mutation's own failure.
//! Because the pass re-derives everything from the remote record, running
//! it repeatedly converges and then stays a no-op.

use crate::config::{RecordConfig, RunMode, UpdaterConfig};
use crate::discovery::IpDiscoverer;
use crate::error::Result;
use crate::traits::DnsProvider;
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// Terminal result of a successful pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record already pointed at the discovered address; nothing was sent
    Unchanged {
        record_name: String,
        ip: Ipv4Addr,
    },

    /// Record was republished with the discovered address
    Updated {
        record_name: String,
        previous: String,
        current: Ipv4Addr,
    },

    /// Dry-run: an update was needed but not sent
    WouldUpdate {
        record_name: String,
        previous: String,
        current: Ipv4Addr,
    },
}

impl ReconcileOutcome {
    /// Whether the provider's record was modified
    pub fn changed(&self) -> bool {
        matches!(self, ReconcileOutcome::Updated { .. })
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Unchanged { record_name, ip } => {
                write!(f, "{record_name} already up to date ({ip})")
            }
            ReconcileOutcome::Updated {
                record_name,
                previous,
                current,
            } => write!(f, "updated {record_name} from {previous} to {current}"),
            ReconcileOutcome::WouldUpdate {
                record_name,
                previous,
                current,
            } => write!(f, "would update {record_name} from {previous} to {current}"),
        }
    }
}

/// One-shot DNS reconciliation driver
pub struct Reconciler {
    /// Ordered IP discovery chain
    discoverer: IpDiscoverer,

    /// DNS provider holding the record
    provider: Box<dyn DnsProvider>,

    /// Desired record state
    record: RecordConfig,

    /// Live or dry-run
    mode: RunMode,
}

impl Reconciler {
    /// Create a reconciler for the record described by `config`
    ///
    /// `config` is expected to be validated already.
    pub fn new(
        discoverer: IpDiscoverer,
        provider: Box<dyn DnsProvider>,
        config: &UpdaterConfig,
    ) -> Self {
        Self {
            discoverer,
            provider,
            record: config.record.clone(),
            mode: config.mode,
        }
    }

    /// Run a single reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileOutcome)`: The pass reached a terminal success state
    /// - `Err(Error)`: Discovery, fetch or update failed; the pass is over
    pub async fn run_once(&self) -> Result<ReconcileOutcome> {
        let ip = self.discoverer.discover().await?;
        info!("Detected public IP: {}", ip);

        let record = self.provider.fetch_record(&self.record).await?;
        debug!(
            "Fetched {} record {} (id: {}, content: {}, ttl: {}, proxied: {})",
            record.record_type, record.name, record.id, record.content, record.ttl, record.proxied
        );

        if content_matches(&record.content, ip) {
            info!("{} record {} already up to date", self.provider.provider_name(), record.name);
            return Ok(ReconcileOutcome::Unchanged {
                record_name: record.name,
                ip,
            });
        }

        if self.mode == RunMode::DryRun {
            info!(
                "[DRY-RUN] Would update record {} with payload: {}",
                record.id,
                self.record.update_payload(&ip.to_string())
            );
            return Ok(ReconcileOutcome::WouldUpdate {
                record_name: record.name,
                previous: record.content,
                current: ip,
            });
        }

        self.provider
            .update_record(&self.record, &record.id, ip)
            .await?;

        info!(
            "Successfully updated {} from {} to {}",
            record.name, record.content, ip
        );
        Ok(ReconcileOutcome::Updated {
            record_name: record.name,
            previous: record.content,
            current: ip,
        })
    }
}

/// Compare record content against the discovered address in canonical form
///
/// Content that is not a valid IPv4 address never matches, so a corrupted
/// record is overwritten.
fn content_matches(content: &str, ip: Ipv4Addr) -> bool {
    content
        .trim()
        .parse::<Ipv4Addr>()
        .map(|current| current == ip)
        .unwrap_or(false)
}
