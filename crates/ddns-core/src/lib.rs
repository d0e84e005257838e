// # ddns-core
//
// Core library for the one-shot DDNS reconciler.
//
// ## Architecture Overview
//
// A single invocation keeps one address record in sync with the host's
// public IPv4 address:
// - **IpSource**: Trait for asking one external service for the public IP
// - **IpDiscoverer**: Ordered, sequential fallback across IP sources
// - **DnsProvider**: Trait for fetching and republishing the record
// - **Reconciler**: Discover → fetch → compare → (update), exactly once
// - **UpdaterConfig**: Validated, read-only configuration for the pass
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic lives here, I/O in plugin crates
// 2. **Stateless**: Every pass re-derives state from the remote record
// 3. **Idempotent**: Repeated passes converge and then issue no updates
// 4. **Library-First**: The binary is a thin wrapper around `Reconciler`

pub mod traits;
pub mod discovery;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsRecord};
pub use discovery::IpDiscoverer;
pub use engine::{Reconciler, ReconcileOutcome};
pub use config::{Auth, AuthMethod, RecordConfig, RecordType, RunMode, UpdaterConfig};
pub use error::{Error, Result, Stage};
