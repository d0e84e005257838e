//! Core traits for the DDNS reconciler
//!
//! This module defines the two seams the reconciler depends on.
//!
//! - [`IpSource`]: One service that reports the host's public address
//! - [`DnsProvider`]: Fetch and update of the managed record via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord};
