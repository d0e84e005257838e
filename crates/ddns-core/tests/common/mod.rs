//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles only record what they were asked to do; they contain no
//! provider or network logic.

#![allow(dead_code)]

use ddns_core::config::{Auth, RecordConfig, RunMode, UpdaterConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted IP source answers
#[derive(Debug, Clone)]
pub enum Answer {
    /// Report this address
    Ip(IpAddr),
    /// Fail as a transport error or unparsable body would
    Fail(&'static str),
}

/// An IpSource that always gives the same answer and counts calls
pub struct ScriptedIpSource {
    name: String,
    answer: Answer,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(name: impl Into<String>, answer: Answer) -> Self {
        Self {
            name: name.into(),
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn ok(name: &str, ip: &str) -> Self {
        Self::new(name, Answer::Ip(ip.parse().expect("valid test IP")))
    }

    pub fn failing(name: &str, reason: &'static str) -> Self {
        Self::new(name, Answer::Fail(reason))
    }

    /// Shared call counter, usable after the source is boxed
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Ip(ip) => Ok(*ip),
            Answer::Fail(reason) => Err(Error::ip_source(&self.name, *reason)),
        }
    }

    fn describe(&self) -> &str {
        &self.name
    }
}

/// One recorded update request
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCall {
    pub record_id: String,
    pub payload: serde_json::Value,
}

type ErrorFactory = Arc<dyn Fn() -> Error + Send + Sync>;

/// A DnsProvider holding one in-memory record
///
/// Updates are applied to the stored record so that consecutive passes
/// observe the provider's new state.
pub struct MockDnsProvider {
    record: Arc<Mutex<Option<DnsRecord>>>,
    fetch_calls: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<UpdateCall>>>,
    fetch_error: Option<ErrorFactory>,
    update_error: Option<ErrorFactory>,
}

impl MockDnsProvider {
    /// Provider whose only record has `content`
    pub fn with_content(content: &str) -> Self {
        Self::with_record(Some(DnsRecord {
            id: "record-id".to_string(),
            record_type: "A".to_string(),
            name: "example.com".to_string(),
            content: content.to_string(),
            ttl: 120,
            proxied: false,
        }))
    }

    pub fn with_record(record: Option<DnsRecord>) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
            fetch_error: None,
            update_error: None,
        }
    }

    /// Make every fetch fail with the error built by `make`
    pub fn failing_fetch(mut self, make: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        self.fetch_error = Some(Arc::new(make));
        self
    }

    /// Make every update fail with the error built by `make`
    pub fn failing_update(mut self, make: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        self.update_error = Some(Arc::new(make));
        self
    }

    /// Create a provider that shares record state and counters with `other`
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            record: Arc::clone(&other.record),
            fetch_calls: Arc::clone(&other.fetch_calls),
            updates: Arc::clone(&other.updates),
            fetch_error: other.fetch_error.clone(),
            update_error: other.update_error.clone(),
        }
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> Vec<UpdateCall> {
        self.updates.lock().unwrap().clone()
    }

    pub fn current_content(&self) -> Option<String> {
        self.record.lock().unwrap().as_ref().map(|r| r.content.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn fetch_record(&self, desired: &RecordConfig) -> Result<DnsRecord> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = &self.fetch_error {
            return Err(make());
        }
        self.record
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::not_found(format!("no matching record for {}", desired.name)))
    }

    async fn update_record(
        &self,
        desired: &RecordConfig,
        record_id: &str,
        content: Ipv4Addr,
    ) -> Result<()> {
        self.updates.lock().unwrap().push(UpdateCall {
            record_id: record_id.to_string(),
            payload: desired.update_payload(&content.to_string()),
        });
        if let Some(make) = &self.update_error {
            return Err(make());
        }
        if let Some(record) = self.record.lock().unwrap().as_mut() {
            record.content = content.to_string();
            record.ttl = desired.ttl;
            record.proxied = desired.proxied;
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Validated configuration for `example.com` in zone `Z`
pub fn test_config(mode: RunMode) -> UpdaterConfig {
    UpdaterConfig {
        auth: Auth::ApiToken {
            token: "token-value".to_string(),
            email: None,
        },
        record: RecordConfig::new("Z", "example.com")
            .with_ttl(600)
            .with_proxied(true),
        ip_services: vec!["scripted".to_string()],
        http_timeout: Duration::from_secs(5),
        mode,
    }
}
