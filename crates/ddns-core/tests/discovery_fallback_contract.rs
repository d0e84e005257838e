//! Contract Test: Sequential IP Discovery Fallback
//!
//! Constraints verified:
//! - Sources are tried strictly in configured order
//! - The first usable IPv4 answer wins and later sources are not contacted
//! - Failing, non-IP and IPv6-only sources are skipped, not fatal
//! - Exhausting every source yields `DiscoveryExhausted`

mod common;

use common::*;
use ddns_core::error::Error;
use ddns_core::traits::IpSource;
use ddns_core::IpDiscoverer;
use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;

fn boxed(sources: Vec<ScriptedIpSource>) -> Vec<Box<dyn IpSource>> {
    sources
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn IpSource>)
        .collect()
}

#[tokio::test]
async fn first_success_after_failures_wins() {
    // fail-500, "not-an-ip", then a valid address
    let sources = vec![
        ScriptedIpSource::failing("fail-500", "HTTP error: 500 Internal Server Error"),
        ScriptedIpSource::failing("bad-body", "Invalid IP address: not-an-ip"),
        ScriptedIpSource::ok("valid", "203.0.113.10"),
        ScriptedIpSource::ok("never", "192.0.2.99"),
    ];
    let counters: Vec<_> = sources.iter().map(|s| s.calls()).collect();

    let discoverer = IpDiscoverer::new(boxed(sources));
    let ip = discoverer.discover().await.expect("discovery succeeds");

    assert_eq!(ip, Ipv4Addr::new(203, 0, 113, 10));
    let calls: Vec<usize> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(calls, vec![1, 1, 1, 0], "sources after the winner must not be queried");
}

#[tokio::test]
async fn first_source_success_stops_immediately() {
    let sources = vec![
        ScriptedIpSource::ok("primary", "198.51.100.7"),
        ScriptedIpSource::ok("secondary", "198.51.100.8"),
    ];
    let secondary_calls = sources[1].calls();

    let ip = IpDiscoverer::new(boxed(sources)).discover().await.unwrap();

    assert_eq!(ip.to_string(), "198.51.100.7");
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ipv6_answer_is_skipped() {
    let sources = vec![
        ScriptedIpSource::ok("v6-only", "2001:db8::1"),
        ScriptedIpSource::ok("v4", "192.0.2.1"),
    ];

    let ip = IpDiscoverer::new(boxed(sources)).discover().await.unwrap();
    assert_eq!(ip, Ipv4Addr::new(192, 0, 2, 1));
}

#[tokio::test]
async fn ipv4_mapped_ipv6_answer_is_accepted() {
    let sources = vec![ScriptedIpSource::ok("mapped", "::ffff:203.0.113.10")];

    let ip = IpDiscoverer::new(boxed(sources)).discover().await.unwrap();
    assert_eq!(ip.to_string(), "203.0.113.10");
}

#[tokio::test]
async fn all_sources_failing_is_exhausted() {
    let sources = vec![
        ScriptedIpSource::failing("a", "connection refused"),
        ScriptedIpSource::failing("b", "Invalid IP address: invalid"),
        ScriptedIpSource::ok("c", "2001:db8::2"),
    ];
    let counters: Vec<_> = sources.iter().map(|s| s.calls()).collect();

    let err = IpDiscoverer::new(boxed(sources)).discover().await.unwrap_err();

    assert!(
        matches!(err, Error::DiscoveryExhausted { attempted: 3 }),
        "unexpected error: {err}"
    );
    for counter in counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1, "each source is tried exactly once");
    }
}
