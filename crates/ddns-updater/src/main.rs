// # ddns-updater - One-shot DDNS updater
//
// This binary is a THIN integration layer. All decision logic lives in
// ddns-core; this file only:
// 1. Installs logging
// 2. Reads configuration from environment variables
// 3. Wires the HTTP IP sources and the Cloudflare provider into a Reconciler
// 4. Runs exactly one reconciliation pass and maps the result to an exit code
//
// Scheduling (cron, systemd timers) is external: every invocation performs
// one pass and exits.
//
// ## Configuration
//
// - `CF_AUTH_METHOD`: `token` (default) or `global`
// - `CF_AUTH_KEY`: API token or global API key (required)
// - `CF_AUTH_EMAIL`: Account email (required for `global`)
// - `CF_ZONE_ID`: Zone identifier (required)
// - `CF_RECORD_NAME`: Record name, e.g. `home.example.com` (required)
// - `CF_RECORD_TYPE`: Only `A` is supported (default)
// - `CF_TTL`: TTL in seconds, at least 60 (default 300)
// - `CF_PROXIED`: `true` or `false` (default)
// - `CF_IP_SERVICES`: Comma-separated IP echo URLs, tried in order
// - `CF_HTTP_TIMEOUT_SECS`: Per-request timeout (default 15)
// - `CF_MODE`: `live` (default) or `dry-run`
// - `CF_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export CF_AUTH_KEY=your_token
// export CF_ZONE_ID=your_zone_id
// export CF_RECORD_NAME=home.example.com
//
// ddns-updater
// ```

use anyhow::{Context, Result};
use ddns_core::{Error, IpDiscoverer, ReconcileOutcome, Reconciler, Stage, UpdaterConfig};
use ddns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible results of one invocation
///
/// - 0: Record already current, or updated
/// - 1: Configuration or startup error
/// - 2: The reconciliation pass failed
#[derive(Debug, Clone, Copy)]
enum UpdaterExitCode {
    /// Pass completed (no-op or update)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Discovery, fetch or update failed
    RuntimeError = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

const ENV_LOG_LEVEL: &str = "CF_LOG_LEVEL";

fn parse_log_level(raw: Option<&str>) -> Result<Level> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("info") => Ok(Level::INFO),
        Some("trace") => Ok(Level::TRACE),
        Some("debug") => Ok(Level::DEBUG),
        Some("warn") => Ok(Level::WARN),
        Some("error") => Ok(Level::ERROR),
        Some(other) => anyhow::bail!(
            "{ENV_LOG_LEVEL} '{other}' is not valid. \
            Valid levels: trace, debug, info, warn, error"
        ),
    }
}

fn main() -> ExitCode {
    let log_level = match parse_log_level(env::var(ENV_LOG_LEVEL).ok().as_deref()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    let config = match UpdaterConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    info!(
        "Reconciling {} record {} ({} IP service(s), auth: {:?}, mode: {:?})",
        config.record.record_type,
        config.record.name,
        config.ip_services.len(),
        config.auth.method(),
        config.mode
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdaterExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run_once(&config));

    match result {
        Ok(outcome) => {
            info!("Done: {}", outcome);
            UpdaterExitCode::Success.into()
        }
        Err(e) => {
            error!("{:#}", e);
            if e.downcast_ref::<Error>().is_some_and(Error::is_config) {
                UpdaterExitCode::ConfigError.into()
            } else {
                UpdaterExitCode::RuntimeError.into()
            }
        }
    }
}

/// Build the components and run a single reconciliation pass
async fn run_once(config: &UpdaterConfig) -> Result<ReconcileOutcome> {
    let sources = ddns_ip_http::sources_from_urls(&config.ip_services, config.http_timeout)?;
    let provider = CloudflareProvider::from_config(config)?;

    let reconciler = Reconciler::new(IpDiscoverer::new(sources), Box::new(provider), config);

    match reconciler.run_once().await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            let context = failure_context(&e);
            Err(e).context(context)
        }
    }
}

/// Operator-facing summary of which step of the pass failed
fn failure_context(err: &Error) -> &'static str {
    match (err, err.stage()) {
        (Error::DiscoveryExhausted { .. }, _) => "failed to determine public IP",
        (Error::NotFound(_), _) | (_, Some(Stage::FetchRecord)) => "failed to fetch DNS record",
        (_, Some(Stage::UpdateRecord)) => "failed to update DNS record",
        _ => "reconciliation failed",
    }
}
