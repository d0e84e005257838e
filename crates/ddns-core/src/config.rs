//! Configuration types for the DDNS reconciler
//!
//! Configuration is read once from `CF_*` environment variables, validated,
//! and then passed read-only into every component. Nothing downstream
//! re-validates it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default record TTL in seconds
pub const DEFAULT_TTL: u32 = 300;

/// Smallest TTL the provider accepts for a non-automatic value
pub const MIN_TTL: u32 = 60;

/// Default per-request HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// IP echo services queried when `CF_IP_SERVICES` is unset, in priority order
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ipv4.icanhazip.com",
    "https://ipinfo.io/ip",
];

pub const ENV_AUTH_EMAIL: &str = "CF_AUTH_EMAIL";
pub const ENV_AUTH_METHOD: &str = "CF_AUTH_METHOD";
pub const ENV_AUTH_KEY: &str = "CF_AUTH_KEY";
pub const ENV_ZONE_ID: &str = "CF_ZONE_ID";
pub const ENV_RECORD_NAME: &str = "CF_RECORD_NAME";
pub const ENV_RECORD_TYPE: &str = "CF_RECORD_TYPE";
pub const ENV_TTL: &str = "CF_TTL";
pub const ENV_PROXIED: &str = "CF_PROXIED";
pub const ENV_IP_SERVICES: &str = "CF_IP_SERVICES";
pub const ENV_HTTP_TIMEOUT: &str = "CF_HTTP_TIMEOUT_SECS";
pub const ENV_MODE: &str = "CF_MODE";

/// Authentication method selector (`CF_AUTH_METHOD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Scoped API token sent as a bearer credential
    Token,
    /// Legacy global API key plus account email
    Global,
}

impl FromStr for AuthMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "token" => Ok(AuthMethod::Token),
            "global" => Ok(AuthMethod::Global),
            other => Err(crate::Error::config(format!(
                "unsupported {ENV_AUTH_METHOD} {other:?} (must be 'token' or 'global')"
            ))),
        }
    }
}

/// Provider credentials
///
/// Exactly one scheme is active. The same variant is applied to every
/// provider request of a pass.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Bearer token; the email header is optional
    ApiToken {
        token: String,
        email: Option<String>,
    },
    /// Global API key; the email header is mandatory
    GlobalKey { key: String, email: String },
}

impl Auth {
    /// The method this credential belongs to
    pub fn method(&self) -> AuthMethod {
        match self {
            Auth::ApiToken { .. } => AuthMethod::Token,
            Auth::GlobalKey { .. } => AuthMethod::Global,
        }
    }

    /// Account email to send as the identity header, if any
    pub fn email(&self) -> Option<&str> {
        match self {
            Auth::ApiToken { email, .. } => email.as_deref(),
            Auth::GlobalKey { email, .. } => Some(email.as_str()),
        }
    }

    fn validate(&self) -> Result<(), crate::Error> {
        match self {
            Auth::ApiToken { token, .. } if token.is_empty() => {
                Err(crate::Error::config(format!("{ENV_AUTH_KEY} is required")))
            }
            Auth::GlobalKey { key, .. } if key.is_empty() => {
                Err(crate::Error::config(format!("{ENV_AUTH_KEY} is required")))
            }
            Auth::GlobalKey { email, .. } if email.is_empty() => Err(crate::Error::config(format!(
                "{ENV_AUTH_EMAIL} is required when {ENV_AUTH_METHOD} is 'global'"
            ))),
            _ => Ok(()),
        }
    }
}

// Never print the secret
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiToken { email, .. } => f
                .debug_struct("ApiToken")
                .field("token", &"<REDACTED>")
                .field("email", email)
                .finish(),
            Auth::GlobalKey { email, .. } => f
                .debug_struct("GlobalKey")
                .field("key", &"<REDACTED>")
                .field("email", email)
                .finish(),
        }
    }
}

/// DNS record type. Only address records are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "A" => Ok(RecordType::A),
            other => Err(crate::Error::config(format!(
                "unsupported {ENV_RECORD_TYPE} {other:?} (only A records are handled)"
            ))),
        }
    }
}

/// Whether the pass is allowed to modify the record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Issue updates
    #[default]
    Live,
    /// Fetch and compare, but only log the update that would be sent
    DryRun,
}

impl FromStr for RunMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "live" => Ok(RunMode::Live),
            "dry-run" | "dryrun" => Ok(RunMode::DryRun),
            other => Err(crate::Error::config(format!(
                "unsupported {ENV_MODE} {other:?} (must be 'live' or 'dry-run')"
            ))),
        }
    }
}

/// Desired state of the managed record
///
/// The whole struct is republished on every update so that TTL and proxied
/// drift is corrected together with the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Provider zone identifier
    pub zone_id: String,

    /// Fully-qualified record name (e.g., "home.example.com")
    pub name: String,

    /// Record type
    #[serde(default = "default_record_type")]
    pub record_type: RecordType,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Route traffic through the provider's edge
    #[serde(default)]
    pub proxied: bool,
}

impl RecordConfig {
    /// Create a record configuration with default TTL and proxied flag
    pub fn new(zone_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            name: name.into(),
            record_type: RecordType::A,
            ttl: DEFAULT_TTL,
            proxied: false,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the proxied flag
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Body of an update request carrying `content`
    pub fn update_payload(&self, content: &str) -> serde_json::Value {
        serde_json::json!({
            "type": self.record_type.as_str(),
            "name": self.name,
            "content": content,
            "ttl": self.ttl,
            "proxied": self.proxied,
        })
    }

    /// Validate the record configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.is_empty() {
            return Err(crate::Error::config(format!("{ENV_ZONE_ID} is required")));
        }
        if self.name.is_empty() {
            return Err(crate::Error::config(format!("{ENV_RECORD_NAME} is required")));
        }
        if self.ttl < MIN_TTL {
            return Err(crate::Error::config(format!(
                "{ENV_TTL} must be at least {MIN_TTL} seconds. Got: {}",
                self.ttl
            )));
        }
        Ok(())
    }
}

fn default_record_type() -> RecordType {
    RecordType::A
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// Complete configuration of one reconciliation pass
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Provider credentials
    pub auth: Auth,

    /// Desired record state
    pub record: RecordConfig,

    /// IP echo services, tried strictly in this order
    pub ip_services: Vec<String>,

    /// Timeout applied to every individual HTTP request
    pub http_timeout: Duration,

    /// Live or dry-run
    pub mode: RunMode,
}

impl UpdaterConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Values are trimmed; an empty value is treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let ttl = match get(ENV_TTL) {
            None => DEFAULT_TTL,
            Some(raw) => raw.parse::<u32>().ok().filter(|ttl| *ttl >= MIN_TTL).ok_or_else(|| {
                crate::Error::config(format!("invalid {ENV_TTL} value {raw:?}"))
            })?,
        };

        let proxied = match get(ENV_PROXIED).map(|v| v.to_ascii_lowercase()) {
            None => false,
            Some(v) if v == "false" => false,
            Some(v) if v == "true" => true,
            Some(v) => {
                return Err(crate::Error::config(format!(
                    "invalid {ENV_PROXIED} value {v:?}"
                )));
            }
        };

        let ip_services = parse_services(get(ENV_IP_SERVICES).as_deref());

        let http_timeout = match get(ENV_HTTP_TIMEOUT) {
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| (1..=300).contains(secs))
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    crate::Error::config(format!(
                        "{ENV_HTTP_TIMEOUT} must be between 1 and 300 seconds. Got: {raw}"
                    ))
                })?,
        };

        let key = get(ENV_AUTH_KEY)
            .ok_or_else(|| crate::Error::config(format!("{ENV_AUTH_KEY} is required")))?;
        let email = get(ENV_AUTH_EMAIL);

        let auth = match get(ENV_AUTH_METHOD).unwrap_or_default().parse::<AuthMethod>()? {
            AuthMethod::Token => {
                if email.is_none() {
                    tracing::warn!(
                        "{ENV_AUTH_EMAIL} is empty; API tokens typically do not require it"
                    );
                }
                Auth::ApiToken { token: key, email }
            }
            AuthMethod::Global => Auth::GlobalKey {
                key,
                email: email.ok_or_else(|| {
                    crate::Error::config(format!(
                        "{ENV_AUTH_EMAIL} is required when {ENV_AUTH_METHOD} is 'global'"
                    ))
                })?,
            },
        };

        let record = RecordConfig {
            zone_id: get(ENV_ZONE_ID).unwrap_or_default(),
            name: get(ENV_RECORD_NAME).unwrap_or_default(),
            record_type: get(ENV_RECORD_TYPE).unwrap_or_default().parse()?,
            ttl,
            proxied,
        };

        let config = Self {
            auth,
            record,
            ip_services,
            http_timeout,
            mode: get(ENV_MODE).unwrap_or_default().parse()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.auth.validate()?;
        self.record.validate()?;

        if self.ip_services.is_empty() {
            return Err(crate::Error::config(format!(
                "{ENV_IP_SERVICES} must contain at least one URL"
            )));
        }
        if self.http_timeout.is_zero() {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }

        Ok(())
    }
}

/// Split a comma-separated service list, falling back to the defaults when
/// nothing usable remains
fn parse_services(raw: Option<&str>) -> Vec<String> {
    let services: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if services.is_empty() {
        DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect()
    } else {
        services
    }
}
