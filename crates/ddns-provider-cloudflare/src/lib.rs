// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the
// DDNS reconciler.
//
// ## Behavior
//
// - ✅ One HTTP request per operation (list, or update)
// - ✅ Full error propagation; a failed call ends the pass
// - ✅ HTTP timeout configured from `UpdaterConfig::http_timeout`
// - ✅ API token and global key authentication
// - ✅ Updates republish the full desired state (type, name, content, ttl, proxied)
// - ❌ NO retry logic
// - ❌ NO record creation (a missing record is an error)
// - ❌ NO caching between calls
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{Auth, RecordConfig, UpdaterConfig};
use ddns_core::traits::{DnsProvider, DnsRecord};
use ddns_core::{Error, Result, Stage};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const PROVIDER_NAME: &str = "cloudflare";

const AUTH_EMAIL_HEADER: &str = "X-Auth-Email";
const AUTH_KEY_HEADER: &str = "X-Auth-Key";

/// Common envelope of every Cloudflare v4 response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
}

/// One entry of the envelope's `errors` list
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

fn describe_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no error details returned".to_string();
    }
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Cloudflare DNS provider
///
/// Stateless and single-shot: each trait call is exactly one API request.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose credentials.
pub struct CloudflareProvider {
    /// Token or global key credentials
    /// ⚠️ NEVER log the secret
    auth: Auth,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("auth", &self.auth)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `auth`: API token or global key credentials
    /// - `timeout`: Timeout applied to every request
    pub fn new(auth: Auth, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            auth,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Create a provider from the updater configuration
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        Self::new(config.auth.clone(), config.http_timeout)
    }

    /// Point the provider at a different API root (no trailing slash)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Attach the configured credentials
    ///
    /// - Token: `Authorization: Bearer <token>`, plus `X-Auth-Email` when set
    /// - Global key: `X-Auth-Key` and `X-Auth-Email`
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::ApiToken { token, email } => {
                let request = request.bearer_auth(token);
                match email {
                    Some(email) => request.header(AUTH_EMAIL_HEADER, email),
                    None => request,
                }
            }
            Auth::GlobalKey { key, email } => request
                .header(AUTH_KEY_HEADER, key)
                .header(AUTH_EMAIL_HEADER, email),
        }
    }

    /// Send an authorized request and unwrap the response envelope
    ///
    /// # Errors
    ///
    /// - `ProviderRequest`: Transport failure or non-success HTTP status
    /// - `Decode`: Body is not a valid envelope
    /// - `ProviderRejected`: Envelope has `success: false`
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        stage: Stage,
    ) -> Result<Option<T>> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| {
                Error::provider_request(PROVIDER_NAME, stage, format!("HTTP request failed: {}", e))
            })?;

        let body = read_success_body(response, stage).await?;

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| Error::decode(PROVIDER_NAME, stage, e.to_string()))?;

        if !envelope.success {
            return Err(Error::provider_rejected(
                PROVIDER_NAME,
                stage,
                describe_errors(&envelope.errors),
            ));
        }

        Ok(envelope.result)
    }
}

/// Return the body of a successful response, or map the status to an error
async fn read_success_body(response: Response, stage: Stage) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        Error::provider_request(PROVIDER_NAME, stage, format!("Failed to read response: {}", e))
    })?;

    if status.is_success() {
        return Ok(body);
    }

    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid credentials or insufficient permissions. Status: {} - {}",
            status, body
        ),
        404 => format!("Endpoint not found (check the zone ID). Status: {} - {}", status, body),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!("Cloudflare server error (transient): {} - {}", status, body),
        _ => format!("Unexpected status: {} - {}", status, body),
    };
    Err(Error::provider_request(PROVIDER_NAME, stage, message))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// List the zone's records filtered by name and type, take the first
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=example.com
    /// ```
    async fn fetch_record(&self, desired: &RecordConfig) -> Result<DnsRecord> {
        tracing::debug!(
            "Looking up record: {} (type: {})",
            desired.name,
            desired.record_type
        );

        let url = format!("{}/zones/{}/dns_records", self.base_url, desired.zone_id);
        let request = self.client.get(&url).query(&[
            ("type", desired.record_type.as_str()),
            ("name", desired.name.as_str()),
        ]);

        let records: Vec<DnsRecord> = self
            .execute(request, Stage::FetchRecord)
            .await?
            .unwrap_or_default();

        if records.len() > 1 {
            tracing::warn!(
                "{} records match {} (type: {}), using the first",
                records.len(),
                desired.name,
                desired.record_type
            );
        }

        records.into_iter().next().ok_or_else(|| {
            Error::not_found(format!(
                "no matching record for {} (type: {})",
                desired.name, desired.record_type
            ))
        })
    }

    /// Republish the record with the full desired state
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A",
    ///   "name": "example.com",
    ///   "content": "1.2.3.4",
    ///   "ttl": 300,
    ///   "proxied": false
    /// }
    /// ```
    async fn update_record(
        &self,
        desired: &RecordConfig,
        record_id: &str,
        content: Ipv4Addr,
    ) -> Result<()> {
        tracing::debug!("Updating record {} ({}) -> {}", desired.name, record_id, content);

        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, desired.zone_id, record_id
        );
        let request = self
            .client
            .put(&url)
            .json(&desired.update_payload(&content.to_string()));

        self.execute::<serde_json::Value>(request, Stage::UpdateRecord)
            .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
