// crates/bizreg-transport/src/http.rs
// ============================================================================
// Module: Bizreg HTTP Transport
// Description: Blocking reqwest transport for gateway request descriptors.
// Purpose: Execute built requests and parse the gateway envelope.
// Dependencies: bizreg-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] turns a [`RequestDescriptor`] into one HTTP call. The
//! envelope is parsed regardless of HTTP status because the gateway reports
//! limits as non-2xx responses that still carry an envelope.
//! Invariants:
//! - Redirects are not followed.
//! - Response bodies larger than the configured limit are rejected.
//! - `X-Api-Key` is sent only when the credentials carry a key.
//!
//! Security posture: response bodies are untrusted and size-bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use bizreg_core::GatewayCredentials;
use bizreg_core::GatewayEnvelope;
use bizreg_core::GatewayTransport;
use bizreg_core::HttpMethod;
use bizreg_core::RequestDescriptor;
use bizreg_core::RequestPayload;
use bizreg_core::TransportError;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the gateway API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default maximum response body size in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("bizreg/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Maximum accepted response body size in bytes.
    pub max_response_bytes: usize,
    /// Permit cleartext `http://` gateways.
    pub allow_http: bool,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            allow_http: true,
        }
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Blocking HTTP transport for the registry gateway.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client used for gateway calls.
    client: Client,
    /// Transport settings.
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Builds a transport from settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the HTTP client cannot be constructed.
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(Self {
            client,
            config,
        })
    }

    /// Resolves the absolute request URL, appending query pairs.
    fn request_url(
        &self,
        request: &RequestDescriptor,
        credentials: &GatewayCredentials,
    ) -> Result<Url, TransportError> {
        let mut url = Url::parse(&request.target(&credentials.gateway_url))
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        match url.scheme() {
            "https" => {}
            "http" if self.config.allow_http => {}
            scheme => return Err(TransportError::UnsupportedScheme(scheme.to_string())),
        }
        let query = request.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

impl GatewayTransport for HttpTransport {
    fn send(
        &self,
        request: &RequestDescriptor,
        credentials: &GatewayCredentials,
    ) -> Result<GatewayEnvelope, TransportError> {
        let url = self.request_url(request, credentials)?;
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        builder = builder.header(ACCEPT, "application/json");
        if let Some(key) = credentials.api_key() {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let RequestPayload::Body(body) = &request.payload {
            let bytes =
                serde_json::to_vec(body).map_err(|err| TransportError::Request(err.to_string()))?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        let response = builder.send().map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status();
        let bytes = read_response_limited(response, self.config.max_response_bytes)?;
        match GatewayEnvelope::from_slice(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
            }),
            Err(err) => Err(TransportError::MalformedEnvelope(err)),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a response body, rejecting bodies above `max_bytes`.
fn read_response_limited(response: Response, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
    let too_large = || TransportError::TooLarge {
        max_bytes,
    };
    let max_u64 = u64::try_from(max_bytes).map_err(|_| too_large())?;
    if let Some(length) = response.content_length()
        && length > max_u64
    {
        return Err(too_large());
    }
    let limit = max_u64.checked_add(1).ok_or_else(too_large)?;
    let mut limited = response.take(limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(|err| TransportError::Request(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(too_large());
    }
    Ok(bytes)
}
