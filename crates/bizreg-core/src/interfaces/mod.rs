// crates/bizreg-core/src/interfaces/mod.rs
// ============================================================================
// Module: Bizreg Interfaces
// Description: Collaborator contracts for credentials, transport, and audit.
// Purpose: Keep the core free of HTTP clients, secret stores, and log sinks.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! The core never performs I/O itself. Credentials come from a
//! [`CredentialProvider`], requests go out through a [`GatewayTransport`], and
//! per-record outcomes are reported to an [`AuditSink`]. Reference
//! implementations live in the transport crate and in [`crate::runtime`].
//!
//! Security posture: credentials carry a secret; [`GatewayCredentials`]
//! redacts the API key from its debug output and audit events never include it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::envelope::EnvelopeError;
use crate::core::envelope::GatewayEnvelope;
use crate::core::identifiers::Operation;
use crate::core::identifiers::Registry;
use crate::core::request::GatewayUrl;
use crate::core::request::RequestDescriptor;

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Gateway location and optional API key.
///
/// # Invariants
/// - `api_key` is `None` for the anonymous tier; an empty key is normalized to `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayCredentials {
    /// Normalized gateway base URL.
    pub gateway_url: GatewayUrl,
    /// API key, absent for anonymous access.
    api_key: Option<String>,
}

impl GatewayCredentials {
    /// Creates credentials, treating an empty or blank key as anonymous.
    #[must_use]
    pub fn new(gateway_url: GatewayUrl, api_key: Option<String>) -> Self {
        let api_key = api_key.map(|key| key.trim().to_string()).filter(|key| !key.is_empty());
        Self {
            gateway_url,
            api_key,
        }
    }

    /// Returns the API key, if one is configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns true when no API key is configured.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.api_key.is_none()
    }
}

impl fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Credential lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Credentials could not be obtained.
    #[error("credentials unavailable: {0}")]
    Unavailable(String),
}

/// Source of gateway credentials, consulted once per batch.
pub trait CredentialProvider {
    /// Returns the gateway credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when credentials cannot be resolved.
    fn credentials(&self) -> Result<GatewayCredentials, CredentialError>;
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for &P {
    fn credentials(&self) -> Result<GatewayCredentials, CredentialError> {
        (**self).credentials()
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport errors for gateway calls.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the response not received.
    #[error("gateway request failed: {0}")]
    Request(String),
    /// The target URL is invalid.
    #[error("invalid gateway url: {0}")]
    InvalidUrl(String),
    /// The target URL scheme is not permitted.
    #[error("unsupported gateway url scheme: {0}")]
    UnsupportedScheme(String),
    /// The gateway answered with a non-success status and no envelope.
    #[error("gateway returned http status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The response body exceeded the configured size limit.
    #[error("gateway response exceeds size limit ({max_bytes} bytes)")]
    TooLarge {
        /// Configured limit.
        max_bytes: usize,
    },
    /// The response body is not a valid gateway envelope.
    #[error(transparent)]
    MalformedEnvelope(#[from] EnvelopeError),
}

/// Executes gateway requests.
pub trait GatewayTransport {
    /// Sends a request and returns the parsed envelope.
    ///
    /// Implementations attach the API key as `X-Api-Key` only when the
    /// credentials carry one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call fails or the response is not
    /// a gateway envelope.
    fn send(
        &self,
        request: &RequestDescriptor,
        credentials: &GatewayCredentials,
    ) -> Result<GatewayEnvelope, TransportError>;
}

impl<T: GatewayTransport + ?Sized> GatewayTransport for &T {
    fn send(
        &self,
        request: &RequestDescriptor,
        credentials: &GatewayCredentials,
    ) -> Result<GatewayEnvelope, TransportError> {
        (**self).send(request, credentials)
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Outcome of a processed input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The record produced output records.
    Ok,
    /// The record failed and was converted to an error record.
    Isolated,
    /// The record failed and aborted the batch.
    Failed,
}

/// Audit event emitted once per processed input record.
///
/// # Invariants
/// - Never contains the API key or raw parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordAuditEvent {
    /// Event name.
    pub event: &'static str,
    /// Emission time in unix milliseconds.
    pub timestamp_ms: u128,
    /// Registry the batch targets.
    pub registry: Registry,
    /// Resolved operation, absent when the tag was unknown.
    pub operation: Option<Operation>,
    /// Zero-based input record index.
    pub item_index: usize,
    /// Record outcome.
    pub outcome: AuditOutcome,
    /// Number of output records produced.
    pub output_count: usize,
    /// Stable error kind label, when the record failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

/// Sink for record audit events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &RecordAuditEvent);
}
