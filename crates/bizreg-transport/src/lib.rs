// crates/bizreg-transport/src/lib.rs
// ============================================================================
// Module: Bizreg Transport Library
// Description: Reference HTTP transport and credential providers.
// Purpose: Connect the core request model to the registry gateway over HTTP.
// Dependencies: bizreg-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! Bizreg transport provides [`HttpTransport`], a blocking implementation of
//! [`bizreg_core::GatewayTransport`], plus [`StaticCredentials`] and
//! [`EnvCredentials`] implementations of [`bizreg_core::CredentialProvider`].
//! Invariants:
//! - Response bodies are capped at [`HttpTransportConfig::max_response_bytes`].
//! - Redirects are never followed.
//!
//! Security posture: API keys are only sent in the `X-Api-Key` header and are
//! never logged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod credentials;
pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use credentials::API_KEY_ENV;
pub use credentials::DEFAULT_GATEWAY_URL;
pub use credentials::EnvCredentials;
pub use credentials::EnvCredentialsConfig;
pub use credentials::GATEWAY_URL_ENV;
pub use credentials::StaticCredentials;
pub use http::API_KEY_HEADER;
pub use http::DEFAULT_MAX_RESPONSE_BYTES;
pub use http::DEFAULT_TIMEOUT_MS;
pub use http::DEFAULT_USER_AGENT;
pub use http::HttpTransport;
pub use http::HttpTransportConfig;
