// crates/bizreg-core/src/core/envelope.rs
// ============================================================================
// Module: Bizreg Gateway Envelope
// Description: Validated discriminated union for gateway responses.
// Purpose: Reject malformed envelopes at construction time.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every gateway response is wrapped in `{ "success": bool, "data"?, "error"? }`.
//! [`GatewayEnvelope::from_value`] checks the discriminator once and exposes a
//! two-variant enum so callers never re-inspect the raw JSON.
//! Security posture: envelopes are untrusted remote input; anything that is
//! not an object with a boolean `success` is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Code substituted when a failure carries no usable code.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

/// Message substituted when a failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown gateway error";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Error payload of a failed gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayFailure {
    /// Machine-readable error code, `UNKNOWN` when absent.
    pub code: String,
    /// Human-readable message, defaulted when absent.
    pub message: String,
}

impl GatewayFailure {
    /// Builds a failure, substituting defaults for absent or empty fields.
    #[must_use]
    pub fn new(code: Option<&str>, message: Option<&str>) -> Self {
        let pick = |value: Option<&str>, fallback: &str| {
            value.filter(|text| !text.is_empty()).unwrap_or(fallback).to_string()
        };
        Self {
            code: pick(code, UNKNOWN_ERROR_CODE),
            message: pick(message, UNKNOWN_ERROR_MESSAGE),
        }
    }
}

/// Gateway response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEnvelope {
    /// Successful call; `None` means the gateway returned no data.
    Success {
        /// Response payload, `None` when absent or null.
        data: Option<Value>,
    },
    /// Failed call.
    Failure(GatewayFailure),
}

/// Envelope construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The response body is not a JSON object.
    #[error("gateway envelope is not a json object")]
    NotAnObject,
    /// The `success` discriminator is absent.
    #[error("gateway envelope is missing the success flag")]
    MissingSuccess,
    /// The `success` discriminator is not a boolean.
    #[error("gateway envelope success flag is not a boolean")]
    InvalidSuccess,
    /// The response body is not valid JSON.
    #[error("gateway envelope json error: {0}")]
    Json(String),
}

impl GatewayEnvelope {
    /// Validates a parsed JSON value as a gateway envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] when the value is not an object or the
    /// `success` flag is absent or not a boolean.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Object(mut object) = value else {
            return Err(EnvelopeError::NotAnObject);
        };
        let success = match object.get("success") {
            None => return Err(EnvelopeError::MissingSuccess),
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(EnvelopeError::InvalidSuccess),
        };
        if success {
            let data = object.remove("data").filter(|data| !data.is_null());
            return Ok(Self::Success {
                data,
            });
        }
        let error = object.get("error");
        let field = |name: &str| error.and_then(|error| error.get(name)).and_then(Value::as_str);
        Ok(Self::Failure(GatewayFailure::new(field("code"), field("message"))))
    }

    /// Parses and validates a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Json`] for invalid JSON and the
    /// [`GatewayEnvelope::from_value`] errors otherwise.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| EnvelopeError::Json(err.to_string()))?;
        Self::from_value(value)
    }

    /// Returns true for a success envelope.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use panic/expect/unwrap for clarity."
    )]

    use serde_json::json;

    use super::EnvelopeError;
    use super::GatewayEnvelope;
    use super::GatewayFailure;

    #[test]
    fn success_with_null_data_is_empty() {
        let envelope =
            GatewayEnvelope::from_value(json!({ "success": true, "data": null })).unwrap();
        assert_eq!(
            envelope,
            GatewayEnvelope::Success {
                data: None,
            }
        );
    }

    #[test]
    fn failure_without_error_body_uses_defaults() {
        let envelope = GatewayEnvelope::from_value(json!({ "success": false })).unwrap();
        assert_eq!(envelope, GatewayEnvelope::Failure(GatewayFailure::new(None, None)));
        let GatewayEnvelope::Failure(failure) = envelope else {
            panic!("expected failure");
        };
        assert_eq!(failure.code, "UNKNOWN");
        assert_eq!(failure.message, "Unknown gateway error");
    }

    #[test]
    fn failure_with_empty_fields_uses_defaults() {
        let envelope = GatewayEnvelope::from_value(
            json!({ "success": false, "error": { "code": "", "message": "" } }),
        )
        .unwrap();
        assert_eq!(envelope, GatewayEnvelope::Failure(GatewayFailure::new(None, None)));
    }

    #[test]
    fn malformed_envelopes_are_rejected() {
        assert_eq!(GatewayEnvelope::from_value(json!([1, 2])), Err(EnvelopeError::NotAnObject));
        assert_eq!(
            GatewayEnvelope::from_value(json!({ "data": {} })),
            Err(EnvelopeError::MissingSuccess)
        );
        assert_eq!(
            GatewayEnvelope::from_value(json!({ "success": "yes" })),
            Err(EnvelopeError::InvalidSuccess)
        );
        assert!(matches!(GatewayEnvelope::from_slice(b"<html>"), Err(EnvelopeError::Json(_))));
    }
}
