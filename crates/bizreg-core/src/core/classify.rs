// crates/bizreg-core/src/core/classify.rs
// ============================================================================
// Module: Bizreg Error Classifier
// Description: Mapping of gateway failure codes to actionable error classes.
// Purpose: Tell callers whether to upgrade, register, or inspect the message.
// Dependencies: serde, crate::core::envelope
// ============================================================================

//! ## Overview
//! Gateway failures carry a machine code. Quota codes and anonymous-tier
//! codes get a class with a fixed remediation hint; everything else,
//! including `UNKNOWN`, is generic and prefixes the message instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::envelope::GatewayFailure;

// ============================================================================
// SECTION: Codes
// ============================================================================

/// Monthly request quota of the API key exhausted.
pub const MONTHLY_LIMIT_EXCEEDED: &str = "MONTHLY_LIMIT_EXCEEDED";
/// Per-key rate limit hit.
pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
/// Anonymous-tier rate limit hit.
pub const ANONYMOUS_RATE_LIMIT: &str = "ANONYMOUS_RATE_LIMIT";
/// Anonymous-tier daily quota exhausted.
pub const ANONYMOUS_DAILY_LIMIT: &str = "ANONYMOUS_DAILY_LIMIT";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity class of a gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorClass {
    /// Paid quota or rate limit reached.
    QuotaExceeded,
    /// Anonymous-tier limit reached.
    AnonymousLimit,
    /// Any other gateway failure.
    Generic,
}

impl GatewayErrorClass {
    /// Maps a failure code to its class.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            MONTHLY_LIMIT_EXCEEDED | RATE_LIMIT_EXCEEDED => Self::QuotaExceeded,
            ANONYMOUS_RATE_LIMIT | ANONYMOUS_DAILY_LIMIT => Self::AnonymousLimit,
            _ => Self::Generic,
        }
    }

    /// Returns the remediation hint for the class.
    #[must_use]
    pub const fn description(self) -> Option<&'static str> {
        match self {
            Self::QuotaExceeded => Some("Upgrade your plan or wait for the limit to reset."),
            Self::AnonymousLimit => Some("Register for a free API key to get higher limits."),
            Self::Generic => None,
        }
    }
}

/// Classified gateway failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedGatewayError {
    /// Failure class.
    pub class: GatewayErrorClass,
    /// Gateway error code.
    pub code: String,
    /// Caller-facing message.
    pub message: String,
}

impl ClassifiedGatewayError {
    /// Returns the remediation hint, if the class has one.
    #[must_use]
    pub const fn description(&self) -> Option<&'static str> {
        self.class.description()
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies a gateway failure.
///
/// Limit classes keep the gateway message verbatim; generic failures are
/// reported as `Gateway error: {message}`.
#[must_use]
pub fn classify_failure(failure: &GatewayFailure) -> ClassifiedGatewayError {
    let class = GatewayErrorClass::from_code(&failure.code);
    let message = match class {
        GatewayErrorClass::QuotaExceeded | GatewayErrorClass::AnonymousLimit => {
            failure.message.clone()
        }
        GatewayErrorClass::Generic => format!("Gateway error: {}", failure.message),
    };
    ClassifiedGatewayError {
        class,
        code: failure.code.clone(),
        message,
    }
}
