// crates/bizreg-core/src/core/request.rs
// ============================================================================
// Module: Bizreg Request Builder
// Description: Pure mapping from validated parameters to request descriptors.
// Purpose: Produce well-formed outbound gateway requests without performing I/O.
// Dependencies: percent-encoding, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`build_request`] turns a [`ParameterSet`] into a [`RequestDescriptor`].
//! GET operations carry their parameters as an ordered query list, POST
//! operations as a JSON body. The payload is an enum so a request can never
//! carry both or neither. Lookup-by-identifier operations interpolate the
//! identifier into the path with `encodeURIComponent` escaping.
//!
//! [`prepare_request`] is the entry point used per input record: it resolves
//! the operation tag, validates the raw parameters, and builds the request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::Operation;
use crate::core::identifiers::Registry;
use crate::core::params::ParameterSet;
use crate::core::params::ValidationContext;
use crate::core::params::ValidationError;
use crate::core::params::validate_parameters;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Characters escaped in path segments, matching `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ============================================================================
// SECTION: Types
// ============================================================================

/// HTTP method of a gateway request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Query-parameter request.
    Get,
    /// JSON body request.
    Post,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload, exactly one of query pairs or a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    /// Ordered query pairs for GET requests.
    Query(Vec<(String, String)>),
    /// JSON object body for POST requests.
    Body(Map<String, Value>),
}

/// Fully built outbound request, independent of any HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Operation the request executes.
    pub operation: Operation,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path suffix with path parameters substituted and encoded.
    pub path: String,
    /// Query pairs or JSON body.
    pub payload: RequestPayload,
}

impl RequestDescriptor {
    /// Returns the absolute target URL for a gateway base.
    #[must_use]
    pub fn target(&self, gateway: &GatewayUrl) -> String {
        format!("{}{}", gateway.as_str(), self.path)
    }

    /// Returns the query pairs, or an empty slice for body requests.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        match &self.payload {
            RequestPayload::Query(pairs) => pairs,
            RequestPayload::Body(_) => &[],
        }
    }

    /// Returns the JSON body, if the request carries one.
    #[must_use]
    pub const fn body(&self) -> Option<&Map<String, Value>> {
        match &self.payload {
            RequestPayload::Body(body) => Some(body),
            RequestPayload::Query(_) => None,
        }
    }
}

/// Gateway base URL with a single trailing slash removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayUrl(String);

impl GatewayUrl {
    /// Normalizes a configured gateway base URL.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        Self(trimmed.strip_suffix('/').unwrap_or(trimmed).to_string())
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GatewayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while turning a raw input record into a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareError {
    /// The operation tag is not part of the registry catalog.
    #[error("the operation \"{tag}\" is not supported by {registry}")]
    UnknownOperation {
        /// Registry the tag was resolved against.
        registry: Registry,
        /// Unrecognized tag.
        tag: String,
    },
    /// Parameter validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds the request descriptor for a validated parameter set.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] when a path parameter is absent,
/// which cannot happen for sets produced by [`validate_parameters`] against
/// the catalog.
pub fn build_request(params: &ParameterSet) -> Result<RequestDescriptor, ValidationError> {
    let spec = params.operation().spec();
    let path = match spec.path_param {
        Some(name) => {
            let value = params.get(name).ok_or_else(|| ValidationError::Missing {
                param: name.to_string(),
            })?;
            let encoded = utf8_percent_encode(&value.to_wire_string(), PATH_SEGMENT).to_string();
            spec.path.replace(&format!("{{{name}}}"), &encoded)
        }
        None => spec.path.to_string(),
    };
    let present = spec
        .params
        .iter()
        .filter(|def| Some(def.name) != spec.path_param)
        .filter_map(|def| params.get(def.name).map(|value| (def.wire, value)));
    let payload = match spec.method {
        HttpMethod::Get => RequestPayload::Query(
            present.map(|(wire, value)| (wire.to_string(), value.to_wire_string())).collect(),
        ),
        HttpMethod::Post => RequestPayload::Body(
            present.map(|(wire, value)| (wire.to_string(), value.to_json())).collect(),
        ),
    };
    Ok(RequestDescriptor {
        operation: spec.operation,
        method: spec.method,
        path,
        payload,
    })
}

/// Resolves, validates, and builds the request for one raw input record.
///
/// # Errors
///
/// Returns [`PrepareError::UnknownOperation`] for tags outside the registry
/// catalog and [`PrepareError::Validation`] for invalid parameters.
pub fn prepare_request(
    registry: Registry,
    tag: &str,
    raw: &Map<String, Value>,
    context: &ValidationContext,
) -> Result<RequestDescriptor, PrepareError> {
    let operation =
        Operation::resolve(registry, tag).ok_or_else(|| PrepareError::UnknownOperation {
            registry,
            tag: tag.to_string(),
        })?;
    let params = validate_parameters(operation.spec(), raw, context)?;
    Ok(build_request(&params)?)
}
