// crates/bizreg-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for bizreg-core tests.
// Purpose: Provide scripted transports, credential stubs, and record builders.
// Dependencies: bizreg-core, serde_json, time
// ============================================================================

//! ## Overview
//! Provides a scripted [`GatewayTransport`] that records every request it
//! receives, a fixed credential provider, and small builders for input
//! records and parameter bags.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use bizreg_core::AuditSink;
use bizreg_core::CredentialError;
use bizreg_core::CredentialProvider;
use bizreg_core::ExecutionOptions;
use bizreg_core::GatewayCredentials;
use bizreg_core::GatewayEnvelope;
use bizreg_core::GatewayTransport;
use bizreg_core::GatewayUrl;
use bizreg_core::InputRecord;
use bizreg_core::RecordAuditEvent;
use bizreg_core::RequestDescriptor;
use bizreg_core::TransportError;
use serde_json::Map;
use serde_json::Value;
use time::Date;
use time::macros::date;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Reference date used by all executor tests.
pub const REFERENCE_DATE: Date = date!(2026 - 03 - 10);

/// Fail-fast execution options at the reference date.
pub fn fail_fast() -> ExecutionOptions {
    ExecutionOptions::new(REFERENCE_DATE)
}

/// Isolating execution options at the reference date.
pub fn isolating() -> ExecutionOptions {
    ExecutionOptions::new(REFERENCE_DATE).with_continue_on_fail(true)
}

/// Converts a `json!` object literal into a parameter bag.
pub fn bag(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Builds an input record from a tag and a `json!` object literal.
pub fn record(operation: &str, parameters: Value) -> InputRecord {
    InputRecord::new(operation, bag(parameters))
}

/// Parses an envelope from a `json!` literal.
pub fn envelope(value: Value) -> GatewayEnvelope {
    GatewayEnvelope::from_value(value).expect("valid envelope")
}

// ============================================================================
// SECTION: Scripted Transport
// ============================================================================

/// Transport that replays queued responses and records requests.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    /// Responses returned in order.
    responses: Arc<Mutex<VecDeque<Result<GatewayEnvelope, TransportError>>>>,
    /// Requests received, with the API key seen for each.
    requests: Arc<Mutex<Vec<(RequestDescriptor, Option<String>)>>>,
}

impl ScriptedTransport {
    /// Creates a transport replaying the given responses.
    pub fn new(responses: Vec<Result<GatewayEnvelope, TransportError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<(RequestDescriptor, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl GatewayTransport for ScriptedTransport {
    fn send(
        &self,
        request: &RequestDescriptor,
        credentials: &GatewayCredentials,
    ) -> Result<GatewayEnvelope, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), credentials.api_key().map(str::to_string)));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted response".to_string())))
    }
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Credential provider returning fixed credentials or a fixed failure.
pub struct FixedCredentials(pub Result<GatewayCredentials, CredentialError>);

impl FixedCredentials {
    /// Credentials for a local gateway with the given key.
    pub fn with_key(key: &str) -> Self {
        Self(Ok(GatewayCredentials::new(
            GatewayUrl::new("http://gateway.test/"),
            Some(key.to_string()),
        )))
    }

    /// Anonymous credentials for a local gateway.
    pub fn anonymous() -> Self {
        Self(Ok(GatewayCredentials::new(GatewayUrl::new("http://gateway.test"), None)))
    }
}

impl CredentialProvider for FixedCredentials {
    fn credentials(&self) -> Result<GatewayCredentials, CredentialError> {
        self.0.clone()
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink collecting events in memory.
#[derive(Clone, Default)]
pub struct CollectingAuditSink {
    /// Recorded events.
    events: Arc<Mutex<Vec<RecordAuditEvent>>>,
}

impl CollectingAuditSink {
    /// Returns the recorded events.
    pub fn events(&self) -> Vec<RecordAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for CollectingAuditSink {
    fn record(&self, event: &RecordAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
