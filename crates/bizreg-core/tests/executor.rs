// crates/bizreg-core/tests/executor.rs
// ============================================================================
// Module: Executor Tests
// Description: Tests for sequential batch execution and error isolation.
// ============================================================================
//! ## Overview
//! Validates fail-fast and continue-on-fail behavior, credential handling,
//! index attribution, and audit emission using a scripted transport.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use bizreg_core::AuditOutcome;
use bizreg_core::CredentialError;
use bizreg_core::JsonlAuditSink;
use bizreg_core::Operation;
use bizreg_core::OutputRecord;
use bizreg_core::RecordError;
use bizreg_core::Registry;
use bizreg_core::RegistryClient;
use bizreg_core::TransportError;
use serde_json::Value;
use serde_json::json;

use crate::common::CollectingAuditSink;
use crate::common::FixedCredentials;
use crate::common::ScriptedTransport;
use crate::common::envelope;
use crate::common::fail_fast;
use crate::common::isolating;
use crate::common::record;

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[test]
fn batch_outputs_are_paired_with_input_indexes() {
    let transport = ScriptedTransport::new(vec![
        Ok(envelope(json!({
            "success": true,
            "data": { "firmy": [{ "id": "a" }, { "id": "b" }] },
        }))),
        Ok(envelope(json!({ "success": true, "data": null }))),
    ]);
    let client =
        RegistryClient::new(Registry::Ceidg, transport.clone(), FixedCredentials::with_key("k"));
    let outputs = client
        .execute_batch(
            &[
                record("search", json!({ "searchValue": "Kowalski", "searchBy": "nazwa" })),
                record("getById", json!({ "firmaId": "a" })),
            ],
            &fail_fast(),
        )
        .unwrap();
    assert_eq!(
        outputs,
        vec![
            OutputRecord::new(json!({ "id": "a" }), 0),
            OutputRecord::new(json!({ "id": "b" }), 0),
            OutputRecord::no_results(1),
        ]
    );
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0.operation, Operation::CeidgSearch);
    assert_eq!(requests[1].0.path, "/api/ceidg/firma/a");
    assert_eq!(requests[1].1.as_deref(), Some("k"));
}

#[test]
fn anonymous_credentials_carry_no_key() {
    let transport =
        ScriptedTransport::new(vec![Ok(envelope(json!({ "success": true, "data": [] })))]);
    let client =
        RegistryClient::new(Registry::GusBir, transport.clone(), FixedCredentials::anonymous());
    let outputs = client
        .execute_batch(&[record("search", json!({ "identifier": "1" }))], &fail_fast())
        .unwrap();
    assert!(outputs.is_empty());
    assert_eq!(transport.requests()[0].1, None);
}

// ============================================================================
// SECTION: Fail Fast
// ============================================================================

#[test]
fn validation_failure_aborts_without_network_call() {
    let transport = ScriptedTransport::new(Vec::new());
    let client =
        RegistryClient::new(Registry::Ceidg, transport.clone(), FixedCredentials::anonymous());
    let err = client
        .execute_batch(
            &[record("search", json!({ "searchValue": "x", "filters": { "limit": 500 } }))],
            &fail_fast(),
        )
        .unwrap_err();
    assert!(matches!(err, RecordError::Validation { item_index: 0, .. }));
    assert_eq!(err.kind(), "validation");
    assert!(transport.requests().is_empty());
}

#[test]
fn unknown_operation_aborts_without_network_call() {
    let transport = ScriptedTransport::new(Vec::new());
    let client =
        RegistryClient::new(Registry::Ceidg, transport.clone(), FixedCredentials::anonymous());
    let err = client
        .execute_batch(&[record("summary", json!({}))], &fail_fast())
        .unwrap_err();
    assert_eq!(
        err,
        RecordError::UnknownOperation {
            item_index: 0,
            registry: Registry::Ceidg,
            tag: "summary".to_string(),
        }
    );
    assert!(transport.requests().is_empty());
}

#[test]
fn quota_failure_stops_remaining_records() {
    let transport = ScriptedTransport::new(vec![
        Ok(envelope(json!({ "success": true, "data": { "nazwa": "A" } }))),
        Ok(envelope(json!({
            "success": false,
            "error": { "code": "MONTHLY_LIMIT_EXCEEDED", "message": "Monthly limit reached" }
        }))),
        Ok(envelope(json!({ "success": true, "data": { "nazwa": "C" } }))),
    ]);
    let client =
        RegistryClient::new(Registry::GusBir, transport.clone(), FixedCredentials::with_key("k"));
    let records = [
        record("search", json!({ "identifier": "1" })),
        record("search", json!({ "identifier": "2" })),
        record("search", json!({ "identifier": "3" })),
    ];
    let err = client.execute_batch(&records, &fail_fast()).unwrap_err();
    assert_eq!(err.item_index(), Some(1));
    assert_eq!(err.to_string(), "Monthly limit reached");
    assert_eq!(err.gateway_code(), Some("MONTHLY_LIMIT_EXCEEDED"));
    assert!(err.description().unwrap().contains("Upgrade"));
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn anonymous_limit_maps_to_its_own_variant() {
    let transport = ScriptedTransport::new(vec![Ok(envelope(json!({
        "success": false,
        "error": { "code": "ANONYMOUS_DAILY_LIMIT", "message": "Daily limit" }
    })))]);
    let client = RegistryClient::new(Registry::GusBir, transport, FixedCredentials::anonymous());
    let err = client
        .execute_batch(&[record("search", json!({ "identifier": "1" }))], &fail_fast())
        .unwrap_err();
    assert!(matches!(err, RecordError::GatewayAnonymousLimit { .. }));
    assert!(err.description().unwrap().contains("free API key"));
}

#[test]
fn transport_failure_propagates_with_index() {
    let transport = ScriptedTransport::new(vec![
        Ok(envelope(json!({ "success": true, "data": { "x": 1 } }))),
        Err(TransportError::Request("connection refused".to_string())),
    ]);
    let client = RegistryClient::new(Registry::GusBir, transport, FixedCredentials::anonymous());
    let err = client
        .execute_batch(
            &[
                record("search", json!({ "identifier": "1" })),
                record("search", json!({ "identifier": "2" })),
            ],
            &fail_fast(),
        )
        .unwrap_err();
    assert!(matches!(err, RecordError::Transport { item_index: 1, .. }));
    assert_eq!(err.to_string(), "gateway request failed: connection refused");
}

#[test]
fn credential_failure_is_batch_level_even_when_isolating() {
    let transport = ScriptedTransport::new(Vec::new());
    let client = RegistryClient::new(
        Registry::Ceidg,
        transport.clone(),
        FixedCredentials(Err(CredentialError::Unavailable("vault sealed".to_string()))),
    );
    let err = client
        .execute_batch(&[record("search", json!({ "searchValue": "x" }))], &isolating())
        .unwrap_err();
    assert_eq!(err.item_index(), None);
    assert_eq!(err.kind(), "credentials");
    assert!(transport.requests().is_empty());
}

// ============================================================================
// SECTION: Isolation
// ============================================================================

#[test]
fn isolation_turns_middle_failure_into_error_record() {
    let transport = ScriptedTransport::new(vec![
        Ok(envelope(json!({ "success": true, "data": { "nazwa": "A" } }))),
        Ok(envelope(json!({ "success": true, "data": [{ "nazwa": "C1" }, { "nazwa": "C2" }] }))),
    ]);
    let audit = CollectingAuditSink::default();
    let client =
        RegistryClient::new(Registry::GusBir, transport.clone(), FixedCredentials::anonymous())
            .with_audit_sink(Box::new(audit.clone()));
    let outputs = client
        .execute_batch(
            &[
                record("search", json!({ "identifier": "1" })),
                record("report", json!({ "regon": "not-a-regon" })),
                record("search", json!({ "identifier": "3" })),
            ],
            &isolating(),
        )
        .unwrap();
    assert_eq!(outputs.len(), 4);
    assert_eq!(outputs[0], OutputRecord::new(json!({ "nazwa": "A" }), 0));
    assert_eq!(outputs[1].paired_item.item, 1);
    let message = outputs[1].json.get("error").and_then(Value::as_str).unwrap();
    assert!(message.contains("regon"), "{message}");
    assert_eq!(outputs[2], OutputRecord::new(json!({ "nazwa": "C1" }), 2));
    assert_eq!(outputs[3], OutputRecord::new(json!({ "nazwa": "C2" }), 2));
    assert_eq!(transport.requests().len(), 2);

    let events = audit.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].outcome, AuditOutcome::Ok);
    assert_eq!(events[0].output_count, 1);
    assert_eq!(events[1].outcome, AuditOutcome::Isolated);
    assert_eq!(events[1].error_kind, Some("validation"));
    assert_eq!(events[1].operation, Some(Operation::GusReport));
    assert_eq!(events[2].output_count, 2);
}

#[test]
fn isolated_gateway_error_uses_classified_message() {
    let transport = ScriptedTransport::new(vec![Ok(envelope(json!({
        "success": false,
        "error": { "code": "NOT_FOUND", "message": "No entity" }
    })))]);
    let client = RegistryClient::new(Registry::Ceidg, transport, FixedCredentials::anonymous());
    let outputs = client
        .execute_batch(&[record("getFirma", json!({ "firmaId": "zzz" }))], &isolating())
        .unwrap();
    assert_eq!(outputs, vec![OutputRecord::error("Gateway error: No entity", 0)]);
}

#[test]
fn failed_record_is_audited_before_abort() {
    let audit = CollectingAuditSink::default();
    let transport = ScriptedTransport::new(Vec::new());
    let client = RegistryClient::new(Registry::Ceidg, transport, FixedCredentials::anonymous())
        .with_audit_sink(Box::new(audit.clone()));
    let _ = client.execute_batch(&[record("bogus", json!({}))], &fail_fast());
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, AuditOutcome::Failed);
    assert_eq!(events[0].operation, None);
    assert_eq!(events[0].error_kind, Some("unknown_operation"));
}

#[test]
fn jsonl_audit_sink_writes_one_line_per_record_without_secrets() {
    let transport = ScriptedTransport::new(vec![
        Ok(envelope(json!({ "success": true, "data": { "a": 1 } }))),
        Ok(envelope(json!({ "success": true, "data": { "b": 2 } }))),
    ]);
    let sink = std::sync::Arc::new(JsonlAuditSink::new(Vec::<u8>::new()));
    let credentials = FixedCredentials::with_key("secret-key");
    let client = RegistryClient::new(Registry::GusBir, transport, credentials)
        .with_audit_sink(Box::new(SharedSink(sink.clone())));
    client
        .execute_batch(
            &[
                record("search", json!({ "identifier": "needle-one" })),
                record("search", json!({ "identifier": "needle-two" })),
            ],
            &fail_fast(),
        )
        .unwrap();
    drop(client);
    let sink = std::sync::Arc::try_unwrap(sink).ok().expect("sole owner");
    let text = String::from_utf8(sink.into_inner().expect("writer")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(!text.contains("secret-key"));
    assert!(!text.contains("needle"));
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["event"], "record_processed");
    assert_eq!(first["registry"], "gus");
    assert_eq!(first["operation"], "gus_search");
    assert_eq!(first["outcome"], "ok");
    assert_eq!(first["item_index"], 0);
}

/// Shares one sink between the client and the test.
struct SharedSink(std::sync::Arc<JsonlAuditSink<Vec<u8>>>);

impl bizreg_core::AuditSink for SharedSink {
    fn record(&self, event: &bizreg_core::RecordAuditEvent) {
        self.0.record(event);
    }
}
