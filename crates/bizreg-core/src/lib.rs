// crates/bizreg-core/src/lib.rs
// ============================================================================
// Module: Bizreg Core Library
// Description: Parameter-to-request mapping for the Polish business registry gateway.
// Purpose: Validate operations, build requests, and interpret gateway envelopes.
// Dependencies: percent-encoding, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Bizreg core exposes two registries behind one gateway: CEIDG (sole
//! proprietors) and GUS BIR (the REGON register). Each registry has a closed
//! operation catalog; input records are validated against it, turned into
//! [`RequestDescriptor`] values, sent through a [`GatewayTransport`], and the
//! resulting [`GatewayEnvelope`] is flattened into [`OutputRecord`] values or
//! classified into a [`RecordError`].
//! Invariants:
//! - The core performs no I/O of its own besides the optional audit file sink.
//! - The wall clock is never consulted for validation; callers supply the
//!   reference date.
//!
//! Security posture: gateway responses are untrusted input and API keys are
//! redacted from debug output and audit events.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::ClassifiedGatewayError;
pub use crate::core::EnvelopeError;
pub use crate::core::GatewayEnvelope;
pub use crate::core::GatewayErrorClass;
pub use crate::core::GatewayFailure;
pub use crate::core::GatewayUrl;
pub use crate::core::HttpMethod;
pub use crate::core::NO_RESULTS_MESSAGE;
pub use crate::core::Operation;
pub use crate::core::OperationSpec;
pub use crate::core::OutputRecord;
pub use crate::core::PairedItem;
pub use crate::core::ParamDef;
pub use crate::core::ParamDefault;
pub use crate::core::ParamGroup;
pub use crate::core::ParamKind;
pub use crate::core::ParamValue;
pub use crate::core::ParameterSet;
pub use crate::core::PrepareError;
pub use crate::core::Registry;
pub use crate::core::RequestDescriptor;
pub use crate::core::RequestPayload;
pub use crate::core::UnknownRegistryError;
pub use crate::core::ValidationContext;
pub use crate::core::ValidationError;
pub use crate::core::build_request;
pub use crate::core::classify_failure;
pub use crate::core::interpret_success;
pub use crate::core::prepare_request;
pub use crate::core::registry_catalog;
pub use crate::core::validate_parameters;
pub use interfaces::AuditOutcome;
pub use interfaces::AuditSink;
pub use interfaces::CredentialError;
pub use interfaces::CredentialProvider;
pub use interfaces::GatewayCredentials;
pub use interfaces::GatewayTransport;
pub use interfaces::RecordAuditEvent;
pub use interfaces::TransportError;
pub use runtime::ExecutionOptions;
pub use runtime::FileAuditSink;
pub use runtime::InputRecord;
pub use runtime::JsonlAuditSink;
pub use runtime::NoopAuditSink;
pub use runtime::RecordError;
pub use runtime::RegistryClient;
