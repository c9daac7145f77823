// crates/bizreg-core/src/core/mod.rs
// ============================================================================
// Module: Bizreg Core Model
// Description: Catalog, validation, request, envelope, and result types.
// Purpose: Group the pure, I/O-free building blocks of the gateway client.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! Everything in this module is deterministic and free of I/O. The runtime
//! composes these pieces with the collaborators defined in
//! [`crate::interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod classify;
pub mod envelope;
pub mod identifiers;
pub mod output;
pub mod params;
pub mod request;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::OperationSpec;
pub use catalog::ParamDef;
pub use catalog::ParamDefault;
pub use catalog::ParamGroup;
pub use catalog::ParamKind;
pub use catalog::registry_catalog;
pub use classify::ClassifiedGatewayError;
pub use classify::GatewayErrorClass;
pub use classify::classify_failure;
pub use envelope::EnvelopeError;
pub use envelope::GatewayEnvelope;
pub use envelope::GatewayFailure;
pub use identifiers::Operation;
pub use identifiers::Registry;
pub use identifiers::UnknownRegistryError;
pub use output::NO_RESULTS_MESSAGE;
pub use output::OutputRecord;
pub use output::PairedItem;
pub use output::interpret_success;
pub use params::ParamValue;
pub use params::ParameterSet;
pub use params::ValidationContext;
pub use params::ValidationError;
pub use params::validate_parameters;
pub use request::GatewayUrl;
pub use request::HttpMethod;
pub use request::PrepareError;
pub use request::RequestDescriptor;
pub use request::RequestPayload;
pub use request::build_request;
pub use request::prepare_request;
