// crates/bizreg-core/src/runtime/mod.rs
// ============================================================================
// Module: Bizreg Runtime
// Description: Record execution and reference audit sinks.
// Purpose: Expose the caller-facing client surface.
// Dependencies: crate::runtime::{audit, executor}
// ============================================================================

//! ## Overview
//! The runtime wires the pure core to the transport, credential, and audit
//! collaborators and processes input records in order.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod executor;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::JsonlAuditSink;
pub use audit::NoopAuditSink;
pub use executor::ExecutionOptions;
pub use executor::InputRecord;
pub use executor::RecordError;
pub use executor::RegistryClient;
