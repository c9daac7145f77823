// crates/bizreg-config/src/lib.rs
// ============================================================================
// Module: Bizreg Config Library
// Description: Canonical config model and validation for bizreg.toml.
// Purpose: Single source of truth for client configuration semantics.
// Dependencies: bizreg-core, bizreg-transport, serde, toml, url
// ============================================================================

//! ## Overview
//! `bizreg-config` defines the configuration model for the bizreg client:
//! gateway location and credentials, HTTP limits, batch execution defaults,
//! and the audit log path. Validation is strict and fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
