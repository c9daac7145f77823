// crates/bizreg-core/src/runtime/executor.rs
// ============================================================================
// Module: Bizreg Record Executor
// Description: Sequential per-record execution against the gateway.
// Purpose: Drive validate, build, dispatch, and interpret for each input record.
// Dependencies: serde, serde_json, thiserror, time, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`RegistryClient`] processes input records strictly in order. Credentials
//! are fetched once per batch; each record is then validated, built,
//! dispatched, and interpreted before the next one begins. Failures abort the
//! batch unless [`ExecutionOptions::continue_on_fail`] is set, in which case
//! the failing record becomes an `{"error": message}` output record.
//! Invariants:
//! - No network call is made for a record that fails validation or names an
//!   unknown operation.
//! - Exactly one audit event is emitted per processed record.
//! - Credential failures abort the batch before any record is processed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use time::Date;

use crate::core::classify::GatewayErrorClass;
use crate::core::classify::classify_failure;
use crate::core::envelope::GatewayEnvelope;
use crate::core::identifiers::Operation;
use crate::core::identifiers::Registry;
use crate::core::output::OutputRecord;
use crate::core::output::interpret_success;
use crate::core::params::ValidationContext;
use crate::core::params::ValidationError;
use crate::core::request::PrepareError;
use crate::core::request::prepare_request;
use crate::interfaces::AuditOutcome;
use crate::interfaces::AuditSink;
use crate::interfaces::CredentialError;
use crate::interfaces::CredentialProvider;
use crate::interfaces::GatewayCredentials;
use crate::interfaces::GatewayTransport;
use crate::interfaces::RecordAuditEvent;
use crate::interfaces::TransportError;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::audit::now_millis;

// ============================================================================
// SECTION: Inputs and Options
// ============================================================================

/// One input record: an operation tag and its raw parameter bag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputRecord {
    /// Operation tag or alias within the client's registry.
    pub operation: String,
    /// Raw parameters; grouped parameters live in nested objects.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl InputRecord {
    /// Creates an input record.
    #[must_use]
    pub fn new(operation: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            operation: operation.into(),
            parameters,
        }
    }
}

/// Caller-supplied execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Convert record failures into error output records instead of aborting.
    pub continue_on_fail: bool,
    /// Reference date for relative date validation.
    pub reference_date: Date,
}

impl ExecutionOptions {
    /// Creates fail-fast options anchored at a reference date.
    #[must_use]
    pub const fn new(reference_date: Date) -> Self {
        Self {
            continue_on_fail: false,
            reference_date,
        }
    }

    /// Sets per-record error isolation.
    #[must_use]
    pub const fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Execution failures, attributed to the input record where applicable.
///
/// # Invariants
/// - Every variant except [`RecordError::Credentials`] carries an item index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Parameters failed validation; no request was sent.
    #[error("{source}")]
    Validation {
        /// Input record index.
        item_index: usize,
        /// Validation failure.
        source: ValidationError,
    },
    /// The operation tag is not in the registry catalog; no request was sent.
    #[error("the operation \"{tag}\" is not supported by {registry}")]
    UnknownOperation {
        /// Input record index.
        item_index: usize,
        /// Registry the tag was resolved against.
        registry: Registry,
        /// Unrecognized tag.
        tag: String,
    },
    /// The transport failed to deliver the request or read the envelope.
    #[error("{source}")]
    Transport {
        /// Input record index.
        item_index: usize,
        /// Transport failure.
        source: TransportError,
    },
    /// The gateway reported an exhausted quota or rate limit.
    #[error("{message}")]
    GatewayQuota {
        /// Input record index.
        item_index: usize,
        /// Gateway error code.
        code: String,
        /// Gateway message.
        message: String,
    },
    /// The gateway reported an anonymous-tier limit.
    #[error("{message}")]
    GatewayAnonymousLimit {
        /// Input record index.
        item_index: usize,
        /// Gateway error code.
        code: String,
        /// Gateway message.
        message: String,
    },
    /// The gateway reported any other failure.
    #[error("{message}")]
    GatewayGeneric {
        /// Input record index.
        item_index: usize,
        /// Gateway error code.
        code: String,
        /// Prefixed gateway message.
        message: String,
    },
    /// Credentials could not be obtained for the batch.
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

impl RecordError {
    /// Returns the input record index, absent for batch-level failures.
    #[must_use]
    pub const fn item_index(&self) -> Option<usize> {
        match self {
            Self::Validation {
                item_index, ..
            }
            | Self::UnknownOperation {
                item_index, ..
            }
            | Self::Transport {
                item_index, ..
            }
            | Self::GatewayQuota {
                item_index, ..
            }
            | Self::GatewayAnonymousLimit {
                item_index, ..
            }
            | Self::GatewayGeneric {
                item_index, ..
            } => Some(*item_index),
            Self::Credentials(_) => None,
        }
    }

    /// Returns the remediation hint, if the failure has one.
    #[must_use]
    pub const fn description(&self) -> Option<&'static str> {
        match self {
            Self::GatewayQuota { .. } => GatewayErrorClass::QuotaExceeded.description(),
            Self::GatewayAnonymousLimit { .. } => GatewayErrorClass::AnonymousLimit.description(),
            Self::Validation { .. }
            | Self::UnknownOperation { .. }
            | Self::Transport { .. }
            | Self::GatewayGeneric { .. }
            | Self::Credentials(_) => None,
        }
    }

    /// Returns a stable label for the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::UnknownOperation { .. } => "unknown_operation",
            Self::Transport { .. } => "transport",
            Self::GatewayQuota { .. } => "gateway_quota",
            Self::GatewayAnonymousLimit { .. } => "gateway_anonymous_limit",
            Self::GatewayGeneric { .. } => "gateway_generic",
            Self::Credentials(_) => "credentials",
        }
    }

    /// Returns the gateway error code for gateway-reported failures.
    #[must_use]
    pub fn gateway_code(&self) -> Option<&str> {
        match self {
            Self::GatewayQuota {
                code, ..
            }
            | Self::GatewayAnonymousLimit {
                code, ..
            }
            | Self::GatewayGeneric {
                code, ..
            } => Some(code),
            Self::Validation { .. }
            | Self::UnknownOperation { .. }
            | Self::Transport { .. }
            | Self::Credentials(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Sequential executor for one registry.
pub struct RegistryClient<T, C> {
    /// Registry whose catalog resolves operation tags.
    registry: Registry,
    /// Gateway transport.
    transport: T,
    /// Credential source, consulted once per batch.
    credentials: C,
    /// Per-record audit sink.
    audit: Box<dyn AuditSink>,
}

impl<T: GatewayTransport, C: CredentialProvider> RegistryClient<T, C> {
    /// Creates a client with a no-op audit sink.
    #[must_use]
    pub fn new(registry: Registry, transport: T, credentials: C) -> Self {
        Self {
            registry,
            transport,
            credentials,
            audit: Box::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the client's registry.
    #[must_use]
    pub const fn registry(&self) -> Registry {
        self.registry
    }

    /// Executes a batch of input records in order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Credentials`] when the provider fails, or the
    /// first record failure when `continue_on_fail` is disabled.
    pub fn execute_batch(
        &self,
        records: &[InputRecord],
        options: &ExecutionOptions,
    ) -> Result<Vec<OutputRecord>, RecordError> {
        let credentials = self.credentials.credentials()?;
        let mut outputs = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let operation = Operation::resolve(self.registry, &record.operation);
            match self.execute_record(index, record, &credentials, options) {
                Ok(records) => {
                    self.emit(operation, index, AuditOutcome::Ok, records.len(), None);
                    outputs.extend(records);
                }
                Err(err) if options.continue_on_fail => {
                    self.emit(operation, index, AuditOutcome::Isolated, 1, Some(err.kind()));
                    outputs.push(OutputRecord::error(err.to_string(), index));
                }
                Err(err) => {
                    self.emit(operation, index, AuditOutcome::Failed, 0, Some(err.kind()));
                    return Err(err);
                }
            }
        }
        Ok(outputs)
    }

    /// Executes a single input record with already-resolved credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] attributed to `index` when the record fails
    /// validation, names an unknown operation, fails in transport, or the
    /// gateway reports an error.
    pub fn execute_record(
        &self,
        index: usize,
        record: &InputRecord,
        credentials: &GatewayCredentials,
        options: &ExecutionOptions,
    ) -> Result<Vec<OutputRecord>, RecordError> {
        let context = ValidationContext::new(options.reference_date);
        let request =
            prepare_request(self.registry, &record.operation, &record.parameters, &context)
                .map_err(|err| match err {
                    PrepareError::UnknownOperation {
                        registry,
                        tag,
                    } => RecordError::UnknownOperation {
                        item_index: index,
                        registry,
                        tag,
                    },
                    PrepareError::Validation(source) => RecordError::Validation {
                        item_index: index,
                        source,
                    },
                })?;
        let envelope =
            self.transport.send(&request, credentials).map_err(|source| RecordError::Transport {
                item_index: index,
                source,
            })?;
        match envelope {
            GatewayEnvelope::Success {
                data,
            } => Ok(interpret_success(self.registry, data, index)),
            GatewayEnvelope::Failure(failure) => {
                let classified = classify_failure(&failure);
                let code = classified.code;
                let message = classified.message;
                Err(match classified.class {
                    GatewayErrorClass::QuotaExceeded => RecordError::GatewayQuota {
                        item_index: index,
                        code,
                        message,
                    },
                    GatewayErrorClass::AnonymousLimit => RecordError::GatewayAnonymousLimit {
                        item_index: index,
                        code,
                        message,
                    },
                    GatewayErrorClass::Generic => RecordError::GatewayGeneric {
                        item_index: index,
                        code,
                        message,
                    },
                })
            }
        }
    }

    /// Emits the audit event for one processed record.
    fn emit(
        &self,
        operation: Option<Operation>,
        item_index: usize,
        outcome: AuditOutcome,
        output_count: usize,
        error_kind: Option<&'static str>,
    ) {
        self.audit.record(&RecordAuditEvent {
            event: "record_processed",
            timestamp_ms: now_millis(),
            registry: self.registry,
            operation,
            item_index,
            outcome,
            output_count,
            error_kind,
        });
    }
}
