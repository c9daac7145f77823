// crates/bizreg-core/src/runtime/audit.rs
// ============================================================================
// Module: Bizreg Audit Sinks
// Description: Reference audit sinks for per-record execution events.
// Purpose: Emit redacted JSON-line audit logs without a logging framework.
// Dependencies: serde_json, crate::interfaces
// ============================================================================

//! ## Overview
//! Sinks receive one [`RecordAuditEvent`] per processed input record. Write
//! failures are swallowed so auditing can never fail a batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::interfaces::AuditSink;
use crate::interfaces::RecordAuditEvent;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix time in milliseconds, or zero before the epoch.
#[must_use]
pub fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &RecordAuditEvent) {}
}

/// Audit sink writing one JSON line per event to any writer.
pub struct JsonlAuditSink<W: Write + Send> {
    /// Guarded output writer.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlAuditSink<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer, or `None` if the lock was poisoned.
    pub fn into_inner(self) -> Option<W> {
        self.writer.into_inner().ok()
    }
}

impl<W: Write + Send> AuditSink for JsonlAuditSink<W> {
    fn record(&self, event: &RecordAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut writer) = self.writer.lock()
        {
            let _ = writeln!(writer, "{payload}");
            let _ = writer.flush();
        }
    }
}

/// Audit sink appending JSON lines to a file.
pub struct FileAuditSink {
    /// Append-mode file sink.
    inner: JsonlAuditSink<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: JsonlAuditSink::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &RecordAuditEvent) {
        self.inner.record(event);
    }
}
