// crates/bizreg-core/src/core/output.rs
// ============================================================================
// Module: Bizreg Response Interpreter
// Description: Flattening of successful gateway payloads into output records.
// Purpose: Emit one record per result entry, or a single no-results sentinel.
// Dependencies: serde, serde_json, crate::core::identifiers
// ============================================================================

//! ## Overview
//! [`interpret_success`] maps the `data` of a success envelope to output
//! records. Registry collections (CEIDG `firmy`) and bare arrays are
//! flattened entry by entry; any other non-empty value becomes one record;
//! empty data yields the `{"message": "No results found"}` sentinel. Every
//! record is paired with the index of the input record that produced it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::FpCategory;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::identifiers::Registry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message carried by the sentinel record emitted for empty results.
pub const NO_RESULTS_MESSAGE: &str = "No results found";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Link from an output record back to the input record that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    /// Zero-based input record index.
    pub item: usize,
}

/// Single output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    /// Record payload.
    pub json: Value,
    /// Originating input record.
    pub paired_item: PairedItem,
}

impl OutputRecord {
    /// Creates a record paired with an input index.
    #[must_use]
    pub const fn new(json: Value, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem {
                item,
            },
        }
    }

    /// Creates the no-results sentinel for an input index.
    #[must_use]
    pub fn no_results(item: usize) -> Self {
        Self::new(json!({ "message": NO_RESULTS_MESSAGE }), item)
    }

    /// Creates an isolated error record for an input index.
    #[must_use]
    pub fn error(message: impl Into<String>, item: usize) -> Self {
        Self::new(json!({ "error": message.into() }), item)
    }
}

// ============================================================================
// SECTION: Interpretation
// ============================================================================

/// Maps the data of a success envelope to output records.
#[must_use]
pub fn interpret_success(
    registry: Registry,
    data: Option<Value>,
    item: usize,
) -> Vec<OutputRecord> {
    let Some(data) = data else {
        return vec![OutputRecord::no_results(item)];
    };
    let data = match data {
        Value::Object(mut object) => {
            if let Some(key) = registry.collection_key()
                && matches!(object.get(key), Some(Value::Array(_)))
                && let Some(Value::Array(entries)) = object.remove(key)
            {
                return flatten(entries, item);
            }
            Value::Object(object)
        }
        Value::Array(entries) => return flatten(entries, item),
        other => other,
    };
    if is_empty_value(&data) {
        vec![OutputRecord::no_results(item)]
    } else {
        vec![OutputRecord::new(data, item)]
    }
}

/// Emits one record per array entry.
fn flatten(entries: Vec<Value>, item: usize) -> Vec<OutputRecord> {
    entries.into_iter().map(|entry| OutputRecord::new(entry, item)).collect()
}

/// Returns true for values treated as "no data": null, false, zero, and "".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => {
            number.as_f64().is_some_and(|number| number.classify() == FpCategory::Zero)
        }
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
