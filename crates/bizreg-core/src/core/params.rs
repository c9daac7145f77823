// crates/bizreg-core/src/core/params.rs
// ============================================================================
// Module: Bizreg Parameter Validation
// Description: Coercion of raw parameter bags into validated parameter sets.
// Purpose: Enforce required fields, choices, ranges, and formats before any request is built.
// Dependencies: serde_json, thiserror, time, crate::core::catalog
// ============================================================================

//! ## Overview
//! [`validate_parameters`] walks an [`OperationSpec`] in catalog order and
//! reads each parameter from a raw JSON object. Grouped parameters are read
//! from the nested object named after their group. Strings are trimmed and an
//! empty string counts as absent. Defaults are applied to absent values before
//! the required check.
//!
//! A [`ParameterSet`] can only be produced by validation, so holding one
//! proves every required parameter is present and every value satisfies its
//! declared constraints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::num::FpCategory;

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;
use time::Date;
use time::Duration;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::catalog::OperationSpec;
use crate::core::catalog::ParamDef;
use crate::core::catalog::ParamDefault;
use crate::core::catalog::ParamKind;
use crate::core::identifiers::Operation;

// ============================================================================
// SECTION: Values
// ============================================================================

/// Validated scalar parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Trimmed, non-empty text.
    Text(String),
    /// Range-checked integer.
    Integer(i64),
    /// Boolean flag.
    Boolean(bool),
}

impl ParamValue {
    /// Renders the value as a query-string component.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(number) => number.to_string(),
            Self::Boolean(flag) => flag.to_string(),
        }
    }

    /// Renders the value as a JSON body field.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Integer(number) => Value::Number(Number::from(*number)),
            Self::Boolean(flag) => Value::Bool(*flag),
        }
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Integer(_) | Self::Boolean(_) => None,
        }
    }
}

impl From<ParamDefault> for ParamValue {
    fn from(default: ParamDefault) -> Self {
        match default {
            ParamDefault::Text(text) => Self::Text(text.to_string()),
            ParamDefault::Integer(number) => Self::Integer(number),
            ParamDefault::Boolean(flag) => Self::Boolean(flag),
        }
    }
}

/// Validated parameters for a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSet {
    /// Operation the parameters were validated against.
    operation: Operation,
    /// Present values keyed by parameter name.
    values: BTreeMap<&'static str, ParamValue>,
}

impl ParameterSet {
    /// Returns the operation the set was validated against.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the value of a named parameter, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Returns the number of present parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no parameter is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Context and Errors
// ============================================================================

/// Caller-supplied inputs that validation must not derive itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// Date used for relative date checks.
    pub reference_date: Date,
}

impl ValidationContext {
    /// Creates a context anchored at the given reference date.
    #[must_use]
    pub const fn new(reference_date: Date) -> Self {
        Self {
            reference_date,
        }
    }
}

/// Parameter validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required parameter is absent or empty.
    #[error("missing required parameter: {param}")]
    Missing {
        /// Parameter name.
        param: String,
    },
    /// A choice parameter holds a value outside its allowed set.
    #[error("invalid value for {param}: {value} (allowed: {allowed})")]
    InvalidChoice {
        /// Parameter name.
        param: String,
        /// Rejected value.
        value: String,
        /// Comma-separated allowed values.
        allowed: String,
    },
    /// An integer parameter lies outside its declared range.
    #[error("{param} out of range: {value} (expected {range})")]
    OutOfRange {
        /// Parameter name.
        param: String,
        /// Rejected value.
        value: i64,
        /// Human-readable range.
        range: String,
    },
    /// A parameter has the wrong JSON type.
    #[error("invalid type for {param}: expected {expected}")]
    InvalidType {
        /// Parameter name.
        param: String,
        /// Expected type label.
        expected: &'static str,
    },
    /// A parameter has the right type but an invalid format.
    #[error("malformed {param}: {reason}")]
    Malformed {
        /// Parameter name.
        param: String,
        /// Description of the format violation.
        reason: String,
    },
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a raw parameter bag against an operation spec.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered in catalog order.
pub fn validate_parameters(
    spec: &OperationSpec,
    raw: &Map<String, Value>,
    context: &ValidationContext,
) -> Result<ParameterSet, ValidationError> {
    let mut values = BTreeMap::new();
    for def in spec.params {
        let source = match def.group {
            Some(group) => match raw.get(group.as_str()) {
                None | Some(Value::Null) => None,
                Some(Value::Object(nested)) => Some(nested),
                Some(_) => {
                    return Err(ValidationError::InvalidType {
                        param: group.as_str().to_string(),
                        expected: "object",
                    });
                }
            },
            None => Some(raw),
        };
        let candidate = source.and_then(|bag| bag.get(def.name));
        let value = match candidate {
            Some(raw_value) => coerce_value(def, raw_value, context)?,
            None => None,
        };
        match value.or_else(|| def.default.map(ParamValue::from)) {
            Some(value) => {
                values.insert(def.name, value);
            }
            None if def.required => {
                return Err(ValidationError::Missing {
                    param: def.name.to_string(),
                });
            }
            None => {}
        }
    }
    Ok(ParameterSet {
        operation: spec.operation,
        values,
    })
}

/// Coerces a raw JSON value to a validated scalar; `None` means absent.
fn coerce_value(
    def: &ParamDef,
    raw: &Value,
    context: &ValidationContext,
) -> Result<Option<ParamValue>, ValidationError> {
    match def.kind {
        ParamKind::Boolean => coerce_boolean(def, raw),
        ParamKind::Integer {
            min,
            max,
        } => {
            let Some(number) = coerce_integer(def, raw)? else {
                return Ok(None);
            };
            if number < min || max.is_some_and(|max| number > max) {
                let range = max.map_or_else(|| format!(">= {min}"), |max| format!("{min}..={max}"));
                return Err(ValidationError::OutOfRange {
                    param: def.name.to_string(),
                    value: number,
                    range,
                });
            }
            Ok(Some(ParamValue::Integer(number)))
        }
        ParamKind::Text => Ok(coerce_text(def, raw)?.map(ParamValue::Text)),
        ParamKind::Choice {
            values,
        } => {
            let Some(text) = coerce_text(def, raw)? else {
                return Ok(None);
            };
            if !values.contains(&text.as_str()) {
                return Err(ValidationError::InvalidChoice {
                    param: def.name.to_string(),
                    value: text,
                    allowed: values.join(", "),
                });
            }
            Ok(Some(ParamValue::Text(text)))
        }
        ParamKind::Date => {
            let Some(text) = coerce_text(def, raw)? else {
                return Ok(None);
            };
            let date = parse_date(def, &text)?;
            Ok(Some(ParamValue::Text(format_date(def, date)?)))
        }
        ParamKind::RecentDate {
            max_age_days,
        } => {
            let Some(text) = coerce_text(def, raw)? else {
                return Ok(None);
            };
            let date = parse_date(def, &text)?;
            let earliest = context.reference_date.saturating_sub(Duration::days(max_age_days));
            if date < earliest {
                return Err(ValidationError::Malformed {
                    param: def.name.to_string(),
                    reason: format!(
                        "date must not be earlier than {max_age_days} days before {}",
                        format_date(def, context.reference_date)?
                    ),
                });
            }
            Ok(Some(ParamValue::Text(format_date(def, date)?)))
        }
        ParamKind::Digits {
            lengths,
        } => {
            let Some(text) = coerce_text(def, raw)? else {
                return Ok(None);
            };
            if !text.bytes().all(|byte| byte.is_ascii_digit()) || !lengths.contains(&text.len()) {
                let expected =
                    lengths.iter().map(ToString::to_string).collect::<Vec<_>>().join(" or ");
                return Err(ValidationError::Malformed {
                    param: def.name.to_string(),
                    reason: format!("expected {expected} digits"),
                });
            }
            Ok(Some(ParamValue::Text(text)))
        }
    }
}

/// Reads trimmed text; numbers are accepted in their decimal form.
fn coerce_text(def: &ParamDef, raw: &Value) -> Result<Option<String>, ValidationError> {
    let text = match raw {
        Value::Null => return Ok(None),
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            return Err(ValidationError::InvalidType {
                param: def.name.to_string(),
                expected: "string",
            });
        }
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Reads an integer from a JSON number with no fractional part or an integer string.
fn coerce_integer(def: &ParamDef, raw: &Value) -> Result<Option<i64>, ValidationError> {
    let invalid = || ValidationError::InvalidType {
        param: def.name.to_string(),
        expected: "integer",
    };
    match raw {
        Value::Null => Ok(None),
        Value::Number(number) => match number.as_i64() {
            Some(value) => Ok(Some(value)),
            None => whole_number(number).map(Some).ok_or_else(invalid),
        },
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<i64>().map(Some).map_err(|_| invalid())
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(invalid()),
    }
}

/// Converts a whole-valued float such as `25.0` or `1e2` to an integer.
fn whole_number(number: &Number) -> Option<i64> {
    let value = number.as_f64().filter(|value| value.is_finite())?;
    if value.fract().classify() != FpCategory::Zero {
        return None;
    }
    format!("{value:.0}").parse::<i64>().ok()
}

/// Reads a boolean from a JSON boolean or the strings `true`/`false`.
fn coerce_boolean(def: &ParamDef, raw: &Value) -> Result<Option<ParamValue>, ValidationError> {
    let invalid = || ValidationError::InvalidType {
        param: def.name.to_string(),
        expected: "boolean",
    };
    match raw {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(ParamValue::Boolean(*flag))),
        Value::String(text) => match text.trim() {
            "" => Ok(None),
            "true" => Ok(Some(ParamValue::Boolean(true))),
            "false" => Ok(Some(ParamValue::Boolean(false))),
            _ => Err(invalid()),
        },
        Value::Number(_) | Value::Array(_) | Value::Object(_) => Err(invalid()),
    }
}

/// Calendar date layout used for input and on the wire.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` calendar date; signed or widened years are rejected.
fn parse_date(def: &ParamDef, text: &str) -> Result<Date, ValidationError> {
    let malformed = || ValidationError::Malformed {
        param: def.name.to_string(),
        reason: format!("expected a YYYY-MM-DD date, got {text}"),
    };
    if text.len() != 10 || !text.starts_with(|ch: char| ch.is_ascii_digit()) {
        return Err(malformed());
    }
    Date::parse(text, DATE_FORMAT).map_err(|_| malformed())
}

/// Formats a date as `YYYY-MM-DD`.
fn format_date(def: &ParamDef, date: Date) -> Result<String, ValidationError> {
    date.format(DATE_FORMAT).map_err(|err| ValidationError::Malformed {
        param: def.name.to_string(),
        reason: err.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
