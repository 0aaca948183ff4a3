//! Input checks for slot requests.
//!
//! Both functions are pure. They run before any storage access, so a
//! rejected request never opens a transaction.

use std::fmt::Display;
use std::num::IntErrorKind;

use serde_json::Value;
use thiserror::Error;

use crate::{Payload, SlotIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Index,
    Data,
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Index => f.write_str("index"),
            Field::Data => f.write_str("data"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Accepts a JSON integer, or a string holding one (query parameters arrive as text).
pub fn validate_index(raw: &Value) -> Result<SlotIndex, ValidationError> {
    let value = match raw {
        Value::Number(n) if n.is_u64() => Ok(n.as_i64().unwrap_or(i64::MAX)),
        Value::Number(n) => n.as_i64().ok_or(()),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(v) => Ok(v),
            // Integers too large for i64 are still integers, just out of range.
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(()),
            },
        },
        _ => Err(()),
    };

    match value {
        Ok(v) => SlotIndex::new(v),
        Err(()) => Err(ValidationError::new(Field::Index, "must be an integer")),
    }
}

pub fn validate_payload(raw: Option<&Value>) -> Result<Payload, ValidationError> {
    match raw {
        None | Some(Value::Null) => Err(ValidationError::new(Field::Data, "cannot be empty")),
        Some(Value::Object(map)) => Ok(Payload::new(map.clone())),
        Some(_) => Err(ValidationError::new(Field::Data, "must be an object")),
    }
}
