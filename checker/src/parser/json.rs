//! JSON trace input
//!
//! Accepts either a bare array of operations or an object with an `ops`
//! array. Each operation spans the bytes of its JSON object.

use crate::ast::{Op, OpKind, Trace};
use crate::common::Span;
use crate::diagnostics::CheckError;
use miette::Result;
use serde::Deserialize;
use serde_json::Value;
use serde_json::value::RawValue;

/// Object form of a trace; unknown fields are ignored
#[derive(Deserialize)]
struct Wrapped<'a> {
    #[serde(borrow)]
    ops: Option<Vec<&'a RawValue>>,
}

fn invalid(message: impl Into<String>) -> CheckError {
    CheckError::InvalidJson {
        message: message.into(),
    }
}

/// Parse a JSON trace
pub fn parse_json(content: &str) -> Result<Trace> {
    let raw_ops: Vec<&RawValue> = match content.trim_start().chars().next() {
        Some('[') => serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?,
        Some('{') => {
            let wrapped: Wrapped =
                serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
            wrapped
                .ops
                .ok_or_else(|| invalid("object trace is missing the `ops` array"))?
        }
        _ => {
            let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
            return Err(invalid(format!(
                "expected an array of operations, found {}",
                kind_of(&value)
            ))
            .into());
        }
    };

    let base = content.as_ptr() as usize;
    let mut ops = Vec::with_capacity(raw_ops.len());
    for (index, raw) in raw_ops.into_iter().enumerate() {
        let text = raw.get();
        let kind: OpKind = serde_json::from_str(text)
            .map_err(|e| invalid(format!("operation {}: {}", index, e)))?;
        let start = (text.as_ptr() as usize).saturating_sub(base);
        ops.push(Op::new(kind, Span::new(start, start + text.len())));
    }
    Ok(Trace::new(ops, content.len()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
