//! Argument validation against tool input schemas.
//!
//! Supports the subset of JSON Schema the tool catalog uses: `type`
//! (object, array, string, number, integer, boolean), `required`,
//! `properties`, `items`, `enum`, `minimum` and `maximum`. Unknown keywords are ignored.

use serde_json::{Map, Value};

use super::error::ToolError;

/// Validates `arguments` against `schema`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] naming the first offending path.
pub fn validate(schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    check(schema, arguments, "arguments")
}

fn check(schema: &Value, value: &Value, path: &str) -> Result<(), ToolError> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !matches_type(expected, value) {
            return Err(ToolError::invalid(format!(
                "{path} must be of type {expected}"
            )));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed.iter().map(Value::to_string).collect();
            return Err(ToolError::invalid(format!(
                "{path} must be one of: {}",
                options.join(", ")
            )));
        }
    }

    if let (Some(minimum), Some(actual)) = (
        schema.get("minimum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if actual < minimum {
            return Err(ToolError::invalid(format!(
                "{path} must be at least {minimum}"
            )));
        }
    }

    if let (Some(maximum), Some(actual)) = (
        schema.get("maximum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if actual > maximum {
            return Err(ToolError::invalid(format!(
                "{path} must be at most {maximum}"
            )));
        }
    }

    match value {
        Value::Object(map) => check_object(schema, map, path),
        Value::Array(items) => match schema.get("items") {
            Some(item_schema) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check(item_schema, item, &format!("{path}[{i}]"))),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_object(schema: &Value, map: &Map<String, Value>, path: &str) -> Result<(), ToolError> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if map.get(key).map_or(true, Value::is_null) {
                return Err(ToolError::invalid(format!(
                    "missing required parameter: {}",
                    join(path, key)
                )));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, property_schema) in properties {
            match map.get(key) {
                None | Some(Value::Null) => {}
                Some(value) => check(property_schema, value, &join(path, key))?,
            }
        }
    }

    Ok(())
}

fn join(path: &str, key: &str) -> String {
    if path == "arguments" {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        _ => true,
    }
}
