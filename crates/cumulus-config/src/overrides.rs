//! Safe parsing of CLI override expressions
//!
//! `--*-variables` flags accept either a JSON object or a comma-separated
//! `key=value` list. Anything else is rejected; override expressions are
//! never evaluated as code.

use crate::error::{ConfigError, Result};
use crate::model::SectionMap;
use serde_json::Value;

/// Parse an override expression into a section map.
///
/// Examples of accepted input:
///
/// ```text
/// {"image_id": "ami-123456", "count": 2}
/// image_id=ami-123456,key_name=deploy
/// ```
pub fn parse_override_expr(expr: &str) -> Result<SectionMap> {
    let trimmed = expr.trim();

    if trimmed.is_empty() {
        return Err(invalid(expr, "empty expression"));
    }

    if trimmed.starts_with('{') {
        return parse_json_object(expr, trimmed);
    }

    parse_pair_list(expr, trimmed)
}

fn parse_json_object(original: &str, expr: &str) -> Result<SectionMap> {
    let value: Value =
        serde_json::from_str(expr).map_err(|e| invalid(original, &e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(invalid(
            original,
            &format!("expected a JSON object, got {other}"),
        )),
    }
}

fn parse_pair_list(original: &str, expr: &str) -> Result<SectionMap> {
    let mut map = SectionMap::new();

    for pair in expr.split(',') {
        let pair = pair.trim();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| invalid(original, &format!("expected key=value, got '{pair}'")))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(invalid(original, "empty key"));
        }

        map.insert(key.to_string(), Value::String(value.trim().to_string()));
    }

    Ok(map)
}

fn invalid(expr: &str, message: &str) -> ConfigError {
    ConfigError::InvalidOverride {
        expr: expr.to_string(),
        message: message.to_string(),
    }
}
