//! Payload validation against generated schemas.
//!
//! Registry entries are OpenAPI 3.0 schema objects. Before handing them to
//! `jsonschema` they are rewritten into a standalone JSON Schema document:
//! `nullable` becomes an explicit `null` alternative, registry references
//! point into `$defs`, and OpenAPI-only keywords are dropped.

use serde_json::{json, Map, Value};

use crate::error::{SchemaError, ValidateError};
use crate::naming::SCHEMA_REF_PREFIX;
use crate::registry::SchemaRegistry;

const DEFS_PREFIX: &str = "#/$defs/";
const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Keywords whose value is a single subschema.
const SUBSCHEMA_KEYWORDS: [&str; 3] = ["items", "additionalProperties", "not"];
/// Keywords whose value is a list of subschemas.
const COMBINATOR_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Build a JSON Schema document for one registry entry.
///
/// Every registry entry is carried along under `$defs` so references between
/// entries keep resolving.
///
/// # Errors
///
/// Returns `ValidateError::UnknownSchema` if the registry has no entry called `name`.
pub fn to_json_schema(registry: &SchemaRegistry, name: &str) -> Result<Value, ValidateError> {
    if !registry.contains(name) {
        return Err(ValidateError::UnknownSchema {
            name: name.to_string(),
        });
    }

    let defs: Map<String, Value> = registry
        .sorted()
        .into_iter()
        .map(|(entry, schema)| (entry.to_string(), convert(schema)))
        .collect();

    Ok(json!({
        "$schema": DRAFT,
        "$ref": format!("{}{}", DEFS_PREFIX, name),
        "$defs": defs,
    }))
}

/// Validate a payload against the registry entry called `name`.
///
/// # Errors
///
/// Returns `ValidateError::UnknownSchema` for a missing entry,
/// `ValidateError::InvalidSchema` if the converted schema is rejected by the
/// validator, or `ValidateError::Invalid` with every violation found.
pub fn validate_payload(
    registry: &SchemaRegistry,
    name: &str,
    payload: &Value,
) -> Result<(), ValidateError> {
    let schema = to_json_schema(registry, name)?;
    validate_against_schema(&schema, payload)
}

/// Validate a payload against an already-built JSON Schema document.
///
/// Use this with [`to_json_schema`] to validate many payloads against one entry.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

/// Rewrite one OpenAPI schema object as JSON Schema.
fn convert(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut out = Map::new();
    let mut nullable = false;
    for (key, value) in map {
        match key.as_str() {
            "nullable" => nullable = value.as_bool().unwrap_or(false),
            "discriminator" => {}
            _ if key.starts_with("x-") => {}
            "$ref" => {
                let target = value.as_str().unwrap_or_default();
                let target = match target.strip_prefix(SCHEMA_REF_PREFIX) {
                    Some(entry) => format!("{}{}", DEFS_PREFIX, entry),
                    None => target.to_string(),
                };
                out.insert(key.clone(), Value::String(target));
            }
            "properties" => {
                let properties = match value {
                    Value::Object(props) => Value::Object(
                        props
                            .iter()
                            .map(|(name, prop)| (name.clone(), convert(prop)))
                            .collect(),
                    ),
                    other => other.clone(),
                };
                out.insert(key.clone(), properties);
            }
            k if SUBSCHEMA_KEYWORDS.contains(&k) => {
                out.insert(key.clone(), convert(value));
            }
            k if COMBINATOR_KEYWORDS.contains(&k) => {
                let branches = match value {
                    Value::Array(items) => Value::Array(items.iter().map(convert).collect()),
                    other => other.clone(),
                };
                out.insert(key.clone(), branches);
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    if nullable {
        allow_null(out)
    } else {
        Value::Object(out)
    }
}

/// Add `null` to the values a converted schema accepts.
fn allow_null(mut schema: Map<String, Value>) -> Value {
    if let Some(Value::String(ty)) = schema.get("type") {
        let types = json!([ty, "null"]);
        schema.insert("type".to_string(), types);
        if let Some(Value::Array(values)) = schema.get_mut("enum") {
            if !values.contains(&Value::Null) {
                values.push(Value::Null);
            }
        }
        return Value::Object(schema);
    }

    for combinator in ["oneOf", "anyOf"] {
        if let Some(Value::Array(branches)) = schema.get_mut(combinator) {
            branches.push(json!({ "type": "null" }));
            return Value::Object(schema);
        }
    }

    json!({ "anyOf": [schema, { "type": "null" }] })
}
