//! Canonical schema names and `$ref` construction.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::config::MappingConfig;
use crate::error::MappingError;
use crate::model::{DomainModel, TypeDescriptor, TypeId};
use crate::types::{MappingMode, RequestType, SchemaKey};

/// Prefix of every registry reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// `#/components/schemas/{name}`
pub fn ref_path(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, name)
}

/// A bare `$ref` node.
pub fn ref_schema(name: &str) -> Value {
    json!({ "$ref": ref_path(name) })
}

/// Registry names of every `$ref` inside a schema node.
pub fn referenced_names(schema: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_refs(schema, &mut names);
    names
}

fn collect_refs(schema: &Value, names: &mut BTreeSet<String>) {
    match schema {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::String(target) if key == "$ref" => {
                        if let Some(name) = target.strip_prefix(SCHEMA_REF_PREFIX) {
                            names.insert(name.to_string());
                        }
                    }
                    _ => collect_refs(value, names),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, names);
            }
        }
        _ => {}
    }
}

pub(crate) fn lookup<'m>(model: &'m DomainModel, id: &TypeId) -> Result<&'m TypeDescriptor, MappingError> {
    model.get(id).ok_or_else(|| MappingError::UnknownType {
        type_name: id.to_string(),
    })
}

/// Reject keys that can never be mapped.
pub fn check_key(ty: &TypeDescriptor, key: &SchemaKey) -> Result<(), MappingError> {
    if !key.mode.is_compatible_with(ty) {
        return Err(MappingError::IncompatibleMode {
            mode: key.mode,
            type_name: ty.name.to_string(),
        });
    }
    if key.mode == MappingMode::Exposed && key.request == RequestType::Parameter {
        return Err(MappingError::InvalidRequestContext {
            mode: key.mode,
            request: key.request,
            type_name: ty.name.to_string(),
        });
    }
    Ok(())
}

/// Collapse keys that share one registry entry.
///
/// The hyperlink type and enums ignore mode and request type, so they map to
/// `(type, Value, Response)`.
pub fn canonical_key(model: &DomainModel, key: &SchemaKey) -> Result<SchemaKey, MappingError> {
    let ty = lookup(model, &key.type_id)?;
    if ty.is_link() || ty.is_enum() {
        return Ok(SchemaKey::new(
            ty.name.clone(),
            MappingMode::Value,
            RequestType::Response,
        ));
    }
    check_key(ty, key)?;
    Ok(key.clone())
}

/// `request.prefix + mode.prefix + simple_name + mode.suffix + request.suffix`.
pub fn canonical_name(
    model: &DomainModel,
    config: &MappingConfig,
    key: &SchemaKey,
) -> Result<String, MappingError> {
    let ty = lookup(model, &key.type_id)?;
    if ty.is_link() {
        return Ok(config.link_type_name.clone());
    }
    if ty.is_enum() {
        return Ok(format!("{}{}", ty.simple_name(), config.enum_type_suffix));
    }
    check_key(ty, key)?;

    let mode = key.mode.affix(&config.modes);
    let request = key.request.affix(&config.requests);
    Ok(format!(
        "{}{}{}{}{}",
        request.prefix,
        mode.prefix,
        ty.simple_name(),
        mode.suffix,
        request.suffix
    ))
}

/// Turns schema keys into names while the mapper walks a type.
///
/// The generator's implementation also schedules every new key for generation.
pub trait ReferenceResolver {
    fn resolve(&mut self, key: &SchemaKey) -> Result<String, MappingError>;

    /// A `$ref` node for `key`.
    fn reference(&mut self, key: &SchemaKey) -> Result<Value, MappingError> {
        let name = self.resolve(key)?;
        Ok(ref_schema(&name))
    }
}

/// Resolver that only computes names.
pub struct NamingResolver<'a> {
    model: &'a DomainModel,
    config: &'a MappingConfig,
}

impl<'a> NamingResolver<'a> {
    pub fn new(model: &'a DomainModel, config: &'a MappingConfig) -> Self {
        Self { model, config }
    }
}

impl ReferenceResolver for NamingResolver<'_> {
    fn resolve(&mut self, key: &SchemaKey) -> Result<String, MappingError> {
        canonical_name(self.model, self.config, key)
    }
}
