//! Schema mapper: turns one schema key into one schema node.
//!
//! The mapper never recurses into referenced types. Every nested type is
//! named through a [`ReferenceResolver`], which is where the generator
//! schedules it, so mapping a key is a single bounded step even on cyclic
//! type graphs.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::config::MappingConfig;
use crate::error::MappingError;
use crate::model::{
    DomainModel, InheritanceTree, PropertyDescriptor, TypeDescriptor, TypeId, TypeRef,
};
use crate::naming::{check_key, lookup, ref_path, ref_schema, ReferenceResolver};
use crate::policy;
use crate::standard::any_schema;
use crate::types::{MappingMode, RequestType, SchemaKey};

const LINKS_PROPERTY: &str = "_links";
const SELF_LINK: &str = "self";
const X_LINKED_ENTITY: &str = "x-linked-entity";
const X_SOURCE_TYPE_NAME: &str = "x-source-type-name";

/// Maps schema keys against a model and configuration.
#[derive(Debug, Clone, Copy)]
pub struct SchemaMapper<'a> {
    model: &'a DomainModel,
    config: &'a MappingConfig,
}

impl<'a> SchemaMapper<'a> {
    pub fn new(model: &'a DomainModel, config: &'a MappingConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> &'a DomainModel {
        self.model
    }

    pub fn config(&self) -> &'a MappingConfig {
        self.config
    }

    /// Produce the schema node for `key`.
    ///
    /// Dispatch order: links, with-links, with-projections, inheritance child,
    /// enum, standard scalar, hierarchy root, plain object.
    pub fn map_type(
        &self,
        key: &SchemaKey,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let ty = lookup(self.model, &key.type_id)?;
        check_key(ty, key)?;

        match key.mode {
            MappingMode::Links => return self.links_schema(ty, resolver),
            MappingMode::WithLinks => {
                let exposed = resolver.reference(&response_key(&ty.name, MappingMode::Exposed))?;
                let links = resolver.reference(&response_key(&ty.name, MappingMode::Links))?;
                return Ok(json!({ "allOf": [exposed, links] }));
            }
            MappingMode::WithProjections => return self.with_projections_schema(ty, resolver),
            MappingMode::InheritanceChild => {
                return self.inheritance_child_schema(ty, key, resolver)
            }
            _ => {}
        }

        if ty.is_enum() {
            return Ok(self.enum_schema(ty));
        }

        if ty.is_standard() {
            return ty.scalar.map(|scalar| scalar.template()).ok_or_else(|| {
                MappingError::UnknownType {
                    type_name: ty.name.to_string(),
                }
            });
        }

        if key.mode == MappingMode::Exposed && key.request == RequestType::Response {
            if let Some(tree) = self.model.hierarchy_rooted_at(&ty.name) {
                return self.hierarchy_root_schema(ty, tree, key, resolver);
            }
        }

        let properties = self.model.properties_of(&ty.name);
        self.object_schema(ty, &properties, key, resolver)
    }

    fn links_schema(
        &self,
        ty: &TypeDescriptor,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let mut targets: BTreeMap<String, TypeId> = BTreeMap::new();
        targets.insert(SELF_LINK.to_string(), ty.name.clone());
        targets.insert(lower_camel(ty.simple_name()), ty.name.clone());

        for property in self.model.properties_of(&ty.name) {
            // Collections of exposed entities have no link.
            if property.json_ignored || property.value_type.is_collection() {
                continue;
            }
            if let TypeRef::Named(target) = &property.value_type {
                if self.model.is_exposed(target) {
                    targets.insert(property.name.clone(), target.clone());
                }
            }
        }

        let link = resolver.reference(&SchemaKey::new(
            TypeId::link(),
            MappingMode::Value,
            RequestType::Response,
        ))?;

        let mut links = Map::new();
        for (name, target) in targets {
            let value = if self.config.add_x_linked_entity {
                let linked = resolver.resolve(&response_key(&target, MappingMode::Exposed))?;
                json!({ "allOf": [link.clone()], X_LINKED_ENTITY: linked })
            } else {
                link.clone()
            };
            links.insert(name, value);
        }

        Ok(json!({
            "type": "object",
            "required": [LINKS_PROPERTY],
            "properties": {
                LINKS_PROPERTY: {
                    "type": "object",
                    "properties": links
                }
            }
        }))
    }

    fn with_projections_schema(
        &self,
        ty: &TypeDescriptor,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let mut variants = vec![resolver.reference(&response_key(&ty.name, MappingMode::Exposed))?];
        for projection in self.model.projections_of(&ty.name) {
            variants.push(
                resolver.reference(&response_key(&projection.projection, MappingMode::Projection))?,
            );
        }
        let links = resolver.reference(&response_key(&ty.name, MappingMode::Links))?;
        Ok(json!({ "allOf": [{ "oneOf": variants }, links] }))
    }

    fn inheritance_child_schema(
        &self,
        ty: &TypeDescriptor,
        key: &SchemaKey,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let tree = self.model.hierarchy_of(&ty.name).ok_or_else(|| {
            MappingError::MissingInheritanceEntry {
                type_name: ty.name.to_string(),
            }
        })?;
        let base = resolver.reference(&SchemaKey::new(
            tree.base.clone(),
            MappingMode::InheritanceBase,
            key.request,
        ))?;
        let own = self.model.properties_below(&ty.name, &tree.base);
        let own = self.object_schema(ty, &own, key, resolver)?;
        Ok(json!({ "allOf": [base, own] }))
    }

    fn enum_schema(&self, ty: &TypeDescriptor) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!("string"));
        if self.config.add_x_source_type_name {
            schema.insert(X_SOURCE_TYPE_NAME.into(), json!(ty.name.as_str()));
        }
        schema.insert("enum".into(), json!(ty.constants));
        Value::Object(schema)
    }

    fn hierarchy_root_schema(
        &self,
        ty: &TypeDescriptor,
        tree: &InheritanceTree,
        key: &SchemaKey,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let column = tree.discriminator_column();
        let discriminator = self
            .model
            .properties_of(&ty.name)
            .into_iter()
            .find(|p| p.column_name().eq_ignore_ascii_case(column))
            .map(|p| p.name.clone());

        let mut any_of = Vec::new();
        let mut mapping = Map::new();
        for member in tree.closure() {
            let mode = if member.type_id == tree.base {
                MappingMode::InheritanceBase
            } else {
                MappingMode::InheritanceChild
            };
            let name = resolver.resolve(&SchemaKey::new(member.type_id.clone(), mode, key.request))?;
            if let Some(value) = &member.discriminator_value {
                mapping.insert(value.clone(), Value::String(ref_path(&name)));
            }
            any_of.push(ref_schema(&name));
        }

        let mut schema = Map::new();
        schema.insert("anyOf".into(), Value::Array(any_of));
        if let Some(property_name) = discriminator {
            let mut discriminator = Map::new();
            discriminator.insert("propertyName".into(), Value::String(property_name));
            if !mapping.is_empty() {
                discriminator.insert("mapping".into(), Value::Object(mapping));
            }
            schema.insert("discriminator".into(), Value::Object(discriminator));
        }
        Ok(Value::Object(schema))
    }

    fn object_schema(
        &self,
        ty: &TypeDescriptor,
        properties: &[&PropertyDescriptor],
        key: &SchemaKey,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let mut required = Vec::new();
        let mut fields = Map::new();

        for property in properties {
            if !policy::is_property_included(property, key.request) {
                continue;
            }
            if self.left_to_links(property, key) {
                continue;
            }
            if policy::is_required(ty, property, key.request) {
                required.push(Value::String(property.name.clone()));
            }
            let nullable = policy::is_nullable(ty, property, key.request);
            let field = self.field_schema(ty, property, key, nullable, resolver)?;
            fields.insert(property.name.clone(), field);
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if self.config.add_x_source_type_name {
            schema.insert(X_SOURCE_TYPE_NAME.into(), json!(ty.name.as_str()));
        }
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        if !fields.is_empty() {
            schema.insert("properties".into(), Value::Object(fields));
        }
        Ok(Value::Object(schema))
    }

    /// Responses render exposed associations only as links, except in
    /// value and projection shapes.
    fn left_to_links(&self, property: &PropertyDescriptor, key: &SchemaKey) -> bool {
        key.request == RequestType::Response
            && !key.mode.exposes_nested_entities()
            && property
                .value_type
                .target()
                .map_or(false, |target| self.model.is_exposed(target))
    }

    fn field_schema(
        &self,
        host: &TypeDescriptor,
        property: &PropertyDescriptor,
        key: &SchemaKey,
        nullable: bool,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let schema = self
            .to_schema(key, &property.value_type, nullable, resolver)
            .map_err(|err| match err {
                MappingError::UnknownType { type_name } => MappingError::UnmappableType {
                    type_name,
                    owner: host.name.to_string(),
                    property: property.name.clone(),
                },
                other => other,
            })?;
        Ok(decorate(schema, property))
    }

    /// Schema for a value type used inside a schema for `key`.
    pub fn to_schema(
        &self,
        key: &SchemaKey,
        value_type: &TypeRef,
        nullable: bool,
        resolver: &mut dyn ReferenceResolver,
    ) -> Result<Value, MappingError> {
        let schema = match value_type {
            TypeRef::Any => return Ok(any_schema()),
            TypeRef::Array(_) | TypeRef::Collection { .. } => {
                let items = match value_type.element_type() {
                    Some(element) => self.to_schema(key, element, false, resolver)?,
                    None => any_schema(),
                };
                json!({ "type": "array", "items": items })
            }
            TypeRef::Map(values) => {
                let values = match values {
                    Some(values) => self.to_schema(key, values, false, resolver)?,
                    None => Value::Bool(true),
                };
                json!({ "type": "object", "additionalProperties": values })
            }
            TypeRef::Named(id) => {
                let target = lookup(self.model, id)?;
                if target.is_standard() && !target.is_link() {
                    let scalar = target.scalar.ok_or_else(|| MappingError::UnknownType {
                        type_name: id.to_string(),
                    })?;
                    return Ok(scalar.schema(nullable));
                }
                let reference = resolver.reference(&self.nested_key(target, key))?;
                return Ok(nullable_ref(reference, nullable));
            }
        };
        Ok(with_nullable(schema, nullable))
    }

    fn nested_key(&self, target: &TypeDescriptor, host: &SchemaKey) -> SchemaKey {
        let mode = if target.is_enum() || target.is_link() {
            MappingMode::Value
        } else if target.structural {
            MappingMode::Projection
        } else if self.model.is_exposed(&target.name) && host.request != RequestType::Parameter {
            host.mode.nested()
        } else {
            MappingMode::Value
        };
        SchemaKey::new(target.name.clone(), mode, host.request)
    }
}

fn response_key(id: &TypeId, mode: MappingMode) -> SchemaKey {
    SchemaKey::new(id.clone(), mode, RequestType::Response)
}

/// `nullable` cannot sit next to `$ref`, so nullable references are wrapped.
fn nullable_ref(reference: Value, nullable: bool) -> Value {
    if nullable {
        json!({ "nullable": true, "oneOf": [reference] })
    } else {
        reference
    }
}

fn with_nullable(mut schema: Value, nullable: bool) -> Value {
    if nullable {
        if let Value::Object(map) = &mut schema {
            map.insert("nullable".into(), Value::Bool(true));
        }
    }
    schema
}

/// Attach constraints and extensions. Inline shapes take them directly;
/// references and compositions are wrapped in `allOf` for extensions and
/// never receive constraints.
fn decorate(schema: Value, property: &PropertyDescriptor) -> Value {
    let constraints = &property.constraints;
    if constraints.is_empty() && property.extensions.is_empty() {
        return schema;
    }
    let inline = schema.get("type").is_some();
    let string = schema.get("type").and_then(Value::as_str) == Some("string");
    match schema {
        Value::Object(mut map) if inline => {
            if let Some(minimum) = constraints.minimum {
                map.insert("minimum".into(), bound(minimum));
            }
            if let Some(maximum) = constraints.maximum {
                map.insert("maximum".into(), bound(maximum));
            }
            // Length hints only mean something on strings.
            if string {
                if let Some(min_length) = constraints.min_length {
                    map.insert("minLength".into(), json!(min_length));
                }
                if let Some(max_length) = constraints.max_length {
                    map.insert("maxLength".into(), json!(max_length));
                }
            }
            for (name, value) in &property.extensions {
                map.insert(name.clone(), value.clone());
            }
            Value::Object(map)
        }
        other if !property.extensions.is_empty() => {
            let mut wrapper = Map::new();
            wrapper.insert("allOf".into(), json!([other]));
            for (name, value) in &property.extensions {
                wrapper.insert(name.clone(), value.clone());
            }
            Value::Object(wrapper)
        }
        other => other,
    }
}

/// Whole bounds render as integers (`1`, not `1.0`).
fn bound(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
