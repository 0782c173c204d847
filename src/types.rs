//! Core types: presentation modes, request contexts and schema keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Affix, ModeAffixes, RequestAffixes};
use crate::model::{TypeDescriptor, TypeId};

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Presentation variant requested for a type's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Plain data shape: nested non-exposed types, enums, parameters.
    Value,
    /// The resource's own fields; nested exposed entities are left to `Links`.
    Exposed,
    /// HAL `_links` block.
    Links,
    /// `Exposed` and `Links` composed.
    WithLinks,
    /// Properties of an inheritance hierarchy base.
    InheritanceBase,
    /// Base reference plus the subtype's own properties.
    InheritanceChild,
    /// A named projection of an entity.
    Projection,
    /// One of the resource or any of its projections, composed with `Links`.
    WithProjections,
}

impl MappingMode {
    pub const ALL: [MappingMode; 8] = [
        MappingMode::Value,
        MappingMode::Exposed,
        MappingMode::Links,
        MappingMode::WithLinks,
        MappingMode::InheritanceBase,
        MappingMode::InheritanceChild,
        MappingMode::Projection,
        MappingMode::WithProjections,
    ];

    /// Name affixes for this mode.
    pub fn affix<'a>(&self, affixes: &'a ModeAffixes) -> &'a Affix {
        match self {
            MappingMode::Value => &affixes.value,
            MappingMode::Exposed => &affixes.exposed,
            MappingMode::Links => &affixes.links,
            MappingMode::WithLinks => &affixes.with_links,
            MappingMode::InheritanceBase => &affixes.inheritance_base,
            MappingMode::InheritanceChild => &affixes.inheritance_child,
            MappingMode::Projection => &affixes.projection,
            MappingMode::WithProjections => &affixes.with_projections,
        }
    }

    /// `Projection` needs a structural type; every other mode a concrete one.
    pub fn is_compatible_with(&self, ty: &TypeDescriptor) -> bool {
        match self {
            MappingMode::Projection => ty.structural,
            _ => !ty.structural,
        }
    }

    /// Whether properties pointing at exposed entities are rendered inline
    /// (as references) rather than left to the links block.
    pub fn exposes_nested_entities(&self) -> bool {
        matches!(self, MappingMode::Value | MappingMode::Projection)
    }

    /// Mode used for a reference to an exposed entity nested in this mode.
    pub fn nested(&self) -> MappingMode {
        if self.exposes_nested_entities() {
            MappingMode::Value
        } else {
            MappingMode::Exposed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MappingMode::Value => "value",
            MappingMode::Exposed => "exposed",
            MappingMode::Links => "links",
            MappingMode::WithLinks => "with_links",
            MappingMode::InheritanceBase => "inheritance_base",
            MappingMode::InheritanceChild => "inheritance_child",
            MappingMode::Projection => "projection",
            MappingMode::WithProjections => "with_projections",
        }
    }

    /// Parse a mode name. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|mode| mode.as_str() == s)
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read/write context a schema is generated for.
///
/// Governs the required-field policy and which fields are writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Response,
    Create,
    Update,
    Patch,
    /// Part of a URL parameter.
    Parameter,
}

impl RequestType {
    pub const ALL: [RequestType; 5] = [
        RequestType::Response,
        RequestType::Create,
        RequestType::Update,
        RequestType::Patch,
        RequestType::Parameter,
    ];

    /// Name affixes for this request type.
    pub fn affix<'a>(&self, affixes: &'a RequestAffixes) -> &'a Affix {
        match self {
            RequestType::Response => &affixes.response,
            RequestType::Create => &affixes.create,
            RequestType::Update => &affixes.update,
            RequestType::Patch => &affixes.patch,
            RequestType::Parameter => &affixes.parameter,
        }
    }

    /// Patches are partial: nothing is ever required.
    pub fn never_required(&self) -> bool {
        matches!(self, RequestType::Patch)
    }

    /// Server-generated values are only present in responses.
    pub fn generated_values_present(&self) -> bool {
        matches!(self, RequestType::Response)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Response => "response",
            RequestType::Create => "create",
            RequestType::Update => "update",
            RequestType::Patch => "patch",
            RequestType::Parameter => "parameter",
        }
    }

    /// Parse a request type name. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|request| request.as_str() == s)
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one schema node: `(type, mode, request type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey {
    pub type_id: TypeId,
    pub mode: MappingMode,
    pub request: RequestType,
}

impl SchemaKey {
    pub fn new(type_id: impl Into<TypeId>, mode: MappingMode, request: RequestType) -> Self {
        Self {
            type_id: type_id.into(),
            mode,
            request,
        }
    }

    /// Same type and request type, different mode.
    pub fn with_mode(&self, mode: MappingMode) -> Self {
        Self {
            type_id: self.type_id.clone(),
            mode,
            request: self.request,
        }
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.type_id, self.mode, self.request)
    }
}
