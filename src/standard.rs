//! Built-in scalar types with fixed schema templates.
//!
//! A standard scalar never gets its own registry entry (the hyperlink type
//! aside); its template is inlined wherever a property uses it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Engine-known scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    String,
    Int32,
    Int64,
    Float,
    Double,
    Decimal,
    Boolean,
    DateTime,
    Date,
    Uuid,
    Uri,
    /// Untyped string-keyed map.
    Map,
    /// The universal HAL hyperlink object.
    Link,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 13] = [
        ScalarKind::String,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::Decimal,
        ScalarKind::Boolean,
        ScalarKind::DateTime,
        ScalarKind::Date,
        ScalarKind::Uuid,
        ScalarKind::Uri,
        ScalarKind::Map,
        ScalarKind::Link,
    ];

    /// Look up a scalar by the name used in model documents.
    ///
    /// Accepts the canonical kebab-case name plus a few common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "string" | "text" => ScalarKind::String,
            "int32" | "integer" | "int" => ScalarKind::Int32,
            "int64" | "long" => ScalarKind::Int64,
            "float" => ScalarKind::Float,
            "double" | "number" => ScalarKind::Double,
            "decimal" => ScalarKind::Decimal,
            "boolean" | "bool" => ScalarKind::Boolean,
            "date-time" | "timestamp" | "instant" => ScalarKind::DateTime,
            "date" => ScalarKind::Date,
            "uuid" => ScalarKind::Uuid,
            "uri" | "url" => ScalarKind::Uri,
            "map" => ScalarKind::Map,
            "link" => ScalarKind::Link,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical model-document name.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Boolean => "boolean",
            ScalarKind::DateTime => "date-time",
            ScalarKind::Date => "date",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Uri => "uri",
            ScalarKind::Map => "map",
            ScalarKind::Link => "link",
        }
    }

    /// Simple name used when a scalar has to be named in the registry.
    pub fn simple_name(&self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Int32 => "Integer",
            ScalarKind::Int64 => "Long",
            ScalarKind::Float => "Float",
            ScalarKind::Double => "Double",
            ScalarKind::Decimal => "Decimal",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Date => "Date",
            ScalarKind::Uuid => "Uuid",
            ScalarKind::Uri => "Uri",
            ScalarKind::Map => "Map",
            ScalarKind::Link => "Link",
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ScalarKind::Link)
    }

    /// The fixed template for this scalar.
    pub fn template(&self) -> Value {
        match self {
            ScalarKind::String => json!({ "type": "string" }),
            ScalarKind::Int32 => json!({ "type": "integer", "format": "int32" }),
            ScalarKind::Int64 => json!({ "type": "integer", "format": "int64" }),
            ScalarKind::Float => json!({ "type": "number", "format": "float" }),
            ScalarKind::Double => json!({ "type": "number", "format": "double" }),
            ScalarKind::Decimal => json!({ "type": "number" }),
            ScalarKind::Boolean => json!({ "type": "boolean" }),
            ScalarKind::DateTime => json!({ "type": "string", "format": "date-time" }),
            ScalarKind::Date => json!({ "type": "string", "format": "date" }),
            ScalarKind::Uuid => json!({ "type": "string", "format": "uuid" }),
            ScalarKind::Uri => json!({ "type": "string", "format": "uri" }),
            ScalarKind::Map => json!({ "type": "object", "additionalProperties": true }),
            ScalarKind::Link => link_template(),
        }
    }

    /// The template with an explicit `nullable` flag.
    pub fn schema(&self, nullable: bool) -> Value {
        let mut schema = self.template();
        if let Value::Object(map) = &mut schema {
            map.insert("nullable".to_string(), Value::Bool(nullable));
        }
        schema
    }
}

/// Schema of the wildcard "any JSON value" type.
///
/// There is no array branch; generated documents have always looked like this.
pub fn any_schema() -> Value {
    json!({
        "nullable": true,
        "oneOf": [
            { "type": "boolean" },
            { "type": "object" },
            { "type": "number" },
            { "type": "string" }
        ]
    })
}

fn link_template() -> Value {
    json!({
        "type": "object",
        "required": ["href"],
        "properties": {
            "href": { "type": "string" },
            "templated": { "type": "boolean" },
            "type": { "type": "string" },
            "deprecation": { "type": "string" },
            "profile": { "type": "string" },
            "name": { "type": "string" },
            "title": { "type": "string" },
            "hreflang": { "type": "string" }
        }
    })
}
