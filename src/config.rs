//! Mapping configuration: naming affixes and output toggles.
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

/// A name prefix/suffix pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Affix {
    pub prefix: String,
    pub suffix: String,
}

impl Affix {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(prefix, "")
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::new("", suffix)
    }
}

/// Affixes per [`MappingMode`](crate::MappingMode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeAffixes {
    pub value: Affix,
    pub exposed: Affix,
    pub links: Affix,
    pub with_links: Affix,
    pub inheritance_base: Affix,
    pub inheritance_child: Affix,
    pub projection: Affix,
    pub with_projections: Affix,
}

impl Default for ModeAffixes {
    fn default() -> Self {
        Self {
            value: Affix::suffix("Data"),
            exposed: Affix::default(),
            links: Affix::suffix("Links"),
            with_links: Affix::suffix("WithLinks"),
            inheritance_base: Affix::prefix("Base"),
            inheritance_child: Affix::suffix("Subtype"),
            projection: Affix::default(),
            with_projections: Affix::suffix("WithProjections"),
        }
    }
}

/// Affixes per [`RequestType`](crate::RequestType).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestAffixes {
    pub response: Affix,
    pub create: Affix,
    pub update: Affix,
    pub patch: Affix,
    pub parameter: Affix,
}

impl Default for RequestAffixes {
    fn default() -> Self {
        Self {
            response: Affix::default(),
            create: Affix::new("New", "Request"),
            update: Affix::suffix("Request"),
            patch: Affix::suffix("Patch"),
            parameter: Affix::suffix("Parameter"),
        }
    }
}

/// Options for schema generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub modes: ModeAffixes,
    pub requests: RequestAffixes,
    /// Appended to every enum name.
    pub enum_type_suffix: String,
    /// Registry name of the universal hyperlink schema.
    pub link_type_name: String,
    /// Decorate links with `x-linked-entity` naming the linked resource schema.
    pub add_x_linked_entity: bool,
    /// Decorate object and enum schemas with `x-source-type-name`.
    pub add_x_source_type_name: bool,
    /// Seed create/update/patch request bodies for every exposed type.
    pub include_write_schemas: bool,
    /// Record failing keys and keep going instead of aborting the run.
    pub isolate_failures: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            modes: ModeAffixes::default(),
            requests: RequestAffixes::default(),
            enum_type_suffix: String::new(),
            link_type_name: "Link".to_string(),
            add_x_linked_entity: false,
            add_x_source_type_name: false,
            include_write_schemas: true,
            isolate_failures: false,
        }
    }
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linked_entity(mut self, enabled: bool) -> Self {
        self.add_x_linked_entity = enabled;
        self
    }

    pub fn source_type_name(mut self, enabled: bool) -> Self {
        self.add_x_source_type_name = enabled;
        self
    }

    pub fn write_schemas(mut self, enabled: bool) -> Self {
        self.include_write_schemas = enabled;
        self
    }

    pub fn isolate_failures(mut self, enabled: bool) -> Self {
        self.isolate_failures = enabled;
        self
    }
}
