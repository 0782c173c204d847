//! HATEOAS Schema Generator
//!
//! Compiles a domain type model into a registry of OpenAPI 3.0 schema objects
//! for a hypermedia (HAL) REST API.
//!
//! Each domain type is rendered once per *presentation mode* (value object,
//! exposed resource, links block, ...) and *request type* (response, create,
//! update, patch, parameter). Types reference each other through
//! `#/components/schemas/{name}` pointers; generation follows those
//! references through a work queue until every referenced schema exists.
//!
//! # Example
//!
//! ```
//! use hateoas_schema::{generate, load_model_str, MappingConfig};
//!
//! let model = load_model_str(r#"{
//!     "types": [{
//!         "name": "com.example.Node",
//!         "properties": [
//!             { "name": "id", "type": "uuid", "generated": true },
//!             { "name": "value", "type": "string", "nullable": "no" },
//!             { "name": "parent", "type": "com.example.Node", "nullable": "yes" }
//!         ]
//!     }],
//!     "exposed": ["com.example.Node"]
//! }"#).unwrap();
//!
//! let registry = generate(&model, &MappingConfig::default()).unwrap();
//!
//! // The exposed resource, its links block and the combined HAL body
//! assert!(registry.contains("Node"));
//! assert!(registry.contains("NodeLinks"));
//! assert!(registry.contains("NodeWithLinks"));
//!
//! // Associations to exposed resources leave the response body for the links block
//! let node = registry.get("Node").unwrap();
//! assert!(node["properties"].get("parent").is_none());
//! let links = &registry.get("NodeLinks").unwrap()["properties"]["_links"]["properties"];
//! assert_eq!(links["parent"]["$ref"], "#/components/schemas/Link");
//! ```
//!
//! # Naming
//!
//! | Mode | Response | Create | Update | Patch |
//! |------|----------|--------|--------|-------|
//! | value | `NodeData` | `NewNodeDataRequest` | `NodeDataRequest` | `NodeDataPatch` |
//! | exposed | `Node` | `NewNodeRequest` | `NodeRequest` | `NodePatch` |
//! | links | `NodeLinks` | | | |
//! | with links | `NodeWithLinks` | | | |
//!
//! Enums and the hyperlink type ignore mode and request type and get a single
//! entry each. All affixes are configurable through [`MappingConfig`].

mod config;
mod error;
mod linter;
mod loader;
mod mapper;
mod model;
mod naming;
mod policy;
mod registry;
mod standard;
mod types;
mod validator;

pub use config::{Affix, MappingConfig, ModeAffixes, RequestAffixes};
pub use error::{LoadError, MappingError, ModelError, SchemaError, ValidateError};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{is_url, load_config, load_json, load_model, load_model_auto, load_model_str};
pub use mapper::SchemaMapper;
pub use model::{
    Constraints, DomainModel, InheritanceMember, InheritanceTree, ModelDocument,
    NullSerialization, Nullability, ProjectionDescriptor, PropertyDescriptor, TypeDescriptor,
    TypeId, TypeKind, TypeRef, DEFAULT_DISCRIMINATOR_COLUMN,
};
pub use naming::{
    canonical_key, canonical_name, check_key, ref_path, ref_schema, referenced_names,
    NamingResolver, ReferenceResolver, SCHEMA_REF_PREFIX,
};
pub use policy::{is_nullable, is_property_included, is_required};
pub use registry::{generate, Failure, SchemaGenerator, SchemaRegistry};
pub use standard::{any_schema, ScalarKind};
pub use types::{MappingMode, RequestType, SchemaKey};
pub use validator::{to_json_schema, validate_against_schema, validate_payload};

#[cfg(feature = "remote")]
pub use loader::load_model_url;
