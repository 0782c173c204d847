//! Error types for model loading, schema generation and payload validation.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{MappingMode, RequestType, SchemaKey};

/// Integrity errors in a domain model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("type '{name}' is declared more than once")]
    DuplicateType { name: String },

    #[error("{context} references unknown type '{name}'")]
    UnknownType { context: String, name: String },

    #[error("supertype chain of '{name}' is cyclic")]
    SupertypeCycle { name: String },

    #[error("standard type '{name}' does not name a scalar")]
    MissingScalar { name: String },

    #[error("type '{name}' belongs to hierarchies '{first}' and '{second}'")]
    OverlappingHierarchy {
        name: String,
        first: String,
        second: String,
    },

    #[error("type '{member}' is listed in hierarchy '{base}' but does not extend it")]
    NotASubtype { member: String, base: String },

    #[error("projection '{projection}' is not a structural type")]
    ProjectionNotStructural { projection: String },
}

impl ModelError {
    /// Short code used by the linter.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::DuplicateType { .. } | ModelError::UnknownType { .. } => "E002",
            ModelError::ProjectionNotStructural { .. } => "E004",
            _ => "E003",
        }
    }
}

/// Errors raised while mapping schema keys.
///
/// All of them are programmer or data errors: nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("mode {mode} is not compatible with type '{type_name}'")]
    IncompatibleMode {
        mode: MappingMode,
        type_name: String,
    },

    #[error(
        "mode {mode} cannot be used for {request} of '{type_name}': entities are passed as identifiers"
    )]
    InvalidRequestContext {
        mode: MappingMode,
        request: RequestType,
        type_name: String,
    },

    #[error("cannot map type '{type_name}' of property '{owner}.{property}'")]
    UnmappableType {
        type_name: String,
        owner: String,
        property: String,
    },

    #[error("unknown type '{type_name}'")]
    UnknownType { type_name: String },

    #[error("type '{type_name}' is mapped as an inheritance child but belongs to no hierarchy")]
    MissingInheritanceEntry { type_name: String },

    #[error("schema name '{name}' is produced by both {first} and {second}")]
    NameCollision {
        name: String,
        first: SchemaKey,
        second: SchemaKey,
    },
}

impl MappingError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading models, configuration or payloads.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during payload validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("no schema named '{name}' in the registry")]
    UnknownSchema { name: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Invalid { .. } => 1,
            _ => 2,
        }
    }
}
