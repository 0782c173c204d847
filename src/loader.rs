//! Model and configuration loading from files, strings and HTTP URLs.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::MappingConfig;
use crate::error::LoadError;
use crate::model::{DomainModel, ModelDocument};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Read a file to a string.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::ReadError` if it can't be read.
fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(content: &str) -> Result<T, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load any JSON document from a file path.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    parse(&read_file(path)?)
}

/// Load and check a model from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` / `ReadError` for I/O problems,
/// `LoadError::InvalidJson` if the file isn't a model document,
/// or `LoadError::InvalidModel` if the model fails its integrity checks.
pub fn load_model(path: &Path) -> Result<DomainModel, LoadError> {
    load_model_str(&read_file(path)?)
}

/// Load and check a model from a JSON string.
pub fn load_model_str(content: &str) -> Result<DomainModel, LoadError> {
    let document: ModelDocument = parse(content)?;
    Ok(DomainModel::new(document)?)
}

/// Load a mapping configuration from a file path.
///
/// Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<MappingConfig, LoadError> {
    parse(&read_file(path)?)
}

/// Load and check a model from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the body isn't
/// a model document, or `LoadError::InvalidModel` if the model is inconsistent.
#[cfg(feature = "remote")]
pub fn load_model_url(url: &str) -> Result<DomainModel, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    let response = client.get(url).send().map_err(network)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network)?;

    let document: ModelDocument = response.json().map_err(network)?;
    Ok(DomainModel::new(document)?)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a model from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_model_auto(source: &str) -> Result<DomainModel, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_model_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_model(Path::new(source))
    }
}
