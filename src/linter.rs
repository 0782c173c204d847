//! Model linting - static analysis of model files.
//!
//! Checks model files for:
//! - JSON syntax and document shape errors
//! - References to undeclared types
//! - Supertype, hierarchy and projection integrity
//! - Keys the generator cannot map

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::MappingConfig;
use crate::error::ModelError;
use crate::loader::load_json;
use crate::model::{DomainModel, ModelDocument};
use crate::registry::generate;
use crate::types::json_type_name;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/types/2/constants")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
/// Returns aggregated results for all files.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_model_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single model file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut diagnostics = Vec::new();
    check_file(file, &mut diagnostics);

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status,
        diagnostics,
    }
}

fn check_file(file: &Path, diagnostics: &mut Vec<Diagnostic>) {
    let mut report = |severity, code: &str, path: String, message: String| {
        diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: file.to_path_buf(),
            path,
            message,
        });
    };

    // Try to load the file (checks syntax)
    let raw = match load_json(file) {
        Ok(raw) => raw,
        Err(e) => {
            report(Severity::Error, "E001", "/".into(), format!("syntax error: {}", e));
            return;
        }
    };

    if !raw.is_object() {
        report(
            Severity::Error,
            "E001",
            "/".into(),
            format!("expected object, got {}", json_type_name(&raw)),
        );
        return;
    }

    let document: ModelDocument = match serde_json::from_value(raw) {
        Ok(document) => document,
        Err(e) => {
            report(
                Severity::Error,
                "E001",
                "/".into(),
                format!("invalid model document: {}", e),
            );
            return;
        }
    };

    for (i, ty) in document.types.iter().enumerate() {
        if ty.is_enum() && ty.constants.is_empty() {
            report(
                Severity::Warning,
                "W001",
                format!("/types/{}/constants", i),
                format!("enum '{}' has no constants", ty.name),
            );
        }
    }

    if document.exposed.is_empty() {
        report(
            Severity::Warning,
            "W003",
            "/exposed".into(),
            "no exposed types: nothing will be generated".into(),
        );
    }

    let issues = document.issues();
    for issue in &issues {
        report(
            Severity::Error,
            issue.code(),
            issue_path(&document, issue),
            issue.to_string(),
        );
    }
    if !issues.is_empty() {
        return;
    }

    let model = match DomainModel::new(document) {
        Ok(model) => model,
        Err(e) => {
            report(Severity::Error, e.code(), "/".into(), e.to_string());
            return;
        }
    };

    for (i, tree) in model.hierarchies().iter().enumerate() {
        let column = tree.discriminator_column();
        let has_values = tree.closure().any(|m| m.discriminator_value.is_some());
        let matched = model
            .properties_of(&tree.base)
            .iter()
            .any(|p| p.column_name().eq_ignore_ascii_case(column));
        if has_values && !matched {
            report(
                Severity::Warning,
                "W002",
                format!("/inheritance/{}", i),
                format!(
                    "no property of '{}' maps to discriminator column '{}'",
                    tree.base, column
                ),
            );
        }
    }

    let config = MappingConfig::default().isolate_failures(true);
    match generate(&model, &config) {
        Ok(registry) => {
            for failure in registry.failures() {
                report(
                    Severity::Error,
                    "E005",
                    "/".into(),
                    format!("cannot generate {}: {}", failure.key, failure.error),
                );
            }
        }
        Err(e) => report(Severity::Error, "E005", "/".into(), e.to_string()),
    }
}

/// JSON path of the type an issue is about, or the document root.
fn issue_path(document: &ModelDocument, issue: &ModelError) -> String {
    let type_name = match issue {
        ModelError::DuplicateType { name } => {
            return document
                .types
                .iter()
                .rposition(|t| t.name.as_str() == name)
                .map(|i| format!("/types/{}", i))
                .unwrap_or_else(|| "/".to_string());
        }
        ModelError::SupertypeCycle { name } | ModelError::MissingScalar { name } => name,
        ModelError::NotASubtype { member, .. } => member,
        ModelError::OverlappingHierarchy { second, .. } => {
            return document
                .inheritance
                .iter()
                .rposition(|t| t.base.as_str() == second)
                .map(|i| format!("/inheritance/{}", i))
                .unwrap_or_else(|| "/".to_string());
        }
        ModelError::ProjectionNotStructural { projection } => {
            return document
                .projections
                .iter()
                .position(|p| p.name == *projection)
                .map(|i| format!("/projections/{}", i))
                .unwrap_or_else(|| "/".to_string());
        }
        ModelError::UnknownType { .. } => return "/".to_string(),
    };
    document
        .types
        .iter()
        .position(|t| t.name.as_str() == type_name)
        .map(|i| format!("/types/{}", i))
        .unwrap_or_else(|| "/".to_string())
}

/// Collect all .json files in a path (file or directory).
fn collect_model_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn codes(result: &FileResult) -> Vec<&str> {
        result.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    fn lint_str(content: &str) -> FileResult {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        lint_file(file.path(), file.path().parent().unwrap())
    }

    #[test]
    fn lint_valid_model() {
        let result = lint_str(
            r#"{
            "types": [
                { "name": "Node", "properties": [
                    { "name": "id", "type": "uuid", "generated": true },
                    { "name": "parent", "type": "Node", "nullable": "yes" }
                ] }
            ],
            "exposed": ["Node"]
        }"#,
        );
        assert_eq!(result.status, FileStatus::Ok);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn lint_invalid_json_syntax() {
        let result = lint_str("{ not valid json }");
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(codes(&result), vec!["E001"]);
    }

    #[test]
    fn lint_wrong_document_shape() {
        let result = lint_str(r#"["Node"]"#);
        assert_eq!(codes(&result), vec!["E001"]);
        assert!(result.diagnostics[0].message.contains("got array"));

        let result = lint_str(r#"{"types": [{"properties": []}]}"#);
        assert_eq!(codes(&result), vec!["E001"]);
    }

    #[test]
    fn lint_unknown_type_reference() {
        let result = lint_str(
            r#"{
            "types": [
                { "name": "Order", "properties": [{ "name": "customer", "type": "Customer" }] }
            ],
            "exposed": ["Order"]
        }"#,
        );
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(codes(&result), vec!["E002"]);
        assert!(result.diagnostics[0].message.contains("Customer"));
    }

    #[test]
    fn lint_hierarchy_integrity() {
        let result = lint_str(
            r#"{
            "types": [
                { "name": "Animal" },
                { "name": "Rock" }
            ],
            "exposed": ["Animal"],
            "inheritance": [{ "base": "Animal", "members": [{ "type": "Rock" }] }]
        }"#,
        );
        assert_eq!(codes(&result), vec!["E003"]);
        assert_eq!(result.diagnostics[0].path, "/types/1");
    }

    #[test]
    fn lint_projection_not_structural() {
        let result = lint_str(
            r#"{
            "types": [{ "name": "Node" }, { "name": "NodeSummary" }],
            "exposed": ["Node"],
            "projections": [{ "name": "summary", "projection": "NodeSummary", "targets": ["Node"] }]
        }"#,
        );
        assert_eq!(codes(&result), vec!["E004"]);
        assert_eq!(result.diagnostics[0].path, "/projections/0");
    }

    #[test]
    fn lint_generation_failure() {
        let result = lint_str(
            r#"{
            "types": [{ "name": "a.Node" }, { "name": "b.Node" }],
            "exposed": ["a.Node", "b.Node"]
        }"#,
        );
        assert_eq!(result.status, FileStatus::Error);
        assert!(codes(&result).iter().all(|c| *c == "E005"));
        assert!(result.diagnostics[0].message.contains("'Node'"));
    }

    #[test]
    fn lint_warnings() {
        let result = lint_str(
            r#"{
            "types": [
                { "name": "Status", "kind": "enum" },
                { "name": "Animal", "properties": [{ "name": "kind", "type": "string" }] },
                { "name": "Dog", "supertype": "Animal" }
            ],
            "inheritance": [{ "base": "Animal", "members": [{ "type": "Dog", "discriminator_value": "dog" }] }]
        }"#,
        );
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(codes(&result), vec!["W001", "W003", "W002"]);
        assert_eq!(result.diagnostics[0].path, "/types/0/constants");
    }

    #[test]
    fn lint_directory() {
        let dir = tempdir().unwrap();

        let valid_path = dir.path().join("valid.json");
        std::fs::write(
            &valid_path,
            r#"{"types": [{"name": "Node"}], "exposed": ["Node"]}"#,
        )
        .unwrap();

        let invalid_path = dir.path().join("invalid.json");
        std::fs::write(&invalid_path, "{ not json }").unwrap();

        let ignored_path = dir.path().join("notes.txt");
        std::fs::write(&ignored_path, "not a model").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.is_ok());
    }

    #[test]
    fn lint_strict_mode() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("model.json");
        // Warning only: empty exposed set
        std::fs::write(&file_path, r#"{"types": [{"name": "Node"}]}"#).unwrap();

        let result = lint(&file_path, false);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 0);

        let result = lint(&file_path, true);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.passed, 0);
        assert_eq!(result.failed, 1);
    }
}
