//! CLI integration tests for hateoas-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const LIBRARY: &str = "tests/fixtures/library.json";

fn cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hateoas-schema"));
    cmd.env_remove("RUST_LOG");
    cmd
}

// Helper to create a temp model, config or payload file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod generate_command {
    use super::*;

    #[test]
    fn basic_generate() {
        cmd()
            .args(["generate", LIBRARY])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"components":{"schemas":{"#))
            .stdout(predicate::str::contains(r#""AuthorWithLinks""#))
            .stdout(predicate::str::contains(r#""NewBookRequest""#))
            .stdout(predicate::str::contains(r#""Link""#));
    }

    #[test]
    fn generate_with_pretty() {
        cmd()
            .args(["generate", LIBRARY, "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn generate_with_output_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("schemas.json");

        cmd()
            .args(["generate", LIBRARY, "--output", output.to_str().unwrap()])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        let document: serde_json::Value = serde_json::from_str(&content).unwrap();
        let schemas = document["components"]["schemas"].as_object().unwrap();
        assert!(schemas.contains_key("Author"));
        assert!(schemas.contains_key("BookLinks"));
        assert!(schemas.contains_key("Genre"));
        assert!(schemas.contains_key("AddressData"));
    }

    #[test]
    fn generate_output_is_sorted() {
        let output = cmd().args(["generate", LIBRARY]).output().unwrap();
        let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&String> = document["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn generate_single_entry() {
        cmd()
            .args(["generate", LIBRARY, "--entry", "Genre"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"type":"string","enum":["FICTION","HISTORY","SCIENCE"]}"#,
            ));
    }

    #[test]
    fn generate_entry_as_json_schema() {
        cmd()
            .args(["generate", LIBRARY, "--entry", "Book", "--json-schema"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##""$ref":"#/$defs/Book""##))
            .stdout(predicate::str::contains("nullable").not());
    }

    #[test]
    fn json_schema_requires_entry() {
        cmd()
            .args(["generate", LIBRARY, "--json-schema"])
            .assert()
            .failure();
    }

    #[test]
    fn generate_unknown_entry() {
        cmd()
            .args(["generate", LIBRARY, "--entry", "Ghost"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no schema named 'Ghost'"));
    }

    #[test]
    fn generate_with_config() {
        let dir = TempDir::new().unwrap();
        let config = write_temp_file(
            &dir,
            "config.json",
            r#"{"link_type_name": "HalLink", "enum_type_suffix": "Type"}"#,
        );

        cmd()
            .args(["generate", LIBRARY, "--config", config.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""HalLink""#))
            .stdout(predicate::str::contains(r#""GenreType""#));
    }

    #[test]
    fn generate_without_write_schemas() {
        let dir = TempDir::new().unwrap();
        let config = write_temp_file(&dir, "config.json", r#"{"include_write_schemas": false}"#);

        cmd()
            .args(["generate", LIBRARY, "-c", config.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("NewAuthorRequest").not())
            .stdout(predicate::str::contains("BookPatch").not());
    }

    #[test]
    fn verbose_logs_to_stderr() {
        cmd()
            .args(["generate", LIBRARY, "-vv"])
            .assert()
            .success()
            .stderr(predicate::str::contains("queued"))
            .stderr(predicate::str::contains("schema generation finished"));
    }

    #[test]
    fn quiet_by_default() {
        cmd()
            .args(["generate", LIBRARY])
            .assert()
            .success()
            .stderr(predicate::str::is_empty());
    }
}

mod validate_command {
    use super::*;

    fn validate(payload: &std::path::Path, schema: &str) -> Command {
        let mut cmd = cmd();
        cmd.args([
            "validate",
            payload.to_str().unwrap(),
            "--model",
            LIBRARY,
            "--schema",
            schema,
        ]);
        cmd
    }

    #[test]
    fn validate_valid_create_payload() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(
            &dir,
            "book.json",
            r#"{
                "title": "Dune",
                "genre": "FICTION",
                "pages": 412,
                "author": { "name": "Frank Herbert" }
            }"#,
        );

        validate(&payload, "NewBookRequest")
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn validate_unknown_enum_constant() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(
            &dir,
            "book.json",
            r#"{"title": "Dune", "genre": "POETRY", "author": {"name": "Frank Herbert"}}"#,
        );

        validate(&payload, "NewBookRequest")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"))
            .stderr(predicate::str::contains("/genre"));
    }

    #[test]
    fn validate_missing_required_field() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "book.json", r#"{"genre": "FICTION"}"#);

        validate(&payload, "NewBookRequest")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"));
    }

    #[test]
    fn validate_constraint_violation() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "patch.json", r#"{"pages": 0}"#);

        validate(&payload, "BookPatch").assert().code(1);
    }

    #[test]
    fn patch_requires_nothing() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "patch.json", r#"{}"#);

        validate(&payload, "AuthorPatch").assert().success();
    }

    #[test]
    fn validate_json_output_valid() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "patch.json", r#"{"title": "Children of Dune"}"#);

        validate(&payload, "BookPatch")
            .arg("--json")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"valid":true}"#));
    }

    #[test]
    fn validate_json_output_invalid() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "patch.json", r#"{"title": 42}"#);

        validate(&payload, "BookPatch")
            .arg("--json")
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""path":"/title""#));
    }

    #[test]
    fn validate_unknown_schema() {
        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "payload.json", r#"{}"#);

        validate(&payload, "Ghost")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no schema named 'Ghost'"));
    }

    #[test]
    fn validate_json_output_file_error() {
        cmd()
            .args([
                "validate",
                "/nonexistent/payload.json",
                "--model",
                LIBRARY,
                "--schema",
                "Book",
                "--json",
            ])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains("loading payload"));
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn lint_valid_fixture() {
        cmd()
            .args(["lint", LIBRARY])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 files checked, all passed"));
    }

    #[test]
    fn lint_directory_with_broken_model() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "good.json",
            r#"{"types": [{"name": "Node"}], "exposed": ["Node"]}"#,
        );
        write_temp_file(
            &dir,
            "broken.json",
            r#"{"types": [{"name": "Node", "properties": [{"name": "tag", "type": "Tag"}]}], "exposed": ["Node"]}"#,
        );

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E002"))
            .stdout(predicate::str::contains("1 passed, 1 failed"));
    }

    #[test]
    fn lint_json_format() {
        cmd()
            .args(["lint", LIBRARY, "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""files_checked": 1"#))
            .stdout(predicate::str::contains(r#""status": "ok""#));
    }

    #[test]
    fn lint_warnings_pass_unless_strict() {
        let dir = TempDir::new().unwrap();
        let model = write_temp_file(&dir, "model.json", r#"{"types": [{"name": "Node"}]}"#);

        cmd()
            .args(["lint", model.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("W003"));

        cmd()
            .args(["lint", model.to_str().unwrap(), "--strict"])
            .assert()
            .code(1);
    }

    #[test]
    fn lint_quiet_hides_passing_files() {
        cmd()
            .args(["lint", LIBRARY, "--quiet"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Linting").not())
            .stdout(predicate::str::contains("library.json").not());
    }

    #[test]
    fn lint_missing_path() {
        cmd()
            .args(["lint", "/nonexistent/models"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("path not found"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["generate", "/nonexistent/model.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_json_model() {
        let dir = TempDir::new().unwrap();
        let model = write_temp_file(&dir, "model.json", "not valid json");

        cmd()
            .args(["generate", model.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn inconsistent_model() {
        let dir = TempDir::new().unwrap();
        let model = write_temp_file(
            &dir,
            "model.json",
            r#"{"types": [{"name": "Cat", "supertype": "Animal"}]}"#,
        );

        cmd()
            .args(["generate", model.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Animal"));
    }

    #[test]
    fn name_collision_is_fatal() {
        let dir = TempDir::new().unwrap();
        let model = write_temp_file(
            &dir,
            "model.json",
            r#"{"types": [{"name": "a.Node"}, {"name": "b.Node"}], "exposed": ["a.Node", "b.Node"]}"#,
        );

        cmd()
            .args(["generate", model.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("'Node'"));
    }

    #[test]
    fn isolated_failures_are_reported() {
        let dir = TempDir::new().unwrap();
        let model = write_temp_file(
            &dir,
            "model.json",
            r#"{"types": [{"name": "a.Node"}, {"name": "b.Node"}], "exposed": ["a.Node", "b.Node"]}"#,
        );
        let config = write_temp_file(&dir, "config.json", r#"{"isolate_failures": true}"#);

        cmd()
            .args([
                "generate",
                model.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""NodeLinks""#))
            .stderr(predicate::str::contains("Warning: skipped (b.Node"));
    }

    #[test]
    fn config_not_found() {
        cmd()
            .args(["generate", LIBRARY, "--config", "/nonexistent/config.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("loading config"));
    }
}

mod required_args {
    use super::*;

    #[test]
    fn missing_model_path() {
        cmd().arg("generate").assert().failure();
    }

    #[test]
    fn missing_schema_for_validate() {
        cmd()
            .args(["validate", "payload.json", "--model", LIBRARY])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--schema"));
    }

    #[test]
    fn missing_payload_for_validate() {
        cmd()
            .args(["validate", "--model", LIBRARY, "--schema", "Book"])
            .assert()
            .failure();
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Generate HAL/OpenAPI schemas"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("hateoas-schema"));
    }

    #[test]
    fn generate_help() {
        cmd()
            .args(["generate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--config"))
            .stdout(predicate::str::contains("--entry"))
            .stdout(predicate::str::contains("--pretty"));
    }

    #[test]
    fn validate_help() {
        cmd()
            .args(["validate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--model"))
            .stdout(predicate::str::contains("--schema"))
            .stdout(predicate::str::contains("--json"));
    }
}

#[cfg(feature = "remote")]
mod remote {
    use super::*;

    #[test]
    fn generate_from_url() {
        let model = fs::read_to_string(LIBRARY).unwrap();
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/library.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(model)
            .create();

        cmd()
            .args(["generate", &format!("{}/library.json", server.url())])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""BookWithLinks""#));
        mock.assert();
    }

    #[test]
    fn generate_url_404() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing.json").with_status(404).create();

        cmd()
            .args(["generate", &format!("{}/missing.json", server.url())])
            .assert()
            .code(3) // Network errors are exit code 3
            .stderr(predicate::str::contains("404"));
    }

    #[test]
    fn validate_with_remote_model() {
        let model = fs::read_to_string(LIBRARY).unwrap();
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/library.json")
            .with_status(200)
            .with_body(model)
            .create();

        let dir = TempDir::new().unwrap();
        let payload = write_temp_file(&dir, "author.json", r#"{"name": "Ursula K. Le Guin"}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--model",
                &format!("{}/library.json", server.url()),
                "--schema",
                "NewAuthorRequest",
            ])
            .assert()
            .success();
    }
}
