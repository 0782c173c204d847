//! HATEOAS Schema CLI
//!
//! Command-line interface for generating schema registries from domain models,
//! linting model files and validating payloads.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hateoas_schema::{
    generate, lint, load_config, load_json, load_model_auto, to_json_schema, validate_payload,
    FileStatus, MappingConfig, SchemaRegistry, Severity, ValidateError,
};
use serde_json::Value;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hateoas-schema")]
#[command(about = "Generate HAL/OpenAPI schemas from domain models")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schema registry for a model
    Generate {
        /// Model source: file path or URL (http:// or https://)
        model: String,

        /// Mapping configuration file (defaults when omitted)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Print a single registry entry instead of the whole document
        #[arg(long)]
        entry: Option<String>,

        /// With --entry: print it as a standalone JSON Schema
        #[arg(long, requires = "entry")]
        json_schema: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a payload against a generated schema
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Model source: file path or URL
        #[arg(long, short)]
        model: String,

        /// Registry entry to validate against (e.g. NewAuthorRequest)
        #[arg(long, short)]
        schema: String,

        /// Mapping configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint model files for errors (syntax, broken refs, unmappable types)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,hateoas_schema=info".to_string(),
            2 => "info,hateoas_schema=debug".to_string(),
            _ => "debug,hateoas_schema=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            model,
            config,
            entry,
            json_schema,
            output,
            pretty,
        } => run_generate(GenerateArgs {
            model,
            config,
            entry,
            json_schema,
            output,
            pretty,
        }),

        Commands::Validate {
            payload,
            model,
            schema,
            config,
            json,
        } => run_validate(&payload, &model, &schema, config.as_deref(), json),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load the model and config, then run the generator.
///
/// Errors carry the message and the process exit code.
fn build_registry(
    model_source: &str,
    config: Option<&Path>,
) -> Result<SchemaRegistry, (String, u8)> {
    let config = match config {
        Some(path) => load_config(path)
            .map_err(|e| (format!("loading config: {}", e), e.exit_code() as u8))?,
        None => MappingConfig::default(),
    };
    let model = load_model_auto(model_source)
        .map_err(|e| (format!("loading model: {}", e), e.exit_code() as u8))?;
    generate(&model, &config).map_err(|e| (e.to_string(), e.exit_code() as u8))
}

struct GenerateArgs {
    model: String,
    config: Option<PathBuf>,
    entry: Option<String>,
    json_schema: bool,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_generate(args: GenerateArgs) -> Result<(), u8> {
    let GenerateArgs {
        model,
        config,
        entry,
        json_schema,
        output,
        pretty,
    } = args;

    let registry = build_registry(&model, config.as_deref()).map_err(|(msg, code)| {
        eprintln!("Error: {}", msg);
        code
    })?;

    for failure in registry.failures() {
        eprintln!("Warning: skipped {}: {}", failure.key, failure.error);
    }

    let document = match entry {
        Some(name) if json_schema => to_json_schema(&registry, &name).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?,
        Some(name) => registry.get(&name).cloned().ok_or_else(|| {
            eprintln!("Error: no schema named '{}' in the registry", name);
            2u8
        })?,
        None => registry.to_document(),
    };

    write_json(&document, output.as_deref(), pretty)
}

fn write_json(document: &Value, output: Option<&Path>, pretty: bool) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_validate(
    payload_path: &Path,
    model: &str,
    schema: &str,
    config: Option<&Path>,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_json(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let registry = build_registry(model, config).map_err(|(msg, code)| {
        report_error(json_output, &msg);
        code
    })?;

    match validate_payload(&registry, schema, &payload) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        let output = serde_json::json!({ "valid": false, "error": msg });
        println!("{}", output);
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
