//! API Schema CLI
//!
//! Command-line interface for converting API documents to JSON Schema
//! and validating payloads against the result.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use api_schema::{
    convert, load_document, load_document_auto, validate_payload, ConvertOptions, ValidateError,
};

#[derive(Parser)]
#[command(name = "api-schema")]
#[command(about = "Convert Swagger 2, OpenAPI 3 and AsyncAPI 2 documents into JSON Schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an API document to a JSON Schema
    Convert {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// Keep $ref pointers literal instead of resolving and inlining them
        #[arg(long)]
        no_resolve_refs: bool,

        /// Value for the output $schema field
        #[arg(long)]
        schema_uri: Option<String>,

        /// Value for the output $id field (omitted if not given)
        #[arg(long)]
        id: Option<String>,

        /// Allow properties not listed in the schema
        #[arg(long)]
        additional_properties: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a payload against a converted document
    Validate {
        /// Document source: file path or URL
        document: String,

        /// Payload file to validate
        payload: PathBuf,

        /// Keep $ref pointers literal instead of resolving and inlining them
        #[arg(long)]
        no_resolve_refs: bool,

        /// Allow properties not listed in the schema
        #[arg(long)]
        additional_properties: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            document,
            no_resolve_refs,
            schema_uri,
            id,
            additional_properties,
            output,
            pretty,
        } => run_convert(
            &document,
            no_resolve_refs,
            schema_uri,
            id,
            additional_properties,
            output,
            pretty,
        ),

        Commands::Validate {
            document,
            payload,
            no_resolve_refs,
            additional_properties,
            json,
        } => run_validate(
            &document,
            &payload,
            no_resolve_refs,
            additional_properties,
            json,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Build conversion options, anchoring relative references next to the
/// source document.
fn build_options(
    document_source: &str,
    no_resolve_refs: bool,
    additional_properties: bool,
) -> ConvertOptions {
    let root_dir = Path::new(document_source)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ConvertOptions::new()
        .resolve_refs(!no_resolve_refs)
        .additional_properties(additional_properties)
        .root_dir(root_dir)
}

fn convert_source(
    document_source: &str,
    options: &ConvertOptions,
) -> Result<serde_json::Value, u8> {
    let doc = load_document_auto(document_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let converted = convert(doc, options, &api_schema::FsLoader).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    converted.ok_or_else(|| {
        eprintln!(
            "Error: unsupported document: expected swagger 2.x, openapi 3.x or asyncapi 2.x"
        );
        2u8
    })
}

#[allow(clippy::too_many_arguments)]
fn run_convert(
    document_source: &str,
    no_resolve_refs: bool,
    schema_uri: Option<String>,
    id: Option<String>,
    additional_properties: bool,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let mut options = build_options(document_source, no_resolve_refs, additional_properties);
    if let Some(uri) = schema_uri {
        options = options.schema_uri(uri);
    }
    if let Some(id) = id {
        options = options.id(id);
    }

    let schema = convert_source(document_source, &options)?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&schema)
    } else {
        serde_json::to_string(&schema)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
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
    document_source: &str,
    payload_path: &Path,
    no_resolve_refs: bool,
    additional_properties: bool,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_document(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let options = build_options(document_source, no_resolve_refs, additional_properties);
    let schema = convert_source(document_source, &options)?;

    match validate_payload(&schema, &payload) {
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
                let report = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", report);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(ValidateError::Convert(e)) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!(r#"{{"valid":false,"error":"{}"}}"#, msg);
    } else {
        eprintln!("Error: {}", msg);
    }
}
