//! CLI integration tests for the api-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("api-schema"))
}

// Helper to create a temp document file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PETSTORE: &str = r##"{
    "swagger": "2.0",
    "info": {"title": "Petstore", "version": "1.0.0"},
    "paths": {
        "/pets": {
            "get": {
                "responses": {
                    "200": {
                        "description": "A list of pets.",
                        "schema": {
                            "type": "array",
                            "items": {"$ref": "#/definitions/Pet"}
                        }
                    }
                }
            }
        }
    },
    "definitions": {
        "Pet": {
            "type": "object",
            "properties": {
                "name": {"type": "string", "required": true}
            }
        }
    }
}"##;

mod convert_command {
    use super::*;

    #[test]
    fn basic_convert() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);

        cmd()
            .args(["convert", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""arrayOfPet""#))
            .stdout(predicate::str::contains(r#""schemaVersion""#));
    }

    #[test]
    fn convert_inlines_refs_by_default() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);

        cmd()
            .args(["convert", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("$ref").not())
            .stdout(predicate::str::contains(r#""required":["name"]"#));
    }

    #[test]
    fn convert_keeps_refs_when_disabled() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);

        cmd()
            .args(["convert", doc.to_str().unwrap(), "--no-resolve-refs"])
            .assert()
            .success()
            .stdout(predicate::str::contains("#/definitions/Pet"));
    }

    #[test]
    fn convert_accepts_yaml_documents() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.yaml",
            "swagger: '2.0'\ninfo:\n  title: Yaml Petstore\n  version: '1.0'\npaths: {}\n",
        );

        cmd()
            .args(["convert", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Yaml Petstore"));
    }

    #[test]
    fn convert_with_pretty() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);

        cmd()
            .args(["convert", doc.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn convert_with_output_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);
        let output = dir.path().join("schema.json");

        cmd()
            .args([
                "convert",
                doc.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""arrayOfPet""#));
    }

    #[test]
    fn convert_sets_id_and_schema_uri() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);

        cmd()
            .args([
                "convert",
                doc.to_str().unwrap(),
                "--id",
                "https://example.com/petstore.json",
                "--schema-uri",
                "https://example.com/meta",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("https://example.com/petstore.json"))
            .stdout(predicate::str::contains("https://example.com/meta"));
    }

    #[test]
    fn unsupported_document_exits_2() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r#"{"raml": "1.0"}"#);

        cmd()
            .args(["convert", doc.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported document"));
    }

    #[test]
    fn missing_file_exits_3() {
        cmd()
            .args(["convert", "/nonexistent/api.yaml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn broken_external_ref_exits_3() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r#"{
                "swagger": "2.0",
                "info": {"title": "T", "version": "1"},
                "paths": {
                    "/a": {
                        "get": {
                            "responses": {
                                "200": {"x": {"$ref": "missing.yaml"}}
                            }
                        }
                    }
                }
            }"#,
        );

        cmd()
            .args(["convert", doc.to_str().unwrap()])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("missing.yaml"));
    }

    #[cfg(feature = "remote")]
    #[test]
    fn convert_from_url() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api.json")
            .with_status(200)
            .with_body(PETSTORE)
            .create();

        cmd()
            .args(["convert", &format!("{}/api.json", server.url())])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""arrayOfPet""#));
        mock.assert();
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_payload_passes() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);
        let payload = write_temp_file(
            &dir,
            "payload.json",
            r#"{"schemaVersion": "1.0.0", "arrayOfPet": [{"name": "rex"}]}"#,
        );

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                payload.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn invalid_payload_exits_1() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);
        let payload = write_temp_file(
            &dir,
            "payload.json",
            r#"{"arrayOfPet": [{"name": 42}]}"#,
        );

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                payload.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"));
    }

    #[test]
    fn invalid_payload_json_report() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);
        let payload = write_temp_file(&dir, "payload.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                doc.to_str().unwrap(),
                payload.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains("schemaVersion"));
    }

    #[test]
    fn missing_payload_exits_3() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", PETSTORE);

        cmd()
            .args(["validate", doc.to_str().unwrap(), "/nonexistent.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("loading payload"));
    }
}
