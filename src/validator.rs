//! Payload validation against converted schemas.

use serde_json::Value;

use crate::error::{ConvertError, SchemaError, ValidateError};

/// Validate a runtime payload against a converted schema.
///
/// Collects every violation with its JSON-Pointer path instead of
/// stopping at the first.
///
/// # Errors
///
/// Returns `ValidateError::Convert` when the schema itself cannot be
/// compiled, or `ValidateError::Invalid` listing the violations.
pub fn validate_payload(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        ValidateError::Convert(ConvertError::StructuralParse {
            path: format!("output schema rejected by validator: {}", e),
        })
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "schemaVersion": {"type": "string"},
                "pet": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }
            },
            "required": ["schemaVersion"]
        })
    }

    #[test]
    fn valid_payload_passes() {
        let payload = json!({"schemaVersion": "1.0.0", "pet": {"name": "rex"}});
        assert!(validate_payload(&schema(), &payload).is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let payload = json!({"pet": {"name": "rex"}});
        let result = validate_payload(&schema(), &payload);
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn violations_carry_pointer_paths() {
        let payload = json!({"schemaVersion": 7, "pet": {"name": 42}});
        match validate_payload(&schema(), &payload) {
            Err(ValidateError::Invalid { errors }) => {
                assert_eq!(errors.len(), 2);
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert!(paths.contains(&"/schemaVersion"));
                assert!(paths.contains(&"/pet/name"));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }
}
