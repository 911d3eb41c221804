//! Intent validation against `schemas/intent.schema.json`.

use crate::error::PlannerError;
use jsonschema::Validator;
use serde_json::Value;
use std::sync::LazyLock;

const INTENT_SCHEMA: &str = include_str!("../../../schemas/intent.schema.json");

static VALIDATOR: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(INTENT_SCHEMA).map_err(|e| e.to_string())?;
    jsonschema::draft202012::options()
        .build(&schema)
        .map_err(|e| e.to_string())
});

/// Check a candidate intent. All violations are joined into one message.
pub fn validate_intent(instance: &Value) -> Result<(), PlannerError> {
    let validator = VALIDATOR
        .as_ref()
        .map_err(|e| PlannerError::Schema(format!("schema failed to compile: {}", e)))?;

    if validator.is_valid(instance) {
        return Ok(());
    }
    let msgs: Vec<String> = validator
        .iter_errors(instance)
        .take(20)
        .map(|err| {
            let path = err.instance_path().to_string();
            let location = if path.is_empty() { "(root)".to_string() } else { path };
            format!("{}: {}", location, err)
        })
        .collect();
    Err(PlannerError::Schema(msgs.join("; ")))
}
