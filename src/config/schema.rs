//! JSON Schema validation for settings files

use anyhow::{Result, anyhow};
use serde_json::Value;

/// Embedded settings schema
pub const SCHEMA: &str = include_str!("../../docs/settings.schema.json");

/// Compile the embedded JSON schema
pub fn get_schema() -> Result<jsonschema::Validator> {
    let schema: Value = serde_json::from_str(SCHEMA)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {e}"))?;

    jsonschema::draft7::new(&schema).map_err(|e| anyhow!("Failed to compile JSON schema: {e}"))
}

/// Validate a settings value against the schema
pub fn validate_against_schema(settings: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(settings)
        .map(|e| format!("  - Path '{}': {e}", e.instance_path))
        .collect();

    if !error_messages.is_empty() {
        return Err(anyhow!(
            "Settings validation failed:\n{}",
            error_messages.join("\n")
        ));
    }

    Ok(())
}
