//! JSON Schema loading for capability tables.
//!
//! The table schema ships inside the binary so validation never depends on
//! the working directory. The `schema_version` const embedded in the schema
//! is the only table format this build accepts.

use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

const TABLE_SCHEMA_JSON: &str = include_str!("../schema/capability_table.schema.json");
const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

impl SchemaLoadResult {
    /// Validate `instance`, joining every violation into one error.
    pub fn validate(&self, instance: &Value, origin: &str) -> Result<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{path}: {err}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{origin} failed schema validation:\n{details}");
        }
        Ok(())
    }
}

/// Compile the embedded capability table schema.
pub(crate) fn load_table_schema() -> Result<SchemaLoadResult> {
    let schema: Value = serde_json::from_str(TABLE_SCHEMA_JSON)
        .map_err(|err| anyhow!("parsing embedded table schema: {err}"))?;
    compile_schema(&schema, "embedded table schema")
}

pub(crate) fn compile_schema(schema: &Value, origin: &str) -> Result<SchemaLoadResult> {
    let schema_version = extract_schema_version(schema, SCHEMA_VERSION_POINTER)
        .ok_or_else(|| anyhow!("{origin} missing schema_version const"))?;
    let compiled =
        JSONSchema::compile(schema).map_err(|err| anyhow!("compiling {origin}: {err}"))?;
    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
