//! # Validate Subcommand
//!
//! Validates one value against a component schema of a document and
//! prints either the validated value (defaults applied, raw text coerced)
//! or the error tree, both as JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use oasv_core::{CompileError, Field};
use oasv_schema::{FormatRegistry, SchemaCompiler};
use serde_json::Value;

/// Arguments for `oasv validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// OpenAPI document, YAML or JSON.
    #[arg(long, value_name = "SPEC")]
    pub spec: PathBuf,

    /// Name under `components.schemas`.
    #[arg(long)]
    pub schema: String,

    /// Value as JSON or YAML text.
    #[arg(long, conflicts_with = "file")]
    pub value: Option<String>,

    /// File holding the value.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Treat a string value as raw request text to be coerced, as query
    /// and header values are.
    #[arg(long)]
    pub raw: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code 0 when the value is valid, 1 when it is not.
pub fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> Result<u8> {
    let document = crate::load_document(&args.spec)?;
    let components = document
        .components()
        .ok_or(CompileError::MissingComponents)?;
    let schema = components
        .get("schemas", &args.schema)
        .ok_or_else(|| anyhow!("schema '{}' is not declared in components.schemas", args.schema))?;

    let formats = FormatRegistry::new();
    let validator = SchemaCompiler::new(Some(components), &formats)
        .compile(schema)
        .with_context(|| format!("schema '{}' does not compile", args.schema))?;

    let input = match (&args.value, &args.file) {
        (Some(text), _) => read_input(text, args.raw)?,
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            crate::parse_value(&text).map(Field::from_value)?
        }
        (None, None) => bail!("one of --value or --file is required"),
    };

    match validator.validate(input, args.raw) {
        Ok(value) => {
            let value = value.into_json().unwrap_or(Value::Null);
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            Ok(0)
        }
        Err(error) => {
            tracing::debug!(schema = %args.schema, "value rejected");
            writeln!(out, "{}", serde_json::to_string_pretty(&error)?)?;
            Ok(1)
        }
    }
}

/// Raw mode takes the text literally, as a request would deliver it.
fn read_input(text: &str, raw: bool) -> Result<Field> {
    if raw {
        Ok(Field::text(text))
    } else {
        crate::parse_value(text).map(Field::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r"
paths: {}
components:
  schemas:
    Limit:
      type: integer
      minimum: 1
    Pet:
      type: object
      required: [name]
      properties:
        name: {type: string}
        tags:
          type: array
          items: {type: string}
          default: []
";

    fn run(schema: &str, value: &str, raw: bool) -> (u8, Value) {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("api.yaml");
        std::fs::write(&spec, DOCUMENT).unwrap();
        let args = ValidateArgs {
            spec,
            schema: schema.to_string(),
            value: Some(value.to_string()),
            file: None,
            raw,
        };
        let mut out = Vec::new();
        let code = run_validate(&args, &mut out).unwrap();
        (code, serde_json::from_slice(&out).unwrap())
    }

    #[test]
    fn valid_value_is_printed_with_defaults() {
        assert_eq!(
            run("Pet", r#"{"name": "rex"}"#, false),
            (0, serde_json::json!({"name": "rex", "tags": []}))
        );
    }

    #[test]
    fn invalid_value_prints_error_tree() {
        assert_eq!(
            run("Pet", "{}", false),
            (1, serde_json::json!({"name": "required property"}))
        );
        assert_eq!(
            run("Limit", "0", false),
            (1, serde_json::json!("value should be more than or equal to 1"))
        );
    }

    #[test]
    fn raw_text_is_coerced() {
        assert_eq!(run("Limit", "12", true), (0, serde_json::json!(12)));
        assert_eq!(
            run("Limit", "twelve", true),
            (1, serde_json::json!("value should be type of int"))
        );
    }

    #[test]
    fn unknown_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("api.yaml");
        std::fs::write(&spec, DOCUMENT).unwrap();
        let args = ValidateArgs {
            spec,
            schema: "Nope".into(),
            value: Some("1".into()),
            file: None,
            raw: false,
        };
        assert!(run_validate(&args, &mut Vec::new()).is_err());
    }
}
