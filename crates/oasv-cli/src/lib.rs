//! # oasv-cli — Command-Line Tool
//!
//! ## Subcommands
//!
//! - `oasv check <SPEC>` compiles every operation of a document and reports
//!   the ones that fail.
//! - `oasv validate --spec <SPEC> --schema <NAME> (--value <TEXT> | --file <PATH>)`
//!   validates one value against `#/components/schemas/<NAME>`.
//!
//! ```bash
//! oasv check api.yaml
//! oasv validate --spec api.yaml --schema Pet --value '{"name": "rex"}'
//! oasv validate --spec api.yaml --schema Limit --value 10 --raw
//! ```
//!
//! Exit codes: 0 success, 1 compile or validation failure, 2 operational
//! error (unreadable file, malformed input).

pub mod check;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use oasv_binder::OpenApiDocument;
use serde_json::Value;

/// Read and parse an OpenAPI document (YAML or JSON).
///
/// # Errors
///
/// Unreadable file or a document without a usable `paths` table.
pub fn load_document(path: &Path) -> Result<OpenApiDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    OpenApiDocument::from_text(&text).with_context(|| format!("invalid document {}", path.display()))
}

/// Parse YAML or JSON text into a value.
///
/// # Errors
///
/// The parser diagnostic.
pub fn parse_value(text: &str) -> Result<Value> {
    serde_yaml::from_str(text).context("value is neither JSON nor YAML")
}
