//! # Check Subcommand
//!
//! Compiles every operation of a document with the built-in formats and
//! decoders and prints one line per failure.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use oasv_binder::{BinderOptions, DecoderRegistry, OperationBinder};
use oasv_schema::FormatRegistry;

/// Arguments for `oasv check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// OpenAPI document, YAML or JSON.
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,
}

/// Execute the check subcommand.
///
/// Returns exit code 0 when every operation compiles, 1 otherwise.
pub fn run_check(args: &CheckArgs, out: &mut impl Write) -> Result<u8> {
    let document = crate::load_document(&args.spec)?;
    let formats = FormatRegistry::new();
    let decoders = DecoderRegistry::new();

    let operations = document.operations();
    let mut failed = 0usize;
    for operation in &operations {
        let compiled = OperationBinder::compile(
            &document,
            &operation.path,
            &operation.method,
            &formats,
            &decoders,
            BinderOptions::default(),
        );
        match compiled {
            Ok(_) => tracing::debug!(path = %operation.path, method = %operation.method, "compiled"),
            Err(e) => {
                failed += 1;
                writeln!(
                    out,
                    "  FAIL: {} {}: {e}",
                    operation.method.to_ascii_uppercase(),
                    operation.path
                )?;
            }
        }
    }

    writeln!(
        out,
        "Operations: {}/{} compiled",
        operations.len() - failed,
        operations.len()
    )?;
    Ok(u8::from(failed > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(document: &str) -> (u8, String) {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("api.yaml");
        std::fs::write(&spec, document).unwrap();
        let mut out = Vec::new();
        let code = run_check(&CheckArgs { spec }, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn clean_document() {
        let (code, out) = check(
            r"
paths:
  /a:
    get:
      parameters:
        - {name: q, in: query, schema: {type: string, format: email}}
",
        );
        assert_eq!(code, 0);
        assert_eq!(out, "Operations: 1/1 compiled\n");
    }

    #[test]
    fn reports_each_failure() {
        let (code, out) = check(
            r"
paths:
  /a:
    get:
      security: [{missing: []}]
    post:
      requestBody:
        content:
          image/png:
            schema: {type: string, format: binary}
  /b:
    get: {}
",
        );
        assert_eq!(code, 1);
        assert!(out.contains("FAIL: GET /a"));
        assert!(out.contains("FAIL: POST /a: register handler for image/png first"));
        assert!(out.ends_with("Operations: 1/3 compiled\n"));
    }

    #[test]
    fn unreadable_document_is_an_error() {
        let args = CheckArgs {
            spec: PathBuf::from("/nonexistent/oasv/api.yaml"),
        };
        assert!(run_check(&args, &mut Vec::new()).is_err());
    }
}
