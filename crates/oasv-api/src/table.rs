//! # Validation Table
//!
//! Every operation of a document compiled into an [`OperationBinder`],
//! keyed by lowercase method and path template. Built once at startup and
//! shared read-only behind an `Arc`.

use std::collections::HashMap;

use oasv_binder::{BinderOptions, DecoderRegistry, OpenApiDocument, OperationBinder};
use oasv_core::CompileError;
use oasv_schema::FormatRegistry;

/// Compiled binders for a whole document.
#[derive(Debug, Clone, Default)]
pub struct ValidationTable {
    binders: HashMap<(String, String), OperationBinder>,
}

impl ValidationTable {
    /// Compile every operation of `document`.
    ///
    /// # Errors
    ///
    /// The first [`CompileError`] met. Startup should not continue with a
    /// partially compiled table.
    pub fn compile(
        document: &OpenApiDocument,
        formats: &FormatRegistry,
        decoders: &DecoderRegistry,
        options: &BinderOptions,
    ) -> Result<Self, CompileError> {
        let mut binders = HashMap::new();
        for operation in document.operations() {
            let binder = OperationBinder::compile(
                document,
                &operation.path,
                &operation.method,
                formats,
                decoders,
                options.clone(),
            )?;
            binders.insert((operation.method, operation.path), binder);
        }
        tracing::info!(operations = binders.len(), "validation table compiled");
        Ok(Self { binders })
    }

    /// The binder for a method and path template.
    pub fn get(&self, method: &str, path: &str) -> Option<&OperationBinder> {
        self.binders
            .get(&(method.to_ascii_lowercase(), path.to_string()))
    }

    /// Number of compiled operations.
    pub fn len(&self) -> usize {
        self.binders.len()
    }

    /// Whether no operation was compiled.
    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}
