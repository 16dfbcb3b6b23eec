//! # OpenAPI Document
//!
//! Thin read-only view over an already-parsed OpenAPI document. Only the
//! parts the binder needs are interpreted: `paths`, `components` and the
//! top-level `security`. Validating the document against the OpenAPI
//! meta-schema is out of scope; shape problems surface as
//! [`CompileError`]s when an operation is compiled.

use oasv_core::{CompileError, Components};
use serde_json::{Map, Value};

/// HTTP methods that may appear as keys of a path item.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Parsed OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    root: Value,
    components: Option<Components>,
}

/// One `(path, method)` pair declared by the document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OperationRef {
    /// Path template, e.g. `/pets/{id}`.
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
}

impl OpenApiDocument {
    /// Wrap a parsed document.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` when the root is not an object or `paths` is
    /// missing; any error from parsing `components`.
    pub fn from_value(root: Value) -> Result<Self, CompileError> {
        let object = root
            .as_object()
            .ok_or_else(|| CompileError::InvalidDocument("document must be an object".to_string()))?;
        if !object.get("paths").is_some_and(Value::is_object) {
            return Err(CompileError::InvalidDocument(
                "paths must be an object".to_string(),
            ));
        }
        let components = match object.get("components") {
            Some(value) => Some(Components::from_value(value.clone())?),
            None => None,
        };
        Ok(Self { root, components })
    }

    /// Parse YAML or JSON text (JSON is valid YAML).
    ///
    /// # Errors
    ///
    /// `InvalidDocument` with the parser diagnostic, or any error of
    /// [`OpenApiDocument::from_value`].
    pub fn from_text(text: &str) -> Result<Self, CompileError> {
        let root: Value =
            serde_yaml::from_str(text).map_err(|e| CompileError::InvalidDocument(e.to_string()))?;
        Self::from_value(root)
    }

    /// The `components` table, if declared.
    pub fn components(&self) -> Option<&Components> {
        self.components.as_ref()
    }

    /// Top-level `security`, applied to operations that declare none.
    pub fn security(&self) -> Option<&Value> {
        self.root.get("security")
    }

    /// The whole document.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// A path item by its template.
    pub fn path_item(&self, path: &str) -> Option<&Map<String, Value>> {
        self.root
            .get("paths")
            .and_then(|paths| paths.get(path))
            .and_then(Value::as_object)
    }

    /// An operation object.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` when the path or method is not declared.
    pub fn operation(&self, path: &str, method: &str) -> Result<&Map<String, Value>, CompileError> {
        let method = method.to_ascii_lowercase();
        self.path_item(path)
            .and_then(|item| item.get(&method))
            .and_then(Value::as_object)
            .ok_or(CompileError::UnknownOperation {
                method,
                path: path.to_string(),
            })
    }

    /// Every declared operation, sorted by path then method.
    pub fn operations(&self) -> Vec<OperationRef> {
        let mut operations: Vec<OperationRef> = self
            .root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(path, item)| item.as_object().map(|item| (path, item)))
            .flat_map(|(path, item)| {
                item.keys()
                    .filter(|key| HTTP_METHODS.contains(&key.as_str()))
                    .map(move |method| OperationRef {
                        path: path.clone(),
                        method: method.clone(),
                    })
            })
            .collect();
        operations.sort();
        operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> OpenApiDocument {
        OpenApiDocument::from_value(json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "parameters": [],
                    "get": {"responses": {}},
                    "post": {"responses": {}}
                },
                "/pets/{id}": {"delete": {"responses": {}}}
            },
            "security": [{"bearerAuth": []}]
        }))
        .unwrap()
    }

    #[test]
    fn lists_operations_without_path_item_keys() {
        let operations = document().operations();
        let pairs: Vec<(&str, &str)> = operations
            .iter()
            .map(|op| (op.path.as_str(), op.method.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("/pets", "get"), ("/pets", "post"), ("/pets/{id}", "delete")]
        );
    }

    #[test]
    fn operation_lookup_is_case_insensitive_on_method() {
        let doc = document();
        assert!(doc.operation("/pets", "GET").is_ok());
        assert_eq!(
            doc.operation("/pets", "put").unwrap_err(),
            CompileError::UnknownOperation {
                method: "put".into(),
                path: "/pets".into()
            }
        );
    }

    #[test]
    fn global_security() {
        assert_eq!(document().security(), Some(&json!([{"bearerAuth": []}])));
    }

    #[test]
    fn parses_yaml_text() {
        let doc = OpenApiDocument::from_text("openapi: 3.0.0\npaths: {}\n").unwrap();
        assert!(doc.operations().is_empty());
        assert!(doc.components().is_none());
    }

    #[test]
    fn rejects_documents_without_paths() {
        assert!(OpenApiDocument::from_value(json!({"openapi": "3.0.0"})).is_err());
        assert!(OpenApiDocument::from_text("- not\n- a document\n").is_err());
    }
}
