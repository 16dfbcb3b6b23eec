//! # Error Types — Validation Trees and Compile Failures
//!
//! Two error families with very different lifecycles:
//!
//! - [`FieldError`] is produced per request. It mirrors the shape of the
//!   input: a leaf message for a scalar failure, or an ordered map from
//!   property name (or stringified array index) to a nested error. It
//!   serializes untagged, so `{"body": {"id": "required property"}}` is the
//!   JSON a client receives.
//!
//! - [`CompileError`] is produced while schemas, security requirements and
//!   operations are being compiled during startup. All variants are fatal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered map of field name to nested error.
pub type ErrorMap = BTreeMap<String, FieldError>;

/// Structured validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldError {
    /// Leaf failure message, e.g. `"value should be type of int"`.
    #[error("{0}")]
    Message(String),

    /// Per-field failures of a container value.
    #[error("{}", render_map(.0))]
    Nested(ErrorMap),
}

fn render_map(map: &ErrorMap) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| format!("{map:?}"))
}

impl FieldError {
    /// Build a leaf message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Build a nested error from an already collected map.
    pub fn nested(map: ErrorMap) -> Self {
        Self::Nested(map)
    }

    /// Build a nested error with a single entry.
    pub fn at(key: impl Into<String>, error: FieldError) -> Self {
        let mut map = ErrorMap::new();
        map.insert(key.into(), error);
        Self::Nested(map)
    }

    /// Leaf message text, if this is a leaf.
    pub fn as_message(&self) -> Option<&str> {
        match self {
            Self::Message(m) => Some(m),
            Self::Nested(_) => None,
        }
    }

    /// Nested entries, if this is a map.
    pub fn as_map(&self) -> Option<&ErrorMap> {
        match self {
            Self::Message(_) => None,
            Self::Nested(map) => Some(map),
        }
    }

    /// Look up a nested entry by key.
    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Render as a JSON value (string or object).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Message(m) => serde_json::Value::String(m.clone()),
            Self::Nested(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

/// Fatal failure while compiling schemas, security requirements or
/// operations into validators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A `$ref` was found but no components table was supplied.
    #[error("file with components definitions is missing")]
    MissingComponents,

    /// A `$ref` string does not have `<section>/<name>` trailing segments.
    #[error("malformed $ref '{0}'")]
    MalformedRef(String),

    /// A `$ref` does not resolve against the components table.
    #[error("unresolved $ref '{0}'")]
    UnresolvedRef(String),

    /// A `$ref` re-enters itself while being compiled.
    #[error("cyclic $ref '{0}'")]
    CyclicRef(String),

    /// Schema has neither a combinator nor a `type`.
    #[error("type is required")]
    MissingType,

    /// Schema `type` is not one of the supported OpenAPI types.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Numeric `format` is not supported for the schema type.
    #[error("unknown {kind} format '{format}'")]
    UnknownFormat {
        /// Schema type the format was declared on.
        kind: String,
        /// The unsupported format name.
        format: String,
    },

    /// A keyword carries a value of the wrong shape.
    #[error("invalid '{keyword}': {reason}")]
    InvalidKeyword {
        /// Schema keyword, e.g. `minimum`.
        keyword: String,
        /// What was wrong with it.
        reason: String,
    },

    /// `pattern` is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Regex compiler diagnostic.
        reason: String,
    },

    /// `discriminator` is malformed or its mapping points nowhere.
    #[error("invalid discriminator: {0}")]
    Discriminator(String),

    /// A `security` requirement exists but components has no `securitySchemes`.
    #[error("securitySchemes must be defined in components")]
    MissingSecuritySchemes,

    /// A `security` requirement names a scheme that is not declared.
    #[error("security schema {0} must be defined in components")]
    UndeclaredSecurityScheme(String),

    /// A declared security scheme cannot be enforced by this engine.
    #[error("unsupported security scheme '{name}': {reason}")]
    UnsupportedSecurityScheme {
        /// Scheme name from `securitySchemes`.
        name: String,
        /// Why it is unsupported.
        reason: String,
    },

    /// A request body declares a media type with no registered decoder.
    #[error("register handler for {0} first")]
    MissingDecoder(String),

    /// A parameter object is malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The document has no such path/method.
    #[error("no operation {method} {path} in document")]
    UnknownOperation {
        /// HTTP method, lowercase.
        method: String,
        /// Path template.
        path: String,
    },

    /// The document itself is not shaped like an OpenAPI document.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
