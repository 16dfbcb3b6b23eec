//! # Field Presence
//!
//! Every value handed to a validator is wrapped in a [`Field`], which keeps
//! apart the three situations that OpenAPI validation has to treat
//! differently:
//!
//! | State            | Example input          | Validator behavior                    |
//! |------------------|------------------------|---------------------------------------|
//! | `Absent`         | key not sent           | substitute `default`, or stay absent  |
//! | `Null`           | `{"key": null}`        | accept only when `nullable: true`     |
//! | `Value(..)`      | `{"key": 3}`           | coerce and check per schema type      |
//! | `Binary(..)`     | raw request body bytes | pass-through for binary string types  |
//!
//! `Field::Value` never wraps `serde_json::Value::Null`; use
//! [`Field::from_value`] to construct from arbitrary JSON.

use serde_json::Value;

/// Presence state of a single input value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    /// No value was supplied at all.
    #[default]
    Absent,
    /// A value was supplied and it is explicitly `null`.
    Null,
    /// A non-null JSON value.
    Value(Value),
    /// An opaque byte payload, produced by body decoders for binary media.
    Binary(Vec<u8>),
}

impl Field {
    /// Wrap a JSON value, mapping `Value::Null` to [`Field::Null`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            other => Self::Value(other),
        }
    }

    /// Wrap an optional JSON value; `None` becomes [`Field::Absent`].
    pub fn from_option(value: Option<Value>) -> Self {
        value.map_or(Self::Absent, Self::from_value)
    }

    /// Wrap a raw string extracted from a request location.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }

    /// True when no value was supplied.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// True for an explicit `null` (including a stray `Value(Null)`).
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Value(Value::Null))
    }

    /// Borrow the JSON value, if any.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to JSON for embedding in a parent container.
    ///
    /// Returns `None` for `Absent`, since an absent field has no place in
    /// an output object. Binary payloads are rendered as a lossy UTF-8 string.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::Value(v) => Some(v),
            Self::Binary(bytes) => Some(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
        }
    }

    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null | Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "boolean",
            Self::Value(Value::Number(_)) => "number",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_)) => "array",
            Self::Value(Value::Object(_)) => "object",
            Self::Binary(_) => "binary",
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Option<Value>> for Field {
    fn from(value: Option<Value>) -> Self {
        Self::from_option(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_json_becomes_null_field() {
        assert_eq!(Field::from_value(Value::Null), Field::Null);
        assert!(Field::from_value(Value::Null).is_null());
    }

    #[test]
    fn none_becomes_absent() {
        assert_eq!(Field::from_option(None), Field::Absent);
        assert!(Field::default().is_absent());
    }

    #[test]
    fn absent_has_no_json() {
        assert_eq!(Field::Absent.into_json(), None);
        assert_eq!(Field::Null.into_json(), Some(Value::Null));
        assert_eq!(Field::from(json!(3)).into_json(), Some(json!(3)));
    }

    #[test]
    fn binary_renders_lossy() {
        let field = Field::Binary(b"abc".to_vec());
        assert_eq!(field.into_json(), Some(json!("abc")));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Field::text("x").kind(), "string");
        assert_eq!(Field::from(json!([1])).kind(), "array");
        assert_eq!(Field::from(json!({})).kind(), "object");
        assert_eq!(Field::from(json!(true)).kind(), "boolean");
        assert_eq!(Field::Value(Value::Null).kind(), "null");
    }
}
