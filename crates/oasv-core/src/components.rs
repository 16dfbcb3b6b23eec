//! # Components Table
//!
//! Read-only index over the `components` object of an OpenAPI document:
//! section name (`schemas`, `parameters`, `securitySchemes`, ...) to object
//! name to definition. Only consulted while compiling; validators never hold
//! a reference back into it.

use serde_json::{Map, Value};

use crate::error::CompileError;

/// Parsed `components` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    sections: Map<String, Value>,
}

impl Components {
    /// Build from the JSON value of a `components` object.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidDocument` if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self, CompileError> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            other => Err(CompileError::InvalidDocument(format!(
                "components must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// True when no section is defined.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Borrow one section, e.g. `securitySchemes`.
    pub fn section(&self, section: &str) -> Option<&Map<String, Value>> {
        self.sections.get(section).and_then(Value::as_object)
    }

    /// Look up `components[section][name]`.
    pub fn get(&self, section: &str, name: &str) -> Option<&Value> {
        self.section(section).and_then(|s| s.get(name))
    }

    /// Resolve a `$ref` string of the form `#/components/<section>/<name>`.
    ///
    /// Only the last two path segments are significant.
    ///
    /// # Errors
    ///
    /// `MalformedRef` when the string has fewer than two segments,
    /// `UnresolvedRef` when the target does not exist.
    pub fn resolve(&self, reference: &str) -> Result<&Value, CompileError> {
        let (section, name) = split_ref(reference)?;
        tracing::debug!(reference, section, name, "resolving $ref");
        self.get(section, name)
            .ok_or_else(|| CompileError::UnresolvedRef(reference.to_string()))
    }
}

/// Split a `$ref` into its trailing `(section, name)` segments.
///
/// # Errors
///
/// Returns `CompileError::MalformedRef` if fewer than two non-empty trailing
/// segments are present.
pub fn split_ref(reference: &str) -> Result<(&str, &str), CompileError> {
    let mut segments = reference.rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(name), Some(section)) if !name.is_empty() && !section.is_empty() => {
            Ok((section, name))
        }
        _ => Err(CompileError::MalformedRef(reference.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components() -> Components {
        Components::from_value(json!({
            "schemas": {
                "Pet": {"type": "object"}
            },
            "securitySchemes": {
                "basicAuth": {"type": "http", "scheme": "basic"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn resolves_full_ref() {
        let c = components();
        assert_eq!(
            c.resolve("#/components/schemas/Pet").unwrap(),
            &json!({"type": "object"})
        );
    }

    #[test]
    fn only_last_two_segments_matter() {
        let c = components();
        assert!(c.resolve("other.yaml#/whatever/schemas/Pet").is_ok());
    }

    #[test]
    fn unresolved_ref() {
        let c = components();
        assert_eq!(
            c.resolve("#/components/schemas/Dog").unwrap_err(),
            CompileError::UnresolvedRef("#/components/schemas/Dog".into())
        );
    }

    #[test]
    fn malformed_ref() {
        assert!(matches!(split_ref("Pet"), Err(CompileError::MalformedRef(_))));
        assert!(matches!(split_ref("schemas/"), Err(CompileError::MalformedRef(_))));
        assert_eq!(split_ref("schemas/Pet").unwrap(), ("schemas", "Pet"));
    }

    #[test]
    fn non_object_rejected() {
        assert!(Components::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn section_lookup() {
        let c = components();
        assert!(c.section("securitySchemes").is_some());
        assert!(c.section("parameters").is_none());
        assert!(!c.is_empty());
    }
}
