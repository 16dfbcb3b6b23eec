//! # String Validator
//!
//! `type: string`. Binary payloads (multipart parts, octet streams) are only
//! accepted for the `binary`, `password` and `byte` formats and pass through
//! without further checks.
//!
//! Check order: `minLength`/`maxLength` (in characters), `enum`, `format`,
//! `pattern`.

use oasv_core::{Field, FieldError};
use regex::Regex;
use serde_json::Value;

use crate::formats::FormatCheck;
use crate::validator::{render_list, type_error, Common, Step};

/// Formats under which a binary payload is acceptable.
const BINARY_FORMATS: &[&str] = &["binary", "password", "byte"];

/// Validator for `type: string`.
#[derive(Debug, Clone, Default)]
pub struct StringValidator {
    /// Shared keywords.
    pub common: Common,
    /// Declared `format`, checked or not.
    pub format: Option<String>,
    /// Check bound from the format registry at compile time; `None` for
    /// formats nobody registered.
    pub check: Option<FormatCheck>,
    /// `pattern`, searched anywhere in the value.
    pub pattern: Option<Regex>,
    /// `minLength`
    pub min_length: Option<usize>,
    /// `maxLength`
    pub max_length: Option<usize>,
    /// Allowed values.
    pub enumeration: Option<Vec<Value>>,
}

impl StringValidator {
    /// Validate a string input. No coercion happens, so `raw` is irrelevant.
    ///
    /// # Errors
    ///
    /// `"value should be type of str"` on a type mismatch, otherwise the
    /// first failing length, enum, format or pattern check.
    pub fn validate(&self, input: Field) -> Result<Field, FieldError> {
        let input = match self.common.precheck(input, "str")? {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        let text = match input {
            Field::Binary(bytes) if self.accepts_binary() => return Ok(Field::Binary(bytes)),
            Field::Value(Value::String(text)) => text,
            _ => return Err(type_error("str")),
        };

        let length = text.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(FieldError::Message(format!(
                    "value length should be more than {min}"
                )));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(FieldError::Message(format!(
                    "value length should be less than {max}"
                )));
            }
        }
        if let Some(members) = &self.enumeration {
            if !members.iter().any(|m| m.as_str() == Some(text.as_str())) {
                return Err(FieldError::Message(format!(
                    "value should be one of {}",
                    render_list(members)
                )));
            }
        }
        if let Some(check) = &self.check {
            check.run(&text).map_err(FieldError::Message)?;
        }
        if let Some(pattern) = &self.pattern {
            if self.format.as_deref() != Some("binary") && !pattern.is_match(&text) {
                return Err(FieldError::Message(format!(
                    "value should match regex pattern '{}'",
                    pattern.as_str()
                )));
            }
        }
        Ok(Field::Value(Value::String(text)))
    }

    fn accepts_binary(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| BINARY_FORMATS.contains(&f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatRegistry;
    use serde_json::json;

    fn err(message: &str) -> FieldError {
        FieldError::message(message)
    }

    fn with_format(format: &str) -> StringValidator {
        StringValidator {
            format: Some(format.to_string()),
            check: FormatRegistry::new().get(format).cloned(),
            ..StringValidator::default()
        }
    }

    #[test]
    fn plain_string() {
        let v = StringValidator::default();
        assert_eq!(v.validate(Field::text("abc")).unwrap(), Field::text("abc"));
        assert_eq!(v.validate(json!(5).into()).unwrap_err(), err("value should be type of str"));
        assert_eq!(v.validate(Field::Null).unwrap_err(), err("value should be type of str"));
    }

    #[test]
    fn length_counts_characters() {
        let v = StringValidator {
            min_length: Some(2),
            max_length: Some(3),
            ..StringValidator::default()
        };
        assert_eq!(v.validate(Field::text("a")).unwrap_err(), err("value length should be more than 2"));
        assert_eq!(v.validate(Field::text("abcd")).unwrap_err(), err("value length should be less than 3"));
        assert!(v.validate(Field::text("äöü")).is_ok());
    }

    #[test]
    fn enum_membership() {
        let v = StringValidator {
            enumeration: Some(vec![json!("red"), json!("green")]),
            ..StringValidator::default()
        };
        assert!(v.validate(Field::text("red")).is_ok());
        assert_eq!(
            v.validate(Field::text("blue")).unwrap_err(),
            err(r#"value should be one of ["red", "green"]"#)
        );
    }

    #[test]
    fn format_check_runs_after_length() {
        let mut v = with_format("uuid");
        v.max_length = Some(3);
        assert_eq!(v.validate(Field::text("abcd")).unwrap_err(), err("value length should be less than 3"));
        let v = with_format("uuid");
        assert_eq!(v.validate(Field::text("abcd")).unwrap_err(), err("value should be uuid"));
    }

    #[test]
    fn unknown_format_passes() {
        let v = StringValidator {
            format: Some("x-vendor".to_string()),
            ..StringValidator::default()
        };
        assert!(v.validate(Field::text("anything")).is_ok());
    }

    #[test]
    fn pattern_is_a_search() {
        let v = StringValidator {
            pattern: Some(Regex::new("[0-9]+").unwrap()),
            ..StringValidator::default()
        };
        assert!(v.validate(Field::text("abc123def")).is_ok());
        assert_eq!(
            v.validate(Field::text("abc")).unwrap_err(),
            err("value should match regex pattern '[0-9]+'")
        );
    }

    #[test]
    fn binary_payload_only_for_binary_formats() {
        let v = with_format("binary");
        assert_eq!(
            v.validate(Field::Binary(vec![0, 1, 2])).unwrap(),
            Field::Binary(vec![0, 1, 2])
        );
        let v = StringValidator::default();
        assert_eq!(
            v.validate(Field::Binary(vec![0])).unwrap_err(),
            err("value should be type of str")
        );
    }

    #[test]
    fn pattern_skipped_for_binary_format() {
        let v = StringValidator {
            format: Some("binary".to_string()),
            pattern: Some(Regex::new("^x$").unwrap()),
            ..StringValidator::default()
        };
        assert!(v.validate(Field::text("abc")).is_ok());
    }
}
