//! # Object Validator
//!
//! `type: object`. Unlike arrays, objects report every failing property at
//! once.
//!
//! Order of checks:
//!
//! 1. `required`: every missing key yields `"required property"` and stops
//!    validation. Read-only properties are never required from clients.
//! 2. Declared `properties`: every failure is collected. A read-only property
//!    that is present fails with `"property is read-only"`.
//! 3. `additionalProperties` for keys not covered by `properties`; failures
//!    join the same map as step 2.
//! 4. `minProperties`/`maxProperties` on the output key count.

use std::collections::{BTreeMap, BTreeSet};

use oasv_core::{ErrorMap, Field, FieldError};
use serde_json::{Map, Value};

use crate::validator::{type_error, Common, Step, Validator};

/// Policy for keys not listed under `properties`.
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    /// `true` or absent: copy through unvalidated.
    #[default]
    Allow,
    /// `false`: each such key is an error.
    Deny,
    /// A schema: validate each such value.
    Schema(Box<Validator>),
}

/// Validator for `type: object`.
#[derive(Debug, Clone, Default)]
pub struct ObjectValidator {
    /// Shared keywords.
    pub common: Common,
    /// Declared properties.
    pub properties: BTreeMap<String, Validator>,
    /// `required`
    pub required: BTreeSet<String>,
    /// `minProperties`
    pub min_properties: Option<usize>,
    /// `maxProperties`
    pub max_properties: Option<usize>,
    /// `additionalProperties`
    pub additional: AdditionalProperties,
}

impl ObjectValidator {
    /// Validate an object input.
    ///
    /// # Errors
    ///
    /// `"value should be type of dict"` on a type mismatch, a map of
    /// per-key failures, or a property-count message.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        let input = match self.common.precheck(input, "dict")? {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        let Field::Value(Value::Object(mut input)) = input else {
            return Err(type_error("dict"));
        };

        let missing: ErrorMap = self
            .required
            .iter()
            .filter(|name| !input.contains_key(name.as_str()))
            .filter(|name| !self.properties.get(name.as_str()).is_some_and(Validator::is_read_only))
            .map(|name| (name.clone(), FieldError::message("required property")))
            .collect();
        if !missing.is_empty() {
            return Err(FieldError::Nested(missing));
        }

        let mut output = Map::new();
        let mut errors = ErrorMap::new();

        for (name, validator) in &self.properties {
            let value = input.remove(name);
            if validator.is_read_only() {
                if value.is_some() {
                    errors.insert(name.clone(), FieldError::message("property is read-only"));
                }
                continue;
            }
            match validator.validate(Field::from_option(value), raw) {
                Ok(field) => {
                    if let Some(value) = field.into_json() {
                        output.insert(name.clone(), value);
                    }
                }
                Err(error) => {
                    errors.insert(name.clone(), error);
                }
            }
        }

        // Everything left in `input` is an additional property.
        for (name, value) in input {
            match &self.additional {
                AdditionalProperties::Allow => {
                    output.insert(name, value);
                }
                AdditionalProperties::Deny => {
                    errors.insert(name, FieldError::message("additional property not allowed"));
                }
                AdditionalProperties::Schema(validator) => {
                    match validator.validate(Field::from_value(value), raw) {
                        Ok(field) => {
                            if let Some(value) = field.into_json() {
                                output.insert(name, value);
                            }
                        }
                        Err(error) => {
                            errors.insert(name, error);
                        }
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(FieldError::Nested(errors));
        }

        if let Some(min) = self.min_properties {
            if output.len() < min {
                return Err(FieldError::Message(format!(
                    "number of properties must be more than {min}"
                )));
            }
        }
        if let Some(max) = self.max_properties {
            if output.len() > max {
                return Err(FieldError::Message(format!(
                    "number of properties must be less than {max}"
                )));
            }
        }
        Ok(Field::Value(Value::Object(output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::IntegerValidator;
    use crate::string::StringValidator;
    use serde_json::json;

    fn msg(message: &str) -> FieldError {
        FieldError::message(message)
    }

    fn pet() -> ObjectValidator {
        let mut properties = BTreeMap::new();
        properties.insert("id".to_string(), Validator::Integer(IntegerValidator::default()));
        properties.insert("name".to_string(), Validator::String(StringValidator::default()));
        ObjectValidator {
            properties,
            required: ["id".to_string(), "name".to_string()].into(),
            ..ObjectValidator::default()
        }
    }

    #[test]
    fn required_check_comes_first() {
        let v = ObjectValidator {
            required: ["a".to_string(), "b".to_string()].into(),
            ..ObjectValidator::default()
        };
        let error = v.validate(json!({}).into(), false).unwrap_err();
        assert_eq!(
            error.to_json(),
            json!({"a": "required property", "b": "required property"})
        );
    }

    #[test]
    fn required_short_circuits_property_errors() {
        let error = pet().validate(json!({"id": "x"}).into(), false).unwrap_err();
        assert_eq!(error.to_json(), json!({"name": "required property"}));
    }

    #[test]
    fn all_property_errors_collected() {
        let error = pet()
            .validate(json!({"id": "x", "name": 5}).into(), false)
            .unwrap_err();
        assert_eq!(
            error.to_json(),
            json!({"id": "value should be type of int", "name": "value should be type of str"})
        );
    }

    #[test]
    fn additional_properties_policies() {
        let input = json!({"id": 1, "name": "rex", "extra": true});
        assert_eq!(pet().validate(input.clone().into(), false).unwrap(), Field::Value(input.clone()));

        let deny = ObjectValidator {
            additional: AdditionalProperties::Deny,
            ..pet()
        };
        let error = deny
            .validate(json!({"id": "x", "name": "rex", "extra": true}).into(), false)
            .unwrap_err();
        assert_eq!(
            error.to_json(),
            json!({"id": "value should be type of int", "extra": "additional property not allowed"})
        );

        let typed = ObjectValidator {
            additional: AdditionalProperties::Schema(Box::new(Validator::Integer(
                IntegerValidator::default(),
            ))),
            ..ObjectValidator::default()
        };
        assert_eq!(
            typed.validate(json!({"a": "1"}).into(), true).unwrap(),
            Field::Value(json!({"a": 1}))
        );
        assert_eq!(
            typed.validate(json!({"a": "x"}).into(), true).unwrap_err().to_json(),
            json!({"a": "value should be type of int"})
        );
    }

    #[test]
    fn absent_optional_property_is_omitted() {
        let v = ObjectValidator {
            required: BTreeSet::new(),
            ..pet()
        };
        assert_eq!(v.validate(json!({"id": 1}).into(), false).unwrap(), Field::Value(json!({"id": 1})));
    }

    #[test]
    fn default_fills_absent_property() {
        let mut v = pet();
        v.required.remove("name");
        v.properties.insert(
            "name".to_string(),
            Validator::String(StringValidator {
                common: Common {
                    default: Some(json!("anon")),
                    ..Common::default()
                },
                ..StringValidator::default()
            }),
        );
        assert_eq!(
            v.validate(json!({"id": 1}).into(), false).unwrap(),
            Field::Value(json!({"id": 1, "name": "anon"}))
        );
    }

    #[test]
    fn read_only_properties() {
        let mut v = pet();
        v.properties.insert(
            "id".to_string(),
            Validator::Integer(IntegerValidator {
                common: Common {
                    read_only: true,
                    ..Common::default()
                },
                ..IntegerValidator::default()
            }),
        );
        // Required but read-only: absence is fine.
        assert_eq!(
            v.validate(json!({"name": "rex"}).into(), false).unwrap(),
            Field::Value(json!({"name": "rex"}))
        );
        assert_eq!(
            v.validate(json!({"id": 1, "name": "rex"}).into(), false).unwrap_err().to_json(),
            json!({"id": "property is read-only"})
        );
    }

    #[test]
    fn property_counts_on_output() {
        let v = ObjectValidator {
            min_properties: Some(1),
            max_properties: Some(2),
            ..ObjectValidator::default()
        };
        assert_eq!(v.validate(json!({}).into(), false).unwrap_err(), msg("number of properties must be more than 1"));
        assert_eq!(
            v.validate(json!({"a": 1, "b": 2, "c": 3}).into(), false).unwrap_err(),
            msg("number of properties must be less than 2")
        );
    }

    #[test]
    fn non_object_rejected() {
        assert_eq!(pet().validate(json!([1]).into(), false).unwrap_err(), msg("value should be type of dict"));
        assert_eq!(pet().validate(Field::Null, false).unwrap_err(), msg("value should be type of dict"));
        assert_eq!(pet().validate(Field::Absent, false).unwrap(), Field::Absent);
    }
}
