//! # Combinators
//!
//! `oneOf`, `anyOf` and `allOf`. Failures are flat: the branch errors are
//! discarded and a single `"fail to validate <kind>"` message is returned.
//!
//! With a `discriminator`, `oneOf`/`anyOf` do not try every branch. The input
//! must be an object carrying the discriminator property, and its value picks
//! the one branch that is validated.

use std::collections::BTreeMap;

use oasv_core::{Field, FieldError};
use serde_json::{Map, Value};

use crate::validator::{render_list, type_error, Common, Step, Validator};

/// Discriminator of a `oneOf`/`anyOf`: property name plus the accepted
/// values, each pointing at a branch index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    /// `propertyName`
    pub property: String,
    /// Accepted property value → branch index.
    pub targets: BTreeMap<String, usize>,
}

impl Discriminator {
    fn select(&self, input: &Field) -> Result<usize, FieldError> {
        let Some(Value::Object(object)) = input.as_value() else {
            return Err(type_error("dict"));
        };
        let Some(value) = object.get(&self.property) else {
            return Err(FieldError::at(
                self.property.clone(),
                FieldError::message("is required"),
            ));
        };
        value
            .as_str()
            .and_then(|name| self.targets.get(name))
            .copied()
            .ok_or_else(|| {
                let names: Vec<Value> = self
                    .targets
                    .keys()
                    .map(|name| Value::String(name.clone()))
                    .collect();
                FieldError::at(
                    self.property.clone(),
                    FieldError::Message(format!("must be one of {}", render_list(&names))),
                )
            })
    }
}

/// Shared precheck for combinators: defaults apply, `null` is handed to the
/// branches unless the combinator itself is nullable.
fn precheck(common: &Common, input: Field) -> Step {
    match common.substitute_default(input) {
        None => Step::Done(Field::Absent),
        Some(field) if common.nullable && field.is_null() => Step::Done(Field::Null),
        Some(field) => Step::Check(field),
    }
}

/// `oneOf`/`anyOf` node.
#[derive(Debug, Clone, Default)]
pub struct CombinatorValidator {
    /// Shared keywords.
    pub common: Common,
    /// Branches in declaration order.
    pub branches: Vec<Validator>,
    /// Optional early dispatch.
    pub discriminator: Option<Discriminator>,
}

impl CombinatorValidator {
    /// Exactly one branch must accept.
    ///
    /// # Errors
    ///
    /// `"fail to validate oneOf"` when zero or several branches accept, or
    /// a discriminator error.
    pub fn validate_one_of(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        const FAILED: &str = "fail to validate oneOf";
        let input = match precheck(&self.common, input) {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        if let Some(discriminator) = &self.discriminator {
            return self.dispatch(discriminator, input, raw, FAILED);
        }

        let mut matched = None;
        for branch in &self.branches {
            if let Ok(field) = branch.validate(input.clone(), raw) {
                if matched.is_some() {
                    return Err(FieldError::message(FAILED));
                }
                matched = Some(field);
            }
        }
        matched.ok_or_else(|| FieldError::message(FAILED))
    }

    /// The first accepting branch wins.
    ///
    /// # Errors
    ///
    /// `"fail to validate anyOf"` when no branch accepts, or a discriminator
    /// error.
    pub fn validate_any_of(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        const FAILED: &str = "fail to validate anyOf";
        let input = match precheck(&self.common, input) {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        if let Some(discriminator) = &self.discriminator {
            return self.dispatch(discriminator, input, raw, FAILED);
        }

        self.branches
            .iter()
            .find_map(|branch| branch.validate(input.clone(), raw).ok())
            .ok_or_else(|| FieldError::message(FAILED))
    }

    fn dispatch(
        &self,
        discriminator: &Discriminator,
        input: Field,
        raw: bool,
        failed: &str,
    ) -> Result<Field, FieldError> {
        let index = discriminator.select(&input)?;
        let branch = self
            .branches
            .get(index)
            .ok_or_else(|| FieldError::message(failed))?;
        branch
            .validate(input, raw)
            .map_err(|_| FieldError::message(failed))
    }
}

/// `allOf` node.
#[derive(Debug, Clone, Default)]
pub struct AllOfValidator {
    /// Shared keywords.
    pub common: Common,
    /// Branches in declaration order.
    pub branches: Vec<Validator>,
}

impl AllOfValidator {
    /// Every branch must accept. Object outputs are shallow-merged with
    /// later branches winning; if any output is not an object the last
    /// output is returned.
    ///
    /// # Errors
    ///
    /// `"fail to validate allOf"` when any branch fails.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        let input = match precheck(&self.common, input) {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };

        let mut merged = Map::new();
        let mut last = Field::Absent;
        let mut all_objects = true;
        for branch in &self.branches {
            let output = branch
                .validate(input.clone(), raw)
                .map_err(|_| FieldError::message("fail to validate allOf"))?;
            match &output {
                Field::Value(Value::Object(object)) => {
                    merged.extend(object.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Field::Absent => continue,
                _ => all_objects = false,
            }
            last = output;
        }
        if all_objects && !last.is_absent() {
            Ok(Field::Value(Value::Object(merged)))
        } else {
            Ok(last)
        }
    }
}
