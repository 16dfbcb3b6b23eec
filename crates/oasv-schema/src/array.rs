//! # Array Validator
//!
//! `type: array`. Raw inputs may arrive as a comma-separated string, which is
//! split before the items are validated. Item validation stops at the first
//! failing index and reports only that index.

use oasv_core::{Field, FieldError};
use serde_json::Value;

use crate::validator::{type_error, Common, Step, Validator};

/// Validator for `type: array`.
#[derive(Debug, Clone)]
pub struct ArrayValidator {
    /// Shared keywords.
    pub common: Common,
    /// Validator applied to every item.
    pub items: Box<Validator>,
    /// `minItems`
    pub min_items: Option<usize>,
    /// `maxItems`
    pub max_items: Option<usize>,
    /// `uniqueItems`
    pub unique_items: bool,
}

impl ArrayValidator {
    /// Array validator over `items` with no further constraints.
    pub fn new(items: Validator) -> Self {
        Self {
            common: Common::default(),
            items: Box::new(items),
            min_items: None,
            max_items: None,
            unique_items: false,
        }
    }

    /// Validate an array input.
    ///
    /// # Errors
    ///
    /// `"value should be type of list"` on a type mismatch,
    /// `{"<index>": <item error>}` for the first failing item, then the
    /// count and uniqueness messages.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        let input = match self.common.precheck(input, "list")? {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        let raw_items: Vec<Value> = match input {
            Field::Value(Value::Array(items)) => items,
            Field::Value(Value::String(text)) if raw => split_raw(&text),
            _ => return Err(type_error("list")),
        };

        let mut items = Vec::with_capacity(raw_items.len());
        for (index, item) in raw_items.into_iter().enumerate() {
            match self.items.validate(Field::from_value(item), raw) {
                Ok(field) => items.push(field.into_json().unwrap_or(Value::Null)),
                Err(error) => return Err(FieldError::at(index.to_string(), error)),
            }
        }

        if let Some(min) = self.min_items {
            if items.len() < min {
                return Err(FieldError::Message(format!(
                    "number of items must be more than {min}"
                )));
            }
        }
        if let Some(max) = self.max_items {
            if items.len() > max {
                return Err(FieldError::Message(format!(
                    "number of items must be less than {max}"
                )));
            }
        }
        if self.unique_items {
            // Value equality: object key order does not matter.
            let duplicate = items
                .iter()
                .enumerate()
                .any(|(i, item)| items[..i].contains(item));
            if duplicate {
                return Err(FieldError::message("all items must be unique"));
            }
        }
        Ok(Field::Value(Value::Array(items)))
    }
}

/// `""` is an empty array, not one empty item.
fn split_raw(text: &str) -> Vec<Value> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|part| Value::String(part.to_string()))
        .collect()
}
