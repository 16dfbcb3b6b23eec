//! # Validator Nodes
//!
//! The closed set of compiled validator kinds and the precedence rules they
//! all share.
//!
//! ## Shared Precedence
//!
//! Every node applies the same first steps before looking at the value's
//! type:
//!
//! 1. `Absent` → substitute `default` (and keep validating it), or return
//!    `Absent` unchanged so the caller omits the field.
//! 2. `Null` → return `Null` when `nullable`, else fail with
//!    `"value should be type of <type>"`.
//! 3. Anything else → coerce and check per kind.
//!
//! Combinators apply step 1 but hand `null` to their branches unless the
//! combinator itself is `nullable`.

use oasv_core::{Field, FieldError};
use serde_json::Value;

use crate::array::ArrayValidator;
use crate::combinator::{AllOfValidator, CombinatorValidator};
use crate::numeric::{IntegerValidator, NumberValidator};
use crate::object::ObjectValidator;
use crate::string::StringValidator;

/// A compiled, immutable validation rule.
#[derive(Debug, Clone)]
pub enum Validator {
    /// `type: integer`
    Integer(IntegerValidator),
    /// `type: number`
    Number(NumberValidator),
    /// `type: string`
    String(StringValidator),
    /// `type: boolean`
    Boolean(BooleanValidator),
    /// `type: array`
    Array(ArrayValidator),
    /// `type: object`
    Object(ObjectValidator),
    /// `oneOf`: exactly one branch must accept.
    OneOf(CombinatorValidator),
    /// `anyOf`: first accepting branch wins.
    AnyOf(CombinatorValidator),
    /// `allOf`: every branch must accept; object outputs are merged.
    AllOf(AllOfValidator),
}

impl Validator {
    /// Validate one input.
    ///
    /// `raw` enables coercion from text, for values taken from query, path,
    /// header and cookie locations.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] describing the failure; container nodes
    /// return nested maps keyed by property name or array index.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        match self {
            Self::Integer(v) => v.validate(input, raw),
            Self::Number(v) => v.validate(input, raw),
            Self::String(v) => v.validate(input),
            Self::Boolean(v) => v.validate(input, raw),
            Self::Array(v) => v.validate(input, raw),
            Self::Object(v) => v.validate(input, raw),
            Self::OneOf(v) => v.validate_one_of(input, raw),
            Self::AnyOf(v) => v.validate_any_of(input, raw),
            Self::AllOf(v) => v.validate(input, raw),
        }
    }

    /// Validate a JSON value, treating `Value::Null` as an explicit null.
    ///
    /// # Errors
    ///
    /// Same as [`Validator::validate`].
    pub fn validate_value(&self, value: Value, raw: bool) -> Result<Field, FieldError> {
        self.validate(Field::from_value(value), raw)
    }

    /// Shared keywords of this node.
    pub fn common(&self) -> &Common {
        match self {
            Self::Integer(v) => &v.common,
            Self::Number(v) => &v.common,
            Self::String(v) => &v.common,
            Self::Boolean(v) => &v.common,
            Self::Array(v) => &v.common,
            Self::Object(v) => &v.common,
            Self::OneOf(v) | Self::AnyOf(v) => &v.common,
            Self::AllOf(v) => &v.common,
        }
    }

    /// True when the schema is marked `readOnly: true`.
    pub fn is_read_only(&self) -> bool {
        self.common().read_only
    }

    /// Schema kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::OneOf(_) => "oneOf",
            Self::AnyOf(_) => "anyOf",
            Self::AllOf(_) => "allOf",
        }
    }
}

/// Keywords every schema kind accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Common {
    /// `nullable: true` admits an explicit `null`.
    pub nullable: bool,
    /// Substituted when the input is absent.
    pub default: Option<Value>,
    /// `readOnly: true` forbids the property in client-supplied objects.
    pub read_only: bool,
}

/// Outcome of the shared precedence steps.
pub(crate) enum Step {
    /// Validation is finished with this result.
    Done(Field),
    /// Continue with type-specific checks on this non-null input.
    Check(Field),
}

impl Common {
    /// Apply default substitution and the `nullable` rule.
    pub(crate) fn precheck(&self, input: Field, type_name: &str) -> Result<Step, FieldError> {
        let input = match self.substitute_default(input) {
            Some(field) => field,
            None => return Ok(Step::Done(Field::Absent)),
        };
        if input.is_null() {
            return if self.nullable {
                Ok(Step::Done(Field::Null))
            } else {
                Err(type_error(type_name))
            };
        }
        Ok(Step::Check(input))
    }

    /// Replace `Absent` by the default; `None` means "stay absent".
    pub(crate) fn substitute_default(&self, input: Field) -> Option<Field> {
        match input {
            Field::Absent => self.default.clone().map(Field::from_value),
            other => Some(other),
        }
    }
}

/// Validator for `type: boolean`.
#[derive(Debug, Clone, Default)]
pub struct BooleanValidator {
    /// Shared keywords.
    pub common: Common,
}

impl BooleanValidator {
    /// Native booleans pass; `"true"`/`"false"` pass only when `raw`.
    ///
    /// # Errors
    ///
    /// `"value should be type of bool"` for anything else.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        let input = match self.common.precheck(input, "bool")? {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        match input {
            Field::Value(Value::Bool(b)) => Ok(Field::Value(Value::Bool(b))),
            Field::Value(Value::String(s)) if raw => match s.as_str() {
                "true" => Ok(Field::Value(Value::Bool(true))),
                "false" => Ok(Field::Value(Value::Bool(false))),
                _ => Err(type_error("bool")),
            },
            _ => Err(type_error("bool")),
        }
    }
}

/// `"value should be type of <name>"`.
pub(crate) fn type_error(type_name: &str) -> FieldError {
    FieldError::Message(format!("value should be type of {type_name}"))
}

/// Render enum members as `[a, b, c]` for messages.
pub(crate) fn render_list<T: std::fmt::Display>(items: &[T]) -> String {
    let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(", "))
}
