//! # Numeric Validators
//!
//! `type: integer` and `type: number`.
//!
//! Booleans are never numbers here, even though some hosts treat them as
//! integer-like. Text is accepted only for raw inputs and is trimmed before
//! parsing. Check order after type resolution: `int32` range, `enum`,
//! `minimum`, `maximum`.

use std::cmp::Ordering;

use oasv_core::{Field, FieldError};
use serde_json::{Number, Value};

use crate::validator::{render_list, type_error, Common, Step};

/// `format` of an integer schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerFormat {
    /// Signed 32-bit range enforced.
    Int32,
    /// Full native range.
    Int64,
}

impl IntegerFormat {
    /// Parse the schema's `format` string.
    pub fn parse(format: &str) -> Option<Self> {
        match format {
            "int32" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            _ => None,
        }
    }
}

/// `format` of a number schema. Both formats validate identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// `float`
    Float,
    /// `double`
    Double,
}

impl NumberFormat {
    /// Parse the schema's `format` string.
    pub fn parse(format: &str) -> Option<Self> {
        match format {
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            _ => None,
        }
    }
}

/// A numeric operand: integers stay exact, everything else is compared as
/// `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Int(i128),
    Float(f64),
}

impl Operand {
    fn of(number: &Number) -> Self {
        if let Some(i) = number.as_i64() {
            Self::Int(i128::from(i))
        } else if let Some(u) = number.as_u64() {
            Self::Int(i128::from(u))
        } else {
            Self::Float(number.as_f64().unwrap_or(f64::NAN))
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

/// A lower or upper limit, strict when `exclusive`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    /// The limit as written in the schema.
    pub limit: Number,
    /// Strict comparison (`exclusiveMinimum`/`exclusiveMaximum`).
    pub exclusive: bool,
}

impl Bound {
    fn check_lower(&self, value: Operand) -> Result<(), FieldError> {
        let passes = match value.compare(Operand::of(&self.limit)) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !self.exclusive,
            _ => false,
        };
        if passes {
            Ok(())
        } else {
            Err(FieldError::Message(format!(
                "value should be more than{} {}",
                self.qualifier(),
                self.limit
            )))
        }
    }

    fn check_upper(&self, value: Operand) -> Result<(), FieldError> {
        let passes = match value.compare(Operand::of(&self.limit)) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => !self.exclusive,
            _ => false,
        };
        if passes {
            Ok(())
        } else {
            Err(FieldError::Message(format!(
                "value should be less than{} {}",
                self.qualifier(),
                self.limit
            )))
        }
    }

    fn qualifier(&self) -> &'static str {
        if self.exclusive {
            ""
        } else {
            " or equal to"
        }
    }
}

fn check_bounds(
    value: Operand,
    minimum: Option<&Bound>,
    maximum: Option<&Bound>,
) -> Result<(), FieldError> {
    if let Some(bound) = minimum {
        bound.check_lower(value)?;
    }
    if let Some(bound) = maximum {
        bound.check_upper(value)?;
    }
    Ok(())
}

fn check_enum(value: Operand, enumeration: Option<&[Value]>) -> Result<(), FieldError> {
    let Some(members) = enumeration else {
        return Ok(());
    };
    let found = members.iter().any(|member| {
        member
            .as_number()
            .is_some_and(|n| value.compare(Operand::of(n)) == Some(Ordering::Equal))
    });
    if found {
        Ok(())
    } else {
        Err(FieldError::Message(format!(
            "value should be one of {}",
            render_list(members)
        )))
    }
}

// ── Integer ─────────────────────────────────────────────────────────

/// Validator for `type: integer`.
#[derive(Debug, Clone, Default)]
pub struct IntegerValidator {
    /// Shared keywords.
    pub common: Common,
    /// `int32`/`int64`; `None` behaves like `int64`.
    pub format: Option<IntegerFormat>,
    /// `minimum` with its exclusivity.
    pub minimum: Option<Bound>,
    /// `maximum` with its exclusivity.
    pub maximum: Option<Bound>,
    /// Allowed values.
    pub enumeration: Option<Vec<Value>>,
}

impl IntegerValidator {
    /// Validate an integer input.
    ///
    /// # Errors
    ///
    /// `"value should be type of int"` on a type mismatch, otherwise the
    /// first failing range, enum or bound check.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        let input = match self.common.precheck(input, "int")? {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        let number = match input {
            Field::Value(Value::Number(n)) if n.is_i64() || n.is_u64() => n,
            Field::Value(Value::String(s)) if raw => parse_integer(&s)?,
            _ => return Err(type_error("int")),
        };
        let operand = Operand::of(&number);
        if self.format == Some(IntegerFormat::Int32) && !fits_int32(operand) {
            return Err(FieldError::message("value out of bounds int32"));
        }
        check_enum(operand, self.enumeration.as_deref())?;
        check_bounds(operand, self.minimum.as_ref(), self.maximum.as_ref())?;
        Ok(Field::Value(Value::Number(number)))
    }
}

fn fits_int32(value: Operand) -> bool {
    matches!(value, Operand::Int(i) if i32::try_from(i).is_ok())
}

fn parse_integer(text: &str) -> Result<Number, FieldError> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        Ok(Number::from(i))
    } else if let Ok(u) = text.parse::<u64>() {
        Ok(Number::from(u))
    } else {
        Err(type_error("int"))
    }
}

// ── Number ──────────────────────────────────────────────────────────

/// Validator for `type: number`.
#[derive(Debug, Clone, Default)]
pub struct NumberValidator {
    /// Shared keywords.
    pub common: Common,
    /// `float`/`double`, informational only.
    pub format: Option<NumberFormat>,
    /// `minimum` with its exclusivity.
    pub minimum: Option<Bound>,
    /// `maximum` with its exclusivity.
    pub maximum: Option<Bound>,
    /// Allowed values.
    pub enumeration: Option<Vec<Value>>,
}

impl NumberValidator {
    /// Validate a number input; integers are promoted to floats.
    ///
    /// # Errors
    ///
    /// `"value should be type of float"` on a type mismatch (including
    /// non-finite text such as `"nan"`), otherwise the first failing enum or
    /// bound check.
    pub fn validate(&self, input: Field, raw: bool) -> Result<Field, FieldError> {
        let input = match self.common.precheck(input, "float")? {
            Step::Done(field) => return Ok(field),
            Step::Check(field) => field,
        };
        let value = match input {
            Field::Value(Value::Number(n)) => n.as_f64().ok_or_else(|| type_error("float"))?,
            Field::Value(Value::String(s)) if raw => s
                .trim()
                .parse::<f64>()
                .map_err(|_| type_error("float"))?,
            _ => return Err(type_error("float")),
        };
        let number = Number::from_f64(value).ok_or_else(|| type_error("float"))?;
        let operand = Operand::Float(value);
        check_enum(operand, self.enumeration.as_deref())?;
        check_bounds(operand, self.minimum.as_ref(), self.maximum.as_ref())?;
        Ok(Field::Value(Value::Number(number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bound(limit: i64, exclusive: bool) -> Option<Bound> {
        Some(Bound {
            limit: Number::from(limit),
            exclusive,
        })
    }

    fn err(message: &str) -> FieldError {
        FieldError::message(message)
    }

    #[test]
    fn integer_accepts_native_and_raw_text() {
        let v = IntegerValidator::default();
        assert_eq!(v.validate(json!(7).into(), false).unwrap(), Field::Value(json!(7)));
        assert_eq!(v.validate(Field::text(" 42 "), true).unwrap(), Field::Value(json!(42)));
        assert_eq!(v.validate(Field::text("42"), false).unwrap_err(), err("value should be type of int"));
        assert_eq!(v.validate(Field::text("4.2"), true).unwrap_err(), err("value should be type of int"));
        assert_eq!(v.validate(json!(4.2).into(), false).unwrap_err(), err("value should be type of int"));
    }

    #[test]
    fn integer_rejects_booleans() {
        let v = IntegerValidator::default();
        assert_eq!(v.validate(json!(true).into(), false).unwrap_err(), err("value should be type of int"));
        assert!(v.validate(json!(false).into(), true).is_err());
    }

    #[test]
    fn int32_range() {
        let v = IntegerValidator {
            format: Some(IntegerFormat::Int32),
            ..IntegerValidator::default()
        };
        assert!(v.validate(json!(2_147_483_647).into(), false).is_ok());
        assert!(v.validate(json!(-2_147_483_648_i64).into(), false).is_ok());
        assert_eq!(
            v.validate(json!(2_147_483_648_i64).into(), false).unwrap_err(),
            err("value out of bounds int32")
        );
        assert_eq!(
            v.validate(Field::text("-2147483649"), true).unwrap_err(),
            err("value out of bounds int32")
        );
        let wide = IntegerValidator {
            format: Some(IntegerFormat::Int64),
            ..IntegerValidator::default()
        };
        assert!(wide.validate(json!(u64::MAX).into(), false).is_ok());
    }

    #[test]
    fn inclusive_and_exclusive_bounds() {
        let v = IntegerValidator {
            minimum: bound(10, true),
            maximum: bound(20, false),
            ..IntegerValidator::default()
        };
        assert_eq!(v.validate(Field::text("10"), true).unwrap_err(), err("value should be more than 10"));
        assert_eq!(v.validate(Field::text("15"), true).unwrap(), Field::Value(json!(15)));
        assert!(v.validate(json!(20).into(), false).is_ok());
        assert_eq!(
            v.validate(json!(21).into(), false).unwrap_err(),
            err("value should be less than or equal to 20")
        );

        let v = IntegerValidator {
            minimum: bound(10, false),
            maximum: bound(20, true),
            ..IntegerValidator::default()
        };
        assert_eq!(
            v.validate(json!(9).into(), false).unwrap_err(),
            err("value should be more than or equal to 10")
        );
        assert_eq!(v.validate(json!(20).into(), false).unwrap_err(), err("value should be less than 20"));
    }

    #[test]
    fn enum_checked_before_bounds() {
        let v = IntegerValidator {
            minimum: bound(100, false),
            enumeration: Some(vec![json!(1), json!(2)]),
            ..IntegerValidator::default()
        };
        assert_eq!(v.validate(json!(3).into(), false).unwrap_err(), err("value should be one of [1, 2]"));
        assert_eq!(
            v.validate(json!(1).into(), false).unwrap_err(),
            err("value should be more than or equal to 100")
        );
    }

    #[test]
    fn number_promotes_integers() {
        let v = NumberValidator::default();
        assert_eq!(v.validate(json!(5).into(), false).unwrap(), Field::Value(json!(5.0)));
        assert_eq!(v.validate(Field::text("2.5"), true).unwrap(), Field::Value(json!(2.5)));
        assert_eq!(v.validate(Field::text("2.5"), false).unwrap_err(), err("value should be type of float"));
        assert_eq!(v.validate(json!(true).into(), false).unwrap_err(), err("value should be type of float"));
        assert_eq!(v.validate(Field::text("nan"), true).unwrap_err(), err("value should be type of float"));
    }

    #[test]
    fn number_bounds_with_fractional_limits() {
        let v = NumberValidator {
            minimum: Some(Bound {
                limit: Number::from_f64(0.5).unwrap(),
                exclusive: true,
            }),
            ..NumberValidator::default()
        };
        assert_eq!(v.validate(json!(0.5).into(), false).unwrap_err(), err("value should be more than 0.5"));
        assert!(v.validate(json!(1).into(), false).is_ok());
    }

    #[test]
    fn number_enum_compares_numerically() {
        let v = NumberValidator {
            enumeration: Some(vec![json!(1), json!(2.5)]),
            ..NumberValidator::default()
        };
        assert!(v.validate(json!(1.0).into(), false).is_ok());
        assert!(v.validate(Field::text("2.5"), true).is_ok());
        assert_eq!(v.validate(json!(3).into(), false).unwrap_err(), err("value should be one of [1, 2.5]"));
    }

    #[test]
    fn nullable_and_default() {
        let v = IntegerValidator {
            common: Common {
                nullable: true,
                default: Some(json!(5)),
                read_only: false,
            },
            ..IntegerValidator::default()
        };
        assert_eq!(v.validate(Field::Null, false).unwrap(), Field::Null);
        assert_eq!(v.validate(Field::Absent, true).unwrap(), Field::Value(json!(5)));
    }
}
