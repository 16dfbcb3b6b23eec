//! # Parameters
//!
//! A [`Parameter`] binds a compiled validator to a named request location.
//! Parameters come from the path item and from the operation; the operation
//! wins when both declare the same `(name, in)`. Either may be a `$ref` into
//! `components.parameters`.

use oasv_core::{CompileError, Components};
use oasv_schema::{SchemaCompiler, Validator};
use serde_json::{Map, Value};

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// Query string; repeatable.
    Query,
    /// Router path match; always required.
    Path,
    /// Request header; case-insensitive, reported lowercase.
    Header,
    /// Cookie; exact name.
    Cookie,
}

impl Location {
    /// Parse the `in` field of a parameter object.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(Self::Query),
            "path" => Some(Self::Path),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }

    /// The `in` spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

/// A compiled parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Name as reported in results and errors. Header names are lowercased.
    pub name: String,
    /// Where the raw value is read from.
    pub location: Location,
    /// Validator applied with `raw = true`.
    pub validator: Validator,
    /// Missing value is an error.
    pub required: bool,
}

/// Compile the effective parameters of an operation.
///
/// # Errors
///
/// `MissingComponents` for a `$ref` without components, `InvalidParameter`
/// for malformed parameter objects, and any schema compile error.
pub fn compile_parameters(
    path_item: Option<&Map<String, Value>>,
    operation: &Map<String, Value>,
    components: Option<&Components>,
    compiler: &SchemaCompiler<'_>,
) -> Result<Vec<Parameter>, CompileError> {
    let mut declared: Vec<&Map<String, Value>> = Vec::new();
    let sources = [
        path_item.and_then(|item| item.get("parameters")),
        operation.get("parameters"),
    ];
    for list in sources.into_iter().flatten() {
        let list = list
            .as_array()
            .ok_or_else(|| CompileError::InvalidParameter("parameters must be a list".to_string()))?;
        for entry in list {
            let entry = resolve(entry, components)?;
            let key = identity(entry)?;
            // Later declarations (the operation's) replace earlier ones.
            declared.retain(|existing| identity(existing).ok() != Some(key));
            declared.push(entry);
        }
    }
    declared
        .into_iter()
        .map(|entry| compile_one(entry, compiler))
        .collect()
}

fn resolve<'v>(
    entry: &'v Value,
    components: Option<&'v Components>,
) -> Result<&'v Map<String, Value>, CompileError> {
    let entry = match entry.get("$ref").and_then(Value::as_str) {
        Some(reference) => components
            .ok_or(CompileError::MissingComponents)?
            .resolve(reference)?,
        None => entry,
    };
    entry
        .as_object()
        .ok_or_else(|| CompileError::InvalidParameter("parameter must be an object".to_string()))
}

fn identity(entry: &Map<String, Value>) -> Result<(&str, &str), CompileError> {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| CompileError::InvalidParameter("name is required".to_string()))?;
    let location = entry
        .get("in")
        .and_then(Value::as_str)
        .ok_or_else(|| CompileError::InvalidParameter(format!("'in' is required for {name}")))?;
    Ok((name, location))
}

fn compile_one(entry: &Map<String, Value>, compiler: &SchemaCompiler<'_>) -> Result<Parameter, CompileError> {
    let (name, location) = identity(entry)?;
    let location = Location::parse(location).ok_or_else(|| {
        CompileError::InvalidParameter(format!("unknown location '{location}' for {name}"))
    })?;
    let schema = entry
        .get("schema")
        .ok_or_else(|| CompileError::InvalidParameter(format!("schema is required for {name}")))?;
    let required = match entry.get("required") {
        None => false,
        Some(Value::Bool(required)) => *required,
        Some(_) => {
            return Err(CompileError::InvalidParameter(format!(
                "required must be a boolean for {name}"
            )))
        }
    };
    let name = match location {
        Location::Header => name.to_ascii_lowercase(),
        _ => name.to_string(),
    };
    Ok(Parameter {
        validator: compiler.compile(schema)?,
        required: required || location == Location::Path,
        name,
        location,
    })
}
