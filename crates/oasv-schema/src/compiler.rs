//! # Schema Compiler
//!
//! Turns an OpenAPI schema object into a [`Validator`] tree.
//!
//! 1. `$ref` → resolved against the components table and compiled in place.
//!    Sibling keywords next to a `$ref` are ignored. A reference that
//!    re-enters itself is rejected.
//! 2. `oneOf` / `anyOf` / `allOf` → combinator node over the compiled
//!    branches, with an optional discriminator.
//! 3. Otherwise dispatch on `type`.
//!
//! Every reference site gets a fresh subtree; nothing is memoized.

use std::collections::{BTreeMap, BTreeSet};

use oasv_core::{CompileError, Components};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::array::ArrayValidator;
use crate::combinator::{AllOfValidator, CombinatorValidator, Discriminator};
use crate::formats::FormatRegistry;
use crate::numeric::{Bound, IntegerFormat, IntegerValidator, NumberFormat, NumberValidator};
use crate::object::{AdditionalProperties, ObjectValidator};
use crate::string::StringValidator;
use crate::validator::{BooleanValidator, Common, Validator};

/// Compile with the built-in string formats.
///
/// # Errors
///
/// Any [`CompileError`] raised while walking the schema.
pub fn compile(schema: &Value, components: Option<&Components>) -> Result<Validator, CompileError> {
    let formats = FormatRegistry::new();
    SchemaCompiler::new(components, &formats).compile(schema)
}

/// Compiler bound to one components table and one format registry.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCompiler<'a> {
    components: Option<&'a Components>,
    formats: &'a FormatRegistry,
}

impl<'a> SchemaCompiler<'a> {
    /// Create a compiler. `components` may be `None` for documents without
    /// a `components` section; any `$ref` then fails.
    pub fn new(components: Option<&'a Components>, formats: &'a FormatRegistry) -> Self {
        Self {
            components,
            formats,
        }
    }

    /// Compile one schema object.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] for malformed schemas, unresolved or
    /// cyclic references, unknown types and invalid keyword values.
    pub fn compile(&self, schema: &Value) -> Result<Validator, CompileError> {
        let mut stack = Vec::new();
        self.compile_inner(schema, &mut stack)
    }

    fn compile_inner(&self, schema: &Value, stack: &mut Vec<String>) -> Result<Validator, CompileError> {
        let object = as_schema(schema)?;

        if let Some(reference) = object.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| invalid("$ref", "must be a string"))?;
            return self.compile_ref(reference, stack);
        }

        let common = common(object)?;
        if let Some(branches) = object.get("oneOf") {
            let (branches, discriminator) = self.compile_branches(object, "oneOf", branches, stack)?;
            return Ok(Validator::OneOf(CombinatorValidator {
                common,
                branches,
                discriminator,
            }));
        }
        if let Some(branches) = object.get("anyOf") {
            let (branches, discriminator) = self.compile_branches(object, "anyOf", branches, stack)?;
            return Ok(Validator::AnyOf(CombinatorValidator {
                common,
                branches,
                discriminator,
            }));
        }
        if let Some(branches) = object.get("allOf") {
            let branches = branch_list("allOf", branches)?
                .iter()
                .map(|branch| self.compile_inner(branch, stack))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Validator::AllOf(AllOfValidator { common, branches }));
        }

        let kind = match object.get("type") {
            None => return Err(CompileError::MissingType),
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => return Err(CompileError::UnknownType(other.to_string())),
        };
        match kind {
            "integer" => self.integer(object, common),
            "number" => self.number(object, common),
            "string" => self.string(object, common),
            "boolean" => Ok(Validator::Boolean(BooleanValidator { common })),
            "array" => self.array(object, common, stack),
            "object" => self.object(object, common, stack),
            other => Err(CompileError::UnknownType(other.to_string())),
        }
    }

    fn compile_ref(&self, reference: &str, stack: &mut Vec<String>) -> Result<Validator, CompileError> {
        let components = self.components.ok_or(CompileError::MissingComponents)?;
        if stack.iter().any(|seen| seen == reference) {
            return Err(CompileError::CyclicRef(reference.to_string()));
        }
        let target = components.resolve(reference)?;
        stack.push(reference.to_string());
        let compiled = self.compile_inner(target, stack);
        stack.pop();
        compiled
    }

    fn compile_branches(
        &self,
        object: &Map<String, Value>,
        keyword: &str,
        branches: &Value,
        stack: &mut Vec<String>,
    ) -> Result<(Vec<Validator>, Option<Discriminator>), CompileError> {
        let schemas = branch_list(keyword, branches)?;
        let compiled = schemas
            .iter()
            .map(|branch| self.compile_inner(branch, stack))
            .collect::<Result<Vec<_>, _>>()?;
        let discriminator = match object.get("discriminator") {
            Some(definition) => Some(discriminator(definition, schemas)?),
            None => None,
        };
        Ok((compiled, discriminator))
    }

    // ── Per-type builders ───────────────────────────────────────────

    fn integer(&self, object: &Map<String, Value>, common: Common) -> Result<Validator, CompileError> {
        let format = match string_keyword(object, "format")? {
            None => None,
            Some(name) => Some(IntegerFormat::parse(name).ok_or_else(|| unknown_format("integer", name))?),
        };
        Ok(Validator::Integer(IntegerValidator {
            common,
            format,
            minimum: bound(object, "minimum", "exclusiveMinimum")?,
            maximum: bound(object, "maximum", "exclusiveMaximum")?,
            enumeration: enumeration(object)?,
        }))
    }

    fn number(&self, object: &Map<String, Value>, common: Common) -> Result<Validator, CompileError> {
        let format = match string_keyword(object, "format")? {
            None => None,
            Some(name) => Some(NumberFormat::parse(name).ok_or_else(|| unknown_format("number", name))?),
        };
        Ok(Validator::Number(NumberValidator {
            common,
            format,
            minimum: bound(object, "minimum", "exclusiveMinimum")?,
            maximum: bound(object, "maximum", "exclusiveMaximum")?,
            enumeration: enumeration(object)?,
        }))
    }

    fn string(&self, object: &Map<String, Value>, common: Common) -> Result<Validator, CompileError> {
        let format = string_keyword(object, "format")?.map(str::to_string);
        let check = format.as_deref().and_then(|name| self.formats.get(name)).cloned();
        let pattern = match string_keyword(object, "pattern")? {
            None => None,
            Some(source) => Some(Regex::new(source).map_err(|e| CompileError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?),
        };
        Ok(Validator::String(StringValidator {
            common,
            format,
            check,
            pattern,
            min_length: count(object, "minLength")?,
            max_length: count(object, "maxLength")?,
            enumeration: enumeration(object)?,
        }))
    }

    fn array(
        &self,
        object: &Map<String, Value>,
        common: Common,
        stack: &mut Vec<String>,
    ) -> Result<Validator, CompileError> {
        let items = object.get("items").ok_or_else(|| invalid("items", "is required for arrays"))?;
        Ok(Validator::Array(ArrayValidator {
            common,
            items: Box::new(self.compile_inner(items, stack)?),
            min_items: count(object, "minItems")?,
            max_items: count(object, "maxItems")?,
            unique_items: flag(object, "uniqueItems")?,
        }))
    }

    fn object(
        &self,
        object: &Map<String, Value>,
        common: Common,
        stack: &mut Vec<String>,
    ) -> Result<Validator, CompileError> {
        let mut properties = BTreeMap::new();
        if let Some(declared) = object.get("properties") {
            let declared = declared.as_object().ok_or_else(|| invalid("properties", "must be an object"))?;
            for (name, schema) in declared {
                properties.insert(name.clone(), self.compile_inner(schema, stack)?);
            }
        }

        let required: BTreeSet<String> = match object.get("required") {
            None => BTreeSet::new(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| {
                    name.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid("required", "must be a list of strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(invalid("required", "must be a list of strings")),
        };

        let additional = match object.get("additionalProperties") {
            None | Some(Value::Bool(true)) => AdditionalProperties::Allow,
            Some(Value::Bool(false)) => AdditionalProperties::Deny,
            Some(schema @ Value::Object(_)) => {
                AdditionalProperties::Schema(Box::new(self.compile_inner(schema, stack)?))
            }
            Some(_) => return Err(invalid("additionalProperties", "must be a boolean or a schema")),
        };

        Ok(Validator::Object(ObjectValidator {
            common,
            properties,
            required,
            min_properties: count(object, "minProperties")?,
            max_properties: count(object, "maxProperties")?,
            additional,
        }))
    }
}

// ── Keyword readers ─────────────────────────────────────────────────

fn as_schema(schema: &Value) -> Result<&Map<String, Value>, CompileError> {
    schema.as_object().ok_or_else(|| invalid("schema", "must be an object"))
}

fn invalid(keyword: &str, reason: &str) -> CompileError {
    CompileError::InvalidKeyword {
        keyword: keyword.to_string(),
        reason: reason.to_string(),
    }
}

fn unknown_format(kind: &str, format: &str) -> CompileError {
    CompileError::UnknownFormat {
        kind: kind.to_string(),
        format: format.to_string(),
    }
}

fn common(object: &Map<String, Value>) -> Result<Common, CompileError> {
    Ok(Common {
        nullable: flag(object, "nullable")?,
        // `default: null` is the same as no default.
        default: object.get("default").filter(|v| !v.is_null()).cloned(),
        read_only: flag(object, "readOnly")?,
    })
}

fn flag(object: &Map<String, Value>, keyword: &str) -> Result<bool, CompileError> {
    match object.get(keyword) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(invalid(keyword, "must be a boolean")),
    }
}

fn count(object: &Map<String, Value>, keyword: &str) -> Result<Option<usize>, CompileError> {
    match object.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(keyword, "must be a non-negative integer")),
    }
}

fn string_keyword<'s>(object: &'s Map<String, Value>, keyword: &str) -> Result<Option<&'s str>, CompileError> {
    match object.get(keyword) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(invalid(keyword, "must be a string")),
    }
}

fn enumeration(object: &Map<String, Value>) -> Result<Option<Vec<Value>>, CompileError> {
    match object.get("enum") {
        None => Ok(None),
        Some(Value::Array(members)) => Ok(Some(members.clone())),
        Some(_) => Err(invalid("enum", "must be a list")),
    }
}

/// `minimum` + `exclusiveMinimum` (or the `maximum` pair). The exclusive
/// keyword may be a boolean flag or, in the newer dialect, the limit itself.
fn bound(object: &Map<String, Value>, limit: &str, exclusive: &str) -> Result<Option<Bound>, CompileError> {
    let limit_value: Option<Number> = match object.get(limit) {
        None => None,
        Some(Value::Number(n)) => Some(n.clone()),
        Some(_) => return Err(invalid(limit, "must be a number")),
    };
    match object.get(exclusive) {
        None => Ok(limit_value.map(|limit| Bound {
            limit,
            exclusive: false,
        })),
        Some(Value::Bool(flag)) => Ok(limit_value.map(|limit| Bound {
            limit,
            exclusive: *flag,
        })),
        Some(Value::Number(n)) => Ok(Some(Bound {
            limit: n.clone(),
            exclusive: true,
        })),
        Some(_) => Err(invalid(exclusive, "must be a boolean or a number")),
    }
}

fn branch_list<'s>(keyword: &str, branches: &'s Value) -> Result<&'s [Value], CompileError> {
    match branches {
        Value::Array(list) if !list.is_empty() => Ok(list),
        _ => Err(invalid(keyword, "must be a non-empty list of schemas")),
    }
}

/// Build the dispatch table. Each branch given as a `$ref` is selectable by
/// the last segment of its reference; `mapping` adds aliases whose target is
/// matched the same way.
fn discriminator(definition: &Value, branches: &[Value]) -> Result<Discriminator, CompileError> {
    let property = definition
        .get("propertyName")
        .and_then(Value::as_str)
        .ok_or_else(|| CompileError::Discriminator("propertyName is required".to_string()))?;

    let branch_names: Vec<Option<&str>> = branches
        .iter()
        .map(|branch| branch.get("$ref").and_then(Value::as_str).map(last_segment))
        .collect();

    let mut targets = BTreeMap::new();
    for (index, name) in branch_names.iter().enumerate() {
        if let Some(name) = name {
            targets.insert((*name).to_string(), index);
        }
    }

    if let Some(mapping) = definition.get("mapping") {
        let mapping = mapping
            .as_object()
            .ok_or_else(|| CompileError::Discriminator("mapping must be an object".to_string()))?;
        for (alias, target) in mapping {
            let target = target.as_str().ok_or_else(|| {
                CompileError::Discriminator(format!("mapping '{alias}' must be a string"))
            })?;
            let wanted = last_segment(target);
            let index = branch_names
                .iter()
                .position(|name| *name == Some(wanted))
                .ok_or_else(|| {
                    CompileError::Discriminator(format!(
                        "mapping '{alias}' points at '{target}', which is not one of the branches"
                    ))
                })?;
            targets.insert(alias.clone(), index);
        }
    }

    if targets.is_empty() {
        return Err(CompileError::Discriminator(
            "no branch can be selected; use $ref branches or a mapping".to_string(),
        ));
    }
    tracing::debug!(property, targets = targets.len(), "compiled discriminator");
    Ok(Discriminator {
        property: property.to_string(),
        targets,
    })
}

fn last_segment(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
