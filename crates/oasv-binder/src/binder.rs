//! # Operation Binder
//!
//! One [`OperationBinder`] per `(path, method)`, compiled once at startup
//! and shared read-only by every request to that operation.
//!
//! ## Per-request Flow
//!
//! 1. Parameters, in declaration order: read the raw value from its location,
//!    report `"is required"` when a required value is missing, otherwise
//!    validate with `raw = true`.
//! 2. Body: pick the declared content entry for the request media type
//!    (`; charset=...` stripped), decode, validate with the decoder's `raw`
//!    flag. No `Content-Type` means no body.
//! 3. Security: validate credentials; their error map entries join the
//!    others without replacing a parameter failure of the same name.
//!
//! Every failure lands in one [`ErrorMap`]. If it is not empty the whole
//! binding fails and no arguments are produced.

use std::collections::{BTreeMap, BTreeSet};

use oasv_auth::{compile_security, AuthValidator, Credentials};
use oasv_core::{CompileError, Components, ErrorMap, Field, FieldError};
use oasv_schema::{FormatRegistry, SchemaCompiler, Validator};
use serde_json::{Map, Value};

use crate::decoder::{essence, Decoder, DecoderRegistry};
use crate::document::OpenApiDocument;
use crate::error::BindError;
use crate::parameter::{compile_parameters, Location, Parameter};
use crate::surface::RequestSurface;

/// Key of the body in results and errors.
pub const BODY: &str = "body";

/// Binder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderOptions {
    /// When `false`, requests are passed through without any validation.
    pub validate: bool,
    /// Names the handler consumes. `None` hands every bound value to the
    /// handler.
    pub handler_params: Option<BTreeSet<String>>,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            validate: true,
            handler_params: None,
        }
    }
}

/// Result of a successful binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundRequest {
    /// Values destined for the handler.
    pub arguments: BTreeMap<String, Field>,
    /// Every bound value, credentials included.
    pub data: BTreeMap<String, Field>,
    /// Validated credentials only.
    pub credentials: Credentials,
}

impl BoundRequest {
    /// A bound value by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.data.get(name)
    }

    /// The full data map as a JSON object.
    pub fn data_json(&self) -> Value {
        Value::Object(
            self.data
                .iter()
                .filter_map(|(k, v)| v.clone().into_json().map(|v| (k.clone(), v)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
struct BodyContent {
    decoder: Decoder,
    /// `None` when the media type declares no schema.
    validator: Option<Validator>,
}

#[derive(Debug, Clone)]
struct RequestBody {
    required: bool,
    content: BTreeMap<String, BodyContent>,
}

impl RequestBody {
    /// Declared entry for a media type, with the same wildcard fallback as
    /// decoder lookup.
    fn select(&self, media_type: &str) -> Option<&BodyContent> {
        let (kind, subtype) = media_type.split_once('/').unwrap_or((media_type, "*"));
        [
            media_type.to_string(),
            format!("{kind}/*"),
            format!("*/{subtype}"),
            "*/*".to_string(),
        ]
        .iter()
        .find_map(|candidate| self.content.get(candidate))
    }
}

/// Compiled validation rules for one operation.
#[derive(Debug, Clone)]
pub struct OperationBinder {
    path: String,
    method: String,
    parameters: Vec<Parameter>,
    body: Option<RequestBody>,
    security: Option<AuthValidator>,
    options: BinderOptions,
}

impl OperationBinder {
    /// Compile the binder for `(path, method)`.
    ///
    /// # Errors
    ///
    /// Any [`CompileError`]: unknown operation, malformed parameters or
    /// schemas, a declared media type without decoder, an undeclared or
    /// unsupported security scheme.
    pub fn compile(
        document: &OpenApiDocument,
        path: &str,
        method: &str,
        formats: &FormatRegistry,
        decoders: &DecoderRegistry,
        options: BinderOptions,
    ) -> Result<Self, CompileError> {
        let method = method.to_ascii_lowercase();
        let operation = document.operation(path, &method)?;
        let components = document.components();
        let compiler = SchemaCompiler::new(components, formats);

        let parameters = compile_parameters(document.path_item(path), operation, components, &compiler)?;
        let body = match operation.get("requestBody") {
            Some(body) => Some(compile_body(body, components, &compiler, decoders)?),
            None => None,
        };
        let security = match operation.get("security").or_else(|| document.security()) {
            Some(requirements) => compile_security(requirements, components)?,
            None => None,
        };

        tracing::debug!(
            path,
            method = %method,
            parameters = parameters.len(),
            body = body.is_some(),
            security = security.is_some(),
            "compiled operation"
        );
        Ok(Self {
            path: path.to_string(),
            method,
            parameters,
            body,
            security,
            options,
        })
    }

    /// Path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Lowercase method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Compiled parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Declared body media types.
    pub fn body_media_types(&self) -> Vec<&str> {
        self.body
            .iter()
            .flat_map(|body| body.content.keys().map(String::as_str))
            .collect()
    }

    /// Compiled security requirement, if any.
    pub fn security(&self) -> Option<&AuthValidator> {
        self.security.as_ref()
    }

    /// Bind one request.
    ///
    /// # Errors
    ///
    /// [`BindError::UnsupportedMediaType`] when the request's media type is
    /// not declared; [`BindError::Invalid`] with every collected failure
    /// otherwise.
    pub fn bind<S>(&self, request: &S) -> Result<BoundRequest, BindError>
    where
        S: RequestSurface + ?Sized,
    {
        if !self.options.validate {
            return Ok(BoundRequest::default());
        }

        let mut errors = ErrorMap::new();
        let mut data = BTreeMap::new();

        for parameter in &self.parameters {
            let raw = extract(parameter, request);
            if raw.is_absent() && parameter.required {
                errors.insert(parameter.name.clone(), FieldError::message("is required"));
                continue;
            }
            match parameter.validator.validate(raw, true) {
                Ok(Field::Absent) => {}
                Ok(value) => {
                    data.insert(parameter.name.clone(), value);
                }
                Err(error) => {
                    errors.insert(parameter.name.clone(), error);
                }
            }
        }

        if let Some(body) = &self.body {
            match self.bind_body(body, request)? {
                Ok(Field::Absent) => {}
                Ok(value) => {
                    data.insert(BODY.to_string(), value);
                }
                Err(error) => {
                    errors.insert(BODY.to_string(), error);
                }
            }
        }

        let mut credentials = Credentials::new();
        if let Some(security) = &self.security {
            match security.validate(request) {
                Ok(validated) => credentials = validated,
                // A parameter failure under the same name is kept.
                Err(FieldError::Nested(failures)) => {
                    for (name, failure) in failures {
                        errors.entry(name).or_insert(failure);
                    }
                }
                Err(error) => {
                    errors.entry("security".to_string()).or_insert(error);
                }
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                path = %self.path,
                method = %self.method,
                errors = errors.len(),
                "request binding failed"
            );
            return Err(BindError::Invalid(errors));
        }

        for (name, value) in &credentials {
            data.insert(name.clone(), Field::text(value.clone()));
        }
        let arguments = match &self.options.handler_params {
            None => data.clone(),
            Some(wanted) => data
                .iter()
                .filter(|(name, _)| wanted.contains(name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        };
        Ok(BoundRequest {
            arguments,
            data,
            credentials,
        })
    }

    /// Outer `Err` aborts binding; inner `Err` is a body validation failure.
    fn bind_body<S>(&self, body: &RequestBody, request: &S) -> Result<Result<Field, FieldError>, BindError>
    where
        S: RequestSurface + ?Sized,
    {
        let Some(content_type) = request.content_type() else {
            return Ok(if body.required {
                Err(FieldError::message("is required"))
            } else {
                Ok(Field::Absent)
            });
        };
        let media_type = essence(&content_type);
        let content = body
            .select(&media_type)
            .ok_or(BindError::UnsupportedMediaType(media_type))?;
        let decoded = match content.decoder.decode(request.body()) {
            Ok(decoded) => decoded,
            Err(message) => return Ok(Err(FieldError::Message(message))),
        };
        if decoded.value.is_absent() && body.required {
            return Ok(Err(FieldError::message("is required")));
        }
        Ok(match &content.validator {
            Some(validator) => validator.validate(decoded.value, decoded.raw),
            None => Ok(decoded.value),
        })
    }
}

fn extract<S>(parameter: &Parameter, request: &S) -> Field
where
    S: RequestSurface + ?Sized,
{
    let single = |value: Option<String>| value.map_or(Field::Absent, Field::text);
    match parameter.location {
        Location::Query => {
            let mut values = request.query_values(&parameter.name);
            match values.len() {
                0 => Field::Absent,
                1 => Field::text(values.remove(0)),
                _ => Field::Value(Value::Array(values.into_iter().map(Value::String).collect())),
            }
        }
        Location::Path => single(request.path_param(&parameter.name)),
        Location::Header => single(request.header(&parameter.name)),
        Location::Cookie => single(request.cookie(&parameter.name)),
    }
}

fn compile_body(
    body: &Value,
    components: Option<&Components>,
    compiler: &SchemaCompiler<'_>,
    decoders: &DecoderRegistry,
) -> Result<RequestBody, CompileError> {
    let body = match body.get("$ref").and_then(Value::as_str) {
        Some(reference) => components
            .ok_or(CompileError::MissingComponents)?
            .resolve(reference)?,
        None => body,
    };
    let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
    let declared: &Map<String, Value> = body
        .get("content")
        .and_then(Value::as_object)
        .ok_or_else(|| CompileError::InvalidDocument("requestBody.content must be an object".to_string()))?;

    let mut content = BTreeMap::new();
    for (media_type, entry) in declared {
        let decoder = decoders.lookup(media_type)?.clone();
        let validator = match entry.get("schema") {
            Some(schema) => Some(compiler.compile(schema)?),
            None => None,
        };
        content.insert(essence(media_type), BodyContent { decoder, validator });
    }
    Ok(RequestBody { required, content })
}
