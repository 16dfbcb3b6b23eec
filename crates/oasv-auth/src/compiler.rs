//! # Security Compiler
//!
//! `security` list → [`AuthValidator`].
//!
//! - each requirement object with one scheme compiles to that scheme's leaf,
//!   with several schemes to `AllOf` in declaration order (the workspace
//!   enables `serde_json`'s `preserve_order`);
//! - several requirements compile to `AnyOf` in declaration order;
//! - an empty requirement `{}` makes the result `Optional`;
//! - an empty list (or only `{}` entries) means no authentication.

use oasv_core::{CompileError, Components};
use serde_json::{Map, Value};

use crate::validator::AuthValidator;

/// Compile a `security` requirement list.
///
/// Returns `Ok(None)` when the list imposes no authentication.
///
/// # Errors
///
/// [`CompileError::MissingSecuritySchemes`] when schemes are referenced but
/// no `securitySchemes` section exists,
/// [`CompileError::UndeclaredSecurityScheme`] for an unknown scheme name and
/// [`CompileError::UnsupportedSecurityScheme`] for scheme types this engine
/// cannot check (`oauth2`, `openIdConnect`, unknown HTTP schemes).
pub fn compile_security(
    requirements: &Value,
    components: Option<&Components>,
) -> Result<Option<AuthValidator>, CompileError> {
    let requirements = requirements
        .as_array()
        .ok_or_else(|| CompileError::InvalidDocument("security must be a list".to_string()))?;

    let mut optional = false;
    let mut alternatives = Vec::with_capacity(requirements.len());
    for requirement in requirements {
        let requirement = requirement.as_object().ok_or_else(|| {
            CompileError::InvalidDocument("security requirement must be an object".to_string())
        })?;
        if requirement.is_empty() {
            optional = true;
            continue;
        }
        let schemes = components
            .and_then(|c| c.section("securitySchemes"))
            .ok_or(CompileError::MissingSecuritySchemes)?;
        let mut members = requirement
            .keys()
            .map(|name| compile_scheme(name, schemes))
            .collect::<Result<Vec<_>, _>>()?;
        let alternative = if members.len() == 1 {
            members.remove(0)
        } else {
            AuthValidator::AllOf(members)
        };
        alternatives.push(alternative);
    }

    let validator = match alternatives.len() {
        0 => return Ok(None),
        1 => alternatives.remove(0),
        _ => AuthValidator::AnyOf(alternatives),
    };
    tracing::debug!(optional, "compiled security requirements");
    Ok(Some(if optional {
        AuthValidator::Optional(Box::new(validator))
    } else {
        validator
    }))
}

fn compile_scheme(name: &str, schemes: &Map<String, Value>) -> Result<AuthValidator, CompileError> {
    let definition = schemes
        .get(name)
        .ok_or_else(|| CompileError::UndeclaredSecurityScheme(name.to_string()))?;
    let unsupported = |reason: String| CompileError::UnsupportedSecurityScheme {
        name: name.to_string(),
        reason,
    };
    let field = |key: &str| definition.get(key).and_then(Value::as_str);

    match field("type") {
        Some("http") => match field("scheme") {
            Some(scheme) if scheme.eq_ignore_ascii_case("basic") => Ok(AuthValidator::Basic),
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => Ok(AuthValidator::Bearer),
            Some(other) => Err(unsupported(format!("unknown scheme {other}"))),
            None => Err(unsupported("http scheme requires 'scheme'".to_string())),
        },
        Some("apiKey") => {
            let key = field("name")
                .ok_or_else(|| unsupported("apiKey scheme requires 'name'".to_string()))?;
            match field("in") {
                Some("header") => Ok(AuthValidator::ApiKeyHeader {
                    name: key.to_ascii_lowercase(),
                }),
                Some("query") => Ok(AuthValidator::ApiKeyQuery { name: key.to_string() }),
                Some("cookie") => Ok(AuthValidator::ApiKeyCookie { name: key.to_string() }),
                other => Err(unsupported(format!(
                    "unknown value of in {}",
                    other.unwrap_or("(missing)")
                ))),
            }
        }
        Some(other) => Err(unsupported(format!("unsupported auth type {other}"))),
        None => Err(unsupported("type is required".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components() -> Components {
        Components::from_value(json!({
            "securitySchemes": {
                "basicAuth": {"type": "http", "scheme": "basic"},
                "bearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"},
                "apiKeyHeaderAuth": {"type": "apiKey", "in": "header", "name": "X-API-KEY"},
                "apiKeyQueryAuth": {"type": "apiKey", "in": "query", "name": "api_key"},
                "apiKeyCookieAuth": {"type": "apiKey", "in": "cookie", "name": "C-API-KEY"},
                "digestAuth": {"type": "http", "scheme": "digest"},
                "oauth": {"type": "oauth2", "flows": {}}
            }
        }))
        .unwrap()
    }

    fn compiled(security: Value) -> Option<AuthValidator> {
        compile_security(&security, Some(&components())).unwrap()
    }

    #[test]
    fn single_requirement_is_not_wrapped() {
        assert_eq!(compiled(json!([{"basicAuth": []}])), Some(AuthValidator::Basic));
        assert_eq!(
            compiled(json!([{"apiKeyHeaderAuth": []}])),
            Some(AuthValidator::ApiKeyHeader { name: "x-api-key".into() })
        );
    }

    #[test]
    fn multiple_schemes_in_one_requirement_are_all_of() {
        assert_eq!(
            compiled(json!([{"bearerAuth": [], "apiKeyCookieAuth": []}])),
            Some(AuthValidator::AllOf(vec![
                AuthValidator::Bearer,
                AuthValidator::ApiKeyCookie { name: "C-API-KEY".into() },
            ]))
        );
    }

    #[test]
    fn all_of_keeps_declaration_order() {
        let security: Value =
            serde_yaml::from_str("- basicAuth: []\n  apiKeyCookieAuth: []\n").unwrap();
        let validator = compile_security(&security, Some(&components())).unwrap().unwrap();
        assert_eq!(
            validator,
            AuthValidator::AllOf(vec![
                AuthValidator::Basic,
                AuthValidator::ApiKeyCookie { name: "C-API-KEY".into() },
            ])
        );
        // Nothing sent: the first declared scheme reports.
        assert_eq!(
            validator.validate(&crate::StaticCredentials::new()).unwrap_err().to_json(),
            json!({"authorization": "is required"})
        );
    }

    #[test]
    fn several_requirements_are_any_of() {
        assert_eq!(
            compiled(json!([{"bearerAuth": []}, {"apiKeyQueryAuth": []}])),
            Some(AuthValidator::AnyOf(vec![
                AuthValidator::Bearer,
                AuthValidator::ApiKeyQuery { name: "api_key".into() },
            ]))
        );
    }

    #[test]
    fn empty_requirement_makes_it_optional() {
        assert_eq!(
            compiled(json!([{"bearerAuth": []}, {}])),
            Some(AuthValidator::Optional(Box::new(AuthValidator::Bearer)))
        );
        assert_eq!(compiled(json!([{}])), None);
        assert_eq!(compiled(json!([])), None);
    }

    #[test]
    fn compile_failures() {
        assert_eq!(
            compile_security(&json!([{"basicAuth": []}]), None).unwrap_err(),
            CompileError::MissingSecuritySchemes
        );
        assert_eq!(
            compile_security(&json!([{"jwt": []}]), Some(&components())).unwrap_err(),
            CompileError::UndeclaredSecurityScheme("jwt".into())
        );
        assert!(matches!(
            compile_security(&json!([{"digestAuth": []}]), Some(&components())),
            Err(CompileError::UnsupportedSecurityScheme { .. })
        ));
        assert!(matches!(
            compile_security(&json!([{"oauth": []}]), Some(&components())),
            Err(CompileError::UnsupportedSecurityScheme { .. })
        ));
        assert!(compile_security(&json!({"basicAuth": []}), Some(&components())).is_err());
    }
}
