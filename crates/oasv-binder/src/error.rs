//! Per-request binding failures.

use oasv_core::ErrorMap;
use thiserror::Error;

/// Why a request could not be bound to its operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// One or more values failed validation. Keys are parameter names,
    /// credential names, or `"body"`.
    #[error("request validation failed for {} field(s)", .0.len())]
    Invalid(ErrorMap),

    /// The request's media type is not declared for this operation.
    #[error("unsupported media type '{0}'")]
    UnsupportedMediaType(String),
}

impl BindError {
    /// The error map of an `Invalid` failure.
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::UnsupportedMediaType(_) => None,
        }
    }
}
