//! Handler-side access to the values the validation middleware bound.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use oasv_binder::BoundRequest;

use crate::error::AppError;

/// The [`BoundRequest`] the middleware stored for this request.
///
/// Rejects with 500 when the route has no validation middleware, which is
/// a wiring mistake rather than a client error.
#[derive(Debug, Clone)]
pub struct Validated(pub BoundRequest);

impl<S: Send + Sync> FromRequestParts<S> for Validated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BoundRequest>()
            .cloned()
            .map(Validated)
            .ok_or_else(|| AppError::Internal("no bound request in request context".into()))
    }
}
