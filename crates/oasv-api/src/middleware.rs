//! # Validation Middleware
//!
//! Route-layer middleware: looks up the binder for the matched route,
//! buffers the body, binds the request, and either rejects it or hands the
//! [`BoundRequest`](oasv_binder::BoundRequest) to the handler through the
//! request extensions. Must be installed with `route_layer` so
//! `MatchedPath` is available.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::rejection::{MatchedPathRejection, RawPathParamsRejection};
use axum::extract::{MatchedPath, RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::surface::HttpSurface;
use crate::table::ValidationTable;

/// Largest request body buffered for validation.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Validate the request against its operation before the handler runs.
///
/// Routes without a compiled binder pass through untouched.
pub async fn validation_middleware(
    State(table): State<Arc<ValidationTable>>,
    matched: Result<MatchedPath, MatchedPathRejection>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request,
    next: Next,
) -> Response {
    let Ok(matched) = matched else {
        return next.run(request).await;
    };
    let Some(binder) = table.get(request.method().as_str(), matched.as_str()) else {
        return next.run(request).await;
    };

    let path: Vec<(String, String)> = params
        .map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect()
        })
        .unwrap_or_default();

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %matched.as_str(), error = %e, "request body could not be read");
            return AppError::BadRequest("request body could not be read".into()).into_response();
        }
    };

    let bound = binder.bind(&HttpSurface::new(&parts, path, &bytes));
    match bound {
        Ok(bound) => {
            parts.extensions.insert(bound);
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(e) => {
            tracing::warn!(
                method = %parts.method,
                path = %matched.as_str(),
                reason = %e,
                "request rejected"
            );
            AppError::from(e).into_response()
        }
    }
}
