//! # oasv-api — Axum Adapter
//!
//! Puts the oasv binder in front of axum handlers. Every operation of an
//! OpenAPI document is compiled into a [`ValidationTable`] at startup; the
//! [`validation_middleware`] binds each request to its operation and
//! either answers `400` with the error map or forwards the request with a
//! [`BoundRequest`](oasv_binder::BoundRequest) in its extensions, available
//! to handlers through the [`Validated`] extractor.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → validation_middleware (route layer) → Handler
//! ```
//!
//! `/health/liveness` is mounted outside validation.

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod surface;
pub mod table;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, on, MethodFilter, MethodRouter};
use axum::{Json, Router};
use oasv_binder::OpenApiDocument;
use serde_json::Value;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use extractors::Validated;
pub use middleware::validation_middleware;
pub use surface::HttpSurface;
pub use table::ValidationTable;

/// Echo application: every operation of `document` answers with the JSON
/// of its bound values.
pub fn app(document: &OpenApiDocument, table: ValidationTable) -> Router {
    let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();
    for operation in document.operations() {
        let Some(filter) = method_filter(&operation.method) else {
            continue;
        };
        let methods = match by_path.remove(&operation.path) {
            Some(methods) => methods.on(filter, echo),
            None => on(filter, echo),
        };
        by_path.insert(operation.path, methods);
    }

    let mut api = by_path
        .into_iter()
        .fold(Router::new(), |router, (path, methods)| router.route(&path, methods));
    // `route_layer` rejects a router without routes.
    if !table.is_empty() {
        api = api.route_layer(from_fn_with_state(Arc::new(table), validation_middleware));
    }

    Router::new()
        .route("/health/liveness", get(liveness))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}

fn method_filter(method: &str) -> Option<MethodFilter> {
    Some(match method {
        "get" => MethodFilter::GET,
        "put" => MethodFilter::PUT,
        "post" => MethodFilter::POST,
        "delete" => MethodFilter::DELETE,
        "options" => MethodFilter::OPTIONS,
        "head" => MethodFilter::HEAD,
        "patch" => MethodFilter::PATCH,
        "trace" => MethodFilter::TRACE,
        _ => return None,
    })
}

/// Returns every bound value, credentials included.
async fn echo(Validated(bound): Validated) -> Json<Value> {
    Json(bound.data_json())
}

/// Liveness check.
async fn liveness() -> &'static str {
    "ok"
}
