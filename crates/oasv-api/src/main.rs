//! # oasv-api — Binary Entry Point
//!
//! Loads the OpenAPI document named by `OASV_SPEC`, compiles every
//! operation and serves the echo application on `PORT` (default 8080).

use anyhow::Context;
use oasv_api::{AppConfig, ValidationTable};
use oasv_binder::{BinderOptions, DecoderRegistry, OpenApiDocument};
use oasv_schema::FormatRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let text = tokio::fs::read_to_string(&config.spec_path)
        .await
        .with_context(|| format!("reading {}", config.spec_path.display()))?;
    let document = OpenApiDocument::from_text(&text).map_err(|e| {
        tracing::error!("OpenAPI document rejected: {e}");
        e
    })?;

    let options = BinderOptions {
        validate: config.validate,
        handler_params: None,
    };
    if !config.validate {
        tracing::warn!("request validation disabled");
    }
    let table = ValidationTable::compile(
        &document,
        &FormatRegistry::new(),
        &DecoderRegistry::new(),
        &options,
    )
    .map_err(|e| {
        tracing::error!("operation compilation failed: {e}");
        e
    })?;

    let app = oasv_api::app(&document, table);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("oasv echo server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
