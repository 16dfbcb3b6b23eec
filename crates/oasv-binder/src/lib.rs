//! # oasv-binder — Request Binding
//!
//! Turns an OpenAPI operation into an [`OperationBinder`] and applies it to
//! requests. The binder never touches an HTTP stack directly: it reads
//! through [`RequestSurface`], which the HTTP adapter implements over its own
//! request type and [`StaticRequest`] implements in memory.
//!
//! ## Startup
//!
//! 1. [`OpenApiDocument::from_text`] parses the document.
//! 2. [`OperationBinder::compile`] compiles parameters, request body and
//!    security for one operation. Format checks come from a
//!    [`FormatRegistry`](oasv_schema::FormatRegistry), body decoders from a
//!    [`DecoderRegistry`]. Any problem is a
//!    [`CompileError`](oasv_core::CompileError) and should stop startup.
//!
//! ## Per Request
//!
//! [`OperationBinder::bind`] returns a [`BoundRequest`] or a [`BindError`]
//! carrying every failure keyed by parameter name, credential name or
//! `"body"`.

pub mod binder;
pub mod decoder;
pub mod document;
pub mod error;
pub mod parameter;
pub mod surface;

pub use binder::{BinderOptions, BoundRequest, OperationBinder, BODY};
pub use decoder::{essence, DecodedBody, Decoder, DecoderRegistry};
pub use document::{OpenApiDocument, OperationRef, HTTP_METHODS};
pub use error::BindError;
pub use parameter::{Location, Parameter};
pub use surface::{RequestSurface, StaticRequest};
