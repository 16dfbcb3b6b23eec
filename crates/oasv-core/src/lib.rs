//! # oasv-core — Foundational Types for the Validation Engine
//!
//! This crate is the leaf of the oasv dependency DAG. It defines the types
//! that every other crate exchanges: the three-way presence state of an input
//! field, the recursive validation error tree, the read-only components table
//! used for `$ref` resolution, and the compile-time error taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **Absent is not null.** [`Field`] distinguishes a key that was never
//!    supplied from a key supplied with `null`. Defaults apply to the former,
//!    the `nullable` check to the latter.
//!
//! 2. **Errors are data.** A validation failure is a [`FieldError`]: either a
//!    leaf message or a map from property name / array index to a nested
//!    error. Maps are ordered so the serialized error body is identical for
//!    identical failing input.
//!
//! 3. **Compile failures are fatal, validation failures are not.**
//!    [`CompileError`] is raised while routes are being set up and is meant to
//!    stop the process. [`FieldError`] is returned per request and is always
//!    rendered back to the caller.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oasv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod components;
pub mod error;
pub mod field;

pub use components::{split_ref, Components};
pub use error::{CompileError, ErrorMap, FieldError};
pub use field::Field;
