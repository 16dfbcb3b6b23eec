//! # oasv-auth — Security Requirement Validators
//!
//! Compiles an OpenAPI `security` list into an [`AuthValidator`] and applies
//! it to the credential-bearing parts of a request: headers, the query
//! string and cookies, reached through the [`CredentialSurface`] trait.
//!
//! ## Composition
//!
//! ```text
//! security:                      AnyOf
//!   - bearerAuth: []               ├── Bearer
//!   - apiKey: []                   ├── ApiKeyHeader("x-api-key")
//!     session: []                  │     (AllOf with ApiKeyCookie("session"))
//!   - {}                         Optional(..) wraps the whole AnyOf
//! ```
//!
//! A successful validation yields the [`Credentials`] map: the credential
//! value keyed by the header, query or cookie name it came from.
//!
//! ## Crate Policy
//!
//! - Credential values are never logged.
//! - Compilation failures are [`CompileError`](oasv_core::CompileError)s
//!   and are meant to abort startup.

pub mod compiler;
pub mod surface;
pub mod validator;

pub use compiler::compile_security;
pub use surface::{CredentialSurface, StaticCredentials};
pub use validator::{AuthValidator, Credentials};
