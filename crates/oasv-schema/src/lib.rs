//! # oasv-schema — Schema Compiler & Validator Nodes
//!
//! Compiles OpenAPI 3.0 schema objects into immutable [`Validator`] trees and
//! applies them to incoming values.
//!
//! ## Compilation (`compiler`)
//!
//! [`SchemaCompiler::compile`] walks a schema once: `$ref` is resolved
//! against a [`Components`](oasv_core::Components) table and recompiled in
//! place, `oneOf`/`anyOf`/`allOf` become combinator nodes, everything else
//! dispatches strictly on `type`. String formats are bound to their check
//! functions at this point from a [`FormatRegistry`], so validation itself
//! never consults shared state.
//!
//! ## Validation (`validator` and the per-kind modules)
//!
//! [`Validator::validate`] takes a [`Field`](oasv_core::Field) and a `raw`
//! flag. `raw` is set for values extracted from query, path, header and
//! cookie locations: those arrive as text and are coerced (`"10"` becomes
//! `10`, `"1,2"` becomes `[1, 2]`). Values decoded from a typed body are
//! validated with `raw = false` and must already have the right JSON type.
//!
//! ## Error Policy
//!
//! | Node   | On failure                                                  |
//! |--------|-------------------------------------------------------------|
//! | Object | all property failures collected into one map               |
//! | Array  | first failing index only, as `{"<index>": <error>}`        |
//! | OneOf / AnyOf / AllOf | one flat message, branch detail discarded   |
//!
//! ## Crate Policy
//!
//! - Validator trees are `Send + Sync` and never mutated after compilation.
//! - No I/O and no blocking inside `validate`.

pub mod array;
pub mod combinator;
pub mod compiler;
pub mod formats;
pub mod numeric;
pub mod object;
pub mod string;
pub mod validator;

pub use array::ArrayValidator;
pub use combinator::{AllOfValidator, CombinatorValidator, Discriminator};
pub use compiler::{compile, SchemaCompiler};
pub use formats::{FormatCheck, FormatRegistry, BUILTIN_FORMATS};
pub use numeric::{Bound, IntegerFormat, IntegerValidator, NumberFormat, NumberValidator};
pub use object::{AdditionalProperties, ObjectValidator};
pub use string::StringValidator;
pub use validator::{BooleanValidator, Common, Validator};
