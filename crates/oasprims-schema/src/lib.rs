//! OpenAPI schema validation and typed unmarshaling.
//!
//! Walks a schema and an untyped JSON instance in lockstep: the instance is
//! validated first (Draft 4 plus OpenAPI's `nullable`), then converted into a
//! [`TypedValue`] tree where registered formats such as `date` become real
//! dates.
//!
//! Composition keywords are honoured during conversion: `allOf` merges
//! object results with earlier sub-schemas taking priority, `oneOf`/`anyOf`
//! take the first alternative that validates.

pub mod config;
pub mod error;
pub mod formats;
pub mod path;
pub mod rewrite;
pub mod unmarshaler;
pub mod validator;
pub mod value;
pub mod violation;

pub use config::UnmarshalerConfig;
pub use error::{Result, SchemaError, ValidationError};
pub use formats::{Format, FormatRegistry};
pub use path::{ErrorPath, PathSegment};
pub use unmarshaler::SchemaUnmarshaler;
pub use validator::SchemaValidator;
pub use value::TypedValue;
pub use violation::Violation;
