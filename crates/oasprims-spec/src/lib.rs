//! Operation lookup over a pre-parsed OpenAPI document.
//!
//! [`Spec`] indexes every operation of a document once, keyed by the full URI
//! template (server base path included) and the lowercased HTTP method.
//! Lookups afterwards are read-only, so a `Spec` can be shared between
//! threads serving concurrent requests.

pub mod error;
pub mod spec;

pub use error::{Result, SpecError};
pub use spec::{Operation, Spec, METHODS};
