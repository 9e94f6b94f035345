//! Schema-driven OpenAPI request and response validation.
//!
//! oasprims checks HTTP exchanges against a pre-parsed OpenAPI document and
//! turns raw parameters and payloads into typed values, reporting every
//! violation with its location in both the document and the data.
//!
//! # Crate Structure
//!
//! - [`schema`]: JSON Schema validation with `nullable`, typed unmarshaling, formats
//! - [`spec`]: operation lookup by URI template and method
//! - [`message`]: request/response traits, parameters, bodies and responses
//!
//! [`OasValidator`] ties the three together for the common case.

/// Re-export schema types.
pub mod schema {
    pub use oasprims_schema::*;
}

/// Re-export specification types.
pub mod spec {
    pub use oasprims_spec::*;
}

/// Re-export message types.
pub mod message {
    pub use oasprims_message::*;
}

pub mod error;
pub mod validator;

pub use error::{OasError, Result};
pub use validator::OasValidator;
