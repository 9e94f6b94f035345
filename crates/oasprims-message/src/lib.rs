//! Request and response unmarshaling against OpenAPI operation definitions.
//!
//! HTTP layers plug in by implementing the capability traits in [`models`]
//! ([`Request`], [`Response`] and their parts). The functions here resolve
//! parameters, request bodies and response content through a
//! [`SchemaUnmarshaler`](oasprims_schema::SchemaUnmarshaler) and report every
//! problem found in one pass.
//!
//! # Error paths
//!
//! Schema paths are rooted at the operation definition: request parameter
//! errors start with `parameters/<index>`, request body errors with
//! `requestBody/content/<media type>`, and response errors with
//! `responses/<status>/headers` or `responses/<status>/content`.

pub mod content;
pub mod error;
pub mod models;
pub mod parameters;
pub mod request;
pub mod request_body;
pub mod response;

pub use content::unmarshal_content;
pub use error::{MessageError, Result, UnmarshalError};
pub use models::{
    Content, Location, Parameters, RawRequest, RawResponse, RawValues, Request, RequestBody,
    Response,
};
pub use parameters::{deserialize_parameter, unmarshal_parameters, ParameterValues};
pub use request::{unmarshal_request, UnmarshaledRequest};
pub use request_body::unmarshal_request_body;
pub use response::validate_response;
