use oasprims_message::{Request, Response, UnmarshaledRequest};
use oasprims_schema::{FormatRegistry, SchemaUnmarshaler, UnmarshalerConfig};
use oasprims_spec::{Operation, Spec};
use serde_json::Value;
use tracing::debug;

use crate::error::{OasError, Result};

/// Validates requests and responses against one OpenAPI document.
///
/// Immutable after construction; share it behind an `Arc` across request
/// handlers.
#[derive(Debug, Clone)]
pub struct OasValidator {
    spec: Spec,
    unmarshaler: SchemaUnmarshaler,
}

impl OasValidator {
    /// Validator with the built-in formats and default config.
    pub fn new(spec: Spec) -> Self {
        Self::with_unmarshaler(spec, SchemaUnmarshaler::new())
    }

    pub fn with_unmarshaler(spec: Spec, unmarshaler: SchemaUnmarshaler) -> Self {
        Self { spec, unmarshaler }
    }

    /// Index `document` and build a validator with the given formats and config.
    pub fn from_document(
        document: Value,
        formats: FormatRegistry,
        config: UnmarshalerConfig,
    ) -> Result<Self> {
        let spec = Spec::from_value(document)?;
        Ok(Self::with_unmarshaler(
            spec,
            SchemaUnmarshaler::with_config(formats, config),
        ))
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn unmarshaler(&self) -> &SchemaUnmarshaler {
        &self.unmarshaler
    }

    /// Resolve the request's operation and unmarshal its parameters and body.
    pub fn unmarshal_request<R>(&self, request: &R) -> Result<UnmarshaledRequest>
    where
        R: Request + ?Sized,
    {
        let uri_template = request.uri_template().ok_or(OasError::Unrouted)?;
        let operation = self.operation(uri_template, request.method(), request.media_type())?;

        oasprims_message::unmarshal_request(&self.unmarshaler, request, operation.definition())
            .map_err(|err| {
                debug!(uri_template, method = request.method(), error = %err, "request failed validation");
                err.into()
            })
    }

    /// Resolve the operation a response answers and validate the response.
    pub fn validate_response<R>(&self, uri_template: &str, method: &str, response: &R) -> Result<()>
    where
        R: Response + ?Sized,
    {
        let operation = self.operation(uri_template, method, response.media_type())?;

        oasprims_message::validate_response(&self.unmarshaler, response, operation.definition())
            .map_err(|err| {
                debug!(uri_template, method, error = %err, "response failed validation");
                err.into()
            })
    }

    fn operation(
        &self,
        uri_template: &str,
        method: &str,
        media_type: Option<&str>,
    ) -> Result<&Operation> {
        Ok(self.spec.get_operation(uri_template, method, media_type)?)
    }
}
