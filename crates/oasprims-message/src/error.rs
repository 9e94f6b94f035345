use std::fmt;

use oasprims_schema::{SchemaError, ValidationError, Violation};

use crate::models::Location;

/// Request-side failure: parameter and body problems, reported together.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct UnmarshalError {
    pub parameter_errors: Vec<Violation>,
    pub request_body_errors: Vec<Violation>,
}

impl UnmarshalError {
    pub fn is_empty(&self) -> bool {
        self.parameter_errors.is_empty() && self.request_body_errors.is_empty()
    }

    /// All violations, parameters first.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.parameter_errors
            .iter()
            .chain(&self.request_body_errors)
    }
}

impl fmt::Display for UnmarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request did not match its definition ({} parameter error(s), {} request body error(s))",
            self.parameter_errors.len(),
            self.request_body_errors.len()
        )?;
        if let Some(first) = self.violations().next() {
            write!(f, ": {first}")?;
        }
        Ok(())
    }
}

/// Errors raised while unmarshaling or validating HTTP messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MessageError {
    /// Data did not satisfy the definition (response side, or a single stage).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Request parameters and/or body did not satisfy the definition.
    #[error("{0}")]
    Unmarshal(#[from] UnmarshalError),

    /// The content's media type has no entry in the content map.
    #[error("undocumented media type: {}", media_type.as_deref().unwrap_or("<none>"))]
    UndocumentedMediaType { media_type: Option<String> },

    /// Neither the status code nor `default` is documented.
    #[error("undocumented response status: {status_code}")]
    UndocumentedResponse { status_code: u16 },

    /// No value and no default exist for a parameter.
    #[error("parameter {name} not found in {location}")]
    MissingParameter { location: Location, name: String },

    /// A parameter, request body or response definition is malformed.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A schema could not be used as given (compile failure, array without items).
    #[error(transparent)]
    Schema(SchemaError),
}

impl From<SchemaError> for MessageError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Invalid(err) => MessageError::Validation(err),
            other => MessageError::Schema(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;

/// Split an outcome into violations to accumulate and errors to propagate.
pub(crate) fn collect_violations<T>(
    result: Result<T>,
    sink: &mut Vec<Violation>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MessageError::Validation(err)) => {
            sink.extend(err.into_errors());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
