use oasprims_message::MessageError;
use oasprims_spec::SpecError;

// HTTP status codes an adapter should answer with.
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Any failure of [`OasValidator`](crate::OasValidator).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OasError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Message(#[from] MessageError),

    /// The request carries no matched URI template.
    #[error("request did not match any route")]
    Unrouted,
}

impl OasError {
    /// Status code for reporting this error on the HTTP side.
    ///
    /// Client data problems map to 400; undocumented responses and broken
    /// definitions are server faults.
    pub fn status_code(&self) -> u16 {
        match self {
            OasError::Spec(SpecError::OperationNotFound { .. }) | OasError::Unrouted => NOT_FOUND,
            OasError::Spec(SpecError::MethodNotAllowed { .. }) => METHOD_NOT_ALLOWED,
            OasError::Spec(SpecError::InvalidDocument(_)) => INTERNAL_SERVER_ERROR,
            OasError::Message(err) => match err {
                MessageError::Validation(_)
                | MessageError::Unmarshal(_)
                | MessageError::UndocumentedMediaType { .. } => BAD_REQUEST,
                MessageError::UndocumentedResponse { .. }
                | MessageError::MissingParameter { .. }
                | MessageError::InvalidDefinition(_)
                | MessageError::Schema(_) => INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// True when the client sent something the document does not allow.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, OasError>;
