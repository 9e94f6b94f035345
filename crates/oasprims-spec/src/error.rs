/// Errors raised while indexing a document or resolving an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// No path item matches the URI template.
    #[error("no operation for {uri_template}")]
    OperationNotFound { uri_template: String },

    /// The path item exists but does not define the method.
    #[error("method {method} not allowed for {uri_template} (allowed: {})", allowed.join(", "))]
    MethodNotAllowed {
        uri_template: String,
        method: String,
        allowed: Vec<String>,
    },

    /// The document does not have the shape of an OpenAPI description.
    #[error("invalid specification document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, SpecError>;
