use std::fmt;

use crate::path::{ErrorPath, PathSegment};
use crate::violation::Violation;

/// One or more violations found for a single instance/schema pair.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct ValidationError {
    pub errors: Vec<Violation>,
}

impl ValidationError {
    pub fn new(errors: Vec<Violation>) -> Self {
        Self { errors }
    }

    pub fn single(violation: Violation) -> Self {
        Self {
            errors: vec![violation],
        }
    }

    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Violation> {
        self.errors
    }

    /// Rewrite every violation, e.g. to prepend path segments.
    pub fn map_violations(self, f: impl FnMut(Violation) -> Violation) -> Self {
        Self {
            errors: self.errors.into_iter().map(f).collect(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors.iter();
        match errors.next() {
            Some(first) => write!(f, "{first}")?,
            None => return write!(f, "validation failed"),
        }
        for err in errors.by_ref().take(3) {
            write!(f, "; {err}")?;
        }
        let hidden = self.errors.len().saturating_sub(4);
        if hidden > 0 {
            write!(f, "; and {hidden} more")?;
        }
        Ok(())
    }
}

/// Errors that can occur while validating or unmarshaling an instance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// The instance does not satisfy the schema.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationError),

    /// The schema itself could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// An array schema without `items` was asked to convert an array.
    #[error("array schema has no items (schema: {schema_path})")]
    MissingItems { schema_path: ErrorPath },
}

impl SchemaError {
    /// Prepend `segments` to the schema path of whatever this error carries.
    pub fn with_schema_prefix(self, segments: &[PathSegment]) -> Self {
        match self {
            SchemaError::Invalid(err) => SchemaError::Invalid(
                err.map_violations(|v| v.with_schema_prefix(segments.iter().cloned())),
            ),
            SchemaError::MissingItems { schema_path } => SchemaError::MissingItems {
                schema_path: schema_path.prefixed(segments.iter().cloned()),
            },
            other => other,
        }
    }

    /// Prepend `segments` to the instance path of every carried violation.
    pub fn with_path_prefix(self, segments: &[PathSegment]) -> Self {
        match self {
            SchemaError::Invalid(err) => SchemaError::Invalid(
                err.map_violations(|v| v.with_path_prefix(segments.iter().cloned())),
            ),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
