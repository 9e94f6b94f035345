use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::path::{ErrorPath, PathSegment};

/// A single structural failure of an instance against a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Human readable description.
    pub message: String,
    /// The violated keyword (`type`, `format`, `required`, ...).
    pub validator: String,
    /// The keyword's value in the schema.
    pub validator_value: Value,
    /// The offending part of the instance.
    pub instance: Value,
    /// The schema node that holds the violated keyword.
    pub schema: Value,
    /// Path into the schema, ending at the keyword.
    pub schema_path: ErrorPath,
    /// Path into the instance.
    pub path: ErrorPath,
}

impl Violation {
    pub fn new(
        message: impl Into<String>,
        validator: impl Into<String>,
        validator_value: Value,
    ) -> Self {
        Self {
            message: message.into(),
            validator: validator.into(),
            validator_value,
            instance: Value::Null,
            schema: Value::Null,
            schema_path: ErrorPath::root(),
            path: ErrorPath::root(),
        }
    }

    pub fn with_instance(mut self, instance: Value) -> Self {
        self.instance = instance;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_schema_path(mut self, schema_path: ErrorPath) -> Self {
        self.schema_path = schema_path;
        self
    }

    pub fn with_path(mut self, path: ErrorPath) -> Self {
        self.path = path;
        self
    }

    /// Prepend segments to the schema path.
    pub fn with_schema_prefix<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.schema_path = self.schema_path.prefixed(segments);
        self
    }

    /// Prepend segments to the instance path.
    pub fn with_path_prefix<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = self.path.prefixed(segments);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} (schema: {})", self.message, self.schema_path)
        } else {
            write!(
                f,
                "{}: {} (schema: {})",
                self.path, self.message, self.schema_path
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prefixes_extend_both_paths() {
        let violation = Violation::new("bad", "type", json!("integer"))
            .with_schema_path(["schema", "type"].into_iter().collect())
            .with_schema_prefix([PathSegment::Index(0)])
            .with_path_prefix(["query", "p"]);

        assert_eq!(violation.schema_path.to_string(), "/0/schema/type");
        assert_eq!(violation.path.to_string(), "/query/p");
    }

    #[test]
    fn display_includes_instance_location() {
        let violation = Violation::new("too short", "minItems", json!(2))
            .with_schema_path(["minItems"].into_iter().collect())
            .with_path(["tags"].into_iter().collect());

        assert_eq!(violation.to_string(), "/tags: too short (schema: /minItems)");
    }
}
