use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One step of a path into a schema or an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Mapping key (property name, keyword, media type, status code).
    Key(String),
    /// Sequence index.
    Index(usize),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key.replace('~', "~0").replace('/', "~1")),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Ordered path from a document root, left to right.
///
/// Paths only grow at the front as errors travel outwards through
/// composition, content and parameter layers. Every prefixing operation
/// consumes the path and returns the extended one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ErrorPath(Vec<PathSegment>);

impl ErrorPath {
    /// An empty path pointing at the document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split a JSON pointer into typed segments.
    ///
    /// `document` is walked alongside so that numeric tokens become
    /// [`PathSegment::Index`] only where they address an array element.
    pub fn from_pointer(pointer: &str, document: &Value) -> Self {
        let mut segments = Vec::new();
        let mut current = Some(document);

        for token in pointer.split('/').skip(1) {
            let token = token.replace("~1", "/").replace("~0", "~");
            match current {
                Some(Value::Array(items)) => match token.parse::<usize>() {
                    Ok(index) => {
                        current = items.get(index);
                        segments.push(PathSegment::Index(index));
                    }
                    Err(_) => {
                        current = None;
                        segments.push(PathSegment::Key(token));
                    }
                },
                Some(Value::Object(map)) => {
                    current = map.get(&token);
                    segments.push(PathSegment::Key(token));
                }
                _ => {
                    current = None;
                    segments.push(PathSegment::Key(token));
                }
            }
        }

        Self(segments)
    }

    /// Prepend `segments`, keeping their left-to-right order.
    pub fn prefixed<I, S>(self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        let mut joined: Vec<PathSegment> = segments.into_iter().map(Into::into).collect();
        joined.extend(self.0);
        Self(joined)
    }

    /// Append a single segment.
    pub fn join(mut self, segment: impl Into<PathSegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Follow this path through `document`.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(document, |node, segment| match (segment, node) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key),
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            })
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for ErrorPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ErrorPath {
    /// Renders as a JSON pointer (`""` for the root).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pointer_tokens_are_typed_by_the_document() {
        let schema = json!({
            "allOf": [{"properties": {"0": {"type": "string"}}}]
        });

        let path = ErrorPath::from_pointer("/allOf/0/properties/0/type", &schema);
        assert_eq!(
            path.segments(),
            &[
                PathSegment::key("allOf"),
                PathSegment::Index(0),
                PathSegment::key("properties"),
                PathSegment::key("0"),
                PathSegment::key("type"),
            ]
        );
    }

    #[test]
    fn pointer_escapes_are_decoded() {
        let schema = json!({"properties": {"a/b~c": {}}});
        let path = ErrorPath::from_pointer("/properties/a~1b~0c", &schema);
        assert_eq!(path.last(), Some(&PathSegment::key("a/b~c")));
        assert_eq!(path.to_string(), "/properties/a~1b~0c");
    }

    #[test]
    fn root_pointer_is_empty() {
        assert!(ErrorPath::from_pointer("", &json!({})).is_empty());
        assert_eq!(ErrorPath::root().to_string(), "");
    }

    #[test]
    fn prefixing_keeps_order_and_leaves_source_untouched() {
        let inner: ErrorPath = ["schema", "format"].into_iter().collect();
        let outer = inner.clone().prefixed([
            PathSegment::key("content"),
            PathSegment::key("application/json"),
        ]);

        assert_eq!(inner.len(), 2);
        assert_eq!(outer.to_string(), "/content/application~1json/schema/format");
    }

    #[test]
    fn resolve_walks_keys_and_indices() {
        let doc = json!({"a": [{"b": 1}]});
        let path = ErrorPath::root().join("a").join(0usize).join("b");
        assert_eq!(path.resolve(&doc), Some(&json!(1)));
        assert_eq!(ErrorPath::root().join("missing").resolve(&doc), None);
    }
}
