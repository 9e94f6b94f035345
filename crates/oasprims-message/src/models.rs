//! Capability contracts an HTTP layer implements, plus owned reference
//! adapters for tests and simple integrations.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw parameter values of one location, name to wire string.
pub type RawValues = HashMap<String, String>;

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Header,
    Cookie,
}

impl Location {
    pub const ALL: [Location; 4] = [
        Location::Path,
        Location::Query,
        Location::Header,
        Location::Cookie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
            Location::Cookie => "cookie",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter values grouped by location. A location the message does not
/// carry at all is `None`.
pub trait Parameters {
    fn path(&self) -> Option<&RawValues> {
        None
    }

    fn query(&self) -> Option<&RawValues> {
        None
    }

    fn header(&self) -> Option<&RawValues> {
        None
    }

    fn cookie(&self) -> Option<&RawValues> {
        None
    }

    fn values(&self, location: Location) -> Option<&RawValues> {
        match location {
            Location::Path => self.path(),
            Location::Query => self.query(),
            Location::Header => self.header(),
            Location::Cookie => self.cookie(),
        }
    }
}

/// A deserialized payload with its media type.
pub trait Content {
    /// Media type without parameters, e.g. `application/json`.
    fn media_type(&self) -> Option<&str>;

    /// Deserialized payload; `Null` when there is none.
    fn media(&self) -> &Value;
}

pub trait RequestBody: Content {
    fn content_length(&self) -> Option<u64>;
}

pub trait Request: Parameters + RequestBody {
    /// Matched path template including the server base path.
    fn uri_template(&self) -> Option<&str>;

    /// Lowercased HTTP method.
    fn method(&self) -> &str;
}

/// Headers are exposed through [`Parameters::header`].
pub trait Response: Content + Parameters {
    fn status_code(&self) -> u16;
}

/// Drop media type parameters and normalise case.
pub fn media_type_essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn insert(values: &mut Option<RawValues>, name: impl Into<String>, value: impl Into<String>) {
    values
        .get_or_insert_with(RawValues::new)
        .insert(name.into(), value.into());
}

/// Owned request built from already extracted parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRequest {
    uri_template: Option<String>,
    method: String,
    path: Option<RawValues>,
    query: Option<RawValues>,
    header: Option<RawValues>,
    cookie: Option<RawValues>,
    content_length: Option<u64>,
    media_type: Option<String>,
    media: Value,
}

impl RawRequest {
    pub fn new(method: &str, uri_template: impl Into<String>) -> Self {
        Self {
            uri_template: Some(uri_template.into()),
            method: method.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Request that matched no route.
    pub fn unmatched(method: &str) -> Self {
        Self {
            method: method.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.path, name, value);
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.query, name, value);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.header, name, value);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.cookie, name, value);
        self
    }

    /// Attach a JSON payload; content length is its serialized size.
    pub fn with_json(mut self, media_type: &str, media: Value) -> Self {
        self.content_length = Some(media.to_string().len() as u64);
        self.media_type = Some(media_type_essence(media_type));
        self.media = media;
        self
    }

    pub fn with_content_length(mut self, content_length: u64) -> Self {
        self.content_length = Some(content_length);
        self
    }
}

impl Parameters for RawRequest {
    fn path(&self) -> Option<&RawValues> {
        self.path.as_ref()
    }

    fn query(&self) -> Option<&RawValues> {
        self.query.as_ref()
    }

    fn header(&self) -> Option<&RawValues> {
        self.header.as_ref()
    }

    fn cookie(&self) -> Option<&RawValues> {
        self.cookie.as_ref()
    }
}

impl Content for RawRequest {
    fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    fn media(&self) -> &Value {
        &self.media
    }
}

impl RequestBody for RawRequest {
    fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

impl Request for RawRequest {
    fn uri_template(&self) -> Option<&str> {
        self.uri_template.as_deref()
    }

    fn method(&self) -> &str {
        &self.method
    }
}

/// Owned response built from already extracted parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    status_code: u16,
    header: Option<RawValues>,
    media_type: Option<String>,
    media: Value,
}

impl RawResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.header, name, value);
        self
    }

    pub fn with_json(mut self, media_type: &str, media: Value) -> Self {
        self.media_type = Some(media_type_essence(media_type));
        self.media = media;
        self
    }
}

impl Parameters for RawResponse {
    fn header(&self) -> Option<&RawValues> {
        self.header.as_ref()
    }
}

impl Content for RawResponse {
    fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    fn media(&self) -> &Value {
        &self.media
    }
}

impl Response for RawResponse {
    fn status_code(&self) -> u16 {
        self.status_code
    }
}
