use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use chrono::{DateTime, NaiveDate};
use uuid::Uuid;

use crate::value::TypedValue;

type Checker = dyn Fn(&str) -> bool + Send + Sync;
type Converter = dyn Fn(&str) -> Option<TypedValue> + Send + Sync;

/// A named string format: a checker used during validation and a converter
/// applied to valid strings during unmarshaling.
#[derive(Clone)]
pub struct Format {
    checker: Arc<Checker>,
    converter: Arc<Converter>,
}

impl Format {
    pub fn new<C, F>(checker: C, converter: F) -> Self
    where
        C: Fn(&str) -> bool + Send + Sync + 'static,
        F: Fn(&str) -> Option<TypedValue> + Send + Sync + 'static,
    {
        Self {
            checker: Arc::new(checker),
            converter: Arc::new(converter),
        }
    }

    pub fn check(&self, value: &str) -> bool {
        (self.checker)(value)
    }

    pub fn convert(&self, value: &str) -> Option<TypedValue> {
        (self.converter)(value)
    }

    pub(crate) fn checker(&self) -> Arc<Checker> {
        Arc::clone(&self.checker)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format").finish_non_exhaustive()
    }
}

/// Name-keyed registry of formats.
///
/// [`FormatRegistry::default`] knows `date`, `date-time`, `uuid` and `byte`.
/// [`FormatRegistry::empty`] knows nothing, which turns format handling off.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, Format>,
}

impl FormatRegistry {
    /// A registry without any formats.
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Register (or replace) a format.
    pub fn register(&mut self, name: impl Into<String>, format: Format) {
        self.formats.insert(name.into(), format);
    }

    /// Builder form of [`FormatRegistry::register`].
    pub fn with_format(mut self, name: impl Into<String>, format: Format) -> Self {
        self.register(name, format);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Format> {
        self.formats.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Format)> {
        self.formats.iter().map(|(name, format)| (name.as_str(), format))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::empty()
            .with_format(
                "date",
                Format::new(
                    |s| parse_full_date(s).is_some(),
                    |s| parse_full_date(s).map(TypedValue::Date),
                ),
            )
            .with_format(
                "date-time",
                Format::new(
                    |s| DateTime::parse_from_rfc3339(s).is_ok(),
                    |s| DateTime::parse_from_rfc3339(s).ok().map(TypedValue::DateTime),
                ),
            )
            .with_format(
                "uuid",
                Format::new(
                    |s| parse_hyphenated_uuid(s).is_some(),
                    |s| parse_hyphenated_uuid(s).map(TypedValue::Uuid),
                ),
            )
            .with_format(
                "byte",
                Format::new(
                    |s| decode_base64(s).is_some(),
                    |s| decode_base64(s).map(TypedValue::Bytes),
                ),
            )
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

/// RFC 3339 `full-date`: exactly `YYYY-MM-DD`.
fn parse_full_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_hyphenated_uuid(s: &str) -> Option<Uuid> {
    if s.len() != 36 {
        return None;
    }
    Uuid::try_parse(s).ok()
}

fn decode_base64(s: &str) -> Option<Vec<u8>> {
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}
