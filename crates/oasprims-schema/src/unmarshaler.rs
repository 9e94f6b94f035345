use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::trace;

use crate::config::UnmarshalerConfig;
use crate::error::{Result, SchemaError, ValidationError};
use crate::formats::FormatRegistry;
use crate::path::{ErrorPath, PathSegment};
use crate::validator::SchemaValidator;
use crate::value::TypedValue;
use crate::violation::Violation;

/// Validates instances against schemas and converts them into [`TypedValue`]s.
///
/// Validation always precedes conversion for the schema handed to
/// [`SchemaUnmarshaler::unmarshal`], so converters only ever see valid data.
/// The unmarshaler holds no per-call state and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SchemaUnmarshaler {
    validator: SchemaValidator,
}

impl SchemaUnmarshaler {
    /// Unmarshaler with the built-in formats and default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unmarshaler with an explicit format registry.
    pub fn with_formats(formats: FormatRegistry) -> Self {
        Self::with_config(formats, UnmarshalerConfig::default())
    }

    /// Unmarshaler with an explicit format registry and config.
    pub fn with_config(formats: FormatRegistry, config: UnmarshalerConfig) -> Self {
        Self {
            validator: SchemaValidator::new(formats, config),
        }
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn formats(&self) -> &FormatRegistry {
        self.validator.formats()
    }

    pub fn config(&self) -> &UnmarshalerConfig {
        self.validator.config()
    }

    /// Validate `instance` against `schema`, then convert it.
    pub fn unmarshal(&self, instance: &Value, schema: &Value) -> Result<TypedValue> {
        self.validator.validate(instance, schema)?;
        self.convert(instance, schema)
    }

    /// Convert an instance already known to satisfy `schema`.
    fn convert(&self, instance: &Value, schema: &Value) -> Result<TypedValue> {
        // Nullability is settled during validation.
        if instance.is_null() {
            return Ok(TypedValue::Null);
        }

        if let Some(sub_schemas) = non_empty_list(schema, "allOf") {
            return self.convert_all_of(instance, sub_schemas);
        }

        let alternatives = non_empty_list(schema, "oneOf").or_else(|| non_empty_list(schema, "anyOf"));
        for sub_schema in alternatives.unwrap_or_default() {
            match self.unmarshal(instance, sub_schema) {
                Ok(converted) => return Ok(converted),
                Err(SchemaError::Invalid(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("array") => self.convert_array(instance, schema),
            Some("object") => self.convert_object(instance, schema),
            Some("integer" | "number" | "boolean" | "string") => {
                self.convert_primitive(instance, schema)
            }
            _ => Ok(TypedValue::from(instance)),
        }
    }

    /// The first sub-schema seeds the result. When it describes an object
    /// (explicitly or by omitting `type`), later results are merged in, but a
    /// property the seed already transformed is never overwritten.
    fn convert_all_of(&self, instance: &Value, sub_schemas: &[Value]) -> Result<TypedValue> {
        let Some((first, rest)) = sub_schemas.split_first() else {
            return Ok(TypedValue::from(instance));
        };

        let mut result = self
            .convert(instance, first)
            .map_err(|err| err.with_schema_prefix(&composition_prefix("allOf", 0)))?;

        let object_like = first.get("type").map_or(true, |kind| kind == "object");
        if !object_like {
            return Ok(result);
        }

        for (offset, sub_schema) in rest.iter().enumerate() {
            let index = offset + 1;
            let converted = self
                .convert(instance, sub_schema)
                .map_err(|err| err.with_schema_prefix(&composition_prefix("allOf", index)))?;

            let (TypedValue::Object(seed), TypedValue::Object(later), Value::Object(raw)) =
                (&mut result, converted, instance)
            else {
                trace!(index, "allOf result is not an object, merge skipped");
                continue;
            };

            for (key, value) in later {
                if !already_transformed(seed, raw, &key) {
                    seed.insert(key, value);
                }
            }
        }

        Ok(result)
    }

    fn convert_array(&self, instance: &Value, schema: &Value) -> Result<TypedValue> {
        let Value::Array(items) = instance else {
            return Ok(TypedValue::from(instance));
        };
        let item_schemas = schema.get("items").ok_or_else(|| SchemaError::MissingItems {
            schema_path: ErrorPath::root(),
        })?;

        let mut converted = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            // Draft 4 tuple form: one schema per position, then `additionalItems`.
            let (item_schema, schema_prefix) = match item_schemas {
                Value::Array(positional) => match positional.get(index) {
                    Some(item_schema) => (
                        item_schema,
                        vec![PathSegment::key("items"), PathSegment::Index(index)],
                    ),
                    None => match schema.get("additionalItems") {
                        Some(extra @ Value::Object(_)) => {
                            (extra, vec![PathSegment::key("additionalItems")])
                        }
                        _ => {
                            converted.push(TypedValue::from(item));
                            continue;
                        }
                    },
                },
                single => (single, vec![PathSegment::key("items")]),
            };

            let value = self.convert(item, item_schema).map_err(|err| {
                err.with_schema_prefix(&schema_prefix)
                    .with_path_prefix(&[PathSegment::Index(index)])
            })?;
            converted.push(value);
        }

        Ok(TypedValue::Array(converted))
    }

    fn convert_object(&self, instance: &Value, schema: &Value) -> Result<TypedValue> {
        let Value::Object(fields) = instance else {
            return Ok(TypedValue::from(instance));
        };
        let properties = schema.get("properties").and_then(Value::as_object);
        let mut result = BTreeMap::new();

        for (name, sub_schema) in properties.into_iter().flatten() {
            let value = match fields.get(name).or_else(|| sub_schema.get("default")) {
                Some(value) => value,
                None => continue,
            };
            let converted = self.convert(value, sub_schema).map_err(|err| {
                err.with_schema_prefix(&[PathSegment::key("properties"), PathSegment::key(name)])
                    .with_path_prefix(&[PathSegment::key(name)])
            })?;
            result.insert(name.clone(), converted);
        }

        let undeclared = fields
            .iter()
            .filter(|(name, _)| !properties.is_some_and(|p| p.contains_key(name.as_str())));

        match schema.get("additionalProperties") {
            Some(additional @ Value::Object(_)) => {
                for (name, value) in undeclared {
                    let converted = self.convert(value, additional).map_err(|err| {
                        err.with_schema_prefix(&[PathSegment::key("additionalProperties")])
                            .with_path_prefix(&[PathSegment::key(name)])
                    })?;
                    result.insert(name.clone(), converted);
                }
            }
            None | Some(Value::Bool(true)) => {
                for (name, value) in undeclared {
                    result.insert(name.clone(), TypedValue::from(value));
                }
            }
            // `false` (or anything else) drops undeclared properties.
            Some(_) => {}
        }

        Ok(TypedValue::Object(result))
    }

    fn convert_primitive(&self, instance: &Value, schema: &Value) -> Result<TypedValue> {
        let Some(name) = schema.get("format").and_then(Value::as_str) else {
            return Ok(TypedValue::from(instance));
        };
        let (Some(format), Value::String(raw)) = (self.formats().get(name), instance) else {
            return Ok(TypedValue::from(instance));
        };

        trace!(format = name, "converting formatted value");
        format.convert(raw).ok_or_else(|| {
            let violation = Violation::new(
                format!("{instance} is not a {}", Value::from(name)),
                "format",
                Value::from(name),
            )
            .with_instance(instance.clone())
            .with_schema(schema.clone())
            .with_schema_path(ErrorPath::root().join("format"));
            ValidationError::single(violation).into()
        })
    }
}

fn non_empty_list<'a>(schema: &'a Value, keyword: &str) -> Option<&'a [Value]> {
    schema
        .get(keyword)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .filter(|list| !list.is_empty())
}

fn composition_prefix(keyword: &str, index: usize) -> [PathSegment; 2] {
    [PathSegment::key(keyword), PathSegment::Index(index)]
}

/// True when the seed holds a value for `key` that differs from the raw
/// instance value, i.e. an earlier sub-schema converted it. Keys the seed
/// filled from a default (absent in the raw instance) count as transformed.
fn already_transformed(
    seed: &BTreeMap<String, TypedValue>,
    raw: &Map<String, Value>,
    key: &str,
) -> bool {
    match (seed.get(key), raw.get(key)) {
        (None, _) => false,
        (Some(current), Some(raw_value)) => current != raw_value,
        (Some(_), None) => true,
    }
}
