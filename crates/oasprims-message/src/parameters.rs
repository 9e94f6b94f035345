use std::collections::BTreeMap;

use oasprims_schema::{
    ErrorPath, PathSegment, SchemaUnmarshaler, TypedValue, ValidationError, Violation,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use tracing::trace;

use crate::error::{collect_violations, MessageError, Result};
use crate::models::{Location, Parameters};

/// The fields of a parameter definition the unmarshaler relies on.
#[derive(Debug, Clone, Deserialize)]
struct ParameterSpec {
    name: String,
    #[serde(rename = "in")]
    location: Location,
    #[serde(default)]
    required: bool,
}

/// Unmarshaled parameters: location, then name, then value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterValues(BTreeMap<Location, BTreeMap<String, TypedValue>>);

impl ParameterValues {
    pub fn get(&self, location: Location, name: &str) -> Option<&TypedValue> {
        self.0.get(&location)?.get(name)
    }

    pub fn location(&self, location: Location) -> Option<&BTreeMap<String, TypedValue>> {
        self.0.get(&location)
    }

    pub fn insert(&mut self, location: Location, name: impl Into<String>, value: TypedValue) {
        self.0.entry(location).or_default().insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, &str, &TypedValue)> {
        self.0.iter().flat_map(|(location, values)| {
            values
                .iter()
                .map(move |(name, value)| (*location, name.as_str(), value))
        })
    }
}

/// Look up `name` at `location` and coerce the raw string by the schema type.
///
/// Returns the value with the schema to unmarshal it against (`{}` when the
/// definition has none). An absent value falls back to `schema.default`,
/// which is returned as is; with no default either the lookup fails with
/// [`MessageError::MissingParameter`].
pub fn deserialize_parameter<P>(
    parameters: &P,
    location: Location,
    name: &str,
    definition: &Value,
) -> Result<(Value, Value)>
where
    P: Parameters + ?Sized,
{
    let schema = definition.get("schema").cloned().unwrap_or_else(|| json!({}));

    let Some(raw) = lookup(parameters, location, name) else {
        return match schema.get("default") {
            Some(default) => Ok((default.clone(), schema)),
            None => Err(MessageError::MissingParameter {
                location,
                name: name.to_string(),
            }),
        };
    };

    let value = match schema.get("type").and_then(Value::as_str) {
        Some("integer") => parse_integer(raw),
        Some("number") => parse_number(raw),
        Some("boolean") => parse_boolean(raw),
        // Object and array serialization styles are not decoded.
        _ => None,
    }
    .unwrap_or_else(|| Value::String(raw.to_string()));

    Ok((value, schema))
}

fn lookup<'a, P>(parameters: &'a P, location: Location, name: &str) -> Option<&'a str>
where
    P: Parameters + ?Sized,
{
    let values = parameters.values(location)?;
    if let Some(value) = values.get(name) {
        return Some(value);
    }
    if location == Location::Header {
        // Lowest matching key wins when names differ only in case.
        return values
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .min_by_key(|(key, _)| key.as_str())
            .map(|(_, value)| value.as_str());
    }
    None
}

fn parse_integer(raw: &str) -> Option<Value> {
    raw.parse::<i64>()
        .map(Value::from)
        .or_else(|_| raw.parse::<u64>().map(Value::from))
        .ok()
}

fn parse_number(raw: &str) -> Option<Value> {
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn parse_boolean(raw: &str) -> Option<Value> {
    match raw {
        "1" | "true" | "t" | "yes" => Some(Value::Bool(true)),
        "0" | "false" | "f" | "no" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Unmarshal every declared parameter, collecting all violations.
///
/// Violations carry schema paths `[index, ...]` into `definitions` and
/// instance paths `[location, name, ...]`. Parameters with neither a value
/// nor a default are left out of the result.
pub fn unmarshal_parameters<P>(
    unmarshaler: &SchemaUnmarshaler,
    parameters: &P,
    definitions: &[Value],
) -> Result<ParameterValues>
where
    P: Parameters + ?Sized,
{
    let mut values = ParameterValues::default();
    let mut errors = Vec::new();

    for (index, definition) in definitions.iter().enumerate() {
        let spec = ParameterSpec::deserialize(definition).map_err(|err| {
            MessageError::InvalidDefinition(format!("parameter {index}: {err}"))
        })?;
        let instance_prefix = [
            PathSegment::key(spec.location.as_str()),
            PathSegment::key(spec.name.as_str()),
        ];

        let (raw, schema) = match deserialize_parameter(parameters, spec.location, &spec.name, definition) {
            Ok(resolved) => resolved,
            Err(MessageError::MissingParameter { .. }) => {
                if spec.required {
                    errors.push(missing_required(index, &spec, definition));
                } else {
                    trace!(name = %spec.name, location = %spec.location, "optional parameter absent");
                }
                continue;
            }
            Err(err) => return Err(err),
        };

        let unmarshaled = unmarshaler.unmarshal(&raw, &schema).map_err(|err| {
            MessageError::from(
                err.with_schema_prefix(&[PathSegment::Index(index), PathSegment::key("schema")])
                    .with_path_prefix(&instance_prefix),
            )
        });
        if let Some(value) = collect_violations(unmarshaled, &mut errors)? {
            values.insert(spec.location, spec.name, value);
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(ValidationError::new(errors).into())
    }
}

fn missing_required(index: usize, spec: &ParameterSpec, definition: &Value) -> Violation {
    Violation::new(
        format!("'{}' is a required in '{}' parameter", spec.name, spec.location),
        "required",
        Value::Bool(true),
    )
    .with_schema(definition.clone())
    .with_schema_path(ErrorPath::root().join(index).join("required"))
    .with_path(ErrorPath::root().join(spec.location.as_str()).join(spec.name.as_str()))
}
