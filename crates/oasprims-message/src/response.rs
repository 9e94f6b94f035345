use oasprims_schema::{PathSegment, SchemaUnmarshaler, ValidationError, Violation};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::content::unmarshal_content;
use crate::error::{collect_violations, MessageError, Result};
use crate::models::Response;
use crate::parameters::unmarshal_parameters;

/// Validate a response's headers and content against an operation object.
///
/// The response definition is looked up by exact status code, then
/// `default`. Header violations are rooted at
/// `responses/<status>/headers/<index>` (indices count the declared headers
/// other than `Content-Type`), content violations at
/// `responses/<status>/content/<media type>`.
pub fn validate_response<R>(
    unmarshaler: &SchemaUnmarshaler,
    response: &R,
    operation: &Value,
) -> Result<()>
where
    R: Response + ?Sized,
{
    let status_code = response.status_code();
    let responses = operation.get("responses").and_then(Value::as_object);
    let Some((status_key, definition)) = [status_code.to_string(), "default".to_string()]
        .into_iter()
        .find_map(|key| {
            let definition = responses?.get(&key)?;
            Some((key, definition))
        })
    else {
        return Err(MessageError::UndocumentedResponse { status_code });
    };
    trace!(status_code, %status_key, "response definition resolved");

    let mut errors = Vec::new();

    if let Some(headers) = definition.get("headers").and_then(Value::as_object) {
        let definitions = header_definitions(headers);
        let result = unmarshal_parameters(unmarshaler, response, &definitions);
        let mut header_errors = Vec::new();
        collect_violations(result, &mut header_errors)?;
        errors.extend(prefixed(header_errors, &status_key, "headers"));
    }

    if let Some(content_map) = definition.get("content").and_then(Value::as_object) {
        let result = unmarshal_content(unmarshaler, response, content_map);
        let mut content_errors = Vec::new();
        collect_violations(result, &mut content_errors)?;
        errors.extend(prefixed(content_errors, &status_key, "content"));
    }

    if errors.is_empty() {
        return Ok(());
    }
    debug!(status_code, count = errors.len(), "response rejected");
    Err(ValidationError::new(errors).into())
}

/// Header objects as `in: header` parameter definitions.
fn header_definitions(headers: &Map<String, Value>) -> Vec<Value> {
    headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
        .map(|(name, header)| {
            let mut definition = header.as_object().cloned().unwrap_or_default();
            definition.insert("name".to_string(), Value::from(name.as_str()));
            definition.insert("in".to_string(), Value::from("header"));
            Value::Object(definition)
        })
        .collect()
}

fn prefixed(violations: Vec<Violation>, status_key: &str, section: &str) -> Vec<Violation> {
    violations
        .into_iter()
        .map(|v| {
            v.with_schema_prefix([
                PathSegment::key("responses"),
                PathSegment::key(status_key),
                PathSegment::key(section),
            ])
        })
        .collect()
}
