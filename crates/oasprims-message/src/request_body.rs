use oasprims_schema::{ErrorPath, PathSegment, SchemaUnmarshaler, TypedValue, ValidationError, Violation};
use serde_json::Value;

use crate::content::unmarshal_content;
use crate::error::{MessageError, Result};
use crate::models::RequestBody;

/// Unmarshal a request body against a `requestBody` definition.
///
/// An empty body yields `None`, or a `required` violation when the
/// definition demands a body. Content violations are prefixed with
/// `["content"]`.
pub fn unmarshal_request_body<B>(
    unmarshaler: &SchemaUnmarshaler,
    body: &B,
    definition: &Value,
) -> Result<Option<TypedValue>>
where
    B: RequestBody + ?Sized,
{
    if body.content_length().unwrap_or(0) == 0 {
        let required = definition
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !required {
            return Ok(None);
        }
        let violation = Violation::new("Request body is required", "required", Value::Bool(true))
            .with_schema(definition.clone())
            .with_schema_path(ErrorPath::root().join("required"));
        return Err(ValidationError::single(violation).into());
    }

    let content_map = definition
        .get("content")
        .and_then(Value::as_object)
        .ok_or_else(|| MessageError::InvalidDefinition("request body has no content map".to_string()))?;

    match unmarshal_content(unmarshaler, body, content_map) {
        Ok(value) => Ok(Some(value)),
        Err(MessageError::Validation(err)) => Err(err
            .map_violations(|v| v.with_schema_prefix([PathSegment::key("content")]))
            .into()),
        Err(err) => Err(err),
    }
}
