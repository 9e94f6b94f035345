use oasprims_schema::{PathSegment, SchemaUnmarshaler, TypedValue};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{MessageError, Result};
use crate::models::Content;

/// Unmarshal a payload against the entry of `content_map` for its media type.
///
/// A media type entry without a schema lets the payload through unchanged.
/// Violation schema paths are prefixed with `[media_type, "schema"]`.
pub fn unmarshal_content<C>(
    unmarshaler: &SchemaUnmarshaler,
    content: &C,
    content_map: &Map<String, Value>,
) -> Result<TypedValue>
where
    C: Content + ?Sized,
{
    let media_type = content.media_type();
    let Some(entry) = media_type.and_then(|media_type| content_map.get(media_type)) else {
        return Err(MessageError::UndocumentedMediaType {
            media_type: media_type.map(str::to_string),
        });
    };
    let media_type = media_type.unwrap_or_default();

    let Some(schema) = entry.get("schema") else {
        trace!(media_type, "no schema for media type, payload passed through");
        return Ok(TypedValue::from(content.media()));
    };

    unmarshaler
        .unmarshal(content.media(), schema)
        .map_err(|err| {
            err.with_schema_prefix(&[PathSegment::key(media_type), PathSegment::key("schema")])
                .into()
        })
}
