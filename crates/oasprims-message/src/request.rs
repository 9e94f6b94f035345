use oasprims_schema::{PathSegment, SchemaUnmarshaler, TypedValue, Violation};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{collect_violations, MessageError, Result, UnmarshalError};
use crate::models::Request;
use crate::parameters::{unmarshal_parameters, ParameterValues};
use crate::request_body::unmarshal_request_body;

/// Typed parameters and body of a request that matched its operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnmarshaledRequest {
    pub parameters: ParameterValues,
    pub body: Option<TypedValue>,
}

/// Unmarshal parameters and body of `request` against an operation object.
///
/// Both stages always run; their violations are reported together as an
/// [`UnmarshalError`], parameter paths prefixed with `parameters` and body
/// paths with `requestBody`.
pub fn unmarshal_request<R>(
    unmarshaler: &SchemaUnmarshaler,
    request: &R,
    operation: &Value,
) -> Result<UnmarshaledRequest>
where
    R: Request + ?Sized,
{
    let definitions = match operation.get("parameters") {
        None => &[][..],
        Some(Value::Array(definitions)) => definitions.as_slice(),
        Some(_) => {
            return Err(MessageError::InvalidDefinition(
                "operation parameters is not a list".to_string(),
            ))
        }
    };

    let parameters_result = unmarshal_parameters(unmarshaler, request, definitions);
    let body_result = match operation.get("requestBody") {
        Some(definition) => unmarshal_request_body(unmarshaler, request, definition),
        None => Ok(None),
    };

    let mut parameter_errors = Vec::new();
    let mut request_body_errors = Vec::new();
    let parameters = collect_violations(parameters_result, &mut parameter_errors)?;
    let body = collect_violations(body_result, &mut request_body_errors)?;

    match (parameters, body) {
        (Some(parameters), Some(body)) => Ok(UnmarshaledRequest { parameters, body }),
        _ => {
            let err = UnmarshalError {
                parameter_errors: prefixed(parameter_errors, "parameters"),
                request_body_errors: prefixed(request_body_errors, "requestBody"),
            };
            debug!(
                method = request.method(),
                parameter_errors = err.parameter_errors.len(),
                request_body_errors = err.request_body_errors.len(),
                "request rejected"
            );
            Err(err.into())
        }
    }
}

fn prefixed(violations: Vec<Violation>, segment: &str) -> Vec<Violation> {
    violations
        .into_iter()
        .map(|v| v.with_schema_prefix([PathSegment::key(segment)]))
        .collect()
}
