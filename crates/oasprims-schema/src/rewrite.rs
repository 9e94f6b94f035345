//! Schema rewrites applied before compilation.
//!
//! The JSON Schema engine speaks Draft 4, which has no `nullable`. Rather
//! than replacing its `type` and `enum` keywords, the compiled copy of each
//! schema widens them: a schema carrying `nullable: true` accepts `"null"` as
//! a type and `null` as an enum member. Paths are unchanged by the rewrite,
//! so violations still point into the original schema.

use serde_json::{Map, Value};

/// Produce the schema the validator actually compiles.
pub fn prepare(schema: &Value, strict_mode: bool) -> Value {
    let mut prepared = schema.clone();
    apply_nullable(&mut prepared);
    if strict_mode {
        apply_strict_mode(&mut prepared);
    }
    prepared
}

/// Widen `type`/`enum` with null wherever `nullable: true` is declared.
pub fn apply_nullable(value: &mut Value) {
    visit_schemas(value, &mut |map| {
        if !matches!(map.get("nullable"), Some(Value::Bool(true))) {
            return;
        }

        if let Some(kind) = map.get_mut("type") {
            match kind {
                Value::String(name) if name.as_str() != "null" => {
                    let name = std::mem::take(name);
                    *kind = Value::Array(vec![Value::String(name), Value::String("null".into())]);
                }
                Value::Array(kinds) => {
                    if !kinds.iter().any(|k| k == "null") {
                        kinds.push(Value::String("null".into()));
                    }
                }
                _ => {}
            }
        }

        if let Some(Value::Array(members)) = map.get_mut("enum") {
            if !members.iter().any(Value::is_null) {
                members.push(Value::Null);
            }
        }
    });
}

/// Close object schemas that leave `additionalProperties` unspecified.
pub fn apply_strict_mode(value: &mut Value) {
    visit_schemas(value, &mut |map| {
        if is_object_schema(map) && !map.contains_key("additionalProperties") {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    });
}

/// Call `visit` on every schema object reachable through Draft 4 keywords,
/// parents before children.
fn visit_schemas(value: &mut Value, visit: &mut dyn FnMut(&mut Map<String, Value>)) {
    match value {
        Value::Object(map) => {
            visit(map);
            recurse_children(map, visit);
        }
        Value::Array(items) => {
            for item in items {
                visit_schemas(item, visit);
            }
        }
        _ => {}
    }
}

fn recurse_children(map: &mut Map<String, Value>, visit: &mut dyn FnMut(&mut Map<String, Value>)) {
    recurse_map_schemas(map, "properties", visit);
    recurse_map_schemas(map, "patternProperties", visit);
    recurse_map_schemas(map, "definitions", visit);
    recurse_map_schemas(map, "dependencies", visit);

    recurse_single_schema(map, "additionalProperties", visit);
    recurse_single_schema(map, "items", visit);
    recurse_single_schema(map, "additionalItems", visit);
    recurse_single_schema(map, "not", visit);

    recurse_single_schema(map, "allOf", visit);
    recurse_single_schema(map, "anyOf", visit);
    recurse_single_schema(map, "oneOf", visit);
}

fn recurse_map_schemas(
    map: &mut Map<String, Value>,
    key: &str,
    visit: &mut dyn FnMut(&mut Map<String, Value>),
) {
    if let Some(Value::Object(obj)) = map.get_mut(key) {
        for value in obj.values_mut() {
            // `dependencies` may also hold property-name arrays.
            if value.is_object() {
                visit_schemas(value, visit);
            }
        }
    }
}

fn recurse_single_schema(
    map: &mut Map<String, Value>,
    key: &str,
    visit: &mut dyn FnMut(&mut Map<String, Value>),
) {
    if let Some(value) = map.get_mut(key) {
        visit_schemas(value, visit);
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Value::String(kind) if kind == "object")),
        _ => map.contains_key("properties"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nullable_widens_type_and_enum() {
        let prepared = prepare(
            &json!({"type": "string", "enum": ["a", "b"], "nullable": true}),
            false,
        );
        assert_eq!(
            prepared,
            json!({"type": ["string", "null"], "enum": ["a", "b", null], "nullable": true})
        );
    }

    #[test]
    fn nullable_reaches_nested_schemas() {
        let prepared = prepare(
            &json!({
                "type": "object",
                "properties": {
                    "tags": {"type": "array", "items": {"type": "integer", "nullable": true}}
                },
                "oneOf": [{"type": "boolean", "nullable": true}]
            }),
            false,
        );

        assert_eq!(
            prepared["properties"]["tags"]["items"]["type"],
            json!(["integer", "null"])
        );
        assert_eq!(prepared["oneOf"][0]["type"], json!(["boolean", "null"]));
        assert_eq!(prepared["type"], json!("object"));
    }

    #[test]
    fn non_nullable_and_existing_null_are_left_alone() {
        let schema = json!({"type": ["string", "null"], "nullable": true});
        assert_eq!(prepare(&schema, false), schema);

        let schema = json!({"type": "string", "nullable": false});
        assert_eq!(prepare(&schema, false), schema);
    }

    #[test]
    fn strict_mode_closes_objects_without_overriding() {
        let prepared = prepare(
            &json!({
                "type": "object",
                "properties": {
                    "open": {"type": "object", "additionalProperties": true},
                    "nested": {"properties": {"v": {"type": "integer"}}}
                }
            }),
            true,
        );

        assert_eq!(prepared["additionalProperties"], json!(false));
        assert_eq!(prepared["properties"]["open"]["additionalProperties"], json!(true));
        assert_eq!(
            prepared["properties"]["nested"]["additionalProperties"],
            json!(false)
        );
    }
}
