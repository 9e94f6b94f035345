use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{Result, SpecError};

/// HTTP methods that may appear as keys of a path item.
pub const METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// One (URI template, method) entry of the document.
///
/// The definition is the operation object with path-level parameters merged
/// into its `parameters` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    uri_template: String,
    method: String,
    definition: Value,
}

impl Operation {
    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    /// Lowercased method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.definition.get("operationId").and_then(Value::as_str)
    }

    /// Merged parameter definitions, path-level entries first.
    pub fn parameters(&self) -> &[Value] {
        self.definition
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn request_body(&self) -> Option<&Value> {
        self.definition.get("requestBody")
    }

    pub fn responses(&self) -> Option<&Map<String, Value>> {
        self.definition.get("responses").and_then(Value::as_object)
    }
}

/// Immutable, indexed view of an OpenAPI document.
#[derive(Debug, Clone)]
pub struct Spec {
    document: Value,
    operations: HashMap<String, BTreeMap<String, Operation>>,
}

impl Spec {
    /// Index every operation of `document`.
    pub fn from_value(document: Value) -> Result<Self> {
        let paths = document
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| SpecError::InvalidDocument("missing `paths` object".to_string()))?;
        let base_paths = base_paths(&document);

        let mut operations: HashMap<String, BTreeMap<String, Operation>> = HashMap::new();
        for (path, item) in paths {
            let item = item.as_object().ok_or_else(|| {
                SpecError::InvalidDocument(format!("path item {path} is not an object"))
            })?;
            let shared = parameter_list(item.get("parameters"), path)?;

            for (key, definition) in item {
                let method = key.to_ascii_lowercase();
                if !METHODS.contains(&method.as_str()) {
                    continue;
                }
                let mut definition = definition.clone();
                let own = parameter_list(definition.get("parameters"), path)?;
                if let Value::Object(map) = &mut definition {
                    map.insert(
                        "parameters".to_string(),
                        Value::Array(merge_parameters(&shared, &own)),
                    );
                } else {
                    return Err(SpecError::InvalidDocument(format!(
                        "operation {key} {path} is not an object"
                    )));
                }

                for base in &base_paths {
                    let uri_template = join_path(base, path);
                    trace!(%uri_template, %method, "indexed operation");
                    operations.entry(uri_template.clone()).or_default().insert(
                        method.clone(),
                        Operation {
                            uri_template,
                            method: method.clone(),
                            definition: definition.clone(),
                        },
                    );
                }
            }
        }

        debug!(
            templates = operations.len(),
            servers = base_paths.len(),
            "specification indexed"
        );
        Ok(Self {
            document,
            operations,
        })
    }

    /// The document the index was built from.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Resolve the operation for `uri_template` and `method`.
    ///
    /// The media type is accepted for interface parity with request
    /// adapters; coverage of media types is checked during content
    /// unmarshaling, not here.
    pub fn get_operation(
        &self,
        uri_template: &str,
        method: &str,
        _media_type: Option<&str>,
    ) -> Result<&Operation> {
        let by_method =
            self.operations
                .get(uri_template)
                .ok_or_else(|| SpecError::OperationNotFound {
                    uri_template: uri_template.to_string(),
                })?;

        let method = method.to_ascii_lowercase();
        by_method
            .get(&method)
            .ok_or_else(|| SpecError::MethodNotAllowed {
                uri_template: uri_template.to_string(),
                method,
                allowed: by_method.keys().cloned().collect(),
            })
    }

    /// Every indexed operation, in no particular order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values().flat_map(BTreeMap::values)
    }

    pub fn uri_templates(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }
}

fn parameter_list(value: Option<&Value>, path: &str) -> Result<Vec<Value>> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(SpecError::InvalidDocument(format!(
            "parameters of {path} is not a list"
        ))),
    }
}

fn parameter_key(parameter: &Value) -> (Option<&str>, Option<&str>) {
    (
        parameter.get("name").and_then(Value::as_str),
        parameter.get("in").and_then(Value::as_str),
    )
}

/// Path-level parameters not redefined by the operation, then the
/// operation's own parameters. Identity is (`name`, `in`).
fn merge_parameters(shared: &[Value], own: &[Value]) -> Vec<Value> {
    let overridden: Vec<_> = own.iter().map(parameter_key).collect();
    shared
        .iter()
        .filter(|parameter| !overridden.contains(&parameter_key(parameter)))
        .chain(own)
        .cloned()
        .collect()
}

/// Base path of every declared server, `/` when none are declared.
fn base_paths(document: &Value) -> Vec<String> {
    let mut bases: Vec<String> = document
        .get("servers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|server| {
            let url = server.get("url").and_then(Value::as_str)?;
            Some(server_path(&substitute_variables(url, server.get("variables"))))
        })
        .collect();

    if bases.is_empty() {
        bases.push("/".to_string());
    }
    bases.dedup();
    bases
}

/// Replace `{name}` with the variable's `default`.
fn substitute_variables(url: &str, variables: Option<&Value>) -> String {
    let Some(Value::Object(variables)) = variables else {
        return url.to_string();
    };
    variables.iter().fold(url.to_string(), |url, (name, variable)| {
        match variable.get("default").and_then(Value::as_str) {
            Some(default) => url.replace(&format!("{{{name}}}"), default),
            None => url,
        }
    })
}

/// Path component of a server URL, without a trailing slash (`/` for none).
fn server_path(url: &str) -> String {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |at| &rest[at..]),
        None => url,
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn join_path(base: &str, path: &str) -> String {
    if base == "/" {
        path.to_string()
    } else {
        format!("{base}{path}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn petstore() -> Value {
        json!({
            "openapi": "3.0.0",
            "servers": [{"url": "http://petstore.swagger.io/api/v1"}],
            "paths": {
                "/pets/{pet_id}": {
                    "parameters": [
                        {"name": "pet_id", "in": "path", "required": true, "schema": {"type": "integer"}},
                        {"name": "trace", "in": "header", "schema": {"type": "string"}}
                    ],
                    "get": {
                        "operationId": "showPetById",
                        "parameters": [
                            {"name": "trace", "in": "header", "schema": {"type": "boolean"}}
                        ],
                        "responses": {"200": {"description": "ok"}}
                    },
                    "DELETE": {"responses": {"204": {"description": "gone"}}}
                },
                "/pets": {
                    "post": {"requestBody": {"required": true, "content": {}}}
                }
            }
        })
    }

    #[test]
    fn operations_are_indexed_under_server_base_path() {
        let spec = Spec::from_value(petstore()).unwrap();
        let operation = spec.get_operation("/api/v1/pets/{pet_id}", "GET", None).unwrap();

        assert_eq!(operation.method(), "get");
        assert_eq!(operation.operation_id(), Some("showPetById"));
        assert!(spec.get_operation("/api/v1/pets/{pet_id}", "delete", None).is_ok());
        assert!(spec.get_operation("/api/v1/pets", "post", Some("application/json")).is_ok());
    }

    #[test]
    fn path_parameters_merge_with_operation_override() {
        let spec = Spec::from_value(petstore()).unwrap();
        let operation = spec.get_operation("/api/v1/pets/{pet_id}", "get", None).unwrap();
        let parameters = operation.parameters();

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0]["name"], "pet_id");
        assert_eq!(parameters[1]["schema"]["type"], "boolean");
    }

    #[test]
    fn unknown_template_and_method_are_distinguished() {
        let spec = Spec::from_value(petstore()).unwrap();

        assert!(matches!(
            spec.get_operation("/pets", "post", None),
            Err(SpecError::OperationNotFound { .. })
        ));
        let Err(SpecError::MethodNotAllowed { allowed, .. }) =
            spec.get_operation("/api/v1/pets", "get", None)
        else {
            panic!("expected method not allowed");
        };
        assert_eq!(allowed, vec!["post".to_string()]);
    }

    #[test]
    fn missing_servers_index_templates_verbatim() {
        let spec = Spec::from_value(json!({
            "paths": {"/health": {"get": {"responses": {}}}}
        }))
        .unwrap();
        assert!(spec.get_operation("/health", "get", None).is_ok());
        assert_eq!(spec.operations().count(), 1);
    }

    #[test]
    fn server_variables_use_defaults() {
        let spec = Spec::from_value(json!({
            "servers": [
                {"url": "https://{host}/{base}/", "variables": {
                    "host": {"default": "example.com"},
                    "base": {"default": "v2"}
                }},
                {"url": "/"}
            ],
            "paths": {"/items": {"get": {}}}
        }))
        .unwrap();

        let mut templates: Vec<&str> = spec.uri_templates().collect();
        templates.sort_unstable();
        assert_eq!(templates, vec!["/items", "/v2/items"]);
    }

    #[test]
    fn document_without_paths_is_rejected() {
        assert!(matches!(
            Spec::from_value(json!({"openapi": "3.0.0"})),
            Err(SpecError::InvalidDocument(_))
        ));
    }

    #[test]
    fn server_path_handles_relative_and_absolute_urls() {
        assert_eq!(server_path("http://host"), "/");
        assert_eq!(server_path("http://host/api/"), "/api");
        assert_eq!(server_path("api/v1"), "/api/v1");
        assert_eq!(server_path(""), "/");
    }
}
