use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::debug;

use crate::config::UnmarshalerConfig;
use crate::error::{Result, SchemaError, ValidationError};
use crate::formats::FormatRegistry;
use crate::path::{ErrorPath, PathSegment};
use crate::rewrite::prepare;
use crate::violation::Violation;

/// Draft 4 JSON Schema validator that understands OpenAPI's `nullable`.
///
/// Every violation found for an instance is reported, not just the first.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    formats: FormatRegistry,
    config: UnmarshalerConfig,
}

impl SchemaValidator {
    pub fn new(formats: FormatRegistry, config: UnmarshalerConfig) -> Self {
        Self { formats, config }
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn config(&self) -> &UnmarshalerConfig {
        &self.config
    }

    /// Validate `instance` against `schema`, collecting all violations.
    pub fn validate(&self, instance: &Value, schema: &Value) -> Result<()> {
        let compiled = self.compile(schema)?;

        let errors: Vec<Violation> = compiled
            .iter_errors(instance)
            .map(|err| {
                to_violation(
                    &err.schema_path().to_string(),
                    &err.instance_path().to_string(),
                    err.to_string(),
                    instance,
                    schema,
                )
            })
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        debug!(count = errors.len(), "instance failed schema validation");
        Err(ValidationError::new(errors).into())
    }

    /// Check without collecting violations.
    pub fn is_valid(&self, instance: &Value, schema: &Value) -> Result<bool> {
        Ok(self.compile(schema)?.is_valid(instance))
    }

    fn compile(&self, schema: &Value) -> Result<Validator> {
        let prepared = prepare(schema, self.config.strict_mode);
        let validate_formats = self.config.validate_formats && !self.formats.is_empty();

        let options = jsonschema::options()
            .with_draft(Draft::Draft4)
            .should_validate_formats(validate_formats);
        let options = self.formats.iter().fold(options, |options, (name, format)| {
            let checker = format.checker();
            options.with_format(name.to_string(), move |value: &str| checker(value))
        });

        options
            .build(&prepared)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(FormatRegistry::default(), UnmarshalerConfig::default())
    }
}

/// Rebuild an engine error against the original (un-rewritten) schema.
fn to_violation(
    schema_pointer: &str,
    instance_pointer: &str,
    engine_message: String,
    instance: &Value,
    schema: &Value,
) -> Violation {
    let schema_path = ErrorPath::from_pointer(schema_pointer, schema);
    let path = ErrorPath::from_pointer(instance_pointer, instance);

    let validator = match schema_path.last() {
        Some(PathSegment::Key(keyword)) => keyword.clone(),
        Some(PathSegment::Index(index)) => index.to_string(),
        None => String::new(),
    };
    let node: ErrorPath = schema_path
        .segments()
        .iter()
        .take(schema_path.len().saturating_sub(1))
        .cloned()
        .collect();
    let node = node.resolve(schema).cloned().unwrap_or(Value::Null);
    let validator_value = node.get(&validator).cloned().unwrap_or(Value::Null);
    let offending = path.resolve(instance).cloned().unwrap_or(Value::Null);

    let message = match validator.as_str() {
        "type" => type_message(&offending, &validator_value),
        "enum" => format!("{offending} is not one of {validator_value}"),
        "format" => format!("{offending} is not a {validator_value}"),
        _ => engine_message,
    };

    Violation::new(message, validator, validator_value)
        .with_instance(offending)
        .with_schema(node)
        .with_schema_path(schema_path)
        .with_path(path)
}

fn type_message(instance: &Value, expected: &Value) -> String {
    match expected {
        Value::Array(kinds) => {
            let kinds: Vec<String> = kinds.iter().map(Value::to_string).collect();
            format!("{instance} is not of types {}", kinds.join(", "))
        }
        kind => format!("{instance} is not of type {kind}"),
    }
}
