/// Controls how schemas are compiled and instances converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshalerConfig {
    /// When true, object schemas without `additionalProperties` reject
    /// properties they do not declare.
    pub strict_mode: bool,
    /// When true, registered format checkers run during validation.
    /// Ignored (treated as false) when the format registry is empty.
    pub validate_formats: bool,
}

impl Default for UnmarshalerConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            validate_formats: true,
        }
    }
}
