//! Error types for style compilation and output.
//!
//! This module provides [`StyleError`], the error type returned by every
//! fallible operation in the crate. Errors raised by dynamic value producers
//! are carried through unchanged as the `source` of
//! [`StyleError::DynamicValue`]; the core never swallows them.

use std::path::PathBuf;

use crate::value::ValueError;

/// Errors that can occur while compiling, rendering or writing styles.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// A dynamic value producer was reached without a component reference.
    #[error("dynamic value '{property}' in '{selector}' requires a component reference")]
    MissingComponent { selector: String, property: String },

    /// A dynamic value producer failed.
    #[error("dynamic value '{property}' in '{selector}' failed: {source}")]
    DynamicValue {
        selector: String,
        property: String,
        #[source]
        source: ValueError,
    },

    /// Writing rendered text to an output target failed.
    #[error("failed to write styles for '{base_rule}': {source}")]
    Output {
        base_rule: String,
        #[source]
        source: std::io::Error,
    },

    /// A style definition or config document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A style definition or config file could not be read.
    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },
}

impl StyleError {
    pub(crate) fn missing_component(selector: &str, property: &str) -> Self {
        Self::MissingComponent {
            selector: selector.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn dynamic_value(selector: &str, property: &str, source: ValueError) -> Self {
        Self::DynamicValue {
            selector: selector.to_string(),
            property: property.to_string(),
            source,
        }
    }

    pub(crate) fn output(base_rule: &str, source: std::io::Error) -> Self {
        Self::Output {
            base_rule: base_rule.to_string(),
            source,
        }
    }
}

impl From<serde_json::Error> for StyleError {
    fn from(err: serde_json::Error) -> Self {
        StyleError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for StyleError {
    fn from(err: serde_yaml::Error) -> Self {
        StyleError::Parse(err.to_string())
    }
}

/// Result type for style operations.
pub type Result<T> = std::result::Result<T, StyleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_component_display() {
        let err = StyleError::missing_component(".Widget", "size");
        let msg = err.to_string();
        assert!(msg.contains(".Widget"));
        assert!(msg.contains("size"));
        assert!(msg.contains("component reference"));
    }

    #[test]
    fn test_dynamic_value_keeps_source() {
        use std::error::Error;

        let source: ValueError = "counter overflowed".into();
        let err = StyleError::dynamic_value(".Widget", "size", source);
        assert!(err.to_string().contains("counter overflowed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [b").unwrap_err();
        let err: StyleError = yaml_err.into();
        assert!(matches!(err, StyleError::Parse(_)));
    }

    #[test]
    fn test_load_error_display() {
        let err = StyleError::Load {
            path: PathBuf::from("styles/widget.yaml"),
            message: "not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load styles/widget.yaml: not found"
        );
    }
}
