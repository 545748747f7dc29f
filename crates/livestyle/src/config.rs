//! Compiler configuration.
//!
//! A [`StyleConfig`] is attached to a [`StyleRegistry`](crate::StyleRegistry)
//! so every manager sharing the registry renders the same way. It can be
//! built in code or loaded from YAML / JSON:
//!
//! ```yaml
//! format: compact              # or "expanded" (default)
//! skip_unchanged_writes: true  # default
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, StyleError};
use crate::render::OutputFormat;

/// Rendering and write policy shared by a registry's managers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Layout of emitted CSS.
    pub format: OutputFormat,
    /// Skip a dynamic write when the text equals the last one written.
    pub skip_unchanged_writes: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Expanded,
            skip_unchanged_writes: true,
        }
    }
}

impl StyleConfig {
    /// Sets the output format, returning `self` for chaining.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the unchanged-write policy, returning `self` for chaining.
    pub fn with_skip_unchanged_writes(mut self, skip: bool) -> Self {
        self.skip_unchanged_writes = skip;
        self
    }

    /// Parses a config from YAML. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StyleError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Err(StyleError::Load {
                path: path.to_path_buf(),
                message: "unrecognized config extension".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StyleConfig::default();
        assert_eq!(config.format, OutputFormat::Expanded);
        assert!(config.skip_unchanged_writes);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = StyleConfig::from_yaml("format: compact").unwrap();
        assert_eq!(config.format, OutputFormat::Compact);
        assert!(config.skip_unchanged_writes);
    }

    #[test]
    fn test_from_yaml_empty_is_default() {
        assert_eq!(StyleConfig::from_yaml("").unwrap(), StyleConfig::default());
    }

    #[test]
    fn test_from_json_full() {
        let config =
            StyleConfig::from_json(r#"{"format": "expanded", "skip_unchanged_writes": false}"#)
                .unwrap();
        assert!(!config.skip_unchanged_writes);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = StyleConfig::from_yaml("indent: 4").unwrap_err();
        assert!(matches!(err, StyleError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livestyle.yml");
        std::fs::write(&path, "skip_unchanged_writes: false\n").unwrap();
        let config = StyleConfig::from_file(&path).unwrap();
        assert!(!config.skip_unchanged_writes);
        assert_eq!(config.format, OutputFormat::Expanded);
    }

    #[test]
    fn test_builder_methods() {
        let config = StyleConfig::default()
            .with_format(OutputFormat::Compact)
            .with_skip_unchanged_writes(false);
        assert_eq!(config.format, OutputFormat::Compact);
        assert!(!config.skip_unchanged_writes);
    }
}
