//! Loading static style definitions from JSON and YAML documents.
//!
//! Document definitions carry no producers, so every leaf is static. Key
//! order follows the document. Leaves that are neither strings nor numbers
//! are stringified rather than rejected:
//!
//! | Document value | Entry |
//! |----------------|-------|
//! | string | `Static(Text)` |
//! | number | `Static(Number)` |
//! | object / mapping | `Nested` |
//! | boolean / null | `Static(Text("true" / "false" / "null"))` |
//! | array / sequence | `Static(Text)` of the items joined with `,` |
//!
//! ```rust
//! use livestyle::StyleDefinition;
//!
//! let definition = StyleDefinition::<()>::from_yaml_str(r#"
//! color: white
//! backgroundColor: red
//! div:
//!   margin: 0
//! "#).unwrap();
//! assert_eq!(definition.len(), 3);
//! ```

use std::path::Path;

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use super::{StyleDefinition, StyleEntry};
use crate::error::{Result, StyleError};
use crate::value::CssValue;

/// Recognized definition file extensions.
pub const DEFINITION_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".json"];

impl<C> StyleDefinition<C> {
    /// Builds a definition from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Parse`] if `value` is not an object.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(json_object(map)),
            other => Err(StyleError::Parse(format!(
                "style definition must be an object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Parses JSON text into a definition.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    /// Parses YAML text into a definition.
    ///
    /// Non-string mapping keys (e.g. keyframe offsets written as `60:`) are
    /// converted to their text form.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: YamlValue = serde_yaml::from_str(yaml)?;
        match value {
            YamlValue::Mapping(map) => Ok(yaml_mapping(&map)),
            YamlValue::Null => Ok(Self::new()),
            other => Err(StyleError::Parse(format!(
                "style definition must be a mapping, got {}",
                yaml_scalar(&other)
            ))),
        }
    }

    /// Loads a definition from a `.yaml`, `.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Load`] if the file cannot be read or has an
    /// unrecognized extension, and [`StyleError::Parse`] if it is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StyleError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(StyleError::Load {
                path: path.to_path_buf(),
                message: format!(
                    "unrecognized extension, expected one of {}",
                    DEFINITION_EXTENSIONS.join(", ")
                ),
            }),
        }
    }
}

fn json_object<C>(map: &serde_json::Map<String, JsonValue>) -> StyleDefinition<C> {
    let mut definition = StyleDefinition::new();
    for (key, value) in map {
        let entry = match value {
            JsonValue::Object(nested) => StyleEntry::Nested(json_object(nested)),
            leaf => StyleEntry::Static(json_leaf(leaf)),
        };
        definition.insert(key.clone(), entry);
    }
    definition
}

fn json_leaf(value: &JsonValue) -> CssValue {
    match value {
        JsonValue::String(text) => CssValue::Text(text.clone()),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => CssValue::Number(f),
            None => CssValue::Text(n.to_string()),
        },
        JsonValue::Array(items) => CssValue::Text(
            items
                .iter()
                .map(|item| json_leaf(item).to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
        JsonValue::Bool(b) => CssValue::Text(b.to_string()),
        JsonValue::Null => CssValue::Text("null".to_string()),
        JsonValue::Object(_) => CssValue::Text(value.to_string()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn yaml_mapping<C>(map: &serde_yaml::Mapping) -> StyleDefinition<C> {
    let mut definition = StyleDefinition::new();
    for (key, value) in map {
        let key = yaml_scalar(key);
        let entry = match untag(value) {
            YamlValue::Mapping(nested) => StyleEntry::Nested(yaml_mapping(nested)),
            leaf => StyleEntry::Static(yaml_leaf(leaf)),
        };
        definition.insert(key, entry);
    }
    definition
}

fn yaml_leaf(value: &YamlValue) -> CssValue {
    match untag(value) {
        YamlValue::String(text) => CssValue::Text(text.clone()),
        YamlValue::Number(n) => match n.as_f64() {
            Some(f) => CssValue::Number(f),
            None => CssValue::Text(n.to_string()),
        },
        YamlValue::Sequence(items) => CssValue::Text(
            items
                .iter()
                .map(|item| yaml_leaf(item).to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => CssValue::Text(yaml_scalar(other)),
    }
}

fn yaml_scalar(value: &YamlValue) -> String {
    match untag(value) {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(text) => text.clone(),
        YamlValue::Sequence(_) => "a sequence".to_string(),
        YamlValue::Mapping(_) => "a mapping".to_string(),
        YamlValue::Tagged(_) => "a tagged value".to_string(),
    }
}

fn untag(value: &YamlValue) -> &YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn keys<C>(definition: &StyleDefinition<C>) -> Vec<String> {
        definition.entries().map(|(key, _)| key.to_string()).collect()
    }

    fn static_text<C>(definition: &StyleDefinition<C>, key: &str) -> String {
        match definition.get(key) {
            Some(StyleEntry::Static(value)) => value.to_string(),
            _ => panic!("Expected static entry for {}", key),
        }
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let definition = StyleDefinition::<()>::from_json(&json!({
            "zIndex": 3,
            "color": "white",
            "backgroundColor": "red"
        }))
        .unwrap();
        assert_eq!(keys(&definition), vec!["zIndex", "color", "backgroundColor"]);
    }

    #[test]
    fn test_from_json_nests_objects() {
        let definition = StyleDefinition::<()>::from_json(&json!({
            "div": { "margin": 0 }
        }))
        .unwrap();
        match definition.get("div") {
            Some(StyleEntry::Nested(nested)) => assert_eq!(static_text(nested, "margin"), "0"),
            _ => panic!("Expected nested div"),
        }
    }

    #[test]
    fn test_from_json_stringifies_loose_values() {
        let definition = StyleDefinition::<()>::from_json(&json!({
            "visible": true,
            "content": null,
            "fontFamily": ["Inter", "sans-serif"]
        }))
        .unwrap();
        assert_eq!(static_text(&definition, "visible"), "true");
        assert_eq!(static_text(&definition, "content"), "null");
        assert_eq!(static_text(&definition, "fontFamily"), "Inter,sans-serif");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = StyleDefinition::<()>::from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, StyleError::Parse(_)));
    }

    #[test]
    fn test_from_yaml_converts_numeric_keys() {
        let definition = StyleDefinition::<()>::from_yaml_str(
            r#"
"@pulse":
  0:
    opacity: 0
  60:
    opacity: 1
"#,
        )
        .unwrap();
        match definition.get("@pulse") {
            Some(StyleEntry::Nested(timeline)) => assert_eq!(keys(timeline), vec!["0", "60"]),
            _ => panic!("Expected keyframes timeline"),
        }
    }

    #[test]
    fn test_from_yaml_empty_document() {
        let definition = StyleDefinition::<()>::from_yaml_str("").unwrap();
        assert!(definition.is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_scalar() {
        let err = StyleDefinition::<()>::from_yaml_str("just text").unwrap_err();
        assert!(matches!(err, StyleError::Parse(_)));
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("widget.yaml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(file, "color: white").unwrap();
        let definition = StyleDefinition::<()>::from_file(&yaml_path).unwrap();
        assert_eq!(static_text(&definition, "color"), "white");

        let json_path = dir.path().join("widget.json");
        std::fs::write(&json_path, r#"{"color": "black"}"#).unwrap();
        let definition = StyleDefinition::<()>::from_file(&json_path).unwrap();
        assert_eq!(static_text(&definition, "color"), "black");
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.css");
        std::fs::write(&path, ".Widget { color: red; }").unwrap();
        let err = StyleDefinition::<()>::from_file(&path).unwrap_err();
        assert!(matches!(err, StyleError::Load { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = StyleDefinition::<()>::from_file("/nonexistent/widget.yaml").unwrap_err();
        assert!(matches!(err, StyleError::Load { .. }));
    }
}
