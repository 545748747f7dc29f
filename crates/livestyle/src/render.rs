//! Rule set to CSS text.
//!
//! [`render`] walks a [`RuleSet`] in insertion order and writes one block per
//! selector. Dynamic values are evaluated against the component passed in;
//! keyframe offsets render as nested blocks. Order matters: later rules win
//! in CSS, so first-seen selectors are emitted first.
//!
//! Two layouts are available through [`OutputFormat`]:
//!
//! ```text
//! Expanded                    Compact
//! .Widget {                   .Widget{color:white;}
//! color: white;
//! }
//! ```

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Result, StyleError};
use crate::rules::{RuleSet, RuleValue};

/// Layout of rendered CSS text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One declaration per line: `selector {\nprop: value;\n}\n`.
    #[default]
    Expanded,
    /// No whitespace: `selector{prop:value;}`.
    Compact,
}

impl OutputFormat {
    fn open(self, out: &mut String, heading: &str) {
        match self {
            OutputFormat::Expanded => {
                let _ = writeln!(out, "{} {{", heading);
            }
            OutputFormat::Compact => {
                out.push_str(heading);
                out.push('{');
            }
        }
    }

    fn declaration(self, out: &mut String, property: &str, value: &str) {
        match self {
            OutputFormat::Expanded => {
                let _ = writeln!(out, "{}: {};", property, value);
            }
            OutputFormat::Compact => {
                let _ = write!(out, "{}:{};", property, value);
            }
        }
    }

    fn close(self, out: &mut String) {
        match self {
            OutputFormat::Expanded => out.push_str("}\n"),
            OutputFormat::Compact => out.push('}'),
        }
    }
}

/// Renders `rules` to CSS text.
///
/// Dynamic values are evaluated with `component`. Static-only rule sets can
/// be rendered with `None`.
///
/// # Errors
///
/// - [`StyleError::MissingComponent`] if a dynamic value is reached with no
///   component.
/// - [`StyleError::DynamicValue`] if a producer fails.
///
/// # Example
///
/// ```rust
/// use livestyle::render::{render, OutputFormat};
/// use livestyle::rules::compile_full;
/// use livestyle::StyleDefinition;
///
/// let definition = StyleDefinition::<()>::new()
///     .set("color", "white")
///     .set("backgroundColor", "red");
/// let compiled = compile_full(".Widget", &definition);
///
/// let css = render(&compiled.static_rules, None, OutputFormat::Expanded).unwrap();
/// assert_eq!(css, ".Widget {\ncolor: white;\nbackground-color: red;\n}\n");
/// ```
pub fn render<C>(
    rules: &RuleSet<C>,
    component: Option<&C>,
    format: OutputFormat,
) -> Result<String> {
    let mut out = String::new();
    render_into(&mut out, rules, component, format)?;
    Ok(out)
}

/// Renders `rules`, appending to `out`.
pub fn render_into<C>(
    out: &mut String,
    rules: &RuleSet<C>,
    component: Option<&C>,
    format: OutputFormat,
) -> Result<()> {
    for (selector, declarations) in rules.iter() {
        format.open(out, selector);
        render_declarations(out, selector, declarations, component, format)?;
        format.close(out);
    }
    Ok(())
}

fn render_declarations<C>(
    out: &mut String,
    selector: &str,
    declarations: &IndexMap<String, RuleValue<C>>,
    component: Option<&C>,
    format: OutputFormat,
) -> Result<()> {
    for (property, value) in declarations {
        match value {
            RuleValue::Static(value) => format.declaration(out, property, &value.to_string()),
            RuleValue::Dynamic(producer) => {
                let component =
                    component.ok_or_else(|| StyleError::missing_component(selector, property))?;
                let value = producer
                    .evaluate(component)
                    .map_err(|e| StyleError::dynamic_value(selector, property, e))?;
                format.declaration(out, property, &value.to_string());
            }
            RuleValue::Frame(frame) => {
                format.open(out, property);
                render_declarations(out, selector, frame, component, format)?;
                format.close(out);
            }
        }
    }
    Ok(())
}
