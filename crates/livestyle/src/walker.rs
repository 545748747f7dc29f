//! Style-tree walker.
//!
//! [`walk`] traverses a [`StyleDefinition`] and reports each declaration to a
//! [`StyleVisitor`], building the fully qualified selector as it descends.
//! The walker keeps no state of its own; everything it learns goes through
//! the visitor.
//!
//! For every entry, in priority order:
//!
//! 1. A [`when`](crate::when) key qualifies the current selector and the walk
//!    recurses into its definition.
//! 2. A nested definition is a keyframes block (`@` key), an absolute
//!    selector (`=` key) or a child selector (anything else).
//! 3. A dynamic value is reported through [`StyleVisitor::on_dynamic`].
//! 4. A static value is reported through [`StyleVisitor::on_static`].
//!
//! Property names reach the visitor in dash-case (`backgroundColor` becomes
//! `background-color`).

use std::borrow::Cow;

use tracing::warn;

use crate::definition::{when_suffix, StyleDefinition, StyleEntry};
use crate::value::{CssValue, DynamicValue};

/// Receives the declarations found by [`walk`] and [`walk_keyframes`].
///
/// Every method defaults to doing nothing, so a visitor only implements the
/// callbacks it cares about.
pub trait StyleVisitor<C> {
    /// A static declaration under `selector`.
    fn on_static(&mut self, _selector: &str, _property: &str, _value: &CssValue) {}

    /// A dynamic declaration under `selector`.
    fn on_dynamic(&mut self, _selector: &str, _property: &str, _value: &DynamicValue<C>) {}

    /// A keyframes block found while walking `selector`.
    ///
    /// `name` is the raw `@` key; `timeline` maps time keys to declarations.
    fn on_keyframes(&mut self, _selector: &str, _name: &str, _timeline: &StyleDefinition<C>) {}
}

/// Walks `definition` rooted at `selector`, reporting to `visitor`.
///
/// # Example
///
/// ```rust
/// use livestyle::walker::{walk, StyleVisitor};
/// use livestyle::{CssValue, StyleDefinition};
///
/// #[derive(Default)]
/// struct Selectors(Vec<String>);
///
/// impl StyleVisitor<()> for Selectors {
///     fn on_static(&mut self, selector: &str, property: &str, value: &CssValue) {
///         self.0.push(format!("{} {}: {}", selector, property, value));
///     }
/// }
///
/// let definition = StyleDefinition::<()>::new()
///     .set("backgroundColor", "red")
///     .nest("Icon", StyleDefinition::new().set("width", 16));
///
/// let mut found = Selectors::default();
/// walk(".Button", &definition, &mut found);
/// assert_eq!(found.0, vec![
///     ".Button background-color: red",
///     ".Button .Icon width: 16",
/// ]);
/// ```
pub fn walk<C, V>(selector: &str, definition: &StyleDefinition<C>, visitor: &mut V)
where
    V: StyleVisitor<C> + ?Sized,
{
    for (key, entry) in definition.entries() {
        if let Some(suffix) = when_suffix(key) {
            match entry {
                StyleEntry::Nested(inner) => walk(&qualify(selector, suffix), inner, visitor),
                _ => warn!(selector, suffix, "when() qualifier without nested styles, skipped"),
            }
            continue;
        }

        match entry {
            StyleEntry::Nested(inner) => {
                if key.starts_with('@') {
                    visitor.on_keyframes(selector, key, inner);
                } else if let Some(absolute) = key.strip_prefix('=') {
                    walk(absolute, inner, visitor);
                } else {
                    walk(&child_selector(selector, key), inner, visitor);
                }
            }
            StyleEntry::Dynamic(value) => visitor.on_dynamic(selector, &dash_case(key), value),
            StyleEntry::Static(value) => visitor.on_static(selector, &dash_case(key), value),
        }
    }
}

/// Walks a keyframes timeline, reporting each declaration with its time
/// offset in place of a selector.
///
/// Integer time keys gain a `%` suffix (`"60"` becomes `"60%"`); other keys
/// (`from`, `to`, `"60%"`) are kept as written. Time keys are never
/// dash-cased; property names inside them are.
pub fn walk_keyframes<C, V>(timeline: &StyleDefinition<C>, visitor: &mut V)
where
    V: StyleVisitor<C> + ?Sized,
{
    for (key, entry) in timeline.entries() {
        let StyleEntry::Nested(frame) = entry else {
            warn!(offset = key, "keyframe offset without declarations, skipped");
            continue;
        };
        let offset = keyframe_offset(key);
        for (property, value) in frame.entries() {
            match value {
                StyleEntry::Dynamic(value) => {
                    visitor.on_dynamic(&offset, &dash_case(property), value)
                }
                StyleEntry::Static(value) => {
                    visitor.on_static(&offset, &dash_case(property), value)
                }
                StyleEntry::Nested(_) => {
                    warn!(offset = %offset, property, "nested styles inside a keyframe, skipped")
                }
            }
        }
    }
}

/// Converts a camelCase property name to dash-case.
///
/// Each ASCII uppercase letter becomes `-` followed by its lowercase form;
/// every other character is kept.
///
/// ```rust
/// use livestyle::walker::dash_case;
///
/// assert_eq!(dash_case("backgroundColor"), "background-color");
/// assert_eq!(dash_case("color"), "color");
/// ```
pub fn dash_case(property: &str) -> Cow<'_, str> {
    if !property.bytes().any(|b| b.is_ascii_uppercase()) {
        return Cow::Borrowed(property);
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Applies a [`when`](crate::when) suffix to `selector`.
///
/// Suffixes starting with a letter become a class; others are appended as-is.
pub fn qualify(selector: &str, suffix: &str) -> String {
    match suffix.chars().next() {
        Some(c) if c.is_alphabetic() => format!("{}.{}", selector, suffix),
        _ => format!("{}{}", selector, suffix),
    }
}

/// Builds the selector for a nested child key.
///
/// Keys starting with an uppercase letter name a component class
/// (`.Parent .Child`); others are used as written after a space
/// (`.Parent div`, `.Parent >button`).
pub fn child_selector(parent: &str, key: &str) -> String {
    match key.chars().next() {
        Some(c) if c.is_uppercase() => format!("{} .{}", parent, key),
        _ => format!("{} {}", parent, key),
    }
}

/// Normalizes a keyframes time key.
pub fn keyframe_offset(key: &str) -> Cow<'_, str> {
    if key.parse::<i64>().is_ok() {
        Cow::Owned(format!("{}%", key))
    } else {
        Cow::Borrowed(key)
    }
}

/// Returns the at-rule heading for a keyframes key.
///
/// `"@keyframes spin"` is kept; the short form `"@spin"` expands to it.
pub fn keyframes_rule(name: &str) -> Cow<'_, str> {
    if name.starts_with("@keyframes") {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("@keyframes {}", name.trim_start_matches('@')))
    }
}
