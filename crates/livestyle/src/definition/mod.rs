//! Style definitions: the nested tree a component describes its look with.
//!
//! A [`StyleDefinition`] is an ordered map from key to [`StyleEntry`]. How a
//! key is read depends on its entry and its shape:
//!
//! | Key | Entry | Meaning |
//! |-----|-------|---------|
//! | [`when`]`("Square")` | nested | extra class on the current selector (`.Comp.Square`) |
//! | [`when`]`(":hover")` | nested | pseudo-state on the current selector (`.Comp:hover`) |
//! | `"@spin"` | nested | keyframes timeline |
//! | `"=.Container"` | nested | absolute selector, parent ignored |
//! | `"Child"` | nested | child component (`.Comp .Child`) |
//! | `"div"`, `">button"` | nested | descendant / combinator (`.Comp div`) |
//! | `"backgroundColor"` | static or dynamic | declaration (`background-color`) |
//!
//! Entries keep insertion order; the order is preserved in the emitted CSS.
//!
//! # Example
//!
//! ```rust
//! use livestyle::{when, StyleDefinition};
//!
//! struct Button { pressed: bool }
//!
//! let definition = StyleDefinition::<Button>::new()
//!     .set("color", "white")
//!     .set("backgroundColor", "red")
//!     .dynamic("opacity", |button: &Button| if button.pressed { 0.5 } else { 1.0 })
//!     .nest(when(":active"), StyleDefinition::new().set("color", "black"))
//!     .nest("span", StyleDefinition::new().set("fontWeight", 700));
//!
//! assert_eq!(definition.len(), 5);
//! ```

mod document;

pub use document::DEFINITION_EXTENSIONS;

use crate::value::{CssValue, DynamicValue, ValueError};

/// Reserved prefix marking a [`when`] key.
///
/// No CSS property or selector starts with `%`, so the prefix cannot be
/// mistaken for either.
pub const WHEN_PREFIX: &str = "%when:";

/// Builds a key that qualifies the current selector instead of naming a
/// property.
///
/// A suffix starting with a letter becomes a class (`when("Square")` on
/// `.Comp` gives `.Comp.Square`); anything else is appended verbatim
/// (`when(":active")` gives `.Comp:active`).
///
/// ```rust
/// use livestyle::{when, WHEN_PREFIX};
///
/// assert_eq!(when(":hover"), format!("{}:hover", WHEN_PREFIX));
/// ```
pub fn when(suffix: &str) -> String {
    format!("{}{}", WHEN_PREFIX, suffix)
}

/// Returns the suffix of a [`when`] key, or `None` for any other key.
pub fn when_suffix(key: &str) -> Option<&str> {
    key.strip_prefix(WHEN_PREFIX)
}

/// A single value in a [`StyleDefinition`].
#[derive(Debug)]
pub enum StyleEntry<C> {
    /// A declaration fixed at compile time.
    Static(CssValue),
    /// A declaration recomputed from the component on every update.
    Dynamic(DynamicValue<C>),
    /// A child selector, state qualifier, absolute selector or keyframes block.
    Nested(StyleDefinition<C>),
}

impl<C> Clone for StyleEntry<C> {
    fn clone(&self) -> Self {
        match self {
            StyleEntry::Static(value) => StyleEntry::Static(value.clone()),
            StyleEntry::Dynamic(value) => StyleEntry::Dynamic(value.clone()),
            StyleEntry::Nested(definition) => StyleEntry::Nested(definition.clone()),
        }
    }
}

impl<C> From<CssValue> for StyleEntry<C> {
    fn from(value: CssValue) -> Self {
        StyleEntry::Static(value)
    }
}

impl<C> From<DynamicValue<C>> for StyleEntry<C> {
    fn from(value: DynamicValue<C>) -> Self {
        StyleEntry::Dynamic(value)
    }
}

impl<C> From<StyleDefinition<C>> for StyleEntry<C> {
    fn from(definition: StyleDefinition<C>) -> Self {
        StyleEntry::Nested(definition)
    }
}

/// An ordered tree of style entries for components of type `C`.
///
/// Setting a key that already exists replaces its entry in place, keeping
/// the original position.
#[derive(Debug)]
pub struct StyleDefinition<C> {
    entries: Vec<(String, StyleEntry<C>)>,
}

impl<C> Default for StyleDefinition<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for StyleDefinition<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> StyleDefinition<C> {
    /// Creates an empty definition.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a static declaration, returning `self` for chaining.
    pub fn set(self, key: impl Into<String>, value: impl Into<CssValue>) -> Self {
        self.with_entry(key, StyleEntry::Static(value.into()))
    }

    /// Adds a dynamic declaration, returning `self` for chaining.
    pub fn dynamic<F, V>(self, key: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&C) -> V + Send + Sync + 'static,
        V: Into<CssValue>,
    {
        self.with_entry(key, StyleEntry::Dynamic(DynamicValue::new(producer)))
    }

    /// Adds a dynamic declaration whose producer can fail.
    pub fn try_dynamic<F, V>(self, key: impl Into<String>, producer: F) -> Self
    where
        F: Fn(&C) -> Result<V, ValueError> + Send + Sync + 'static,
        V: Into<CssValue>,
    {
        self.with_entry(key, StyleEntry::Dynamic(DynamicValue::try_new(producer)))
    }

    /// Adds a nested definition, returning `self` for chaining.
    pub fn nest(self, key: impl Into<String>, definition: StyleDefinition<C>) -> Self {
        self.with_entry(key, StyleEntry::Nested(definition))
    }

    /// Adds any entry, returning `self` for chaining.
    pub fn with_entry(mut self, key: impl Into<String>, entry: impl Into<StyleEntry<C>>) -> Self {
        self.insert(key, entry);
        self
    }

    /// Inserts an entry, replacing (in place) any entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<StyleEntry<C>>) {
        let key = key.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((key, entry)),
        }
    }

    /// Merges `other` into this definition.
    ///
    /// Keys from `other` replace existing keys in place; new keys are
    /// appended in `other`'s order.
    pub fn extend(mut self, other: StyleDefinition<C>) -> Self {
        for (key, entry) in other.entries {
            self.insert(key, entry);
        }
        self
    }

    /// Looks up the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&StyleEntry<C>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, entry)| entry)
    }

    /// Iterates entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &StyleEntry<C>)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the definition has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_when_round_trips_suffix() {
        assert_eq!(when_suffix(&when("Square")), Some("Square"));
        assert_eq!(when_suffix("color"), None);
    }

    #[test]
    fn test_builder_keeps_insertion_order() {
        let definition = StyleDefinition::<()>::new()
            .set("color", "white")
            .set("backgroundColor", "red")
            .nest("div", StyleDefinition::new());
        let keys: Vec<_> = definition.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["color", "backgroundColor", "div"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let definition = StyleDefinition::<()>::new()
            .set("color", "white")
            .set("margin", 0)
            .set("color", "black");
        let keys: Vec<_> = definition.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["color", "margin"]);
        match definition.get("color") {
            Some(StyleEntry::Static(value)) => assert_eq!(value.to_string(), "black"),
            other => panic!("Expected static color, got {:?}", other),
        }
    }

    #[test]
    fn test_extend_overrides_and_appends() {
        let base = StyleDefinition::<()>::new()
            .set("color", "white")
            .set("margin", 0);
        let overrides = StyleDefinition::new()
            .set("margin", 4)
            .set("padding", 2);
        let merged = base.extend(overrides);
        let keys: Vec<_> = merged.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["color", "margin", "padding"]);
        assert!(matches!(
            merged.get("margin"),
            Some(StyleEntry::Static(CssValue::Number(n))) if *n == 4.0
        ));
    }

    #[test]
    fn test_dynamic_entries_are_classified() {
        let definition = StyleDefinition::<u32>::new().dynamic("width", |w: &u32| *w);
        assert!(matches!(
            definition.get("width"),
            Some(StyleEntry::Dynamic(_))
        ));
    }
}
