//! Rule sets and the accumulators that fill them.
//!
//! A [`RuleSet`] maps a selector to its declarations, both in first-seen
//! order. Compilation produces two of them, one static and one dynamic, and
//! a `(selector, property)` pair only ever lives in one: a later
//! declaration of the same pair moves it to the set matching its kind.
//!
//! Keyframes blocks are all-or-nothing. If any declaration in any offset of
//! a timeline is dynamic, the whole block joins the dynamic set, literal
//! values included, so every offset is re-rendered together.

use indexmap::IndexMap;

use crate::definition::StyleDefinition;
use crate::value::{CssValue, DynamicValue};
use crate::walker::{keyframes_rule, walk, walk_keyframes, StyleVisitor};

/// A declaration value inside a [`RuleSet`].
#[derive(Debug)]
pub enum RuleValue<C> {
    Static(CssValue),
    Dynamic(DynamicValue<C>),
    /// One keyframe offset and its declarations, evaluated together.
    Frame(IndexMap<String, RuleValue<C>>),
}

impl<C> RuleValue<C> {
    /// Returns `true` if this value, or anything inside a frame, is dynamic.
    pub fn is_dynamic(&self) -> bool {
        match self {
            RuleValue::Static(_) => false,
            RuleValue::Dynamic(_) => true,
            RuleValue::Frame(declarations) => declarations.values().any(RuleValue::is_dynamic),
        }
    }
}

impl<C> Clone for RuleValue<C> {
    fn clone(&self) -> Self {
        match self {
            RuleValue::Static(value) => RuleValue::Static(value.clone()),
            RuleValue::Dynamic(value) => RuleValue::Dynamic(value.clone()),
            RuleValue::Frame(declarations) => RuleValue::Frame(declarations.clone()),
        }
    }
}

/// Declarations grouped by fully qualified selector, in insertion order.
#[derive(Debug)]
pub struct RuleSet<C> {
    rules: IndexMap<String, IndexMap<String, RuleValue<C>>>,
}

impl<C> Default for RuleSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for RuleSet<C> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<C> RuleSet<C> {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Sets `property` under `selector`.
    ///
    /// Re-setting a property keeps its original position.
    pub fn insert(&mut self, selector: &str, property: &str, value: RuleValue<C>) {
        self.rules
            .entry(selector.to_string())
            .or_default()
            .insert(property.to_string(), value);
    }

    /// Removes `property` from `selector`, dropping the selector once empty.
    pub fn remove(&mut self, selector: &str, property: &str) -> Option<RuleValue<C>> {
        let declarations = self.rules.get_mut(selector)?;
        let removed = declarations.shift_remove(property);
        if declarations.is_empty() {
            self.rules.shift_remove(selector);
        }
        removed
    }

    /// Removes a whole selector.
    pub fn remove_selector(&mut self, selector: &str) -> Option<IndexMap<String, RuleValue<C>>> {
        self.rules.shift_remove(selector)
    }

    /// Looks up the declarations for `selector`.
    pub fn get(&self, selector: &str) -> Option<&IndexMap<String, RuleValue<C>>> {
        self.rules.get(selector)
    }

    /// Iterates selectors and their declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, RuleValue<C>>)> {
        self.rules
            .iter()
            .map(|(selector, declarations)| (selector.as_str(), declarations))
    }

    /// Number of selectors.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when there are no selectors.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if any declaration needs a component to render.
    pub fn has_dynamic(&self) -> bool {
        self.rules
            .values()
            .any(|declarations| declarations.values().any(RuleValue::is_dynamic))
    }
}

/// Result of a first compile.
#[derive(Debug)]
pub struct Compilation<C> {
    /// Static declarations, keyed by selector.
    pub static_rules: RuleSet<C>,
    /// Keyframes blocks with no dynamic declarations.
    pub static_keyframes: RuleSet<C>,
    /// Dynamic declarations and dynamic keyframes blocks.
    pub dynamic_rules: RuleSet<C>,
}

impl<C> Compilation<C> {
    /// Returns `true` if anything must be rendered once.
    pub fn has_static(&self) -> bool {
        !self.static_rules.is_empty() || !self.static_keyframes.is_empty()
    }

    /// Returns `true` if anything must be re-rendered on update.
    pub fn has_dynamic(&self) -> bool {
        !self.dynamic_rules.is_empty()
    }
}

/// Compiles a definition into static and dynamic rule sets.
pub fn compile_full<C>(base_rule: &str, definition: &StyleDefinition<C>) -> Compilation<C> {
    let mut collector = FullCollector {
        compilation: Compilation {
            static_rules: RuleSet::new(),
            static_keyframes: RuleSet::new(),
            dynamic_rules: RuleSet::new(),
        },
    };
    walk(base_rule, definition, &mut collector);
    collector.compilation
}

/// Refreshes the values of an already compiled dynamic rule set.
///
/// The result holds exactly the pairs and keyframes blocks of `compiled`,
/// in `compiled`'s order. Each takes its value from `definition` when
/// `definition` declares it, and keeps its `compiled` value otherwise. A
/// keyframes block is replaced as a whole. How `definition` itself splits
/// static from dynamic is ignored; that split belongs to the first compile.
pub fn compile_dynamic<C>(
    base_rule: &str,
    definition: &StyleDefinition<C>,
    compiled: &RuleSet<C>,
) -> RuleSet<C> {
    let mut collector = LatestCollector {
        latest: RuleSet::new(),
    };
    walk(base_rule, definition, &mut collector);
    let latest = collector.latest;

    let mut rules = RuleSet::new();
    for (selector, declarations) in compiled.iter() {
        let fresh = latest.get(selector);
        let declarations = match fresh {
            Some(block) if selector.starts_with("@keyframes") => block,
            _ => declarations,
        };
        for (property, value) in declarations {
            let value = fresh
                .and_then(|fresh| fresh.get(property))
                .unwrap_or(value);
            rules.insert(selector, property, value.clone());
        }
    }
    rules
}

struct FullCollector<C> {
    compilation: Compilation<C>,
}

impl<C> StyleVisitor<C> for FullCollector<C> {
    fn on_static(&mut self, selector: &str, property: &str, value: &CssValue) {
        self.compilation.dynamic_rules.remove(selector, property);
        self.compilation
            .static_rules
            .insert(selector, property, RuleValue::Static(value.clone()));
    }

    fn on_dynamic(&mut self, selector: &str, property: &str, value: &DynamicValue<C>) {
        self.compilation.static_rules.remove(selector, property);
        self.compilation
            .dynamic_rules
            .insert(selector, property, RuleValue::Dynamic(value.clone()));
    }

    fn on_keyframes(&mut self, _selector: &str, name: &str, timeline: &StyleDefinition<C>) {
        let frames = collect_frames(timeline);
        let heading = keyframes_rule(name);
        let (target, other) = if frames.dynamic {
            (
                &mut self.compilation.dynamic_rules,
                &mut self.compilation.static_keyframes,
            )
        } else {
            (
                &mut self.compilation.static_keyframes,
                &mut self.compilation.dynamic_rules,
            )
        };
        other.remove_selector(&heading);
        target.remove_selector(&heading);
        for (offset, declarations) in frames.frames {
            target.insert(&heading, &offset, RuleValue::Frame(declarations));
        }
    }
}

/// Collects every declaration of a definition, whatever its kind.
struct LatestCollector<C> {
    latest: RuleSet<C>,
}

impl<C> StyleVisitor<C> for LatestCollector<C> {
    fn on_static(&mut self, selector: &str, property: &str, value: &CssValue) {
        self.latest
            .insert(selector, property, RuleValue::Static(value.clone()));
    }

    fn on_dynamic(&mut self, selector: &str, property: &str, value: &DynamicValue<C>) {
        self.latest
            .insert(selector, property, RuleValue::Dynamic(value.clone()));
    }

    fn on_keyframes(&mut self, _selector: &str, name: &str, timeline: &StyleDefinition<C>) {
        let heading = keyframes_rule(name);
        self.latest.remove_selector(&heading);
        for (offset, declarations) in collect_frames(timeline).frames {
            self.latest
                .insert(&heading, &offset, RuleValue::Frame(declarations));
        }
    }
}

struct FrameCollector<C> {
    frames: IndexMap<String, IndexMap<String, RuleValue<C>>>,
    dynamic: bool,
}

impl<C> StyleVisitor<C> for FrameCollector<C> {
    fn on_static(&mut self, offset: &str, property: &str, value: &CssValue) {
        self.frames
            .entry(offset.to_string())
            .or_default()
            .insert(property.to_string(), RuleValue::Static(value.clone()));
    }

    fn on_dynamic(&mut self, offset: &str, property: &str, value: &DynamicValue<C>) {
        self.dynamic = true;
        self.frames
            .entry(offset.to_string())
            .or_default()
            .insert(property.to_string(), RuleValue::Dynamic(value.clone()));
    }
}

fn collect_frames<C>(timeline: &StyleDefinition<C>) -> FrameCollector<C> {
    let mut collector = FrameCollector {
        frames: IndexMap::new(),
        dynamic: false,
    };
    walk_keyframes(timeline, &mut collector);
    collector
}
