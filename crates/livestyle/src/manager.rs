//! Per-instance style lifecycle.
//!
//! A [`StyleManager`] belongs to one component instance. It holds the base
//! rule, the provider that builds the instance's style definition, and the
//! dynamic rules from the most recent [`init_style`](StyleManager::init_style).
//! All shared state lives in the [`StyleRegistry`].
//!
//! The host drives two calls:
//!
//! 1. [`init_style`](StyleManager::init_style) when the instance mounts. The
//!    first manager for a base rule compiles it and writes the static text;
//!    later managers only re-collect dynamic rules, so their producers
//!    capture the current instance.
//! 2. [`update_dynamic_styles`](StyleManager::update_dynamic_styles) whenever
//!    the instance updates. Dynamic rules are rendered against the component
//!    and written when the text changed.
//!
//! Calling `update_dynamic_styles` before `init_style` does nothing.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::definition::StyleDefinition;
use crate::error::Result;
use crate::registry::{CompileState, Lookup, StyleProvider, StyleRecord, StyleRegistry};
use crate::render::render;
use crate::rules::{compile_dynamic, RuleSet};
use crate::target::OutputTargetFactory;

/// Style lifecycle of one component instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use livestyle::{StyleDefinition, StyleManager, StyleRegistry, TargetKind};
/// use livestyle::target::MemoryTargetFactory;
///
/// struct Bar {
///     width: u32,
/// }
///
/// let registry = Arc::new(StyleRegistry::new());
/// let factory = Arc::new(MemoryTargetFactory::new());
///
/// let mut manager = StyleManager::new(".Bar", registry, factory.clone(), || {
///     StyleDefinition::new()
///         .set("height", "4px")
///         .dynamic("width", |bar: &Bar| format!("{}px", bar.width))
/// });
/// manager.init_style().unwrap();
/// manager.update_dynamic_styles(Some(&Bar { width: 40 })).unwrap();
///
/// let dynamic = factory.target(".Bar", TargetKind::Dynamic).unwrap();
/// assert_eq!(dynamic.content().as_deref(), Some(".Bar {\nwidth: 40px;\n}\n"));
/// ```
pub struct StyleManager<C> {
    base_rule: String,
    provider: StyleProvider<C>,
    registry: Arc<StyleRegistry<C>>,
    factory: Arc<dyn OutputTargetFactory>,
    record: Option<Arc<StyleRecord<C>>>,
    dynamic_rules: Option<RuleSet<C>>,
}

impl<C> StyleManager<C> {
    /// Creates a manager for `base_rule`.
    ///
    /// `provider` is called on every [`init_style`](Self::init_style). It
    /// should capture whatever the instance's dynamic producers need.
    /// Nothing is compiled until then.
    pub fn new<F>(
        base_rule: impl Into<String>,
        registry: Arc<StyleRegistry<C>>,
        factory: Arc<dyn OutputTargetFactory>,
        provider: F,
    ) -> Self
    where
        F: Fn() -> StyleDefinition<C> + Send + Sync + 'static,
    {
        Self {
            base_rule: base_rule.into(),
            provider: Arc::new(provider),
            registry,
            factory,
            record: None,
            dynamic_rules: None,
        }
    }

    /// Compiles or re-collects this instance's styles.
    ///
    /// The provider is always invoked. If the base rule has no record yet,
    /// the definition is fully compiled, static text is written once and
    /// the record is stored. Otherwise the record's dynamic rules are
    /// refreshed from this instance's definition, and nothing at all happens
    /// for a static-only base rule.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Output`](crate::StyleError::Output) if the
    /// static target rejects the write.
    pub fn init_style(&mut self) -> Result<()> {
        let definition = (self.provider)();
        let lookup = self.registry.get_or_compile(&self.base_rule, || {
            Ok(StyleRecord::compile(
                &self.base_rule,
                Arc::clone(&self.provider),
                &definition,
                &*self.factory,
            ))
        })?;

        let record = match lookup {
            Lookup::Compiled(record) => {
                self.dynamic_rules = record.dynamic_rules().cloned();
                record
            }
            Lookup::Hit(record) => {
                self.dynamic_rules = record.dynamic_rules().map(|compiled| {
                    trace!(base_rule = %self.base_rule, "Later compile");
                    compile_dynamic(&self.base_rule, &definition, compiled)
                });
                record
            }
        };

        // A no-op once the static text exists; retries a failed first write.
        record.write_static(self.registry.config().format)?;
        self.record = Some(record);
        Ok(())
    }

    /// Renders dynamic rules against `component` and writes them.
    ///
    /// Returns `Ok(true)` when the dynamic target was written. Returns
    /// `Ok(false)` for an uninitialized or static-only manager, and when the
    /// text is unchanged and the registry config skips unchanged writes.
    ///
    /// # Errors
    ///
    /// - [`StyleError::MissingComponent`](crate::StyleError::MissingComponent)
    ///   if `component` is `None` while dynamic rules exist.
    /// - [`StyleError::DynamicValue`](crate::StyleError::DynamicValue) if a
    ///   producer fails.
    /// - [`StyleError::Output`](crate::StyleError::Output) if the write fails.
    pub fn update_dynamic_styles(&self, component: Option<&C>) -> Result<bool> {
        let Some(record) = &self.record else {
            return Ok(false);
        };
        if record.state() != CompileState::StaticAndDynamic {
            return Ok(false);
        }
        let Some(rules) = self.dynamic_rules.as_ref().or_else(|| record.dynamic_rules()) else {
            return Ok(false);
        };

        let config = self.registry.config();
        let css = render(rules, component, config.format)?;
        record.write_dynamic(css, config.skip_unchanged_writes)
    }

    /// Compile state of this manager's base rule.
    pub fn state(&self) -> CompileState {
        self.record
            .as_ref()
            .map_or(CompileState::Uncompiled, |record| record.state())
    }

    /// The base rule this manager styles.
    pub fn base_rule(&self) -> &str {
        &self.base_rule
    }

    /// Dynamic rules from the latest `init_style`.
    pub fn dynamic_rules(&self) -> Option<&RuleSet<C>> {
        self.dynamic_rules.as_ref()
    }

    /// The registry shared with other managers.
    pub fn registry(&self) -> &Arc<StyleRegistry<C>> {
        &self.registry
    }
}

impl<C> fmt::Debug for StyleManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleManager")
            .field("base_rule", &self.base_rule)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
