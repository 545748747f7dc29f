//! Style registry: one compiled record per base rule.
//!
//! The registry is the only state shared between managers. The first
//! manager to initialize a base rule compiles it and stores a
//! [`StyleRecord`]; every later manager for that base rule finds the record
//! and skips the static work entirely. Records are never evicted.
//!
//! # Compile states
//!
//! ```text
//! Uncompiled ──first compile──► StaticOnly
//!            └────────────────► StaticAndDynamic
//! ```
//!
//! Both compiled states are terminal. `Uncompiled` is simply the absence of
//! a record.
//!
//! # Sharing
//!
//! The registry is an ordinary value; share it with `Arc`. A host that wants
//! one registry for the whole process can keep it in a static:
//!
//! ```rust
//! use std::sync::Arc;
//! use once_cell::sync::Lazy;
//! use livestyle::StyleRegistry;
//!
//! struct Widget;
//!
//! static WIDGET_STYLES: Lazy<Arc<StyleRegistry<Widget>>> =
//!     Lazy::new(|| Arc::new(StyleRegistry::new()));
//!
//! assert!(WIDGET_STYLES.is_empty());
//! ```
//!
//! Tests get isolation by building a fresh registry.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::config::StyleConfig;
use crate::definition::StyleDefinition;
use crate::error::{Result, StyleError};
use crate::render::{render_into, OutputFormat};
use crate::rules::{compile_full, RuleSet};
use crate::target::{OutputTarget, OutputTargetFactory, TargetKind};

/// The callback producing a component's style definition.
pub type StyleProvider<C> = Arc<dyn Fn() -> StyleDefinition<C> + Send + Sync>;

/// Compilation state of a base rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileState {
    /// No record exists yet.
    Uncompiled,
    /// Compiled; no dynamic declarations were found.
    StaticOnly,
    /// Compiled; dynamic declarations must be refreshed on update.
    StaticAndDynamic,
}

struct DynamicSink {
    target: Box<dyn OutputTarget>,
    last_written: Option<String>,
}

/// The compiled output of one base rule.
pub struct StyleRecord<C> {
    base_rule: String,
    provider: StyleProvider<C>,
    state: CompileState,
    static_rules: RuleSet<C>,
    static_keyframes: RuleSet<C>,
    static_css: OnceCell<String>,
    static_target: Option<Mutex<Box<dyn OutputTarget>>>,
    dynamic_rules: RuleSet<C>,
    dynamic_sink: Option<Mutex<DynamicSink>>,
}

impl<C> StyleRecord<C> {
    /// Runs the first compile of `definition` for `base_rule`.
    ///
    /// Output targets are requested from `factory` only for the kinds that
    /// have content. Nothing is written yet; see [`write_static`](Self::write_static).
    pub fn compile(
        base_rule: &str,
        provider: StyleProvider<C>,
        definition: &StyleDefinition<C>,
        factory: &dyn OutputTargetFactory,
    ) -> Self {
        let compilation = compile_full(base_rule, definition);
        let state = if compilation.has_dynamic() {
            CompileState::StaticAndDynamic
        } else {
            CompileState::StaticOnly
        };

        debug!(
            base_rule,
            static_selectors = compilation.static_rules.len(),
            static_keyframes = compilation.static_keyframes.len(),
            dynamic_selectors = compilation.dynamic_rules.len(),
            ?state,
            "First compile"
        );

        let static_target = compilation
            .has_static()
            .then(|| Mutex::new(factory.create(base_rule, TargetKind::Static)));
        let dynamic_sink = compilation.has_dynamic().then(|| {
            Mutex::new(DynamicSink {
                target: factory.create(base_rule, TargetKind::Dynamic),
                last_written: None,
            })
        });

        Self {
            base_rule: base_rule.to_string(),
            provider,
            state,
            static_rules: compilation.static_rules,
            static_keyframes: compilation.static_keyframes,
            static_css: OnceCell::new(),
            static_target,
            dynamic_rules: compilation.dynamic_rules,
            dynamic_sink,
        }
    }

    /// The base rule this record was compiled for.
    pub fn base_rule(&self) -> &str {
        &self.base_rule
    }

    /// The provider retained from the first compile.
    pub fn provider(&self) -> &StyleProvider<C> {
        &self.provider
    }

    /// The record's compile state; never [`CompileState::Uncompiled`].
    pub fn state(&self) -> CompileState {
        self.state
    }

    /// Dynamic rules collected at first compile.
    pub fn dynamic_rules(&self) -> Option<&RuleSet<C>> {
        (!self.dynamic_rules.is_empty()).then_some(&self.dynamic_rules)
    }

    /// The static text, once it has been written.
    pub fn static_css(&self) -> Option<&str> {
        self.static_css.get().map(String::as_str)
    }

    /// Renders static rules and static keyframes, then writes them.
    ///
    /// Rendering and writing happen at most once per record; later calls
    /// return `Ok(false)` without touching the target. Returns `Ok(false)`
    /// as well when there is no static content.
    pub fn write_static(&self, format: OutputFormat) -> Result<bool> {
        let Some(target) = &self.static_target else {
            return Ok(false);
        };
        if self.static_css.get().is_some() {
            return Ok(false);
        }

        let mut written = false;
        self.static_css.get_or_try_init(|| -> Result<String> {
            let mut css = String::new();
            render_into(&mut css, &self.static_rules, None, format)?;
            render_into(&mut css, &self.static_keyframes, None, format)?;
            target
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write(&css)
                .map_err(|e| StyleError::output(&self.base_rule, e))?;
            debug!(base_rule = %self.base_rule, bytes = css.len(), "Static styles written");
            written = true;
            Ok(css)
        })?;
        Ok(written)
    }

    /// Writes rendered dynamic text.
    ///
    /// With `skip_unchanged` set, text equal to the last write is dropped.
    /// Returns whether the target was written. A record without dynamic
    /// rules ignores the call.
    pub fn write_dynamic(&self, css: String, skip_unchanged: bool) -> Result<bool> {
        let Some(sink) = &self.dynamic_sink else {
            return Ok(false);
        };
        let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
        if skip_unchanged && sink.last_written.as_deref() == Some(css.as_str()) {
            trace!(base_rule = %self.base_rule, "Dynamic styles unchanged, write skipped");
            return Ok(false);
        }
        sink.target
            .write(&css)
            .map_err(|e| StyleError::output(&self.base_rule, e))?;
        trace!(base_rule = %self.base_rule, bytes = css.len(), "Dynamic styles written");
        sink.last_written = Some(css);
        Ok(true)
    }
}

impl<C> fmt::Debug for StyleRecord<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRecord")
            .field("base_rule", &self.base_rule)
            .field("state", &self.state)
            .field("static_selectors", &self.static_rules.len())
            .field("dynamic_selectors", &self.dynamic_rules.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of [`StyleRegistry::get_or_compile`].
#[derive(Debug)]
pub enum Lookup<C> {
    /// A record already existed.
    Hit(Arc<StyleRecord<C>>),
    /// This call compiled and stored the record.
    Compiled(Arc<StyleRecord<C>>),
}

impl<C> Lookup<C> {
    /// The record, however it was obtained.
    pub fn record(&self) -> &Arc<StyleRecord<C>> {
        match self {
            Lookup::Hit(record) | Lookup::Compiled(record) => record,
        }
    }
}

/// Compiled records keyed by base rule.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use livestyle::{CompileState, StyleDefinition, StyleRecord, StyleRegistry};
/// use livestyle::target::MemoryTargetFactory;
///
/// let registry = StyleRegistry::<()>::new();
/// let factory = MemoryTargetFactory::new();
/// let provider: livestyle::StyleProvider<()> =
///     Arc::new(|| StyleDefinition::new().set("color", "red"));
///
/// let record = StyleRecord::compile(".A", provider.clone(), &provider(), &factory);
/// registry.create(record);
///
/// assert_eq!(registry.state(".A"), CompileState::StaticOnly);
/// assert_eq!(registry.state(".B"), CompileState::Uncompiled);
/// ```
pub struct StyleRegistry<C> {
    records: Mutex<IndexMap<String, Arc<StyleRecord<C>>>>,
    config: StyleConfig,
}

impl<C> Default for StyleRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StyleRegistry<C> {
    /// Creates an empty registry with the default config.
    pub fn new() -> Self {
        Self::with_config(StyleConfig::default())
    }

    /// Creates an empty registry with `config`.
    pub fn with_config(config: StyleConfig) -> Self {
        Self {
            records: Mutex::new(IndexMap::new()),
            config,
        }
    }

    /// The config shared by managers of this registry.
    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Looks up the record for `base_rule`.
    pub fn get(&self, base_rule: &str) -> Option<Arc<StyleRecord<C>>> {
        self.lock().get(base_rule).cloned()
    }

    /// Stores `record` unless one already exists for its base rule.
    ///
    /// The first record stored for a base rule wins; the stored record is
    /// returned either way.
    pub fn create(&self, record: StyleRecord<C>) -> Arc<StyleRecord<C>> {
        let mut records = self.lock();
        Arc::clone(
            records
                .entry(record.base_rule.clone())
                .or_insert_with(|| Arc::new(record)),
        )
    }

    /// Returns the record for `base_rule`, compiling it first if missing.
    ///
    /// The lookup and the insert happen under one lock, so `compile` runs at
    /// most once per base rule even when managers initialize concurrently.
    /// `compile` must not call back into this registry.
    pub fn get_or_compile<F>(&self, base_rule: &str, compile: F) -> Result<Lookup<C>>
    where
        F: FnOnce() -> Result<StyleRecord<C>>,
    {
        let mut records = self.lock();
        if let Some(record) = records.get(base_rule) {
            trace!(base_rule, "Style registry hit");
            return Ok(Lookup::Hit(Arc::clone(record)));
        }
        let record = Arc::new(compile()?);
        records.insert(base_rule.to_string(), Arc::clone(&record));
        Ok(Lookup::Compiled(record))
    }

    /// Compile state of `base_rule`.
    pub fn state(&self, base_rule: &str) -> CompileState {
        self.lock()
            .get(base_rule)
            .map_or(CompileState::Uncompiled, |record| record.state())
    }

    /// Static text written for `base_rule`, if any.
    pub fn static_css(&self, base_rule: &str) -> Option<String> {
        self.get(base_rule)
            .and_then(|record| record.static_css().map(str::to_string))
    }

    /// Returns `true` if `base_rule` has been compiled.
    pub fn contains(&self, base_rule: &str) -> bool {
        self.lock().contains_key(base_rule)
    }

    /// Base rules in the order they were first compiled.
    pub fn base_rules(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of compiled base rules.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been compiled.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, Arc<StyleRecord<C>>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> fmt::Debug for StyleRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("base_rules", &self.base_rules())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryTargetFactory;

    fn provider(definition: fn() -> StyleDefinition<u32>) -> StyleProvider<u32> {
        Arc::new(definition)
    }

    fn static_only() -> StyleDefinition<u32> {
        StyleDefinition::new().set("color", "white")
    }

    fn with_dynamic() -> StyleDefinition<u32> {
        StyleDefinition::new()
            .set("color", "white")
            .dynamic("width", |w: &u32| format!("{}px", w))
    }

    fn compile(
        base_rule: &str,
        definition: fn() -> StyleDefinition<u32>,
        factory: &MemoryTargetFactory,
    ) -> StyleRecord<u32> {
        let provider = provider(definition);
        StyleRecord::compile(base_rule, provider.clone(), &provider(), factory)
    }

    #[test]
    fn test_state_follows_dynamic_content() {
        let factory = MemoryTargetFactory::new();
        assert_eq!(
            compile(".A", static_only, &factory).state(),
            CompileState::StaticOnly
        );
        assert_eq!(
            compile(".B", with_dynamic, &factory).state(),
            CompileState::StaticAndDynamic
        );
    }

    #[test]
    fn test_targets_created_only_for_content() {
        let factory = MemoryTargetFactory::new();
        compile(".A", static_only, &factory);
        assert!(factory.target(".A", TargetKind::Static).is_some());
        assert!(factory.target(".A", TargetKind::Dynamic).is_none());

        compile(".Empty", StyleDefinition::new, &factory);
        assert!(factory.target(".Empty", TargetKind::Static).is_none());
    }

    #[test]
    fn test_dynamic_target_created_but_not_written() {
        let factory = MemoryTargetFactory::new();
        compile(".B", with_dynamic, &factory);
        let target = factory.target(".B", TargetKind::Dynamic).unwrap();
        assert_eq!(target.write_count(), 0);
    }

    #[test]
    fn test_write_static_happens_once() {
        let factory = MemoryTargetFactory::new();
        let record = compile(".A", static_only, &factory);
        assert!(record.write_static(OutputFormat::Expanded).unwrap());
        assert!(!record.write_static(OutputFormat::Expanded).unwrap());

        let target = factory.target(".A", TargetKind::Static).unwrap();
        assert_eq!(target.writes(), vec![".A {\ncolor: white;\n}\n"]);
        assert_eq!(record.static_css(), Some(".A {\ncolor: white;\n}\n"));
    }

    #[test]
    fn test_write_dynamic_skips_unchanged() {
        let factory = MemoryTargetFactory::new();
        let record = compile(".B", with_dynamic, &factory);
        assert!(record.write_dynamic("a".into(), true).unwrap());
        assert!(!record.write_dynamic("a".into(), true).unwrap());
        assert!(record.write_dynamic("a".into(), false).unwrap());
        assert!(record.write_dynamic("b".into(), true).unwrap());
        let target = factory.target(".B", TargetKind::Dynamic).unwrap();
        assert_eq!(target.writes(), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_create_first_caller_wins() {
        let factory = MemoryTargetFactory::new();
        let registry = StyleRegistry::new();
        let first = registry.create(compile(".A", static_only, &factory));
        let second = registry.create(compile(".A", with_dynamic, &factory));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.state(".A"), CompileState::StaticOnly);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_or_compile_runs_once() {
        let factory = MemoryTargetFactory::new();
        let registry = StyleRegistry::new();
        let mut runs = 0;

        for _ in 0..3 {
            registry
                .get_or_compile(".A", || {
                    runs += 1;
                    Ok(compile(".A", static_only, &factory))
                })
                .unwrap();
        }
        assert_eq!(runs, 1);
        assert!(registry.contains(".A"));
    }

    #[test]
    fn test_get_or_compile_reports_outcome() {
        let factory = MemoryTargetFactory::new();
        let registry = StyleRegistry::new();
        let first = registry
            .get_or_compile(".A", || Ok(compile(".A", static_only, &factory)))
            .unwrap();
        assert!(matches!(first, Lookup::Compiled(_)));
        let second = registry
            .get_or_compile(".A", || Ok(compile(".A", static_only, &factory)))
            .unwrap();
        assert!(matches!(second, Lookup::Hit(_)));
        assert!(Arc::ptr_eq(first.record(), second.record()));
    }

    #[test]
    fn test_failed_compile_leaves_rule_uncompiled() {
        let registry = StyleRegistry::<u32>::new();
        let result = registry.get_or_compile(".A", || Err(StyleError::Parse("bad".into())));
        assert!(result.is_err());
        assert_eq!(registry.state(".A"), CompileState::Uncompiled);
    }

    #[test]
    fn test_base_rules_keep_compile_order() {
        let factory = MemoryTargetFactory::new();
        let registry = StyleRegistry::new();
        registry.create(compile(".Z", static_only, &factory));
        registry.create(compile(".A", static_only, &factory));
        assert_eq!(registry.base_rules(), vec![".Z", ".A"]);
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        let registry = Arc::new(StyleRegistry::<u32>::new());
        let factory = Arc::new(MemoryTargetFactory::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || {
                    registry
                        .get_or_compile(".Shared", || {
                            Ok(compile(".Shared", with_dynamic, &factory))
                        })
                        .map(|lookup| matches!(lookup, Lookup::Compiled(_)))
                        .unwrap()
                })
            })
            .collect();
        let compiled = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|compiled| *compiled)
            .count();
        assert_eq!(compiled, 1);
        assert_eq!(factory.created_count(), 2);
    }
}
