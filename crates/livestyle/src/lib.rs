//! # Livestyle - Component Style Compiler
//!
//! `livestyle` turns a nested description of a component's look into CSS
//! text. Most declarations are static and compiled exactly once per
//! component type; declarations computed from live component state are kept
//! apart and re-rendered on every update.
//!
//! ## Core Concepts
//!
//! - [`StyleDefinition`]: The nested style tree, built in code or loaded from YAML / JSON
//! - [`walker`]: Stateless traversal classifying every entry of a definition
//! - [`RuleSet`]: Accumulated `selector -> property -> value` declarations
//! - [`StyleRegistry`]: One compiled [`StyleRecord`] per base rule, shared by all instances
//! - [`StyleManager`]: Per-instance lifecycle (`init_style`, `update_dynamic_styles`)
//! - [`OutputTargetFactory`]: Where rendered text goes; supplied by the host
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use livestyle::{StyleDefinition, StyleManager, StyleRegistry, TargetKind};
//! use livestyle::target::MemoryTargetFactory;
//!
//! struct Widget;
//!
//! let registry = Arc::new(StyleRegistry::new());
//! let factory = Arc::new(MemoryTargetFactory::new());
//! let counter = Arc::new(AtomicU32::new(0));
//!
//! let mut manager = StyleManager::new(".Widget", registry, factory.clone(), move || {
//!     let counter = Arc::clone(&counter);
//!     StyleDefinition::new()
//!         .set("color", "white")
//!         .set("backgroundColor", "red")
//!         .dynamic("size", move |_: &Widget| counter.fetch_add(1, Ordering::SeqCst))
//! });
//!
//! manager.init_style().unwrap();
//! let statics = factory.target(".Widget", TargetKind::Static).unwrap();
//! assert_eq!(
//!     statics.content().as_deref(),
//!     Some(".Widget {\ncolor: white;\nbackground-color: red;\n}\n")
//! );
//!
//! manager.update_dynamic_styles(Some(&Widget)).unwrap();
//! manager.update_dynamic_styles(Some(&Widget)).unwrap();
//! let dynamics = factory.target(".Widget", TargetKind::Dynamic).unwrap();
//! assert_eq!(
//!     dynamics.writes(),
//!     vec![".Widget {\nsize: 0;\n}\n", ".Widget {\nsize: 1;\n}\n"]
//! );
//! ```
//!
//! ## Selectors
//!
//! Nested keys build selectors from the base rule:
//!
//! ```rust
//! use livestyle::rules::compile_full;
//! use livestyle::render::{render, OutputFormat};
//! use livestyle::{when, StyleDefinition};
//!
//! let definition = StyleDefinition::<()>::new()
//!     .nest(when("Square"), StyleDefinition::new()
//!         .nest(when(":active"), StyleDefinition::new().set("borderRadius", 0)))
//!     .nest("Label", StyleDefinition::new().set("fontSize", "12px"))
//!     .nest("=.Overlay", StyleDefinition::new().set("zIndex", 10));
//!
//! let css = render(&compile_full(".Comp", &definition).static_rules, None, OutputFormat::Compact)
//!     .unwrap();
//! assert_eq!(
//!     css,
//!     ".Comp.Square:active{border-radius:0;}.Comp .Label{font-size:12px;}.Overlay{z-index:10;}"
//! );
//! ```
//!
//! ## Loading Definitions
//!
//! Static styles can live in a document and be extended in code:
//!
//! ```rust
//! use livestyle::StyleDefinition;
//!
//! struct Meter { level: f64 }
//!
//! let definition = StyleDefinition::<Meter>::from_yaml_str(r#"
//! color: white
//! borderWidth: 1px
//! Needle:
//!   height: 2px
//! "#)
//! .unwrap()
//! .dynamic("opacity", |m: &Meter| m.level);
//!
//! assert_eq!(definition.len(), 4);
//! ```

pub mod config;
pub mod definition;
mod error;
pub mod manager;
pub mod registry;
pub mod render;
pub mod rules;
pub mod target;
pub mod value;
pub mod walker;

// Error type
pub use error::{Result, StyleError};

// Definition exports
pub use definition::{
    when, when_suffix, StyleDefinition, StyleEntry, DEFINITION_EXTENSIONS, WHEN_PREFIX,
};
pub use value::{CssValue, DynamicValue, ValueError};

// Compilation exports
pub use render::OutputFormat;
pub use rules::{RuleSet, RuleValue};

// Lifecycle exports
pub use config::StyleConfig;
pub use manager::StyleManager;
pub use registry::{CompileState, Lookup, StyleProvider, StyleRecord, StyleRegistry};
pub use target::{
    MemoryTarget, MemoryTargetFactory, OutputTarget, OutputTargetFactory, TargetKind, WriterTarget,
};
