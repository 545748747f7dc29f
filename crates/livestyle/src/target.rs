//! Output targets: where rendered CSS goes.
//!
//! The compiler never touches a document or stylesheet itself. It asks an
//! [`OutputTargetFactory`] for a target per base rule and kind, then writes
//! text to it. A write carries the complete text for that output, so a
//! stylesheet-backed target should replace its content on each write.
//!
//! [`MemoryTarget`] and [`MemoryTargetFactory`] keep every write in memory,
//! which suits tests and headless hosts. [`WriterTarget`] forwards to any
//! [`std::io::Write`].

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Which of a base rule's two outputs a target holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Written once, at first compile.
    Static,
    /// Rewritten whenever the dynamic text changes.
    Dynamic,
}

/// A writable text sink for rendered CSS.
pub trait OutputTarget: Send {
    /// Delivers the full rendered text for this output.
    fn write(&mut self, css: &str) -> io::Result<()>;
}

/// Creates output targets for base rules.
///
/// Any `Fn(&str, TargetKind) -> Box<dyn OutputTarget>` closure is a factory.
pub trait OutputTargetFactory: Send + Sync {
    /// Creates the `kind` target for `base_rule`.
    fn create(&self, base_rule: &str, kind: TargetKind) -> Box<dyn OutputTarget>;
}

impl<F> OutputTargetFactory for F
where
    F: Fn(&str, TargetKind) -> Box<dyn OutputTarget> + Send + Sync,
{
    fn create(&self, base_rule: &str, kind: TargetKind) -> Box<dyn OutputTarget> {
        self(base_rule, kind)
    }
}

/// An in-memory target recording every write.
///
/// Clones share the same record, so a test can keep a handle while the
/// registry owns the boxed target.
///
/// ```rust
/// use livestyle::target::{MemoryTarget, OutputTarget};
///
/// let target = MemoryTarget::new();
/// let mut boxed: Box<dyn OutputTarget> = Box::new(target.clone());
/// boxed.write(".A {\n}\n").unwrap();
/// assert_eq!(target.content().as_deref(), Some(".A {\n}\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryTarget {
    /// Creates an empty target.
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Current content: the most recent write.
    pub fn content(&self) -> Option<String> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl OutputTarget for MemoryTarget {
    fn write(&mut self, css: &str) -> io::Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(css.to_string());
        Ok(())
    }
}

/// A factory handing out [`MemoryTarget`]s and remembering them.
#[derive(Debug, Clone, Default)]
pub struct MemoryTargetFactory {
    created: Arc<Mutex<Vec<(String, TargetKind, MemoryTarget)>>>,
}

impl MemoryTargetFactory {
    /// Creates a factory with no targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent target created for `base_rule` and `kind`.
    pub fn target(&self, base_rule: &str, kind: TargetKind) -> Option<MemoryTarget> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|(rule, k, _)| rule == base_rule && *k == kind)
            .map(|(_, _, target)| target.clone())
    }

    /// Number of targets created so far.
    pub fn created_count(&self) -> usize {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl OutputTargetFactory for MemoryTargetFactory {
    fn create(&self, base_rule: &str, kind: TargetKind) -> Box<dyn OutputTarget> {
        let target = MemoryTarget::new();
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((base_rule.to_string(), kind, target.clone()));
        Box::new(target)
    }
}

/// Writes each rendered text to an [`io::Write`] and flushes it.
pub struct WriterTarget<W> {
    writer: W,
}

impl<W: io::Write + Send> WriterTarget<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> fmt::Debug for WriterTarget<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterTarget").finish_non_exhaustive()
    }
}

impl<W: io::Write + Send> OutputTarget for WriterTarget<W> {
    fn write(&mut self, css: &str) -> io::Result<()> {
        self.writer.write_all(css.as_bytes())?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_target_records_writes() {
        let target = MemoryTarget::new();
        let mut sink = target.clone();
        sink.write("a").unwrap();
        sink.write("b").unwrap();
        assert_eq!(target.writes(), vec!["a", "b"]);
        assert_eq!(target.write_count(), 2);
        assert_eq!(target.content().as_deref(), Some("b"));
    }

    #[test]
    fn test_memory_factory_tracks_targets() {
        let factory = MemoryTargetFactory::new();
        let mut target = factory.create(".Widget", TargetKind::Dynamic);
        target.write("x").unwrap();

        assert_eq!(factory.created_count(), 1);
        assert!(factory.target(".Widget", TargetKind::Static).is_none());
        let handle = factory.target(".Widget", TargetKind::Dynamic).unwrap();
        assert_eq!(handle.content().as_deref(), Some("x"));
    }

    #[test]
    fn test_closure_is_a_factory() {
        let shared = MemoryTarget::new();
        let handle = shared.clone();
        let factory = move |_: &str, _: TargetKind| -> Box<dyn OutputTarget> {
            Box::new(shared.clone())
        };
        factory
            .create(".Any", TargetKind::Static)
            .write("css")
            .unwrap();
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn test_writer_target_appends_bytes() {
        let mut target = WriterTarget::new(Vec::new());
        target.write(".A{}").unwrap();
        assert_eq!(target.into_inner(), b".A{}".to_vec());
    }
}
