use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for object IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A stable, engine-internal handle for an object in the scene arena.
/// Internally a 4-byte `Spur` index.
///
/// IDs are never written to documents: a reloaded snapshot gets fresh IDs,
/// so anything holding an old ID simply stops resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    /// Intern a string as an ObjectId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ObjectId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a type prefix (e.g. `rect_1`, `textbox_2`).
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Placeholder ID for freshly decoded objects; replaced on insertion.
    pub fn unassigned() -> Self {
        Self::intern("_unassigned")
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ObjectId::intern("rect_42");
        let b = ObjectId::intern("rect_42");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "rect_42");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = ObjectId::with_prefix("rect");
        let b = ObjectId::with_prefix("rect");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("rect_"));
    }
}
