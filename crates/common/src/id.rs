//! Namespaced object ids.
//!
//! Every engine object gets an id of the form `namespace#seq`. Sequence
//! numbers are counted per namespace, start at 1 and never repeat within a
//! registry.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Unique identifier for an engine object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId {
    namespace: &'static str,
    seq: u64,
}

impl ObjectId {
    /// Build an id directly. Used by registries and tests; engine code
    /// should call [`ObjectId::next`].
    pub const fn from_parts(namespace: &'static str, seq: u64) -> Self {
        Self { namespace, seq }
    }

    /// Allocate the next id in `namespace` from the process-wide registry.
    pub fn next(namespace: &'static str) -> Self {
        let registry = global_registry();
        let mut guard = registry.lock().unwrap_or_else(PoisonError::into_inner);
        guard.allocate(namespace)
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.seq)
    }
}

/// Per-namespace id allocator.
#[derive(Debug, Default)]
pub struct IdRegistry {
    counters: BTreeMap<&'static str, u64>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id in `namespace`.
    pub fn allocate(&mut self, namespace: &'static str) -> ObjectId {
        let counter = self.counters.entry(namespace).or_insert(0);
        *counter += 1;
        ObjectId::from_parts(namespace, *counter)
    }

    /// Number of ids issued so far in `namespace`.
    pub fn issued(&self, namespace: &str) -> u64 {
        self.counters.get(namespace).copied().unwrap_or(0)
    }

    /// Namespaces that have issued at least one id, in sorted order.
    pub fn namespaces(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.counters.keys().copied()
    }

    /// Forget all counters. Ids issued afterwards may collide with earlier ones.
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

fn global_registry() -> &'static Mutex<IdRegistry> {
    static REGISTRY: OnceLock<Mutex<IdRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(IdRegistry::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sequences_are_per_namespace() {
        let mut reg = IdRegistry::new();
        let a1 = reg.allocate("A");
        let a2 = reg.allocate("A");
        let b1 = reg.allocate("B");
        assert_eq!(a1.seq(), 1);
        assert_eq!(a2.seq(), 2);
        assert_eq!(b1.seq(), 1);
        assert_ne!(a1, b1);
        assert_eq!(reg.issued("A"), 2);
        assert_eq!(reg.issued("missing"), 0);
    }

    #[test]
    fn namespaces_listed_sorted() {
        let mut reg = IdRegistry::new();
        reg.allocate("Scene");
        reg.allocate("GameObject");
        let names: Vec<_> = reg.namespaces().collect();
        assert_eq!(names, vec!["GameObject", "Scene"]);
    }

    #[test]
    fn reset_restarts_counters() {
        let mut reg = IdRegistry::new();
        reg.allocate("A");
        reg.reset();
        assert_eq!(reg.allocate("A").seq(), 1);
    }

    #[test]
    fn global_ids_are_unique() {
        let ids: HashSet<ObjectId> = (0..100).map(|_| ObjectId::next("Test")).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn display_format() {
        let id = ObjectId::from_parts("GameObject", 7);
        assert_eq!(id.to_string(), "GameObject#7");
    }
}
