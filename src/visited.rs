use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Set of URLs already handed to a worker.
///
/// Every operation takes the lock on its own. Workers go through
/// [`VisitedSet::try_claim`], which does the existence check and the insert
/// under one write lock, so two workers can never both win the same URL.
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: RwLock<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another worker panicked mid-call; the set
    // itself is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashSet<String>> {
        self.keys.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<String>> {
        self.keys.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains(key)
    }

    pub fn add<K: Into<String>>(&self, key: K) {
        self.write().insert(key.into());
    }

    /// Inserts `key` if absent. Returns true if this call inserted it.
    pub fn try_claim(&self, key: &str) -> bool {
        let mut keys = self.write();
        if keys.contains(key) {
            false
        } else {
            keys.insert(key.to_string())
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        self.write().remove(key)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl fmt::Display for VisitedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.read().iter().sorted().join(", "))
    }
}
