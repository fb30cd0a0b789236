//! The set of grammar directories being watched and built.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::GrammarEntry;

/// Registered grammars keyed by directory.
///
/// Insertion-idempotent; entries only leave through [`Registry::remove`].
/// Owned by the orchestrator actor, so no interior locking.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<PathBuf, GrammarEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `directory` if absent. Returns whether it was newly added.
    pub fn add(&mut self, directory: &Path) -> bool {
        if self.entries.contains_key(directory) {
            return false;
        }
        let entry = GrammarEntry::new(directory.to_path_buf());
        self.entries.insert(directory.to_path_buf(), entry);
        true
    }

    /// Delete `directory` if present. Returns whether it was registered.
    pub fn remove(&mut self, directory: &Path) -> bool {
        self.entries.remove(directory).is_some()
    }

    pub fn get(&self, directory: &Path) -> Option<&GrammarEntry> {
        self.entries.get(directory)
    }

    #[inline]
    pub fn contains(&self, directory: &Path) -> bool {
        self.entries.contains_key(directory)
    }

    /// Iterate current entries in directory order.
    pub fn list(&self) -> impl Iterator<Item = &GrammarEntry> + '_ {
        self.entries.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
