use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Watch-root consistency manager.
///
/// Responsibility:
/// - Attach roots as they are registered
/// - Detach roots as they are removed
/// - Re-attach roots that were removed and recreated
pub(super) struct WatchRoots {
    desired: FxHashSet<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new() -> Self {
        Self {
            desired: FxHashSet::default(),
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn roots(&self) -> impl Iterator<Item = &Path> + Clone {
        self.desired.iter().map(PathBuf::as_path)
    }

    pub(super) fn add(&mut self, path: PathBuf, watcher: &mut RecommendedWatcher) {
        if !self.desired.insert(path.clone()) {
            return;
        }
        if !path.exists() {
            crate::debug!("watch"; "{} does not exist yet, will attach later", path.display());
            return;
        }
        match watcher.watch(&path, RecursiveMode::Recursive) {
            Ok(()) => {
                crate::debug!("watch"; "watching {}", path.display());
                self.attached.insert(path);
            }
            Err(e) => crate::log!("watch"; "failed to watch {}: {}", path.display(), e),
        }
    }

    pub(super) fn remove(&mut self, path: &Path, watcher: &mut RecommendedWatcher) {
        self.desired.remove(path);
        if self.attached.remove(path) {
            let _ = watcher.unwatch(path);
            crate::debug!("watch"; "unwatched {}", path.display());
        }
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch(path, RecursiveMode::Recursive).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }
}
