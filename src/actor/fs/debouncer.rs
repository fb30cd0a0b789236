use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::messages::OrchestratorMsg;

/// Per-directory trailing-edge debouncer.
///
/// Each directory owns at most one timer task. Scheduling again aborts the
/// pending timer and starts a fresh one, so only a full quiet period emits
/// a rebuild request.
pub(super) struct Debouncer {
    delay: Duration,
    pub(super) pending: FxHashMap<PathBuf, JoinHandle<()>>,
    tx: mpsc::Sender<OrchestratorMsg>,
}

impl Debouncer {
    pub(super) fn new(delay: Duration, tx: mpsc::Sender<OrchestratorMsg>) -> Self {
        Self {
            delay,
            pending: FxHashMap::default(),
            tx,
        }
    }

    /// Restart the quiet period for `dir`.
    pub(super) fn schedule(&mut self, dir: PathBuf) {
        self.pending.retain(|_, timer| !timer.is_finished());
        if let Some(timer) = self.pending.remove(&dir) {
            timer.abort();
        }

        crate::debug!("watch"; "change in {}", dir.display());

        let tx = self.tx.clone();
        let delay = self.delay;
        let target = dir.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(OrchestratorMsg::Rebuild(target)).await;
        });
        self.pending.insert(dir, timer);
    }

    /// Drop the pending timer for `dir`, if any.
    pub(super) fn cancel(&mut self, dir: &Path) {
        if let Some(timer) = self.pending.remove(dir) {
            timer.abort();
        }
    }

    pub(super) fn cancel_all(&mut self) {
        for (_, timer) in self.pending.drain() {
            timer.abort();
        }
    }
}
