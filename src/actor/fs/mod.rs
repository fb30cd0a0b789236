//! FileSystem Actor
//!
//! Watches registered grammar directories and emits one debounced rebuild
//! request per directory to the OrchestratorActor.
//!
//! Architecture:
//! ```text
//! Watcher → filter (grammar file, hidden paths) → Debouncer (per-dir timers) → Rebuild
//! ```

use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::messages::{FsMsg, OrchestratorMsg};

// Per-directory cancellable timers.
mod debouncer;
// Qualifying-event selection.
mod filter;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


use debouncer::Debouncer;
use filter::rebuild_targets;
use watch_roots::WatchRoots;

/// How often vanished roots are checked for re-attachment.
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(1);

/// FileSystem Actor - watches grammar directories
pub struct FsActor {
    /// Channel to receive control messages
    rx: mpsc::Receiver<FsMsg>,
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watch-root consistency layer (attach/re-attach grammar directories)
    watch_roots: WatchRoots,
    /// Pending rebuild timers
    debouncer: Debouncer,
    /// File name whose changes trigger a rebuild
    grammar_file: String,
}

impl FsActor {
    /// Create a new FsActor. The watcher starts immediately; directories
    /// arrive later through [`FsMsg::Watch`].
    pub fn new(
        rx: mpsc::Receiver<FsMsg>,
        orchestrator_tx: mpsc::Sender<OrchestratorMsg>,
        grammar_file: String,
        debounce: Duration,
    ) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        Ok(Self {
            rx,
            notify_rx,
            watcher,
            watch_roots: WatchRoots::new(),
            debouncer: Debouncer::new(debounce, orchestrator_tx),
            grammar_file,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            mut rx,
            notify_rx,
            mut watcher,
            mut watch_roots,
            mut debouncer,
            grammar_file,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut maintenance = tokio::time::interval(MAINTENANCE_INTERVAL);
        maintenance.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some(FsMsg::Watch(dir)) => watch_roots.add(dir, &mut watcher),
                    Some(FsMsg::Unwatch(dir)) => {
                        debouncer.cancel(&dir);
                        watch_roots.remove(&dir, &mut watcher);
                    }
                    Some(FsMsg::Shutdown) | None => break,
                },
                Some(event) = async_rx.recv() => {
                    for dir in rebuild_targets(&event, watch_roots.roots(), &grammar_file) {
                        debouncer.schedule(dir);
                    }
                }
                _ = maintenance.tick() => watch_roots.maintain(&mut watcher),
            }
        }

        debouncer.cancel_all();
        crate::debug!("watch"; "stopped");
    }
}
