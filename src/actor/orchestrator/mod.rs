//! Orchestrator Actor
//!
//! Single writer of the grammar registry and the dependency state. Every
//! client request, debounce expiry and finished background task arrives
//! here as a message and is handled one at a time.
//!
//! ```text
//! Client/Rebuild ──▶ OrchestratorActor ──spawn_blocking──▶ install / build
//!                          ▲                                    │
//!                          └────────InstallDone / BuildDone─────┘
//! ```
//!
//! Builds for one directory never overlap: a rebuild requested while that
//! directory is building marks it dirty, and a single follow-up build runs
//! once the current one reports back.

mod handlers;
mod tasks;


use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::messages::{FsMsg, OrchestratorMsg, WsMsg};
use crate::config::Config;
use crate::deps::{DependencyManager, Fetcher, HttpFetcher, Platform};
use crate::grammar::Registry;
use crate::pipeline::BuildPipeline;
use crate::protocol::ServerMessage;

/// Orchestrator Actor - owns registry, dependency state and build bookkeeping
pub struct OrchestratorActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<OrchestratorMsg>,
    /// Own sender, handed to background tasks for reporting back
    self_tx: mpsc::Sender<OrchestratorMsg>,
    /// Channel to FsActor
    fs_tx: mpsc::Sender<FsMsg>,
    /// Channel to WsActor
    ws_tx: mpsc::Sender<WsMsg>,
    registry: Registry,
    deps: DependencyManager,
    pipeline: Arc<BuildPipeline>,
    fetcher: Arc<dyn Fetcher>,
    /// Directories with a build in flight
    building: FxHashSet<PathBuf>,
    /// Directories that need one more build after the current one
    dirty: FxHashSet<PathBuf>,
    /// Directories added before the first message is handled
    startup: Vec<PathBuf>,
}

impl OrchestratorActor {
    /// Create the actor, recovering dependency state from disk.
    pub fn new(
        rx: mpsc::Receiver<OrchestratorMsg>,
        self_tx: mpsc::Sender<OrchestratorMsg>,
        fs_tx: mpsc::Sender<FsMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        config: &Config,
    ) -> Self {
        Self {
            rx,
            self_tx,
            fs_tx,
            ws_tx,
            registry: Registry::new(),
            deps: DependencyManager::recover(&config.paths, &config.deps, Platform::current()),
            pipeline: Arc::new(BuildPipeline::new(&config.paths)),
            fetcher: Arc::new(HttpFetcher::new()),
            building: FxHashSet::default(),
            dirty: FxHashSet::default(),
            startup: Vec::new(),
        }
    }

    /// Directories to add, watch and build once as soon as the actor runs.
    pub fn with_startup_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.startup = folders;
        self
    }

    /// Replace the download client.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Resolve CLI downloads for another platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.deps = self.deps.with_platform(platform);
        self
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        for folder in std::mem::take(&mut self.startup) {
            if self.on_add(folder).await.is_err() {
                crate::debug!("orchestrator"; "downstream actor gone, stopping");
                return;
            }
        }

        while let Some(msg) = self.rx.recv().await {
            let flow = match msg {
                OrchestratorMsg::Client(request) => self.on_client(request).await,
                OrchestratorMsg::SubscriberJoined(client) => self.on_subscriber(client).await,
                OrchestratorMsg::Rebuild(dir) => {
                    self.on_rebuild(dir);
                    Ok(())
                }
                OrchestratorMsg::InstallDone {
                    kind,
                    version,
                    result,
                } => self.on_install_done(kind, version, result).await,
                OrchestratorMsg::BuildDone { entry, result } => {
                    self.on_build_done(entry, result).await
                }
                OrchestratorMsg::Shutdown => break,
            };

            if flow.is_err() {
                crate::debug!("orchestrator"; "downstream actor gone, stopping");
                break;
            }
        }
        if !self.registry.is_empty() {
            let names: Vec<_> = self.registry.list().map(|e| e.unique_name.as_str()).collect();
            crate::debug!("orchestrator"; "stopped with {}", names.join(", "));
        } else {
            crate::debug!("orchestrator"; "stopped");
        }
    }

    /// Send an event to every subscriber.
    async fn broadcast(&self, msg: ServerMessage) -> Result<(), ()> {
        self.ws_tx.send(WsMsg::Broadcast(msg)).await.map_err(|_| ())
    }
}
