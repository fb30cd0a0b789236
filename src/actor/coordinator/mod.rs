//! Actor Coordinator - Wires up the Orchestrator Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors
//! - Runs them concurrently

mod runtime;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{FsMsg, OrchestratorMsg, WsMsg};
use super::orchestrator::OrchestratorActor;
use super::ws::WsActor;
use crate::config::Config;

pub(super) const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<Config>,
    folders: Vec<PathBuf>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Create from Arc<Config>.
    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            folders: Vec::new(),
            shutdown_rx: None,
        }
    }

    /// Grammar directories to add on startup.
    pub fn with_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.folders = folders;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (orchestrator_tx, orchestrator_rx) =
            mpsc::channel::<OrchestratorMsg>(CHANNEL_BUFFER);
        let (fs_tx, fs_rx) = mpsc::channel::<FsMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let serve = &self.config.serve;
        let ws_port = crate::protocol::server::start_ws_server(
            serve.interface,
            serve.ws_port,
            ws_tx.clone(),
        )
        .context("websocket server failed")?;
        crate::log!("ws"; "listening on ws://{}:{}", serve.interface, ws_port);

        let build = &self.config.build;
        let fs_actor = FsActor::new(
            fs_rx,
            orchestrator_tx.clone(),
            build.grammar_file.clone(),
            Duration::from_millis(build.debounce_ms),
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let orchestrator = OrchestratorActor::new(
            orchestrator_rx,
            orchestrator_tx.clone(),
            fs_tx.clone(),
            ws_tx.clone(),
            &self.config,
        )
        .with_startup_folders(std::mem::take(&mut self.folders));
        let ws_actor = WsActor::new(ws_rx, orchestrator_tx.clone());

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(
            runtime::Actors {
                fs: fs_actor,
                orchestrator,
                ws: ws_actor,
            },
            runtime::Senders {
                orchestrator: orchestrator_tx,
                fs: fs_tx,
                ws: ws_tx,
            },
            shutdown_rx,
        )
        .await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
