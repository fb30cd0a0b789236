//! Server lifecycle management.

use crate::{actor::Coordinator, config::Config, core::register_server, log};
use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender};
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
///
/// Port 0 asks the OS for a free port and is never retried.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let attempts = if base_port == 0 { 1 } else { MAX_PORT_RETRIES };

    let mut last_err = None;
    for offset in 0..attempts {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        attempts,
        base_port,
        base_port.saturating_add(attempts - 1),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the handler set up in main() unblocks the server
/// and notifies the actors.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server, shutdown_tx);
}

/// Spawn the actor system on its own tokio runtime thread.
pub fn spawn_actors(
    config: Arc<Config>,
    folders: Vec<PathBuf>,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = run_actor_system(config, folders, shutdown_rx) {
            log!("actor"; "error: {:#}", e);
            crate::core::request_shutdown();
        }
    })
}

fn run_actor_system(
    config: Arc<Config>,
    folders: Vec<PathBuf>,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(
        Coordinator::with_config(config)
            .with_folders(folders)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
