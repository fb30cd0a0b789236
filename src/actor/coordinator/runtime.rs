use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{FsMsg, OrchestratorMsg, WsMsg};
use crate::actor::orchestrator::OrchestratorActor;
use crate::actor::ws::WsActor;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub(super) struct Actors {
    pub fs: FsActor,
    pub orchestrator: OrchestratorActor,
    pub ws: WsActor,
}

pub(super) struct Senders {
    pub orchestrator: mpsc::Sender<OrchestratorMsg>,
    pub fs: mpsc::Sender<FsMsg>,
    pub ws: mpsc::Sender<WsMsg>,
}

/// Run all actors concurrently until a shutdown signal or an actor exits.
pub(super) async fn run_actors(
    actors: Actors,
    senders: Senders,
    shutdown_rx: Option<Receiver<()>>,
) {
    let mut orchestrator_handle = tokio::spawn(actors.orchestrator.run());
    let mut fs_handle = tokio::spawn(actors.fs.run());
    let mut ws_handle = tokio::spawn(actors.ws.run());

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if orchestrator_handle.is_finished() || fs_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = &mut orchestrator_handle => {}
            _ = &mut fs_handle => {}
            _ = &mut ws_handle => {}
        }
    }

    crate::debug!("actor"; "sending shutdown");
    let _ = senders.orchestrator.send(OrchestratorMsg::Shutdown).await;
    let _ = senders.fs.send(FsMsg::Shutdown).await;
    let _ = senders.ws.send(WsMsg::Shutdown).await;

    let _ = tokio::time::timeout(SHUTDOWN_GRACE, async {
        let _ = orchestrator_handle.await;
        let _ = fs_handle.await;
        let _ = ws_handle.await;
    })
    .await;
}
