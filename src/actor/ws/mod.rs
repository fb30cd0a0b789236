//! WebSocket Actor - Bidirectional Communication
//!
//! This actor is responsible for:
//! - Managing WebSocket client connections
//! - Broadcasting events to all connected clients
//! - Targeted push for new-subscriber reconciliation
//! - Forwarding client requests to the OrchestratorActor
//!
//! # Architecture
//!
//! ```text
//! OrchestratorActor --[Broadcast/SendTo]--> WsActor --[text frames]--> Clients
//!        ^                                                               |
//!        +--------------------[ClientMessage]----------------------------+
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::{ClientId, OrchestratorMsg, WsMsg};

/// A connected subscriber
struct Subscriber {
    id: ClientId,
    ws: WebSocket<TcpStream>,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Channel to forward client requests
    orchestrator_tx: mpsc::Sender<OrchestratorMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Arc<Mutex<Vec<Subscriber>>>,
    /// Next subscriber id
    next_id: ClientId,
}

impl WsActor {
    /// Create a new WsActor
    pub fn new(rx: mpsc::Receiver<WsMsg>, orchestrator_tx: mpsc::Sender<OrchestratorMsg>) -> Self {
        Self {
            rx,
            orchestrator_tx,
            clients: Arc::new(Mutex::new(Vec::new())),
            next_id: 1,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        // Spawn a background thread to poll client messages
        let clients_for_reader = Arc::clone(&self.clients);
        let tx_for_reader = self.orchestrator_tx.clone();
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader, tx_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Broadcast(event) => {
                    self.broadcast(Message::Text(event.to_json().into()));
                }

                WsMsg::SendTo { client, msg } => {
                    self.send_to(client, Message::Text(msg.to_json().into()));
                }

                WsMsg::AddClient(stream) => {
                    if let Some(id) = self.add_client(stream)
                        && !self.announce(id)
                    {
                        break;
                    }
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut client in clients.drain(..) {
                        let _ = client.ws.close(None);
                        let _ = client.ws.flush();
                    }
                    break;
                }
            }
        }
    }
}

impl WsActor {
    /// Tell the orchestrator about a new subscriber. Never awaits the
    /// orchestrator queue; a full queue defers the notice to a task.
    /// Returns `false` once the orchestrator is gone.
    fn announce(&self, id: ClientId) -> bool {
        match self
            .orchestrator_tx
            .try_send(OrchestratorMsg::SubscriberJoined(id))
        {
            Ok(()) => true,
            Err(TrySendError::Full(msg)) => {
                crate::debug!("ws"; "orchestrator busy, deferring join of client {}", id);
                let tx = self.orchestrator_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(msg).await;
                });
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests;
