use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::protocol::Message;

use super::{Subscriber, WsActor};
use crate::actor::messages::{ClientId, OrchestratorMsg};
use crate::protocol::ClientMessage;

/// Poll interval of the reader thread.
const READ_POLL: Duration = Duration::from_millis(50);

/// Upper bound for a client to finish the opening handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

impl WsActor {
    /// Add a new client connection, returning its id once the handshake
    /// succeeded.
    pub(super) fn add_client(&mut self, stream: TcpStream) -> Option<ClientId> {
        // Keep blocking mode during handshake, switch to non-blocking after
        let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));
        match tungstenite::accept(stream) {
            Ok(ws) => {
                let _ = ws.get_ref().set_read_timeout(None);
                let _ = ws.get_ref().set_nonblocking(true);

                let id = self.next_id;
                self.next_id += 1;

                let mut clients = self.clients.lock();
                clients.push(Subscriber { id, ws });
                crate::debug!("ws"; "client {} connected (total: {})", id, clients.len());
                Some(id)
            }
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                None
            }
        }
    }

    /// Background thread to read client messages (non-blocking poll)
    ///
    /// Parsed requests are forwarded after the client lock is released, so
    /// a full orchestrator queue never stalls broadcasts.
    pub(super) fn client_reader_loop(
        clients: Arc<Mutex<Vec<Subscriber>>>,
        orchestrator_tx: mpsc::Sender<OrchestratorMsg>,
    ) {
        loop {
            std::thread::sleep(READ_POLL);
            if crate::core::is_shutdown() {
                return;
            }

            let mut requests = Vec::new();
            {
                let mut clients_guard = clients.lock();
                clients_guard.retain_mut(|client| Self::drain_client(client, &mut requests));
            }

            for request in requests {
                if orchestrator_tx
                    .blocking_send(OrchestratorMsg::Client(request))
                    .is_err()
                {
                    return;
                }
            }
        }
    }

    /// Read every frame currently available. Returns `false` once the
    /// client is gone.
    fn drain_client(client: &mut Subscriber, requests: &mut Vec<ClientMessage>) -> bool {
        loop {
            match client.ws.read() {
                Ok(Message::Text(text)) => match ClientMessage::from_json(&text) {
                    Ok(request) => requests.push(request),
                    Err(e) => {
                        crate::log!("ws"; "ignoring malformed message from client {}: {}", client.id, e);
                    }
                },
                Ok(Message::Close(_)) => {
                    crate::debug!("ws"; "client {} closed", client.id);
                    return false;
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                    return true;
                }
                Err(e) => {
                    crate::debug!("ws"; "client {} dropped: {}", client.id, e);
                    return false;
                }
            }
        }
    }
}
