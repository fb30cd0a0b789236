use std::io::ErrorKind;

use tungstenite::protocol::Message;

use super::{Subscriber, WsActor};
use crate::actor::messages::ClientId;

impl WsActor {
    /// Broadcast a message to all connected clients
    pub(super) fn broadcast(&self, msg: Message) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        clients.retain_mut(|client| deliver(client, msg.clone()));
        crate::debug!("ws"; "broadcast to {} clients", count);
    }

    /// Send a message to a single client
    pub(super) fn send_to(&self, target: ClientId, msg: Message) {
        let mut clients = self.clients.lock();
        clients.retain_mut(|client| client.id != target || deliver(client, msg.clone()));
    }
}

/// Write one frame. Returns `false` if the client should be dropped.
fn deliver(client: &mut Subscriber, msg: Message) -> bool {
    match client.ws.send(msg) {
        Ok(()) => true,
        // Frame is queued; the next write or read flushes it
        Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
        Err(e) => {
            crate::debug!("ws"; "client {} disconnected: {}", client.id, e);
            false
        }
    }
}
