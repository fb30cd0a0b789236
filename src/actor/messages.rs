//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! WsActor --Client/SubscriberJoined--> OrchestratorActor --Watch/Unwatch--> FsActor
//!    ^                                   |   ^                                 |
//!    +--------Broadcast/SendTo-----------+   +-------------Rebuild-------------+
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::deps::{DepKind, InstallError};
use crate::grammar::GrammarEntry;
use crate::pipeline::BuildError;
use crate::protocol::{ClientMessage, ServerMessage};

/// Identifier assigned to each WebSocket subscriber on connect.
pub type ClientId = u64;

// =============================================================================
// OrchestratorActor Messages
// =============================================================================

/// Messages to the Orchestrator Actor
#[derive(Debug)]
pub enum OrchestratorMsg {
    /// Request from a client
    Client(ClientMessage),
    /// A subscriber finished its handshake (reconcile its view)
    SubscriberJoined(ClientId),
    /// Debounce timer for a directory elapsed
    Rebuild(PathBuf),
    /// Install task finished
    InstallDone {
        kind: DepKind,
        version: Option<String>,
        result: Result<(), InstallError>,
    },
    /// Build task finished
    BuildDone {
        entry: GrammarEntry,
        result: Result<PathBuf, BuildError>,
    },
    /// Shutdown
    Shutdown,
}

// =============================================================================
// FsActor Messages
// =============================================================================

/// Messages to the FileSystem Actor
#[derive(Debug)]
pub enum FsMsg {
    /// Start observing a grammar directory
    Watch(PathBuf),
    /// Stop observing and cancel any pending timer
    Unwatch(PathBuf),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Send to every connected subscriber
    Broadcast(ServerMessage),
    /// Send to one subscriber only
    SendTo {
        client: ClientId,
        msg: ServerMessage,
    },
    /// Add a new client connection
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
