//! Client/server protocol over WebSocket.
//!
//! - `message` - JSON message types for both directions
//! - `server` - listener that hands accepted sockets to the WsActor

pub mod message;
pub mod server;

pub use message::{ClientMessage, ServerMessage};
