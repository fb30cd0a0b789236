//! Actor System for the Grammar Orchestrator
//!
//! Message-passing concurrency for serve mode:
//!
//! ```text
//! FsActor --> OrchestratorActor --> WsActor
//! (watch)    (state + scheduling)  (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with per-directory debouncing
//! - `orchestrator` - Registry, dependency state and build scheduling
//! - `ws` - WebSocket subscribers
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod orchestrator;
pub mod ws;

pub use coordinator::Coordinator;
