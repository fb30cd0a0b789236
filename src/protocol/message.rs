//! Orchestrator Message Protocol
//!
//! JSON text frames tagged by `type`, field names in camelCase.
//!
//! # Client → Server
//!
//! - `add` / `watch` / `remove`: manage grammar directories
//! - `cliCheck` / `cliDownload`: generator CLI status and install
//! - `runtimeCheck` / `runtimeDownload`: runtime module status and install
//! - `toolchainCheck` / `toolchainDownload`: compiler SDK status and install
//!
//! # Server → Client
//!
//! - `load`: a grammar artifact was (re)built
//! - `generateError` / `compileError`: a build stage failed
//! - `cliStatus` / `runtimeStatus` / `toolchainStatus`: dependency transitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deps::{DepKind, DepStatus, InstallRequest};
use crate::grammar::GrammarEntry;
use crate::pipeline::BuildError;

/// Request sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Register, watch and build a directory once.
    Add { folder: PathBuf },
    /// Register and watch directories without building.
    Watch { folders: Vec<PathBuf> },
    /// Stop watching a directory.
    Remove { folder: PathBuf },
    CliCheck,
    CliDownload { version: String },
    RuntimeCheck,
    RuntimeDownload { version: String },
    ToolchainCheck,
    ToolchainDownload,
}

impl ClientMessage {
    /// Parse from a text frame.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Dependency the message asks about, if any.
    pub fn check_kind(&self) -> Option<DepKind> {
        match self {
            Self::CliCheck => Some(DepKind::Cli),
            Self::RuntimeCheck => Some(DepKind::Runtime),
            Self::ToolchainCheck => Some(DepKind::Toolchain),
            _ => None,
        }
    }

    /// Install request carried by the message, if any.
    pub fn install_request(&self) -> Option<InstallRequest> {
        match self {
            Self::CliDownload { version } => Some(InstallRequest::Cli {
                version: version.clone(),
            }),
            Self::RuntimeDownload { version } => Some(InstallRequest::Runtime {
                version: version.clone(),
            }),
            Self::ToolchainDownload => Some(InstallRequest::Toolchain),
            _ => None,
        }
    }
}

/// Event pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Artifact `<grammar>.wasm` is ready to fetch.
    Load { grammar: String, folder: PathBuf },
    GenerateError {
        grammar: String,
        folder: PathBuf,
        error: String,
    },
    CompileError {
        grammar: String,
        folder: PathBuf,
        error: String,
    },
    CliStatus { status: DepStatus },
    RuntimeStatus { status: DepStatus },
    ToolchainStatus { status: DepStatus },
}

impl ServerMessage {
    pub fn load(entry: &GrammarEntry) -> Self {
        Self::Load {
            grammar: entry.unique_name.clone(),
            folder: entry.directory.clone(),
        }
    }

    /// Error event for the failed stage. Artifact directory failures
    /// happen while compiling and are reported as such.
    pub fn build_error(entry: &GrammarEntry, err: &BuildError) -> Self {
        let grammar = entry.unique_name.clone();
        let folder = entry.directory.clone();
        let error = err.diagnostic();
        match err {
            BuildError::Generate { .. } => Self::GenerateError {
                grammar,
                folder,
                error,
            },
            BuildError::Compile { .. } | BuildError::Io { .. } => Self::CompileError {
                grammar,
                folder,
                error,
            },
        }
    }

    pub fn status(kind: DepKind, status: DepStatus) -> Self {
        match kind {
            DepKind::Cli => Self::CliStatus { status },
            DepKind::Runtime => Self::RuntimeStatus { status },
            DepKind::Toolchain => Self::ToolchainStatus { status },
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        // Plain enums of strings and paths always serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
