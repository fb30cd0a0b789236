//! Install failure taxonomy.

use std::path::PathBuf;
use thiserror::Error;

use crate::utils::exec::ExecError;

/// Why a dependency install did not reach `ready`.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The host has no prebuilt CLI in the release matrix.
    #[error("no prebuilt tree-sitter CLI for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("failed to download `{url}`: {message}")]
    Network { url: String, message: String },

    #[error("I/O error at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One of the toolchain's external steps failed; later steps never ran.
    #[error("toolchain step `{step}` failed")]
    ToolchainStep {
        step: &'static str,
        #[source]
        source: ExecError,
    },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Full text for logs, including the step's raw diagnostics.
    pub fn detail(&self) -> String {
        match self {
            Self::ToolchainStep { source, .. } => source.diagnostics(),
            Self::Io { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}
