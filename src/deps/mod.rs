//! External dependency state machines.
//!
//! Three independent dependencies are tracked: the generator CLI, the
//! runtime module and the compiler SDK. Each moves through
//!
//! ```text
//! unset ──┐
//! error ──┼──▶ downloading ──▶ ready | error
//! ready ──┘  (differing version only)
//! ```
//!
//! [`DependencyManager`] only decides and records transitions. The work
//! itself is described by an [`InstallJob`] that the caller runs off the
//! orchestrator thread and reports back through [`DependencyManager::complete`].

mod error;
mod install;
mod matrix;
mod toolchain;

pub use error::InstallError;
pub use install::{Download, Fetcher, HttpFetcher};
pub use matrix::{Platform, cli_asset};
pub use toolchain::Toolchain;

#[cfg(test)]
pub(crate) use install::tests::{MockFetcher, gzip};

use serde::{Deserialize, Serialize};

use crate::config::{DepsConfig, PathsConfig};

/// Runtime module file name, both on disk and in the release.
pub const RUNTIME_ASSET: &str = "tree-sitter.wasm";

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKind {
    Cli,
    Runtime,
    Toolchain,
}

impl DepKind {
    pub const ALL: [Self; 3] = [Self::Cli, Self::Runtime, Self::Toolchain];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cli => "tree-sitter CLI",
            Self::Runtime => "tree-sitter runtime",
            Self::Toolchain => "emsdk",
        }
    }
}

/// Install status as shown to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepStatus {
    #[default]
    Unset,
    Downloading,
    Ready,
    Error,
}

impl DepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Downloading => "downloading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// One dependency's record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepState {
    pub status: DepStatus,
    /// Last successfully installed version. `None` when never installed by
    /// this process, including after restart recovery.
    pub version: Option<String>,
}

/// A client's install request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRequest {
    Cli { version: String },
    Runtime { version: String },
    Toolchain,
}

impl InstallRequest {
    pub fn kind(&self) -> DepKind {
        match self {
            Self::Cli { .. } => DepKind::Cli,
            Self::Runtime { .. } => DepKind::Runtime,
            Self::Toolchain => DepKind::Toolchain,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Cli { version } | Self::Runtime { version } => Some(version),
            Self::Toolchain => None,
        }
    }
}

/// Work to perform for an accepted install request.
#[derive(Debug, Clone)]
pub enum InstallWork {
    Download(Download),
    Toolchain { repo: String, dir: std::path::PathBuf },
}

/// An accepted install, to be run off the orchestrator thread.
#[derive(Debug, Clone)]
pub struct InstallJob {
    pub kind: DepKind,
    pub version: Option<String>,
    pub work: InstallWork,
}

impl InstallJob {
    /// Perform the install. Blocking.
    pub fn run(&self, fetcher: &dyn Fetcher) -> Result<(), InstallError> {
        match &self.work {
            InstallWork::Download(download) => download.run(fetcher),
            InstallWork::Toolchain { repo, dir } => Toolchain::locate(repo, dir)?.run(),
        }
    }
}

/// Outcome of [`DependencyManager::request_install`].
#[derive(Debug)]
pub enum InstallDecision {
    /// Already downloading: nothing happens, nothing is broadcast.
    Ignored,
    /// Already satisfied: re-broadcast the current status.
    AlreadyReady,
    /// Moved straight to `error` without any network operation.
    Rejected(InstallError),
    /// Moved to `downloading`; run the job and call `complete`.
    Start(InstallJob),
}

// ============================================================================
// Manager
// ============================================================================

/// Owner of the three dependency records.
#[derive(Debug)]
pub struct DependencyManager {
    cli: DepState,
    runtime: DepState,
    toolchain: DepState,
    paths: PathsConfig,
    deps: DepsConfig,
    platform: Platform,
}

impl DependencyManager {
    /// Build the manager, deriving every status from what exists on disk.
    pub fn recover(paths: &PathsConfig, deps: &DepsConfig, platform: Platform) -> Self {
        let recovered = |exists: bool| DepState {
            status: if exists {
                DepStatus::Ready
            } else {
                DepStatus::Unset
            },
            version: None,
        };

        Self {
            cli: recovered(paths.cli_path().is_file()),
            runtime: recovered(paths.runtime_path().is_file()),
            toolchain: recovered(paths.emsdk_env().is_file()),
            paths: paths.clone(),
            deps: deps.clone(),
            platform,
        }
    }

    /// Resolve CLI assets for `platform` instead of the host.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Current status of `kind`. Pure read.
    pub fn check_status(&self, kind: DepKind) -> DepStatus {
        self.state(kind).status
    }

    pub fn state(&self, kind: DepKind) -> &DepState {
        match kind {
            DepKind::Cli => &self.cli,
            DepKind::Runtime => &self.runtime,
            DepKind::Toolchain => &self.toolchain,
        }
    }

    fn state_mut(&mut self, kind: DepKind) -> &mut DepState {
        match kind {
            DepKind::Cli => &mut self.cli,
            DepKind::Runtime => &mut self.runtime,
            DepKind::Toolchain => &mut self.toolchain,
        }
    }

    /// Decide what an install request does, recording the transition.
    pub fn request_install(&mut self, request: InstallRequest) -> InstallDecision {
        let kind = request.kind();
        let state = self.state(kind);

        match state.status {
            DepStatus::Downloading => return InstallDecision::Ignored,
            DepStatus::Ready
                if kind == DepKind::Toolchain
                    || state.version.as_deref() == request.version() =>
            {
                return InstallDecision::AlreadyReady;
            }
            _ => {}
        }

        let work = match self.plan(&request) {
            Ok(work) => work,
            Err(err) => {
                self.state_mut(kind).status = DepStatus::Error;
                return InstallDecision::Rejected(err);
            }
        };

        self.state_mut(kind).status = DepStatus::Downloading;
        InstallDecision::Start(InstallJob {
            kind,
            version: request.version().map(str::to_string),
            work,
        })
    }

    /// Record the result of a job started by `request_install`.
    pub fn complete(
        &mut self,
        kind: DepKind,
        version: Option<String>,
        result: &Result<(), InstallError>,
    ) -> DepStatus {
        let state = self.state_mut(kind);
        match result {
            Ok(()) => {
                state.status = DepStatus::Ready;
                state.version = version;
            }
            Err(_) => state.status = DepStatus::Error,
        }
        state.status
    }

    fn plan(&self, request: &InstallRequest) -> Result<InstallWork, InstallError> {
        let work = match request {
            InstallRequest::Cli { version } => {
                let asset = cli_asset(self.platform).ok_or_else(|| {
                    InstallError::UnsupportedPlatform {
                        os: self.platform.os.to_string(),
                        arch: self.platform.arch.to_string(),
                    }
                })?;
                InstallWork::Download(Download {
                    url: self.deps.release_asset(version, &asset),
                    dest: self.paths.cli_path(),
                    gunzip: true,
                    executable: true,
                })
            }
            InstallRequest::Runtime { version } => InstallWork::Download(Download {
                url: self.deps.release_asset(version, RUNTIME_ASSET),
                dest: self.paths.runtime_path(),
                gunzip: false,
                executable: false,
            }),
            InstallRequest::Toolchain => InstallWork::Toolchain {
                repo: self.deps.emsdk_repo.clone(),
                dir: self.paths.emsdk_dir(),
            },
        };
        Ok(work)
    }
}
