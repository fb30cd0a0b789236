use std::path::PathBuf;

use super::OrchestratorActor;
use super::tasks::{spawn_build, spawn_install};
use crate::actor::messages::{ClientId, FsMsg, WsMsg};
use crate::deps::{DepKind, DepStatus, InstallDecision, InstallError, InstallRequest};
use crate::grammar::GrammarEntry;
use crate::logger::{Step, status_error, status_success};
use crate::pipeline::BuildError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::utils::path::normalize_path;

/// `Err(())` means a downstream actor is gone.
type Flow = Result<(), ()>;

impl OrchestratorActor {
    // =========================================================================
    // client requests
    // =========================================================================

    pub(super) async fn on_client(&mut self, request: ClientMessage) -> Flow {
        crate::debug!("orchestrator"; "request: {:?}", request);

        if let Some(kind) = request.check_kind() {
            return self
                .broadcast(ServerMessage::status(kind, self.deps.check_status(kind)))
                .await;
        }
        if let Some(install) = request.install_request() {
            return self.on_install_request(install).await;
        }

        match request {
            ClientMessage::Add { folder } => self.on_add(folder).await,
            ClientMessage::Watch { folders } => {
                for folder in folders {
                    self.register(normalize_path(&folder)).await?;
                }
                Ok(())
            }
            ClientMessage::Remove { folder } => self.on_remove(folder).await,
            _ => Ok(()),
        }
    }

    pub(super) async fn on_add(&mut self, folder: PathBuf) -> Flow {
        let dir = normalize_path(&folder);
        if !dir.is_dir() {
            crate::log!("warning"; "ignoring add for missing directory {}", folder.display());
            return Ok(());
        }
        self.register(dir.clone()).await?;
        self.request_build(dir);
        Ok(())
    }

    /// Register and start watching. Idempotent.
    async fn register(&mut self, dir: PathBuf) -> Flow {
        if !self.registry.add(&dir) {
            return Ok(());
        }
        crate::log!("watch"; "{} ({} registered)", dir.display(), self.registry.len());
        self.fs_tx.send(FsMsg::Watch(dir)).await.map_err(|_| ())
    }

    async fn on_remove(&mut self, folder: PathBuf) -> Flow {
        let dir = normalize_path(&folder);
        // A deleted directory no longer canonicalizes; fall back to the raw path
        let dir = if self.registry.contains(&dir) { dir } else { folder };
        if !self.registry.remove(&dir) {
            return Ok(());
        }
        self.dirty.remove(&dir);
        crate::log!("watch"; "removed {} ({} registered)", dir.display(), self.registry.len());
        self.fs_tx.send(FsMsg::Unwatch(dir)).await.map_err(|_| ())
    }

    // =========================================================================
    // dependencies
    // =========================================================================

    async fn on_install_request(&mut self, request: InstallRequest) -> Flow {
        let kind = request.kind();
        match self.deps.request_install(request) {
            InstallDecision::Ignored => {
                crate::debug!("deps"; "{} already downloading", kind.label());
                Ok(())
            }
            InstallDecision::AlreadyReady => {
                self.broadcast(ServerMessage::status(kind, DepStatus::Ready))
                    .await
            }
            InstallDecision::Rejected(err) => {
                status_error(Step::Install, &format!("cannot install {}", kind.label()), &err.to_string());
                self.broadcast(ServerMessage::status(kind, DepStatus::Error))
                    .await
            }
            InstallDecision::Start(job) => {
                match &job.version {
                    Some(version) => crate::log!("deps"; "installing {} {}", kind.label(), version),
                    None => crate::log!("deps"; "installing {}", kind.label()),
                }
                spawn_install(job, self.fetcher.clone(), self.self_tx.clone());
                self.broadcast(ServerMessage::status(kind, DepStatus::Downloading))
                    .await
            }
        }
    }

    pub(super) async fn on_install_done(
        &mut self,
        kind: DepKind,
        version: Option<String>,
        result: Result<(), InstallError>,
    ) -> Flow {
        let status = self.deps.complete(kind, version, &result);
        match &result {
            Ok(()) => status_success(Step::Install, &format!("installed {}", kind.label())),
            Err(err) => status_error(
                Step::Install,
                &format!("failed to install {}: {err}", kind.label()),
                &err.detail(),
            ),
        }
        self.broadcast(ServerMessage::status(kind, status)).await
    }

    /// Push the current dependency picture to a new subscriber only.
    pub(super) async fn on_subscriber(&mut self, client: ClientId) -> Flow {
        for kind in DepKind::ALL {
            let msg = ServerMessage::status(kind, self.deps.check_status(kind));
            self.ws_tx
                .send(WsMsg::SendTo { client, msg })
                .await
                .map_err(|_| ())?;
        }
        Ok(())
    }

    // =========================================================================
    // builds
    // =========================================================================

    pub(super) fn on_rebuild(&mut self, dir: PathBuf) {
        if self.registry.contains(&dir) {
            self.request_build(dir);
        } else {
            crate::debug!("orchestrator"; "skip rebuild of unregistered {}", dir.display());
        }
    }

    /// Start a build, or mark the directory dirty if one is running.
    fn request_build(&mut self, dir: PathBuf) {
        let Some(entry) = self.registry.get(&dir).cloned() else {
            return;
        };
        if self.building.contains(&dir) {
            crate::debug!("orchestrator"; "build running, queued follow-up for {}", dir.display());
            self.dirty.insert(dir);
            return;
        }
        self.building.insert(dir);
        spawn_build(entry, self.pipeline.clone(), self.self_tx.clone());
    }

    pub(super) async fn on_build_done(
        &mut self,
        entry: GrammarEntry,
        result: Result<PathBuf, BuildError>,
    ) -> Flow {
        self.building.remove(&entry.directory);

        let event = match &result {
            Ok(_) => {
                status_success(Step::Build, &format!("built {}", entry.unique_name));
                ServerMessage::load(&entry)
            }
            Err(err) => {
                status_error(
                    Step::Build,
                    &format!("{}: {}", entry.directory.display(), err),
                    &err.diagnostic(),
                );
                ServerMessage::build_error(&entry, err)
            }
        };
        self.broadcast(event).await?;

        if self.dirty.remove(&entry.directory) {
            self.request_build(entry.directory);
        }
        Ok(())
    }
}
