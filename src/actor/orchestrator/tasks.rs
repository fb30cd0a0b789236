use std::sync::Arc;

use tokio::sync::mpsc;

use crate::actor::messages::OrchestratorMsg;
use crate::deps::{Fetcher, InstallJob};
use crate::grammar::GrammarEntry;
use crate::pipeline::BuildPipeline;

/// Run an install on the blocking pool and report back.
pub(super) fn spawn_install(
    job: InstallJob,
    fetcher: Arc<dyn Fetcher>,
    tx: mpsc::Sender<OrchestratorMsg>,
) {
    tokio::spawn(async move {
        let kind = job.kind;
        let version = job.version.clone();
        let result = tokio::task::spawn_blocking(move || job.run(fetcher.as_ref()))
            .await
            .unwrap_or_else(|e| Err(panicked(e)));
        let _ = tx
            .send(OrchestratorMsg::InstallDone {
                kind,
                version,
                result,
            })
            .await;
    });
}

/// Run a build on the blocking pool and report back.
pub(super) fn spawn_build(
    entry: GrammarEntry,
    pipeline: Arc<BuildPipeline>,
    tx: mpsc::Sender<OrchestratorMsg>,
) {
    tokio::spawn(async move {
        let target = entry.clone();
        let result = tokio::task::spawn_blocking(move || pipeline.build(&target))
            .await
            .unwrap_or_else(|e| {
                Err(crate::pipeline::BuildError::Compile {
                    diagnostic: format!("build task failed: {e}"),
                })
            });
        let _ = tx.send(OrchestratorMsg::BuildDone { entry, result }).await;
    });
}

fn panicked(e: tokio::task::JoinError) -> crate::deps::InstallError {
    crate::deps::InstallError::Io {
        path: Default::default(),
        source: std::io::Error::other(format!("install task failed: {e}")),
    }
}
