//! One-shot build: generate and compile a single grammar directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::{
    config::Config,
    grammar::GrammarEntry,
    log,
    logger::{Step, status_error, status_success},
    pipeline::{BuildError, BuildPipeline},
    utils::path::normalize_path,
};

/// Run the pipeline once for `folder` (default: current directory).
pub fn build_once(config: &Config, folder: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let directory = normalize_path(&folder.map_or_else(|| cwd.clone(), |f| cwd.join(f)));

    if !directory.join(&config.build.grammar_file).is_file() {
        bail!(
            "{} has no {}",
            directory.display(),
            config.build.grammar_file
        );
    }

    let entry = GrammarEntry::new(directory);
    let pipeline = BuildPipeline::new(&config.paths);
    log!(
        "build";
        "{} -> {}",
        entry.directory.display(),
        entry.artifact_path(pipeline.artifact_dir()).display()
    );

    match pipeline.build(&entry) {
        Ok(artifact) => {
            status_success(Step::Build, &format!("built {}", artifact.display()));
            Ok(artifact)
        }
        Err(err) => {
            status_error(Step::Build, summary(&err), &err.diagnostic());
            Err(err).with_context(|| format!("build failed for {}", entry.directory.display()))
        }
    }
}

fn summary(err: &BuildError) -> &'static str {
    match err {
        BuildError::Generate { .. } => "failed to generate parser",
        BuildError::Compile { .. } => "failed to build wasm",
        BuildError::Io { .. } => "failed to prepare build",
    }
}
