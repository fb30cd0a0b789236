//! Two-stage grammar build.
//!
//! ```text
//! grammar.js ──generate──▶ src/parser.c ──compile (emsdk)──▶ <unique_name>.wasm
//! ```
//!
//! Both stages run the tree-sitter CLI inside the grammar directory. The
//! compile stage first sources the SDK environment script so the CLI finds
//! `emcc`. Raw tool output is kept verbatim for clients.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    config::PathsConfig,
    debug,
    exec,
    grammar::GrammarEntry,
    utils::exec::{Cmd, ExecError},
};

/// Shell snippet: source the SDK environment, then exec the remaining args.
const COMPILE_SCRIPT: &str = r#"source "$1" >/dev/null 2>&1 || { echo "failed to source $1" >&2; exit 1; }; shift; exec "$@""#;

/// Failure of a single build, carrying the tool's raw output.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to generate parser")]
    Generate { diagnostic: String },

    #[error("failed to compile wasm")]
    Compile { diagnostic: String },

    #[error("I/O error at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Text forwarded to clients in error events.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Generate { diagnostic } | Self::Compile { diagnostic } => diagnostic.clone(),
            Self::Io { path, source } => format!("{}: {source}", path.display()),
        }
    }
}

/// Runs generate then compile for one grammar directory.
#[derive(Debug, Clone)]
pub struct BuildPipeline {
    cli: PathBuf,
    emsdk_env: PathBuf,
    artifact_dir: PathBuf,
}

impl BuildPipeline {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            cli: paths.cli_path(),
            emsdk_env: paths.emsdk_env(),
            artifact_dir: paths.artifact_dir().to_path_buf(),
        }
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Build `entry`, returning the artifact path. Blocking.
    ///
    /// A generate failure short-circuits: compile never runs.
    pub fn build(&self, entry: &GrammarEntry) -> Result<PathBuf, BuildError> {
        self.generate(&entry.directory)
            .map_err(|err| BuildError::Generate {
                diagnostic: err.diagnostics(),
            })?;

        fs::create_dir_all(&self.artifact_dir).map_err(|source| BuildError::Io {
            path: self.artifact_dir.clone(),
            source,
        })?;

        let output = entry.artifact_path(&self.artifact_dir);
        self.compile(&entry.directory, &output)
            .map_err(|err| BuildError::Compile {
                diagnostic: err.diagnostics(),
            })?;

        Ok(output)
    }

    fn generate(&self, dir: &Path) -> Result<(), ExecError> {
        debug!("build"; "generating parser in {}", dir.display());
        exec!(dir; &self.cli; "generate")?;
        Ok(())
    }

    fn compile(&self, dir: &Path, output: &Path) -> Result<(), ExecError> {
        debug!("build"; "compiling {}", output.display());
        Cmd::new("bash")
            .args(["-c", COMPILE_SCRIPT, "treeground"])
            .arg(&self.emsdk_env)
            .arg(&self.cli)
            .args(["build", "--wasm", "--output"])
            .arg(output)
            .cwd(dir)
            .run()?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Fake CLI: `generate` needs grammar.js, `build` writes the output.
    pub const FAKE_CLI: &str = r#"#!/bin/sh
case "$1" in
  generate)
    [ -f grammar.js ] || { echo "grammar.js not found" >&2; exit 1; }
    grep -q SYNTAX_ERROR grammar.js && { echo "Unexpected token at grammar.js:3" >&2; exit 1; }
    echo generate >> build.log
    ;;
  build)
    echo compile >> build.log
    printf 'wasm' > "$4"
    ;;
esac
"#;

    /// Lay out a sandbox with a fake CLI and an empty SDK env script.
    pub fn sandbox(root: &Path) -> PathsConfig {
        let paths = PathsConfig::rooted(root);
        let cli = paths.cli_path();
        fs::create_dir_all(cli.parent().unwrap()).unwrap();
        fs::write(&cli, FAKE_CLI).unwrap();
        fs::set_permissions(&cli, fs::Permissions::from_mode(0o755)).unwrap();

        fs::create_dir_all(paths.emsdk_dir()).unwrap();
        fs::write(paths.emsdk_env(), "export EMSDK_SOURCED=1\n").unwrap();
        paths
    }

    fn grammar(root: &Path, name: &str, source: &str) -> GrammarEntry {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("grammar.js"), source).unwrap();
        GrammarEntry::new(dir)
    }

    #[test]
    fn test_build_produces_artifact() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = BuildPipeline::new(&sandbox(root.path()));
        let entry = grammar(root.path(), "tree-sitter-json", "module.exports = grammar({})");

        let artifact = pipeline.build(&entry).unwrap();

        assert_eq!(artifact, entry.artifact_path(pipeline.artifact_dir()));
        assert_eq!(fs::read(&artifact).unwrap(), b"wasm");
        let log = fs::read_to_string(entry.directory.join("build.log")).unwrap();
        assert_eq!(log, "generate\ncompile\n");
    }

    #[test]
    fn test_generate_failure_short_circuits() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = BuildPipeline::new(&sandbox(root.path()));
        let entry = grammar(root.path(), "broken", "SYNTAX_ERROR");

        let err = pipeline.build(&entry).unwrap_err();

        match &err {
            BuildError::Generate { diagnostic } => {
                assert!(diagnostic.contains("Unexpected token"));
            }
            other => panic!("expected generate error, got {other:?}"),
        }
        assert!(!entry.directory.join("build.log").exists());
        assert!(!entry.artifact_path(pipeline.artifact_dir()).exists());
    }

    #[test]
    fn test_missing_sdk_env_is_compile_error() {
        let root = tempfile::tempdir().unwrap();
        let paths = sandbox(root.path());
        fs::remove_file(paths.emsdk_env()).unwrap();
        let pipeline = BuildPipeline::new(&paths);
        let entry = grammar(root.path(), "json", "module.exports = grammar({})");

        let err = pipeline.build(&entry).unwrap_err();

        match &err {
            BuildError::Compile { diagnostic } => assert!(diagnostic.contains("failed to source")),
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_cli_is_generate_error() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = BuildPipeline::new(&PathsConfig::rooted(root.path()));
        let entry = grammar(root.path(), "json", "");

        let err = pipeline.build(&entry).unwrap_err();
        assert!(matches!(err, BuildError::Generate { .. }));
        assert!(err.diagnostic().contains("failed to execute"));
    }
}
