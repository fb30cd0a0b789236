//! `[paths]` section configuration.
//!
//! Two fixed per-user roots, both inspectable from outside the process:
//!
//! ```text
//! cache_dir/                 (~/.cache/treeground)
//! ├── tree-sitter.wasm       runtime module
//! └── <unique_name>.wasm     compiled grammars
//! local_dir/                 (~/.local)
//! ├── bin/tree-sitter        generator CLI
//! └── emsdk/                 compiler SDK checkout
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::expand_path;

/// Cache and install roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub cache_dir: PathBuf,
    pub local_dir: PathBuf,
}

impl PathsConfig {
    /// Rooted at a single directory (tests, sandboxes).
    pub fn rooted(root: &Path) -> Self {
        Self {
            cache_dir: root.join("cache"),
            local_dir: root.join("local"),
        }
    }

    /// Expand `~` in both roots.
    pub(crate) fn expand(&mut self) {
        self.cache_dir = expand_path(&self.cache_dir);
        self.local_dir = expand_path(&self.local_dir);
    }

    /// Directory holding compiled grammars and the runtime module.
    pub fn artifact_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn runtime_path(&self) -> PathBuf {
        self.cache_dir.join("tree-sitter.wasm")
    }

    pub fn cli_path(&self) -> PathBuf {
        let name = if cfg!(windows) {
            "tree-sitter.exe"
        } else {
            "tree-sitter"
        };
        self.local_dir.join("bin").join(name)
    }

    pub fn emsdk_dir(&self) -> PathBuf {
        self.local_dir.join("emsdk")
    }

    pub fn emsdk_env(&self) -> PathBuf {
        self.emsdk_dir().join("emsdk_env.sh")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("~/.cache/treeground"),
            local_dir: PathBuf::from("~/.local"),
        }
    }
}
