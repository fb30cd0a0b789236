//! `[deps]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [deps]
//! release_url = "https://github.com/tree-sitter/tree-sitter/releases/download"
//! emsdk_repo = "https://github.com/emscripten-core/emsdk"
//! ```

use serde::{Deserialize, Serialize};

/// Where dependencies are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepsConfig {
    /// Base URL of tree-sitter release assets; the version tag is appended.
    pub release_url: String,

    /// Git remote of the Emscripten SDK.
    pub emsdk_repo: String,
}

impl DepsConfig {
    /// URL of a release asset for a version tag (e.g. `v0.22.6`).
    pub fn release_asset(&self, version: &str, asset: &str) -> String {
        format!(
            "{}/{}/{}",
            self.release_url.trim_end_matches('/'),
            version,
            asset
        )
    }
}

impl Default for DepsConfig {
    fn default() -> Self {
        Self {
            release_url: "https://github.com/tree-sitter/tree-sitter/releases/download".to_string(),
            emsdk_repo: "https://github.com/emscripten-core/emsdk".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_release_asset() {
        let config = test_parse_config("[deps]\nrelease_url = \"https://mirror.local/ts/\"");
        assert_eq!(
            config.deps.release_asset("v0.22.6", "tree-sitter.wasm"),
            "https://mirror.local/ts/v0.22.6/tree-sitter.wasm"
        );
    }
}
