//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! grammar_file = "grammar.js"   # File whose changes trigger a rebuild
//! debounce_ms = 500             # Quiet period before rebuilding
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rebuild trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Grammar source file name watched inside each grammar directory.
    pub grammar_file: String,

    /// Quiet period in milliseconds.
    pub debounce_ms: u64,
}

impl BuildConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            grammar_file: "grammar.js".to_string(),
            debounce_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.grammar_file, "grammar.js");
        assert_eq!(config.build.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_build_override() {
        let config = test_parse_config("[build]\ngrammar_file = \"grammar.ts\"\ndebounce_ms = 250");
        assert_eq!(config.build.grammar_file, "grammar.ts");
        assert_eq!(config.build.debounce_ms, 250);
    }
}
