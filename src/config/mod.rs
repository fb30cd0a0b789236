//! Service configuration management for `treeground.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── deps       # [deps]
//! │   ├── paths      # [paths]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError
//! │   └── handle     # Global config handle
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The config file is optional: without one every section takes its
//! defaults, which match the fixed per-user layout.

pub mod section;
pub mod types;

pub use section::{BuildConfig, DepsConfig, PathsConfig, ServeConfig};
pub use types::{ConfigError, cfg, init_config};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing treeground.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Listener settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Cache and install roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// Rebuild trigger settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Dependency sources
    #[serde(default)]
    pub deps: DepsConfig,
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = if cli.config.is_absolute() {
            cli.config.clone()
        } else {
            cwd.join(&cli.config)
        };

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };

        config.config_path = config_path;
        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse and collect unknown field paths.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Apply CLI overrides and expand paths.
    fn finalize(&mut self, cli: &Cli) {
        if let Commands::Serve {
            interface,
            port,
            ws_port,
            ..
        } = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
            if let Some(ws_port) = ws_port {
                self.serve.ws_port = *ws_port;
            }
        }
        self.paths.expand();
    }

    /// Reject values the orchestrator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grammar_file = &self.build.grammar_file;
        if grammar_file.is_empty()
            || grammar_file.contains(['/', '\\'])
            || grammar_file.starts_with('.')
        {
            return Err(ConfigError::validation(
                "build.grammar_file",
                format!("`{grammar_file}` must be a plain, non-hidden file name"),
            ));
        }

        if self.build.debounce_ms == 0 {
            return Err(ConfigError::validation(
                "build.debounce_ms",
                "must be greater than zero",
            ));
        }

        if self.serve.port != 0 && self.serve.port == self.serve.ws_port {
            return Err(ConfigError::validation(
                "serve.ws_port",
                "must differ from serve.port",
            ));
        }

        Ok(())
    }

    /// Config rooted in a sandbox directory (tests).
    #[cfg(test)]
    pub fn sandboxed(root: &Path) -> Self {
        Self {
            paths: PathsConfig::rooted(root),
            ..Self::default()
        }
    }
}

/// Parse a config snippet, asserting every field is known.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_valid() {
        let config = test_parse_config("");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) = Config::parse_with_ignored("[serve]\nprot = 1\n[extra]\na = 1").unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f == "serve.prot"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_str("[serve\nport = 1").is_err());
    }

    #[test]
    fn test_validate_grammar_file() {
        let mut config = test_parse_config("");
        config.build.grammar_file = "src/grammar.js".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation {
                field: "build.grammar_file",
                ..
            })
        ));

        config.build.grammar_file = ".grammar.js".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_debounce() {
        let config = test_parse_config("[build]\ndebounce_ms = 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_port_clash() {
        let config = test_parse_config("[serve]\nport = 9000\nws_port = 9000");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        use clap::Parser;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treeground.toml");
        fs::write(&path, "[serve]\nport = 9000\n[paths]\ncache_dir = \"/tmp/tg\"").unwrap();

        let cli = Cli::parse_from([
            "treeground",
            "-C",
            path.to_str().unwrap(),
            "serve",
            "--port",
            "9100",
        ]);
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.serve.port, 9100);
        assert_eq!(config.paths.cache_dir, PathBuf::from("/tmp/tg"));
        assert_eq!(config.config_path, path);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        use clap::Parser;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let cli = Cli::parse_from(["treeground", "-C", path.to_str().unwrap(), "status"]);
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.serve.port, 7533);
        assert_eq!(config.build.grammar_file, "grammar.js");
    }
}
