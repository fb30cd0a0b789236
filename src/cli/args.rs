//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Grammar playground server: rebuilds tree-sitter grammars to wasm as you edit them
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: treeground.toml, optional)
    #[arg(short = 'C', long, global = true, default_value = "treeground.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the orchestrator: WebSocket control channel plus artifact server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Artifact HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// WebSocket port
        #[arg(short, long)]
        ws_port: Option<u16>,

        /// Grammar directories to watch from startup
        #[arg(value_hint = clap::ValueHint::DirPath)]
        folders: Vec<PathBuf>,
    },

    /// Generate and compile one grammar directory, then exit
    #[command(visible_alias = "b")]
    Build {
        /// Grammar directory (default: current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        folder: Option<PathBuf>,
    },

    /// Print installed dependency status
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["treeground", "serve", "-p", "9000", "--ws-port", "9001", "/g/a", "/g/b"]);
        match cli.command {
            Commands::Serve {
                port,
                ws_port,
                folders,
                interface,
            } => {
                assert_eq!(port, Some(9000));
                assert_eq!(ws_port, Some(9001));
                assert_eq!(interface, None);
                assert_eq!(folders.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["treeground", "build", "/g/json", "-V", "-C", "other.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Build { folder: Some(_) }));
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["treeground", "status"]);
        assert_eq!(cli.config, PathBuf::from("treeground.toml"));
        assert!(!cli.verbose);
    }
}
