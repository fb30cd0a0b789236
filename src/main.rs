//! Treeground - a grammar playground server that rebuilds tree-sitter
//! grammars to wasm as you edit them.

mod actor;
mod cli;
mod config;
mod core;
mod deps;
mod grammar;
mod logger;
mod pipeline;
mod protocol;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{Config, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(Config::load(&cli)?);

    match &cli.command {
        Commands::Serve { folders, .. } => cli::serve::serve(folders),
        Commands::Build { folder } => cli::build::build_once(&config, folder.as_deref()).map(|_| ()),
        Commands::Status => {
            cli::status::print_status(&config);
            Ok(())
        }
    }
}
