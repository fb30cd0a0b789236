//! `status` command: print the dependency state recovered from disk.

use owo_colors::OwoColorize;

use crate::{
    config::Config,
    deps::{DepKind, DepStatus, DependencyManager, Platform},
};

/// Print one line per dependency plus the artifact directory.
pub fn print_status(config: &Config) {
    let platform = Platform::current();
    let manager = DependencyManager::recover(&config.paths, &config.deps, platform);

    println!("platform  {}-{}", platform.os, platform.arch);
    for kind in DepKind::ALL {
        let status = manager.check_status(kind);
        println!("{:<9} {}", kind.label(), paint(status));
    }
    println!("artifacts {}", config.paths.artifact_dir().display());
}

fn paint(status: DepStatus) -> String {
    match status {
        DepStatus::Ready => status.as_str().green().to_string(),
        DepStatus::Error => status.as_str().red().to_string(),
        DepStatus::Downloading => status.as_str().yellow().to_string(),
        DepStatus::Unset => status.as_str().dimmed().to_string(),
    }
}
