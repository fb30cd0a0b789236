//! Grammar directories and their derived artifact names.
//!
//! A grammar is identified by its source directory. Everything else (the
//! artifact file name, the HTTP path clients fetch) is derived from that
//! directory through [`unique_name`].

mod registry;

pub use registry::Registry;

use std::path::{Path, PathBuf};

use crate::utils::hash;

/// Length of the path fingerprint appended to the basename.
const FINGERPRINT_LEN: usize = 12;

/// Extension of compiled grammar artifacts.
pub const ARTIFACT_EXT: &str = "wasm";

/// A registered grammar source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarEntry {
    /// Absolute path of the grammar directory.
    pub directory: PathBuf,
    /// Stable artifact stem derived from `directory`.
    pub unique_name: String,
}

impl GrammarEntry {
    pub fn new(directory: PathBuf) -> Self {
        let unique_name = unique_name(&directory);
        Self {
            directory,
            unique_name,
        }
    }

    /// Where the compiled artifact for this grammar lives.
    pub fn artifact_path(&self, artifact_dir: &Path) -> PathBuf {
        artifact_dir.join(format!("{}.{ARTIFACT_EXT}", self.unique_name))
    }
}

/// Derive the artifact stem for a grammar directory.
///
/// `<basename>.<fingerprint>`: the basename keeps names readable, the
/// fingerprint of the full path keeps equal basenames apart. The result only
/// contains `[A-Za-z0-9_.-]`, so it is always a single URL path segment.
pub fn unique_name(directory: &Path) -> String {
    let base = directory
        .file_name()
        .map(|name| sanitize(&name.to_string_lossy()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "grammar".to_string());

    let fingerprint = hash::fingerprint(directory.to_string_lossy().as_bytes(), FINGERPRINT_LEN);
    format!("{base}.{fingerprint}")
}

fn sanitize(name: &str) -> String {
    name.trim_start_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_is_pure() {
        let dir = Path::new("/home/u/grammars/tree-sitter-json");
        assert_eq!(unique_name(dir), unique_name(dir));
    }

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name(Path::new("/home/u/grammars/tree-sitter-json"));
        let (base, fp) = name.rsplit_once('.').unwrap();
        assert_eq!(base, "tree-sitter-json");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_equal_basenames_do_not_collide() {
        let a = unique_name(Path::new("/work/a/tree-sitter-json"));
        let b = unique_name(Path::new("/work/b/tree-sitter-json"));
        assert_ne!(a, b);
        assert!(a.starts_with("tree-sitter-json."));
        assert!(b.starts_with("tree-sitter-json."));
    }

    #[test]
    fn test_sanitized_basename() {
        let name = unique_name(Path::new("/work/my grammar (v2)"));
        assert!(name.starts_with("my_grammar__v2_."));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_root_directory_falls_back() {
        assert!(unique_name(Path::new("/")).starts_with("grammar."));
        assert!(unique_name(Path::new("/work/...")).starts_with("grammar."));
    }

    #[test]
    fn test_artifact_path() {
        let entry = GrammarEntry::new(PathBuf::from("/work/tree-sitter-c"));
        let path = entry.artifact_path(Path::new("/cache"));
        assert_eq!(path, Path::new("/cache").join(format!("{}.wasm", entry.unique_name)));
    }
}
