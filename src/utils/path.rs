//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `expand_path` - `~` expansion for config values
//! - `has_hidden_component` - dotfile detection relative to a root

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Whether any component of `path` below `root` starts with a dot.
///
/// Components of `root` itself are not considered, so a grammar living in
/// `~/.config/grammars/x` is still watched.
pub fn has_hidden_component(path: &Path, root: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_path(Path::new("~/.cache/treeground"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with(".cache/treeground"));
    }

    #[test]
    fn test_hidden_component() {
        let root = Path::new("/g");
        assert!(has_hidden_component(Path::new("/g/.git/grammar.js"), root));
        assert!(has_hidden_component(Path::new("/g/.grammar.js.swp"), root));
        assert!(!has_hidden_component(Path::new("/g/grammar.js"), root));
        assert!(!has_hidden_component(
            Path::new("/home/u/.config/g/grammar.js"),
            Path::new("/home/u/.config/g")
        ));
    }
}
