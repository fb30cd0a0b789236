//! Request URL to artifact path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::grammar::ARTIFACT_EXT;

/// Resolve a request URL to a file directly under `artifact_dir`.
///
/// Only single-segment `<name>.wasm` requests resolve; anything else
/// (nested paths, traversal, other extensions) yields `None`.
pub fn resolve_artifact(url: &str, artifact_dir: &Path) -> Option<PathBuf> {
    let name = artifact_name(url)?;
    let path = artifact_dir.join(name);
    path.is_file().then_some(path)
}

/// Decode the requested file name, rejecting anything but one segment.
fn artifact_name(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let raw = path.strip_prefix('/')?;
    let name = percent_decode_str(raw).decode_utf8().ok()?.into_owned();

    let stem = name.strip_suffix(&format!(".{ARTIFACT_EXT}"))?;
    if stem.is_empty()
        || stem.starts_with('.')
        || name.contains(['/', '\\', '\0'])
    {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_artifact_name() {
        assert_eq!(
            artifact_name("/json.0123456789ab.wasm").as_deref(),
            Some("json.0123456789ab.wasm")
        );
        assert_eq!(
            artifact_name("/tree-sitter.wasm?v=3").as_deref(),
            Some("tree-sitter.wasm")
        );
        assert_eq!(
            artifact_name("/my%20lang.wasm").as_deref(),
            Some("my lang.wasm")
        );
    }

    #[test]
    fn test_rejects_non_artifacts() {
        assert_eq!(artifact_name("/"), None);
        assert_eq!(artifact_name("/.wasm"), None);
        assert_eq!(artifact_name("/index.html"), None);
        assert_eq!(artifact_name("/a/b.wasm"), None);
        assert_eq!(artifact_name("/..%2Fsecret.wasm"), None);
        assert_eq!(artifact_name("/a%5Cb.wasm"), None);
        assert_eq!(artifact_name("relative.wasm"), None);
    }

    #[test]
    fn test_resolve_artifact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("json.abc.wasm"), b"\0asm").unwrap();

        assert_eq!(
            resolve_artifact("/json.abc.wasm", dir.path()),
            Some(dir.path().join("json.abc.wasm"))
        );
        assert_eq!(resolve_artifact("/missing.wasm", dir.path()), None);
    }
}
