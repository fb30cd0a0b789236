use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::ModifyKind;

use crate::utils::path::has_hidden_component;

/// Grammar directories a notify event asks to rebuild.
///
/// Only creations and content/name modifications of the grammar source file
/// count. Metadata-only changes are dropped, as are paths with a hidden
/// component below their root (`.git/`, editor swap files). When roots nest,
/// the innermost one owns the file.
pub(super) fn rebuild_targets<'a>(
    event: &notify::Event,
    roots: impl Iterator<Item = &'a Path> + Clone,
    grammar_file: &str,
) -> Vec<PathBuf> {
    let qualifies = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    if !qualifies {
        return Vec::new();
    }

    let mut targets: Vec<PathBuf> = Vec::new();
    for path in &event.paths {
        if path.file_name().is_none_or(|name| name != grammar_file) {
            continue;
        }

        let owner = roots
            .clone()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count());

        if let Some(root) = owner
            && !has_hidden_component(path, root)
            && !targets.iter().any(|t| t == root)
        {
            targets.push(root.to_path_buf());
        }
    }
    targets
}
