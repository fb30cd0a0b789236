//! Prebuilt CLI release matrix.
//!
//! Release assets are named `tree-sitter-<os>-<arch>.gz`, where both parts
//! use the release's own vocabulary rather than Rust's target names.

use std::env::consts;

/// Host operating system and architecture, in Rust's naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    pub const fn new(os: &'static str, arch: &'static str) -> Self {
        Self { os, arch }
    }

    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        Self::new(consts::OS, consts::ARCH)
    }
}

/// `(rust os, release os, [(rust arch, release arch)])`
const MATRIX: &[(&str, &str, &[(&str, &str)])] = &[
    ("macos", "macos", &[("aarch64", "arm64"), ("x86_64", "x64")]),
    (
        "linux",
        "linux",
        &[
            ("aarch64", "arm64"),
            ("arm", "arm"),
            ("x86_64", "x64"),
            ("x86", "x86"),
            ("powerpc64", "powerpc64"),
        ],
    ),
    (
        "windows",
        "windows",
        &[("aarch64", "arm64"), ("x86_64", "x64"), ("x86", "x86")],
    ),
];

/// Release asset name for `platform`, or `None` when unsupported.
pub fn cli_asset(platform: Platform) -> Option<String> {
    MATRIX
        .iter()
        .find(|(os, ..)| *os == platform.os)
        .and_then(|(_, release_os, arches)| {
            arches
                .iter()
                .find(|(arch, _)| *arch == platform.arch)
                .map(|(_, release_arch)| format!("tree-sitter-{release_os}-{release_arch}.gz"))
        })
}
