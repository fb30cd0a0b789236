//! Configuration section definitions.
//!
//! Each module corresponds to a section in `treeground.toml`:
//!
//! | Module   | TOML Section | Purpose                                   |
//! |----------|--------------|-------------------------------------------|
//! | `build`  | `[build]`    | Grammar source file name, debounce window |
//! | `deps`   | `[deps]`     | Release and toolchain source locations    |
//! | `paths`  | `[paths]`    | Cache and install roots                   |
//! | `serve`  | `[serve]`    | HTTP and WebSocket listeners              |

mod build;
mod deps;
mod paths;
mod serve;

pub use build::BuildConfig;
pub use deps::DepsConfig;
pub use paths::PathsConfig;
pub use serve::ServeConfig;
