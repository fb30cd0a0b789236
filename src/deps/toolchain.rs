//! Compiler SDK installation.
//!
//! Three external steps run in order, each one only after the previous one
//! succeeded: fetch the SDK checkout, install the latest release, activate
//! it. Activation writes `emsdk_env.sh`, whose presence marks the toolchain
//! ready across restarts.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    debug, exec, log,
    utils::exec::{ExecError, FilterRule},
};

use super::InstallError;

/// SDK release installed and activated.
const SDK_VERSION: &str = "latest";

/// Progress chatter from `git` and `emsdk` hidden in verbose logs.
const PROGRESS_FILTER: FilterRule = FilterRule::new(&[
    "Cloning into",
    "Resolving SDK",
    "Setting the following tools",
    "Skipping",
    "Done.",
]);

/// Toolchain installer bound to a checkout location.
#[derive(Debug, Clone)]
pub struct Toolchain {
    git: PathBuf,
    repo: String,
    dir: PathBuf,
}

impl Toolchain {
    /// Resolve `git` from `PATH`.
    pub fn locate(repo: &str, dir: &Path) -> Result<Self, InstallError> {
        let git = which::which("git").map_err(|err| InstallError::ToolchainStep {
            step: "fetch",
            source: ExecError::Spawn {
                program: "git".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, err),
            },
        })?;
        Ok(Self::with_git(git, repo, dir))
    }

    pub fn with_git(git: PathBuf, repo: &str, dir: &Path) -> Self {
        Self {
            git,
            repo: repo.to_string(),
            dir: dir.to_path_buf(),
        }
    }

    /// Run fetch, install and activate; stop at the first failure.
    pub fn run(&self) -> Result<(), InstallError> {
        self.fetch()
            .map_err(|source| InstallError::ToolchainStep { step: "fetch", source })?;
        log!("deps"; "installing sdk {SDK_VERSION}");
        self.emsdk("install")
            .map_err(|source| InstallError::ToolchainStep { step: "install", source })?;
        log!("deps"; "activating sdk {SDK_VERSION}");
        self.emsdk("activate")
            .map_err(|source| InstallError::ToolchainStep { step: "activate", source })?;
        Ok(())
    }

    fn fetch(&self) -> Result<(), ExecError> {
        if self.dir.join(".git").is_dir() {
            debug!("deps"; "updating sdk checkout at {}", self.dir.display());
            exec!(filter=&PROGRESS_FILTER; &self.dir; &self.git; "pull", "--ff-only")?;
            return Ok(());
        }

        if let Some(parent) = self.dir.parent() {
            fs::create_dir_all(parent).map_err(|source| ExecError::Spawn {
                program: "git".to_string(),
                source,
            })?;
        }
        log!("deps"; "cloning {}", self.repo);
        crate::utils::exec::cmd(&self.git)
            .args(["clone", "--depth", "1"])
            .arg(&self.repo)
            .arg(&self.dir)
            .filter(&PROGRESS_FILTER)
            .run()?;
        Ok(())
    }

    fn emsdk(&self, action: &str) -> Result<(), ExecError> {
        exec!(filter=&PROGRESS_FILTER; &self.dir; self.script(); action, SDK_VERSION)?;
        Ok(())
    }

    fn script(&self) -> OsString {
        let name = if cfg!(windows) { "emsdk.bat" } else { "emsdk" };
        self.dir.join(name).into_os_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(path: &Path, body: &str) {
        fs::write(path, body).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// A `git` whose `clone` lays down a fake SDK that logs its steps.
    const FAKE_GIT: &str = r#"#!/bin/sh
echo "$1" >> "$FAKE_GIT_LOG"
if [ "$1" = "clone" ]; then
  for last; do :; done
  mkdir -p "$last"
  printf '#!/bin/sh\necho "$1" >> steps.log\n[ "$1" = activate ] && touch emsdk_env.sh\nexit 0\n' > "$last/emsdk"
  chmod +x "$last/emsdk"
  exit 0
fi
[ "$1" = "pull" ] && exit 0
exit 1
"#;

    #[test]
    fn test_clone_install_activate() {
        let root = tempfile::tempdir().unwrap();
        let git = root.path().join("git");
        let log = root.path().join("git.log");
        let script = FAKE_GIT.replace("$FAKE_GIT_LOG", &log.to_string_lossy());
        write_script(&git, &script);

        let dir = root.path().join("local/emsdk");
        Toolchain::with_git(git, "https://example.invalid/emsdk", &dir)
            .run()
            .unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap().trim(), "clone");
        assert_eq!(
            fs::read_to_string(dir.join("steps.log")).unwrap(),
            "install\nactivate\n"
        );
        assert!(dir.join("emsdk_env.sh").exists());
    }

    #[test]
    fn test_existing_checkout_is_pulled() {
        let root = tempfile::tempdir().unwrap();
        let git = root.path().join("git");
        let log = root.path().join("git.log");
        write_script(&git, &FAKE_GIT.replace("$FAKE_GIT_LOG", &log.to_string_lossy()));

        let dir = root.path().join("emsdk");
        fs::create_dir_all(dir.join(".git")).unwrap();
        write_script(&dir.join("emsdk"), "#!/bin/sh\nexit 0\n");

        Toolchain::with_git(git, "https://example.invalid/emsdk", &dir)
            .run()
            .unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap().trim(), "pull");
    }

    #[test]
    fn test_failed_fetch_aborts_remaining_steps() {
        let root = tempfile::tempdir().unwrap();
        let git = root.path().join("git");
        write_script(&git, "#!/bin/sh\necho 'fatal: repository not found' >&2\nexit 128\n");

        let dir = root.path().join("emsdk");
        let err = Toolchain::with_git(git, "https://example.invalid/emsdk", &dir)
            .run()
            .unwrap_err();

        match &err {
            InstallError::ToolchainStep { step, .. } => assert_eq!(*step, "fetch"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.detail().contains("repository not found"));
        assert!(!dir.join("emsdk_env.sh").exists());
    }

    #[test]
    fn test_failed_install_skips_activate() {
        let root = tempfile::tempdir().unwrap();
        let git = root.path().join("git");
        write_script(&git, "#!/bin/sh\nexit 0\n");

        let dir = root.path().join("emsdk");
        fs::create_dir_all(dir.join(".git")).unwrap();
        write_script(
            &dir.join("emsdk"),
            "#!/bin/sh\necho \"$1\" >> steps.log\n[ \"$1\" = install ] && exit 2\nexit 0\n",
        );

        let err = Toolchain::with_git(git, "https://example.invalid/emsdk", &dir)
            .run()
            .unwrap_err();
        assert!(matches!(err, InstallError::ToolchainStep { step: "install", .. }));
        assert_eq!(fs::read_to_string(dir.join("steps.log")).unwrap(), "install\n");
    }
}
