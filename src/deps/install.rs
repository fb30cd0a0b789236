//! Download installers for the CLI and the runtime module.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

use flate2::read::GzDecoder;

use super::InstallError;

/// Source of remote bytes.
///
/// The real implementation talks HTTPS; tests substitute a recorder.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, InstallError>;
}

/// HTTPS fetcher following the release host's redirects.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
    const READ_TIMEOUT: Duration = Duration::from_secs(120);
    const MAX_REDIRECTS: u32 = 10;

    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Self::CONNECT_TIMEOUT)
            .timeout_read(Self::READ_TIMEOUT)
            .redirects(Self::MAX_REDIRECTS)
            .build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, InstallError> {
        let network = |message: String| InstallError::Network {
            url: url.to_string(),
            message,
        };

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| network(err.to_string()))?;

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|err| network(err.to_string()))?;
        Ok(body)
    }
}

/// One file to download and place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub url: String,
    pub dest: PathBuf,
    /// Payload is gzip-compressed.
    pub gunzip: bool,
    /// Mark the result executable (unix only).
    pub executable: bool,
}

impl Download {
    /// Fetch, decode and atomically place the file at `dest`.
    pub fn run(&self, fetcher: &dyn Fetcher) -> Result<(), InstallError> {
        let bytes = fetcher.fetch(&self.url)?;
        let bytes = if self.gunzip {
            gunzip(&bytes).map_err(|err| InstallError::io(&self.dest, err))?
        } else {
            bytes
        };
        write_atomic(&self.dest, &bytes, self.executable)
    }
}

fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// Write through a hidden sibling and rename into place.
///
/// A failed write never leaves a truncated file at `dest`.
fn write_atomic(dest: &Path, bytes: &[u8], executable: bool) -> Result<(), InstallError> {
    let parent = dest.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|err| InstallError::io(parent, err))?;

    let file_name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{file_name}.part"));

    let result = fs::write(&tmp, bytes)
        .and_then(|()| set_executable(&tmp, executable))
        .and_then(|()| fs::rename(&tmp, dest));

    result.map_err(|err| {
        let _ = fs::remove_file(&tmp);
        InstallError::io(dest, err)
    })
}

#[cfg(unix)]
fn set_executable(path: &Path, executable: bool) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if executable {
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path, _executable: bool) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use parking_lot::Mutex;
    use std::io::Write;

    /// Serves canned bytes and records every requested URL.
    #[derive(Default)]
    pub struct MockFetcher {
        pub body: Vec<u8>,
        pub fail: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn serving(body: &[u8]) -> Self {
            Self {
                body: body.to_vec(),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, InstallError> {
            self.calls.lock().push(url.to_string());
            if self.fail {
                return Err(InstallError::Network {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.body.clone())
        }
    }

    pub fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_download_gunzips_and_places() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("bin/tree-sitter");
        let fetcher = MockFetcher::serving(&gzip(b"#!/bin/sh\necho cli\n"));

        let download = Download {
            url: "https://example.invalid/v0.25.0/tree-sitter-linux-x64.gz".to_string(),
            dest: dest.clone(),
            gunzip: true,
            executable: true,
        };
        download.run(&fetcher).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"#!/bin/sh\necho cli\n");
        assert_eq!(fetcher.call_count(), 1);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_download_raw_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tree-sitter.wasm");
        fs::write(&dest, b"old").unwrap();

        let download = Download {
            url: "https://example.invalid/tree-sitter.wasm".to_string(),
            dest: dest.clone(),
            gunzip: false,
            executable: false,
        };
        download.run(&MockFetcher::serving(b"\0asm")).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"\0asm");
        assert!(!dir.path().join(".tree-sitter.wasm.part").exists());
    }

    #[test]
    fn test_corrupt_gzip_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tree-sitter");

        let download = Download {
            url: "https://example.invalid/x.gz".to_string(),
            dest: dest.clone(),
            gunzip: true,
            executable: true,
        };
        let err = download.run(&MockFetcher::serving(b"not gzip")).unwrap_err();

        assert!(matches!(err, InstallError::Io { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_network_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let download = Download {
            url: "https://example.invalid/x".to_string(),
            dest: dir.path().join("x"),
            gunzip: false,
            executable: false,
        };
        let err = download.run(&MockFetcher::failing()).unwrap_err();
        assert!(matches!(err, InstallError::Network { .. }));
    }
}
