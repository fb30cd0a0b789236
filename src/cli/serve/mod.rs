//! Artifact server: static HTTP endpoint plus the orchestrator actors.

mod lifecycle;
mod path;
mod response;

use crate::{
    config::{Config, cfg},
    log,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Worker threads answering artifact requests.
const HTTP_WORKERS: usize = 4;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the actors, then the request loop (blocking).
    pub fn run(self, folders: Vec<PathBuf>) -> Result<()> {
        let config = cfg();
        let actor_handle = lifecycle::spawn_actors(Arc::clone(&config), folders, self.shutdown_rx);
        run_request_loop(&self.server, &config)?;
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

/// Serve `folders` until Ctrl+C.
pub fn serve(folders: &[PathBuf]) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let folders = folders.iter().map(|f| cwd.join(f)).collect();
    bind_server()?.run(folders)
}

fn run_request_loop(server: &Server, config: &Arc<Config>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(HTTP_WORKERS)
        .build()
        .context("Failed to create thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &Config) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !response::is_read_request(&request) {
        return response::respond_method_not_allowed(request);
    }

    match path::resolve_artifact(request.url(), config.paths.artifact_dir()) {
        Some(path) => response::respond_artifact(request, &path),
        None => response::respond_not_found(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};

    /// Send one raw request and return the full response text.
    fn roundtrip(server: &Server, config: &Config, addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();

        let request = server.recv().unwrap();
        handle_request(request, config).unwrap();

        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    fn fixture() -> (tempfile::TempDir, Config, Server, SocketAddr) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::sandboxed(dir.path());
        std::fs::create_dir_all(config.paths.artifact_dir()).unwrap();
        std::fs::write(config.paths.artifact_dir().join("json.abc.wasm"), b"\0asm").unwrap();

        let (server, addr) =
            lifecycle::bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        (dir, config, server, addr)
    }

    #[test]
    fn test_serves_artifact_uncached() {
        let (_dir, config, server, addr) = fixture();
        let resp = roundtrip(
            &server,
            &config,
            addr,
            "GET /json.abc.wasm HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
        );

        assert!(resp.starts_with("HTTP/1.1 200"));
        assert!(resp.contains("application/wasm"));
        assert!(resp.contains("no-cache, no-store, must-revalidate"));
        assert!(resp.ends_with("\0asm"));
    }

    #[test]
    fn test_head_has_no_body() {
        let (_dir, config, server, addr) = fixture();
        let resp = roundtrip(
            &server,
            &config,
            addr,
            "HEAD /json.abc.wasm HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
        );

        assert!(resp.starts_with("HTTP/1.1 200"));
        assert!(resp.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_unknown_name_is_404() {
        let (_dir, config, server, addr) = fixture();
        let resp = roundtrip(
            &server,
            &config,
            addr,
            "GET /../json.abc.wasm HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
        );
        assert!(resp.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_post_is_rejected() {
        let (_dir, config, server, addr) = fixture();
        let resp = roundtrip(
            &server,
            &config,
            addr,
            "POST /json.abc.wasm HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        assert!(resp.starts_with("HTTP/1.1 405"));
    }
}
