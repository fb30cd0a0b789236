//! HTTP response handlers.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

const WASM: &str = "application/wasm";
const PLAIN: &str = "text/plain; charset=utf-8";

/// Headers that keep clients from reusing a stale artifact.
const NO_CACHE: [(&str, &str); 2] = [
    ("Cache-Control", "no-cache, no-store, must-revalidate"),
    ("Pragma", "no-cache"),
];

/// Respond with a compiled artifact.
pub fn respond_artifact(request: Request, path: &Path) -> Result<()> {
    if is_head_request(&request) {
        let len = fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        let response = with_no_cache(Response::empty(StatusCode(200)))
            .with_header(make_header("Content-Type", WASM))
            .with_header(make_header("Content-Length", &len.to_string()));
        request.respond(response)?;
        return Ok(());
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, WASM, body)
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        let response = Response::empty(StatusCode(404)).with_header(make_header("Content-Type", PLAIN));
        request.respond(response)?;
        return Ok(());
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything but GET/HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = Response::from_data(b"405 Method Not Allowed".to_vec())
        .with_status_code(StatusCode(405))
        .with_header(make_header("Content-Type", PLAIN))
        .with_header(make_header("Allow", "GET, HEAD"));
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

pub fn is_read_request(request: &Request) -> bool {
    matches!(request.method(), Method::Get | Method::Head)
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(with_no_cache(response))?;
    Ok(())
}

fn with_no_cache<R: std::io::Read>(mut response: Response<R>) -> Response<R> {
    for (key, value) in NO_CACHE {
        response.add_header(make_header(key, value));
    }
    response
}

fn make_header(key: &str, value: &str) -> Header {
    // Keys and values here are ASCII constants or decimal numbers
    Header::from_bytes(key.as_bytes(), value.as_bytes()).expect("valid header")
}
