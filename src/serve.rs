//! Development server.
//!
//! A lightweight blocking HTTP server on `tiny_http` with a single
//! catch-all handler: every request path (any method, treated as a read)
//! is resolved through the [`Resolver`] chain, and a miss falls back to
//! one `404.html` lookup through the same chain.
//!
//! The server reads the output directory with no lock against the build
//! pipeline: during a rebuild window a request may observe partial
//! output. That staleness is accepted for a local dev tool; the server
//! itself keeps answering throughout.

use crate::{log, resolve::Resolver};
use anyhow::{Context, Result};
use std::{
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to a port, retry with incremented port if in use.
const MAX_PORT_RETRIES: u16 = 10;

/// Start the development server and block until Ctrl+C.
///
/// Serves whatever is on disk: a failed rebuild leaves the previous (or
/// partial) output in place and the server keeps responding from it.
pub fn serve_site(resolver: Resolver, port: u16, base: &str) -> Result<()> {
    let interface = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let (server, addr) = try_bind_port(interface, port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Ctrl+C unblocks the accept loop for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");

    for request in server.incoming_requests() {
        if let Err(e) = respond(request, &resolver, base) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Answer one request through the resolver chain.
fn respond(request: Request, resolver: &Resolver, base: &str) -> Result<()> {
    let path = strip_request_path(request.url(), base).to_owned();

    if let Some(file) = resolver.resolve(&path) {
        return serve_file(request, &file, StatusCode(200));
    }

    // One extra lookup for the fallback page; a missing 404.html
    // degrades to an empty body, never a loop.
    match resolver.resolve("404.html") {
        Some(file) => serve_file(request, &file, StatusCode(404)),
        None => {
            request.respond(Response::empty(StatusCode(404)))?;
            Ok(())
        }
    }
}

/// Reduce a request URL to the path fed into the resolver: drop the
/// query string, surrounding slashes and the configured base prefix.
fn strip_request_path<'a>(url: &'a str, base: &str) -> &'a str {
    let path = url.split('?').next().unwrap_or(url).trim_matches('/');
    if base.is_empty() {
        return path;
    }
    path.strip_prefix(base)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(path)
}

/// Serve a file with a status code and inferred content type.
fn serve_file(request: Request, path: &Path, status: StatusCode) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content)
        .with_status_code(status)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}
