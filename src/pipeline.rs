//! Orchestrates one request end to end on an owned socket (spec §4.6).
//!
//! Grounded on the original `request.c`'s `request_handle`: read request
//! line, discard headers, classify and stat the URI, then dispatch to
//! static or dynamic serving. Every recoverable failure here is converted
//! to an HTTP error response and logged — nothing propagates out of
//! [`handle_connection`] (spec §4.8).

use std::io::BufReader;
use std::os::unix::fs::PermissionsExt;

use crate::cgi;
use crate::http::request::{consume_headers, is_dynamic, read_request_line, resolve_path, split_query, ParseError};
use crate::http::response::{forbidden, not_found, not_implemented, HttpResponse};
use crate::prelude::*;
use crate::static_file;

/// Runs the full request/response cycle on `stream`. The caller (the
/// worker) owns the socket and is responsible for closing it afterward
/// (spec §4.5) — this function never closes it itself.
pub fn handle_connection(stream: &mut TcpStream, peer: SocketAddr) {
    let mut reader = match stream.try_clone() {
        Ok(clone) => BufReader::new(clone),
        Err(e) => {
            tracing::warn!(%peer, error = %e, "failed to clone socket for buffered reads");
            return;
        }
    };

    let request_line = match read_request_line(&mut reader) {
        Ok(line) => line,
        Err(ParseError::Eof) => {
            tracing::debug!(%peer, "connection closed before a request arrived");
            return;
        }
        Err(ParseError::Malformed) => {
            send(stream, &peer, not_implemented("request"));
            return;
        }
        Err(ParseError::UnsupportedMethod(method)) => {
            send(stream, &peer, not_implemented(&method));
            return;
        }
        Err(ParseError::Io(e)) => {
            tracing::warn!(%peer, error = %e, "I/O error reading request line");
            return;
        }
    };

    tracing::info!(%peer, method = %request_line.method, uri = %request_line.uri, "request");

    if consume_headers(&mut reader).is_err() {
        tracing::warn!(%peer, "connection closed while reading headers");
        return;
    }

    let dynamic = is_dynamic(&request_line.uri);
    let (uri_path, cgiargs) = if dynamic {
        split_query(&request_line.uri)
    } else {
        (request_line.uri.as_str(), "")
    };
    let path = resolve_path(uri_path);

    let metadata = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(_) => {
            send(stream, &peer, not_found(&path));
            return;
        }
    };

    if dynamic {
        let executable = metadata.is_file() && metadata.permissions().mode() & 0o100 != 0;
        if !executable {
            send(stream, &peer, forbidden(&path, "server could not run this CGI program"));
            return;
        }

        // The server writes only the status line and `Server:` header; the
        // CGI child completes the header and the blank-line terminator
        // (spec §4.6 step 6, §6).
        let preamble = HttpResponse::new(200, "OK").status_line_and_server();
        if stream.write_all(&preamble).is_err() {
            tracing::warn!(%peer, "failed to write CGI header preamble");
            return;
        }

        if let Err(e) = cgi::run(stream, &path, cgiargs) {
            tracing::warn!(%peer, %path, error = %e, "CGI request failed");
        }
        return;
    }

    let readable = metadata.is_file() && metadata.permissions().mode() & 0o400 != 0;
    if !readable {
        send(stream, &peer, forbidden(&path, "server could not read this file"));
        return;
    }

    if let Err(e) = static_file::serve(stream, &path) {
        tracing::warn!(%peer, %path, error = %e, "static file request failed");
    }
}

fn send(stream: &mut TcpStream, peer: &SocketAddr, response: HttpResponse) {
    if let Err(e) = stream.write_all(&response.to_bytes()) {
        tracing::warn!(%peer, error = %e, "failed to write error response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    fn pipe() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (server, client)
    }

    fn in_dir<R>(dir: &std::path::Path, f: impl FnOnce() -> R) -> R {
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let result = f();
        std::env::set_current_dir(prev).unwrap();
        result
    }

    #[test]
    fn serves_static_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi\n").unwrap();

        let (mut server, mut client) = pipe();
        let peer = server.peer_addr().unwrap();
        client
            .write_all(b"GET /hello.txt HTTP/1.0\r\n\r\n")
            .unwrap();

        in_dir(dir.path(), || handle_connection(&mut server, peer));
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Length: 3\r\n"));
        assert!(text.ends_with("hi\n"));
    }

    #[test]
    fn missing_file_yields_404() {
        let dir = tempfile::tempdir().unwrap();

        let (mut server, mut client) = pipe();
        let peer = server.peer_addr().unwrap();
        client.write_all(b"GET /nope HTTP/1.0\r\n\r\n").unwrap();

        in_dir(dir.path(), || handle_connection(&mut server, peer));
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 404 Not found\r\n"));
        assert!(text.contains("404: Not found"));
    }

    #[test]
    fn non_get_yields_501() {
        let dir = tempfile::tempdir().unwrap();

        let (mut server, mut client) = pipe();
        let peer = server.peer_addr().unwrap();
        client.write_all(b"POST / HTTP/1.0\r\n\r\n").unwrap();

        in_dir(dir.path(), || handle_connection(&mut server, peer));
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 501 Not Implemented\r\n"));
        // the offending method, not a generic placeholder, must appear in the body
        assert!(text.contains("server does not implement this method: POST"));
    }

    #[test]
    fn directory_request_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            b"0123456789012345678901234567890123456789ab",
        )
        .unwrap();

        let (mut server, mut client) = pipe();
        let peer = server.peer_addr().unwrap();
        client.write_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();

        in_dir(dir.path(), || handle_connection(&mut server, peer));
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Length: 42\r\n"));
    }
}
