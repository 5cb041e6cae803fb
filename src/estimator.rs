//! Pre-service size estimation for SFF scheduling (spec §4.2).
//!
//! Grounded on the original `io_helper.c`'s `estimate_request_size` /
//! `request_get_filesize`: peek up to 8 KiB without consuming, sniff a `GET`
//! request line out of it, and either read the spin-CGI cost out of the
//! query string or stat the static file it names.

use std::net::TcpStream;
use std::path::Path;

use crate::http::request::resolve_path;

const PEEK_CAP: usize = 8192;

/// Returns the non-negative scheduling key for a socket that has not yet
/// been read from. Never consumes bytes — callers still see the full
/// request afterward (spec §4.2, invariant 4 in §8). Static-file stats are
/// resolved against the process's current working directory, which is the
/// document root after startup's `chdir` (spec §5).
pub fn estimate(stream: &TcpStream) -> i64 {
    let mut buf = [0u8; PEEK_CAP];
    let n = match stream.peek(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return 0,
    };

    estimate_from_bytes(&buf[..n], Path::new("."))
}

fn estimate_from_bytes(peeked: &[u8], base: &Path) -> i64 {
    let text = String::from_utf8_lossy(peeked);

    let Some(uri) = parse_get_uri(&text) else {
        return peeked.len() as i64;
    };

    if let Some(rest) = uri.find("spin.cgi?").map(|i| &uri[i + "spin.cgi?".len()..]) {
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<i64>() {
            return n * 1000;
        }
    }

    // `resolve_path` returns a "." + uri path; strip that leading "." and
    // join onto `base` so tests can point at a scratch directory instead of
    // depending on process-wide cwd.
    let relative = resolve_path(uri);
    let path = base.join(relative.trim_start_matches('.').trim_start_matches('/'));
    std::fs::metadata(&path).map(|m| m.len() as i64).unwrap_or(0)
}

/// Looks for a `GET <uri> ` request line at the start of the peeked bytes,
/// without requiring the full line (and its terminator) to have arrived yet
/// (spec §4.2 step 1).
fn parse_get_uri(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("GET ")?;
    let uri_end = rest.find(' ')?;
    Some(&rest[..uri_end])
}
