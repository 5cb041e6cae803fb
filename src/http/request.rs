//! Request-line and header parsing (spec §4.6 steps 1-2).
//!
//! Grounded on the teacher's `http/request.rs`: kept the `Method` enum and a
//! `ParseError` enum in the same shape, trimmed to what this spec actually
//! serves (`GET` only; everything else is a client-protocol error, never a
//! variant to dispatch on).

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Other,
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Method::Get)
        } else {
            Ok(Method::Other)
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Other => write!(f, "<other>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line had no whitespace-separated tokens at all (spec §4.6
    /// step 1: maps to 501, cause is the generic "request").
    Malformed,
    /// A method token was parsed but it was not `GET`, or the line had a
    /// method but no URI/version (spec §4.6 step 1: maps to 501, cause is
    /// the actual offending token, matching the original's
    /// `request_error(fd, method, "501", ...)`).
    UnsupportedMethod(String),
    Eof,
    Io(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Malformed => write!(f, "malformed request line"),
            ParseError::UnsupportedMethod(m) => write!(f, "unsupported method: {m}"),
            ParseError::Eof => write!(f, "connection closed before a request line arrived"),
            ParseError::Io(e) => write!(f, "I/O error reading request: {e}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RequestLine {
    pub method: Method,
    pub uri: String,
    pub version: String,
}

/// Reads one LF-terminated line. `BufRead::read_line` already has the
/// semantics the spec's §9 Open Question asks for — it returns `Ok(0)` iff
/// zero bytes were read before EOF, never the original C `readline`'s
/// off-by-one on a single leftover byte.
fn read_line(reader: &mut impl BufRead) -> Result<String, ParseError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(ParseError::Eof);
    }
    Ok(line)
}

/// Reads and parses the request line (spec §4.6 step 1).
pub fn read_request_line(reader: &mut impl BufRead) -> Result<RequestLine, ParseError> {
    let line = read_line(reader)?;
    parse_request_line(&line)
}

fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let mut parts = line.trim_end_matches(['\r', '\n']).split_whitespace();

    let Some(method_tok) = parts.next() else {
        return Err(ParseError::Malformed);
    };

    let method = Method::from_str(method_tok).unwrap();
    let (Some(uri), Some(version)) = (parts.next(), parts.next()) else {
        return Err(ParseError::UnsupportedMethod(method_tok.to_string()));
    };

    if method != Method::Get {
        return Err(ParseError::UnsupportedMethod(method_tok.to_string()));
    }

    Ok(RequestLine {
        method,
        uri: uri.to_string(),
        version: version.to_string(),
    })
}

/// Reads and discards header lines until the blank `CRLF` terminator (spec
/// §4.6 step 2). Headers are not parsed or retained — this server's pipeline
/// has no use for them (non-goal: no header-driven behavior beyond CGI's
/// `QUERY_STRING`, spec §1).
pub fn consume_headers(reader: &mut impl BufRead) -> Result<(), ParseError> {
    loop {
        let line = read_line(reader)?;
        if line == "\r\n" || line == "\n" {
            return Ok(());
        }
    }
}

/// Splits a dynamic-content URI on its first `?` into (path, cgiargs), per
/// spec §4.6 step 3 and §4.7.
pub fn split_query(uri: &str) -> (&str, &str) {
    match uri.split_once('?') {
        Some((path, args)) => (path, args),
        None => (uri, ""),
    }
}

/// Resolves a URI to a document-root-relative filesystem path: `"." + uri`,
/// with `index.html` appended when the URI names a directory (spec §4.6
/// step 3, §4.2 step 3). The process has already `chdir`ed into the document
/// root at startup (spec §5), so the returned path is relative to the
/// current working directory.
pub fn resolve_path(uri: &str) -> String {
    let mut path = format!(".{uri}");
    if uri.ends_with('/') {
        path.push_str("index.html");
    }
    path
}

/// `true` if the URI should be treated as dynamic content (spec §4.6 step 3).
/// Preserves the original's loose substring rule verbatim (see Open
/// Questions, spec §9): a static file whose URI happens to contain `cgi`
/// (e.g. `/logic.html`) is misclassified as dynamic. Not tightened to a
/// `/cgi-bin/` prefix rule by design.
pub fn is_dynamic(uri: &str) -> bool {
    uri.contains("cgi")
}
