//! Response header serialization and the fixed error-page template (spec
//! §4.6, §7).
//!
//! Grounded on the teacher's `http/response.rs` `HttpResponse` builder
//! (`set_header`/`set_body`/`to_bytes`), simplified to HTTP/1.0 and to the
//! one error-body template the original `request_error` in `request.c`
//! emits, reproduced verbatim (spec §10.6) so the scenarios in spec §8
//! match byte-for-byte.

use std::collections::BTreeMap;

const SERVER_NAME: &str = "OSTEP WebServer";

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        HttpResponse {
            status_code,
            status_text: status_text.to_string(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) -> &mut Self {
        self.set_header("Content-Length", &body.len().to_string());
        self.set_header("Content-Type", content_type);
        self.body = body;
        self
    }

    /// Serializes the status line, `Server:` header, and any headers set so
    /// far (not the body). Used verbatim for the partial CGI header the
    /// spec requires (§4.6 step 6): status line + `Server:` only, no
    /// `Content-Length`/`Content-Type`, no terminating blank line — the CGI
    /// child finishes the header and supplies the blank line itself.
    pub fn status_line_and_server(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.0 {} {}\r\n",
            self.status_code, self.status_text
        )
        .into_bytes();
        out.extend_from_slice(format!("Server: {SERVER_NAME}\r\n").as_bytes());
        out
    }

    /// Full header block (status line, `Server:`, any other headers,
    /// terminating blank line) with no body, for the static-file path
    /// (spec §4.6 step 5).
    pub fn headers_to_bytes(&self) -> Vec<u8> {
        let mut out = self.status_line_and_server();
        for (key, value) in &self.headers {
            out.extend_from_slice(format!("{key}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.headers_to_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Builds the fixed OSTEP error page and wraps it in a complete response
/// (status line, `Content-Type`, `Content-Length`, body), reproducing
/// `request_error` from the original `request.c` (spec §4.6, §7, §10.6):
///
/// ```html
/// <!doctype html>
/// <head><title>OSTEP WebServer Error</title></head>
/// <body><h2>{errnum}: {shortmsg}</h2><p>{longmsg}: {cause}</p></body>
/// </html>
/// ```
pub fn error_response(errnum: u16, shortmsg: &str, longmsg: &str, cause: &str) -> HttpResponse {
    let body = format!(
        "<!doctype html>\r\n\
         <head>\r\n\
         \x20 <title>OSTEP WebServer Error</title>\r\n\
         </head>\r\n\
         <body>\r\n\
         \x20 <h2>{errnum}: {shortmsg}</h2>\r\n\
         \x20 <p>{longmsg}: {cause}</p>\r\n\
         </body>\r\n\
         </html>\r\n"
    );

    let mut res = HttpResponse::new(errnum, shortmsg);
    res.set_body(body.into_bytes(), "text/html");
    res
}

pub fn not_implemented(method: &str) -> HttpResponse {
    error_response(
        501,
        "Not Implemented",
        "server does not implement this method",
        method,
    )
}

pub fn not_found(path: &str) -> HttpResponse {
    error_response(404, "Not found", "server could not find this file", path)
}

pub fn forbidden(path: &str, reason: &str) -> HttpResponse {
    error_response(403, "Forbidden", reason, path)
}

/// Substring-match MIME table, in the order spec §4.6 names (spec §4.6: a
/// deliberately narrower table than a real content-type sniffer — matches
/// the original `request_get_filetype` one-for-one).
pub fn mime_type(path: &str) -> &'static str {
    if path.contains(".html") {
        "text/html"
    } else if path.contains(".gif") {
        "image/gif"
    } else if path.contains(".jpg") {
        "image/jpeg"
    } else {
        "text/plain"
    }
}
