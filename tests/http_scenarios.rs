//! End-to-end scenarios against a real server wired from the public API:
//! a bound listener, a worker pool, and the accept loop, exactly as
//! `server::run` assembles them, but with an OS-assigned port so each test
//! can discover its own address (spec §8 scenarios S1-S3, S5-S6).
//!
//! SFF-vs-FIFO dequeue ordering is exercised deterministically at the queue
//! level in `queue.rs`'s own tests; reproducing it here would depend on
//! winning a connect-before-dequeue race against a live worker thread.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Arc, Mutex, MutexGuard};

use webserver_core::config::SchedPolicy;
use webserver_core::queue::BoundedQueue;
use webserver_core::{listener, worker};

/// Serializes access to the process-wide current directory: the pipeline
/// resolves static paths relative to it (spec §5 chdir-once-at-startup
/// contract), which is safe for a single running server but not for several
/// independent test servers sharing one test-binary process.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Chdirs into `dir`, then boots a listener + two workers + the accept loop
/// against it, returning the address clients should connect to. The accept
/// loop runs forever on a detached thread; tests don't shut it down,
/// matching how the real server never returns except on fatal error.
///
/// Returns the `CWD_LOCK` guard alongside the address: the caller must hold
/// it for as long as `dir` needs to remain the process's current directory,
/// i.e. until every request against the returned address has finished.
fn start_server(dir: &std::path::Path) -> (MutexGuard<'static, ()>, std::net::SocketAddr) {
    let guard = CWD_LOCK.lock().unwrap();
    std::env::set_current_dir(dir).unwrap();

    let tcp_listener = listener::bind(0).unwrap();
    let addr = tcp_listener.local_addr().unwrap();

    let queue = Arc::new(BoundedQueue::new(4, SchedPolicy::Fifo));
    let _workers = worker::spawn(2, Arc::clone(&queue));
    std::thread::spawn(move || {
        let _ = listener::accept_loop(&tcp_listener, queue);
    });

    (guard, addr)
}

fn get(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

#[test]
fn s1_static_file_is_served_with_correct_length() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.html"), b"<p>hi</p>").unwrap();
    let (_guard, addr) = start_server(dir.path());

    let response = get(addr, "GET /hello.html HTTP/1.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    assert!(response.contains("Content-Length: 9\r\n"));
    assert!(response.ends_with("<p>hi</p>"));
}

#[test]
fn s2_missing_file_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (_guard, addr) = start_server(dir.path());

    let response = get(addr, "GET /nope.html HTTP/1.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.0 404 Not found\r\n"));
    assert!(response.contains("404: Not found"));
}

#[test]
fn s3_non_get_method_is_501() {
    let dir = tempfile::tempdir().unwrap();
    let (_guard, addr) = start_server(dir.path());

    let response = get(addr, "HEAD / HTTP/1.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.0 501 Not Implemented\r\n"));
    assert!(response.contains("server does not implement this method: HEAD"));
}

#[test]
fn s5_directory_uri_serves_index_html() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), b"home page").unwrap();
    let (_guard, addr) = start_server(dir.path());

    let response = get(addr, "GET / HTTP/1.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(response.ends_with("home page"));
}

#[test]
fn s6_cgi_script_output_is_relayed_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("spin.cgi");
    std::fs::write(
        &script_path,
        "#!/bin/sh\nprintf 'Content-Type: text/html\\r\\n\\r\\n<p>query=%s</p>' \"$QUERY_STRING\"\n",
    )
    .unwrap();
    let mut perms = std::fs::metadata(&script_path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script_path, perms).unwrap();

    let (_guard, addr) = start_server(dir.path());
    let response = get(addr, "GET /spin.cgi?7 HTTP/1.0\r\n\r\n");

    assert!(response.starts_with("HTTP/1.0 200 OK\r\nServer: OSTEP WebServer\r\n"));
    assert!(response.ends_with("<p>query=7</p>"));
}

#[test]
fn forbidden_executable_bit_missing_on_cgi_uri_yields_403() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("report.cgi"), b"not executable").unwrap();
    let (_guard, addr) = start_server(dir.path());

    let response = get(addr, "GET /report.cgi?x HTTP/1.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.0 403 Forbidden\r\n"));
}
