//! The CGI subprocess bridge (spec §4.7).
//!
//! Grounded on the teacher's `cgi.rs`, which builds a `HashMap` of CGI
//! environment variables and separates "build the environment" from "run
//! the child". This spec names exactly one variable (`QUERY_STRING`, §6) and
//! one transport detail (duplicate the socket over the child's stdout), so
//! that split collapses to a single `std::process::Command` call — no
//! manual `fork`/`dup2`/`execve`: `Command::stdout(Stdio::from(...))` plus
//! inherited environment is the idiomatic equivalent the corpus's own
//! `prelude.rs` already imports (`process::{Command, Stdio}`).

use std::os::fd::{FromRawFd, IntoRawFd};
use std::sync::Mutex;

use crate::prelude::*;

/// Serializes the spawn step process-wide (spec §4.7, §5: "Process forking
/// is serialized by a dedicated lock to avoid file-descriptor races around
/// the inheritance window").
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Requires a regular file executable by the owning user (spec §4.6 step 6);
/// runs it with `QUERY_STRING` set to `cgiargs`, standard output wired to
/// `stream`, an empty argument vector, and the server's environment
/// inherited. Blocks until the child exits (spec §4.7: "wait for the child
/// to terminate before continuing").
pub fn run(stream: &TcpStream, path: &str, cgiargs: &str) -> Result<()> {
    // `into_raw_fd` (not `as_raw_fd`) hands ownership of the duplicated
    // descriptor to `Stdio` without closing it first — the clone exists
    // only to give the child its own fd for stdout, independent of the
    // parent's copy.
    let out_fd = stream.try_clone().map_err(ServerError::Io)?.into_raw_fd();

    // SAFETY: `out_fd` is a freshly duplicated, valid, open descriptor
    // whose ownership was just transferred out of the `TcpStream` above via
    // `into_raw_fd`; `Stdio` takes ownership from here and closes it
    // exactly once (on spawn failure, or when `Command::spawn` hands it to
    // the child and the parent's copy is closed after `fork`).
    let child_stdout = unsafe { Stdio::from_raw_fd(out_fd) };

    let _guard = SPAWN_LOCK.lock().unwrap();
    // `Command::new` alone gives argv = [path] with no further arguments,
    // matching the spec's empty argv for CGI children (§4.7, §6).
    let mut child = Command::new(path)
        .env("QUERY_STRING", cgiargs)
        .stdin(Stdio::null())
        .stdout(child_stdout)
        .spawn()
        .map_err(|e| ServerError::Cgi(format!("failed to spawn {path}: {e}")))?;
    drop(_guard);

    // Exit status is observable only through server logs (spec §4.8, §7):
    // the client receives whatever bytes the child wrote, nothing more.
    let status = child
        .wait()
        .map_err(|e| ServerError::Cgi(format!("failed to wait for {path}: {e}")))?;
    if !status.success() {
        tracing::warn!(%path, ?status, "CGI child exited non-zero");
    }

    Ok(())
}
