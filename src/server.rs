//! Top-level wiring: config + queue + worker pool + accept loop (spec §3,
//! §4, §5).
//!
//! Grounded on the teacher's `server.rs`, which owned the listener and
//! dispatched accepted connections to the event loop; this version owns the
//! same listener but hands connections to a [`BoundedQueue`] instead, since
//! admission and service are separate threads of control here (spec §4).

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::listener;
use crate::prelude::*;
use crate::queue::BoundedQueue;
use crate::worker;

/// Runs the server until a fatal error occurs. `chdir`s into the document
/// root once (spec §5), then spawns the worker pool before opening the
/// listening socket so that no accepted connection can wait on a pool that
/// does not exist yet (spec §4.5).
pub fn run(config: ServerConfig) -> Result<()> {
    std::env::set_current_dir(&config.basedir).map_err(|e| {
        ServerError::Startup(format!(
            "could not chdir into document root {}: {e}",
            config.basedir.display()
        ))
    })?;

    let queue = Arc::new(BoundedQueue::new(config.buffers as usize, config.sched));
    let _workers = worker::spawn(config.threads, Arc::clone(&queue));

    let tcp_listener = listener::bind(config.port)?;
    tracing::info!(
        port = config.port,
        threads = config.threads,
        buffers = config.buffers,
        sched = ?config.sched,
        basedir = %config.basedir.display(),
        "server listening"
    );

    listener::accept_loop(&tcp_listener, queue)
}
