//! The accept loop (spec §4.1).
//!
//! Grounded on the original `wserver.c`'s `main` loop and `io_helper.c`'s
//! `open_listen_fd`: bind once with address reuse enabled, then accept
//! forever, admitting every connection into the bounded queue after peeking
//! its scheduling key. An accept failure is unrecoverable (spec §4.1, §4.8)
//! — the server has no way to keep serving without a listening socket.

use std::sync::Arc;

use socket2::{Domain, Socket, Type};

use crate::estimator;
use crate::prelude::*;
use crate::queue::{BoundedQueue, RequestDescriptor};

/// Kernel accept backlog (spec §4.1: "backlog ≥ 1024"). `std::net::TcpListener`
/// hard-codes its own backlog with no way to raise it, so the socket is built
/// with `socket2` (bind, then `listen(LISTEN_BACKLOG)`) and converted into a
/// plain `std::net::TcpListener` for the rest of the server to use, the way
/// `io_helper.c`'s `open_listen_fd` calls `listen(listen_fd, 1024)` directly.
const LISTEN_BACKLOG: i32 = 1024;

/// Binds `0.0.0.0:port` with `SO_REUSEADDR` set and a kernel backlog of
/// [`LISTEN_BACKLOG`], large enough that a burst of connections is not
/// rejected before a worker can drain the queue (spec §4.1).
pub fn bind(port: u16) -> Result<TcpListener> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let socket = Socket::new(Domain::IPV4, Type::STREAM, None).map_err(ServerError::Accept)?;
    socket.set_reuse_address(true).map_err(ServerError::Accept)?;
    socket.bind(&addr.into()).map_err(ServerError::Accept)?;
    socket.listen(LISTEN_BACKLOG).map_err(ServerError::Accept)?;

    Ok(socket.into())
}

/// Runs the accept loop forever: for each connection, peek its scheduling
/// key (without consuming bytes, spec §4.2) and enqueue it. Never returns
/// except on a fatal accept error, which the caller treats as a startup
/// failure (spec §4.8).
pub fn accept_loop(listener: &TcpListener, queue: Arc<BoundedQueue>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().map_err(ServerError::Accept)?;
        let size_estimate = estimator::estimate(&stream);
        tracing::debug!(%peer, size_estimate, "accepted connection");
        queue.enqueue(RequestDescriptor {
            stream,
            peer,
            size_estimate,
        });
    }
}
