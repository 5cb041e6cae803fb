//! The fixed worker-thread pool (spec §4.5).
//!
//! Grounded on the teacher's scratch `Executor` pattern of long-lived
//! threads pulling from a shared queue, now wired to the real
//! [`BoundedQueue`] and the request pipeline instead of a toy future type.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::pipeline;
use crate::queue::BoundedQueue;

/// Spawns `count` worker threads, each looping forever: dequeue one
/// [`RequestDescriptor`](crate::queue::RequestDescriptor), run it through the
/// pipeline, and close the socket — regardless of how the pipeline finished
/// (spec §4.5: "the socket is always closed after the connection is
/// serviced, success or error"). Workers never exit on their own; the
/// returned handles exist for `server::run` to hold (and, in tests, to
/// detach).
pub fn spawn(count: u32, queue: Arc<BoundedQueue>) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker_loop(&queue))
                .expect("failed to spawn worker thread")
        })
        .collect()
}

fn worker_loop(queue: &BoundedQueue) {
    loop {
        let mut descriptor = queue.dequeue();
        pipeline::handle_connection(&mut descriptor.stream, descriptor.peer);
        if let Err(e) = descriptor.stream.shutdown(std::net::Shutdown::Both) {
            tracing::debug!(peer = %descriptor.peer, error = %e, "socket already closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedPolicy;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};

    fn fake_descriptor(listener: &TcpListener) -> (TcpStream, crate::queue::RequestDescriptor) {
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (stream, _) = listener.accept().unwrap();
        let peer = stream.peer_addr().unwrap();
        (
            client,
            crate::queue::RequestDescriptor {
                stream,
                peer,
                size_estimate: 0,
            },
        )
    }

    #[test]
    fn worker_services_a_queued_connection_and_closes_it() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi\n").unwrap();
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let queue = Arc::new(BoundedQueue::new(2, SchedPolicy::Fifo));
        let _handles = spawn(1, Arc::clone(&queue));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let (mut client, descriptor) = fake_descriptor(&listener);
        queue.enqueue(descriptor);

        client
            .write_all(b"GET /hello.txt HTTP/1.0\r\n\r\n")
            .unwrap();

        let mut out = Vec::new();
        client.read_to_end(&mut out).unwrap();

        std::env::set_current_dir(prev).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.ends_with("hi\n"));
    }
}
