//! The bounded request queue (spec §3, §4.3): a fixed-capacity shared slot
//! array behind one `Mutex` and two `Condvar`s.
//!
//! Grounded on the teacher's scratch `Executor` in the original `main.rs`
//! (a `Mutex<Vec<_>>` plus a single `Condvar`, signalled on push and waited
//! on when empty) — generalized here to a fixed-capacity ring with two wait
//! conditions, one per direction, per spec §4.3. The lock is held only long
//! enough to do slot bookkeeping; it is never held across I/O.

use std::net::TcpStream;
use std::sync::{Condvar, Mutex};

use crate::config::SchedPolicy;
use crate::dispatch::{select_fifo, select_sff};

/// The {socket, peer address, size estimate} tuple admitted by the listener
/// and serviced by a worker (spec §3).
pub struct RequestDescriptor {
    pub stream: TcpStream,
    pub peer: std::net::SocketAddr,
    pub size_estimate: i64,
}

struct Inner {
    slots: Vec<Option<RequestDescriptor>>,
    head: usize,
    tail: usize,
    count: usize,
}

/// A fixed-capacity queue of [`RequestDescriptor`]s. `enqueue` blocks while
/// full; `dequeue` blocks while empty. Dequeue order follows the configured
/// [`SchedPolicy`].
pub struct BoundedQueue {
    capacity: usize,
    policy: SchedPolicy,
    inner: Mutex<Inner>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl BoundedQueue {
    pub fn new(capacity: usize, policy: SchedPolicy) -> Self {
        assert!(capacity >= 1, "queue capacity must be at least 1");
        let slots = (0..capacity).map(|_| None).collect();
        BoundedQueue {
            capacity,
            policy,
            inner: Mutex::new(Inner {
                slots,
                head: 0,
                tail: 0,
                count: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Block until there is room, then admit `descriptor` at the tail.
    pub fn enqueue(&self, descriptor: RequestDescriptor) {
        let mut inner = self.inner.lock().unwrap();
        while inner.count == self.capacity {
            inner = self.not_full.wait(inner).unwrap();
        }

        let tail = inner.tail;
        inner.slots[tail] = Some(descriptor);
        inner.tail = (tail + 1) % self.capacity;
        inner.count += 1;

        self.not_empty.notify_one();
    }

    /// Block until a descriptor is resident, then remove and return the one
    /// selected by the active policy (spec §4.4).
    pub fn dequeue(&self) -> RequestDescriptor {
        let mut inner = self.inner.lock().unwrap();
        while inner.count == 0 {
            inner = self.not_empty.wait(inner).unwrap();
        }

        let head = inner.head;
        let idx = match self.policy {
            SchedPolicy::Fifo => select_fifo(&inner.slots, head),
            SchedPolicy::Sff => select_sff(&inner.slots, head, |d| d.size_estimate),
        }
        .expect("count > 0 implies a resident slot");

        let descriptor = inner.slots[idx].take().expect("selected slot must be occupied");
        if idx == head {
            while inner.head != inner.tail && inner.slots[inner.head].is_none() {
                inner.head = (inner.head + 1) % self.capacity;
            }
        }
        inner.count -= 1;

        self.not_full.notify_one();
        descriptor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current resident count. For diagnostics/tests only; not part of the
    /// producer/consumer protocol.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
