//! The shared bus: every memory transaction (read-miss, write-miss, upgrade)
//! serializes through here so that exactly one processor is ever mid-snoop at a
//! time (§4.1, §4.3).
//!
//! A transaction is represented as a [`BusTicket`], not a raw lock guard. A raw
//! `std::sync::MutexGuard` is `!Send`, and the coherence engine needs to hold the
//! bus across a sequence of steps that can span more than one call from the
//! processor's tick loop; a ticket wraps an `Arc<BusInner>` instead, which is
//! `Send`, and releases the bus itself on `Drop`.

use std::sync::{Arc, Condvar, Mutex};

/// The bus's internal state: who, if anyone, currently holds it.
struct BusInner {
    holder: Mutex<Option<usize>>,
    free: Condvar,
}

/// The shared bus arbiter. Cloned cheaply (it's an `Arc` internally) and shared
/// across every processor thread and the memory controller.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Creates a free bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                holder: Mutex::new(None),
                free: Condvar::new(),
            }),
        }
    }

    /// Blocks until the bus is free, then grants it to `processor`. Returns a
    /// ticket that releases the bus when dropped.
    pub fn acquire(&self, processor: usize) -> BusTicket {
        let mut holder = self.inner.holder.lock().expect("bus lock poisoned");
        while holder.is_some() {
            holder = self.inner.free.wait(holder).expect("bus lock poisoned");
        }
        *holder = Some(processor);
        drop(holder);
        BusTicket {
            inner: Arc::clone(&self.inner),
            processor,
        }
    }

    /// Grants the bus to `processor` if it is free right now, without blocking.
    /// Used by a processor's `MISS`/`WAITING_BUS` tick: a busy bus costs exactly
    /// one tick and is retried on the next, rather than parking the thread (§4.5).
    pub fn try_acquire(&self, processor: usize) -> Option<BusTicket> {
        let mut holder = self.inner.holder.lock().expect("bus lock poisoned");
        if holder.is_some() {
            return None;
        }
        *holder = Some(processor);
        drop(holder);
        Some(BusTicket {
            inner: Arc::clone(&self.inner),
            processor,
        })
    }

    /// `true` if no processor currently holds the bus. For diagnostics/tests only;
    /// racy by nature and never used to make a coherence decision.
    pub fn is_free(&self) -> bool {
        self.inner
            .holder
            .lock()
            .expect("bus lock poisoned")
            .is_none()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of exclusive bus ownership for one transaction. `Send`, so it can be
/// carried across a processor's tick boundary without holding a raw mutex guard.
pub struct BusTicket {
    inner: Arc<BusInner>,
    processor: usize,
}

impl BusTicket {
    /// The processor this ticket was granted to.
    pub fn processor(&self) -> usize {
        self.processor
    }
}

impl Drop for BusTicket {
    fn drop(&mut self) {
        let mut holder = self.inner.holder.lock().expect("bus lock poisoned");
        *holder = None;
        drop(holder);
        self.inner.free.notify_one();
    }
}
