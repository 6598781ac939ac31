//! Bounded FIFO queue of outbound packets.
//!
//! One queue sits between the producers calling
//! [`send`](crate::engine::TransportEngine::send) and the single dispatch
//! worker that drains it. Capacity is fixed at construction; when full,
//! `push` with a zero timeout fails immediately — drop-newest backpressure,
//! never blocking the caller. Entries are plain values, copied in and out;
//! storage is a fixed-capacity [`heapless::Deque`], so no entry ever hits
//! the heap.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::packet::Packet;

/// Default queue capacity (packets).
pub const MAX_QUEUE_SIZE: usize = 16;

/// Bounded multi-producer / single-consumer packet FIFO.
pub struct PacketQueue<const N: usize = { MAX_QUEUE_SIZE }> {
    inner: Mutex<heapless::Deque<Packet, N>>,
    space_freed: Condvar,
    item_queued: Condvar,
}

fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<const N: usize> PacketQueue<N> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(heapless::Deque::new()),
            space_freed: Condvar::new(),
            item_queued: Condvar::new(),
        }
    }

    /// Append a copy of `packet`, waiting up to `timeout` for space.
    /// A zero timeout fails immediately when the queue is full.
    pub fn push(&self, packet: &Packet, timeout: Duration) -> bool {
        let mut queue = lock_recover(&self.inner);

        if queue.is_full() && !timeout.is_zero() {
            let deadline = Instant::now() + timeout;
            while queue.is_full() {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let (guard, _) = self
                    .space_freed
                    .wait_timeout(queue, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner);
                queue = guard;
            }
        }

        if queue.push_back(*packet).is_err() {
            return false;
        }
        self.item_queued.notify_one();
        true
    }

    /// Remove and return the head, waiting up to `timeout` for one to
    /// arrive. A zero timeout returns `None` immediately when empty.
    pub fn pop(&self, timeout: Duration) -> Option<Packet> {
        let mut queue = lock_recover(&self.inner);

        if queue.is_empty() && !timeout.is_zero() {
            let deadline = Instant::now() + timeout;
            while queue.is_empty() {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let (guard, _) = self
                    .item_queued
                    .wait_timeout(queue, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner);
                queue = guard;
            }
        }

        let packet = queue.pop_front()?;
        self.space_freed.notify_one();
        Some(packet)
    }

    /// Number of queued packets.
    pub fn len(&self) -> usize {
        lock_recover(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        lock_recover(&self.inner).is_empty()
    }

    /// Drain every entry; returns how many were discarded.
    pub fn clear(&self) -> usize {
        let mut queue = lock_recover(&self.inner);
        let mut discarded = 0;
        while queue.pop_front().is_some() {
            discarded += 1;
        }
        self.space_freed.notify_all();
        discarded
    }
}

impl<const N: usize> Default for PacketQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
