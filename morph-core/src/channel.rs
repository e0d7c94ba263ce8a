//! Bounded single-producer / single-consumer channel.
//!
//! A fixed-capacity FIFO ring guarded by a mutex, with one condition
//! variable per side. The generator worker parks in
//! [`BoundedChannel::send_blocking`] whenever the render loop has not yet
//! drained a previous item — that backpressure bounds memory to
//! `O(capacity × set size)`. The render loop only ever calls the
//! non-blocking [`BoundedChannel::try_recv`], so frame production is never
//! stalled by the worker.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::{MorphError, MorphResult};

/// Interior queue state. `buf` never grows past `capacity`.
struct Ring<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

/// A fixed-capacity blocking queue for handing point sets between two
/// execution contexts.
///
/// With capacity 1 the channel acts as a single-slot mailbox: the consumer
/// simply overwrites its working set with whatever it receives, and the
/// producer stalls until that happens. Exactly one producer and one
/// consumer are expected per instance; FIFO order is guaranteed for that
/// pair.
pub struct BoundedChannel<T> {
    ring: Mutex<Ring<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> BoundedChannel<T> {
    /// Creates a channel with the given fixed capacity.
    ///
    /// ### Parameters
    /// - `capacity` - Number of slots; must be at least 1.
    ///
    /// ### Returns
    /// The channel, or [`MorphError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> MorphResult<Self> {
        if capacity == 0 {
            return Err(MorphError::ZeroCapacity);
        }
        Ok(Self {
            ring: Mutex::new(Ring {
                buf: VecDeque::with_capacity(capacity),
                capacity,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    /// Number of slots this channel was created with.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.lock().buf.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.lock().buf.is_empty()
    }

    /// Enqueues `item`, blocking the calling thread while the channel is
    /// full. Items are never dropped, and sends from a single producer are
    /// received in FIFO order.
    pub fn send_blocking(&self, item: T) {
        let mut ring = self.lock();
        while ring.buf.len() == ring.capacity {
            ring = self.wait(&self.not_full, ring);
        }
        ring.buf.push_back(item);
        self.not_empty.notify_one();
    }

    /// Dequeues the next item, blocking the calling thread while the
    /// channel is empty.
    pub fn recv_blocking(&self) -> T {
        let mut ring = self.lock();
        loop {
            if let Some(item) = ring.buf.pop_front() {
                self.not_full.notify_one();
                return item;
            }
            ring = self.wait(&self.not_empty, ring);
        }
    }

    /// Dequeues the next item if one is immediately available.
    ///
    /// Never blocks; an empty channel is the normal "no update" signal,
    /// not an error.
    pub fn try_recv(&self) -> Option<T> {
        let mut ring = self.lock();
        let item = ring.buf.pop_front()?;
        self.not_full.notify_one();
        Some(item)
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        // A poisoned lock means the peer thread panicked mid-operation;
        // the queue state itself is still a valid VecDeque.
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(&self, cv: &Condvar, guard: MutexGuard<'a, Ring<T>>) -> MutexGuard<'a, Ring<T>> {
        cv.wait(guard).unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            BoundedChannel::<u32>::new(0).err(),
            Some(MorphError::ZeroCapacity)
        );
    }

    #[test]
    fn try_recv_on_empty_returns_none_immediately() {
        let ch = BoundedChannel::<u32>::new(1).unwrap();

        let start = Instant::now();
        assert_eq!(ch.try_recv(), None);
        // Must not block; generous bound to stay robust on loaded machines.
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn send_then_recv_preserves_fifo_order() {
        let ch = BoundedChannel::new(3).unwrap();
        ch.send_blocking(1);
        ch.send_blocking(2);
        ch.send_blocking(3);

        assert_eq!(ch.len(), 3);
        assert_eq!(ch.recv_blocking(), 1);
        assert_eq!(ch.try_recv(), Some(2));
        assert_eq!(ch.recv_blocking(), 3);
        assert!(ch.is_empty());
    }

    #[test]
    fn send_blocks_when_full_until_a_receive_frees_a_slot() {
        let ch = Arc::new(BoundedChannel::new(1).unwrap());
        let sent_extra = Arc::new(AtomicBool::new(false));
        let barrier = Arc::new(Barrier::new(2));

        // Fill the single slot up front.
        ch.send_blocking(0);

        let producer = {
            let ch = Arc::clone(&ch);
            let sent_extra = Arc::clone(&sent_extra);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Capacity is exhausted, so this must park until the
                // consumer below receives.
                ch.send_blocking(1);
                sent_extra.store(true, Ordering::SeqCst);
            })
        };

        barrier.wait();
        // No timeout exists on blocking sends (accepted liveness risk of
        // the design): if the consumer never polled, the producer would
        // park forever. Give the producer time to reach the send and
        // check that it has not completed.
        thread::sleep(Duration::from_millis(50));
        assert!(
            !sent_extra.load(Ordering::SeqCst),
            "send_blocking returned while the channel was still full"
        );

        assert_eq!(ch.recv_blocking(), 0);
        producer.join().unwrap();
        assert!(sent_extra.load(Ordering::SeqCst));
        assert_eq!(ch.recv_blocking(), 1);
    }

    #[test]
    fn recv_blocking_wakes_when_an_item_arrives() {
        let ch = Arc::new(BoundedChannel::new(1).unwrap());

        let consumer = {
            let ch = Arc::clone(&ch);
            thread::spawn(move || ch.recv_blocking())
        };

        thread::sleep(Duration::from_millis(20));
        ch.send_blocking(7u32);
        assert_eq!(consumer.join().unwrap(), 7);
    }

    #[test]
    fn capacity_one_acts_as_mailbox() {
        let ch = BoundedChannel::new(1).unwrap();
        assert_eq!(ch.capacity(), 1);

        ch.send_blocking("a");
        assert_eq!(ch.try_recv(), Some("a"));
        // Draining every item is not required for correctness; the
        // consumer just overwrites its working set with what it gets.
        ch.send_blocking("b");
        assert_eq!(ch.try_recv(), Some("b"));
        assert_eq!(ch.try_recv(), None);
    }
}
