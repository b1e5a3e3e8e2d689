//! Bounded event inbox between the input side and the render path.
//!
//! Backed by a bounded crossbeam channel, so `push` from any number of
//! producers is lock-free and never allocates, and the single consumer drains
//! with `try_recv` only. When the inbox is full the new event is dropped
//! (producer back-pressure) and counted.

use crate::event::Event;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-capacity, multi-producer single-consumer event queue.
pub struct EventInbox {
    tx: Sender<Event>,
    rx: Receiver<Event>,
    capacity: usize,
    dropped: AtomicU64,
}

impl EventInbox {
    /// Create an inbox holding at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            tx,
            rx,
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue an event. Returns `false` and counts a drop if the inbox is full.
    ///
    /// Called from the input side. Never blocks.
    pub fn push(&self, event: Event) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    note = event.note(),
                    channel = event.channel(),
                    total_dropped = total,
                    "event inbox full, dropping event"
                );
                false
            }
            // Both ends live in `self`, the channel cannot disconnect.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Move every event queued so far into `buffer`, oldest first.
    ///
    /// Only events present when the drain starts are taken; anything pushed
    /// concurrently stays for the next drain. Appends without allocating as
    /// long as `buffer` has spare capacity for `self.capacity()` events.
    pub fn drain_into(&self, buffer: &mut Vec<Event>) -> usize {
        let pending = self.rx.len();
        let mut count = 0;
        while count < pending {
            match self.rx.try_recv() {
                Ok(event) => {
                    buffer.push(event);
                    count += 1;
                }
                Err(_) => break,
            }
        }
        count
    }

    /// Drain into a freshly allocated vector. Not for the render thread.
    pub fn drain_all(&self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.rx.len());
        self.drain_into(&mut events);
        events
    }

    /// Discard everything pending.
    pub fn clear(&self) -> usize {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Total events dropped because the inbox was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
