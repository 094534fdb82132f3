//! Fixed-capacity circular buffer shared between the producer and consumer.

use parking_lot::{Condvar, Mutex};

/// A thread-safe circular buffer that overwrites its oldest entry when full.
///
/// Pushing never blocks: once `capacity` entries are held, each push evicts
/// the oldest one. Consumers either block until an entry is available
/// ([`pop_blocking`](Self::pop_blocking)) or return immediately
/// ([`pop_nonblocking`](Self::pop_nonblocking)).
#[derive(Debug)]
pub struct RingBuffer<T> {
    capacity: usize,
    slots: Mutex<Slots<T>>,
    available: Condvar,
}

#[derive(Debug)]
struct Slots<T> {
    data: Vec<Option<T>>,
    write_idx: usize,
    read_idx: usize,
    used: usize,
    closed: bool,
}

impl<T> Slots<T> {
    fn take_oldest(&mut self) -> Option<T> {
        if self.used == 0 {
            return None;
        }

        let elem = self.data[self.read_idx].take();
        self.read_idx = (self.read_idx + 1) % self.data.len();
        self.used -= 1;
        elem
    }
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");

        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, || None);

        Self {
            capacity,
            slots: Mutex::new(Slots {
                data,
                write_idx: 0,
                read_idx: 0,
                used: 0,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Inserts an entry, evicting the oldest one if the buffer is full.
    pub fn push(&self, elem: T) {
        let mut slots = self.slots.lock();

        let write_idx = slots.write_idx;
        slots.data[write_idx] = Some(elem);
        slots.write_idx = (write_idx + 1) % self.capacity;

        if slots.used == self.capacity {
            slots.read_idx = slots.write_idx;
        } else {
            slots.used += 1;
        }

        drop(slots);
        self.available.notify_one();
    }

    /// Removes the oldest entry, waiting until one is pushed.
    ///
    /// Returns `None` only once the buffer has been [closed](Self::close) and
    /// every remaining entry has been taken.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut slots = self.slots.lock();

        while slots.used == 0 && !slots.closed {
            self.available.wait(&mut slots);
        }

        slots.take_oldest()
    }

    /// Removes the oldest entry, or returns `None` right away if empty.
    pub fn pop_nonblocking(&self) -> Option<T> {
        self.slots.lock().take_oldest()
    }

    /// Fixed capacity of the buffer.
    pub fn size(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held.
    pub fn used(&self) -> usize {
        self.slots.lock().used
    }

    /// Marks the buffer closed and wakes every blocked consumer.
    ///
    /// Entries already held can still be popped.
    pub fn close(&self) {
        self.slots.lock().closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.slots.lock().closed
    }

    /// Discards all held entries and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut slots = self.slots.lock();
        let dropped = slots.used;

        slots.data.iter_mut().for_each(|slot| *slot = None);
        slots.write_idx = 0;
        slots.read_idx = 0;
        slots.used = 0;

        dropped
    }
}
