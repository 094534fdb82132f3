//! One-shot rendezvous between the producer and consumer.

use parking_lot::{Condvar, Mutex};

const PARTIES: u8 = 2;

/// Releases both parties once each has arrived.
///
/// The barrier is not reusable: after the second arrival it stays released
/// and any further call to [`arrive`](Self::arrive) returns immediately.
#[derive(Debug, Default)]
pub struct StartupBarrier {
    arrivals: Mutex<u8>,
    released: Condvar,
}

impl StartupBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals arrival and blocks until the other party has arrived too.
    pub fn arrive(&self) {
        let mut arrivals = self.arrivals.lock();

        if *arrivals >= PARTIES {
            return;
        }

        *arrivals += 1;
        if *arrivals == PARTIES {
            self.released.notify_all();
            return;
        }

        while *arrivals < PARTIES {
            self.released.wait(&mut arrivals);
        }
    }

    /// Whether both parties have arrived.
    pub fn is_released(&self) -> bool {
        *self.arrivals.lock() >= PARTIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_first_arrival_blocks_until_second() {
        let barrier = Arc::new(StartupBarrier::new());
        let passed = Arc::new(AtomicBool::new(false));

        let first = {
            let barrier = Arc::clone(&barrier);
            let passed = Arc::clone(&passed);
            thread::spawn(move || {
                barrier.arrive();
                passed.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!passed.load(Ordering::SeqCst));
        assert!(!barrier.is_released());

        barrier.arrive();
        first.join().unwrap();

        assert!(passed.load(Ordering::SeqCst));
        assert!(barrier.is_released());
    }

    #[test]
    fn test_both_parties_from_threads() {
        let barrier = Arc::new(StartupBarrier::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.arrive())
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(barrier.is_released());
    }

    #[test]
    fn test_arrival_after_release_does_not_block() {
        let barrier = StartupBarrier::new();
        thread::scope(|scope| {
            scope.spawn(|| barrier.arrive());
            barrier.arrive();
        });

        barrier.arrive();
        assert!(barrier.is_released());
    }
}
