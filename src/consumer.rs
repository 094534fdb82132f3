//! The consumer side: drains the ring buffer to an output sink.

use crate::barrier::StartupBarrier;
use crate::error::Result;
use crate::ring_buffer::RingBuffer;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Writes buffered lines to `out`, one per line, oldest first.
pub struct Consumer<O> {
    buffer: Arc<RingBuffer<String>>,
    barrier: Arc<StartupBarrier>,
    follow: bool,
    out: O,
}

impl<O: Write> Consumer<O> {
    pub fn new(
        buffer: Arc<RingBuffer<String>>,
        barrier: Arc<StartupBarrier>,
        follow: bool,
        out: O,
    ) -> Self {
        Self {
            buffer,
            barrier,
            follow,
            out,
        }
    }

    /// Waits for the producer's initial read, then emits lines.
    ///
    /// Without follow this writes a snapshot of the buffer and returns. With
    /// follow it keeps emitting until the producer closes the buffer.
    /// Returns the number of lines written. The buffer is closed on return
    /// so a following producer can stop.
    pub fn run(mut self) -> Result<u64> {
        self.barrier.arrive();

        let outcome = if self.follow {
            self.drain_following()
        } else {
            self.drain_snapshot()
        };

        self.buffer.close();
        if let Ok(emitted) = &outcome {
            debug!(emitted, "consumer finished");
        }
        outcome
    }

    fn drain_snapshot(&mut self) -> Result<u64> {
        let mut emitted = 0;
        while let Some(line) = self.buffer.pop_nonblocking() {
            writeln!(self.out, "{}", line)?;
            emitted += 1;
        }
        self.out.flush()?;
        Ok(emitted)
    }

    fn drain_following(&mut self) -> Result<u64> {
        let mut emitted = 0;
        while let Some(line) = self.buffer.pop_blocking() {
            writeln!(self.out, "{}", line)?;
            emitted += 1;

            // Batch writes while the producer is ahead.
            if self.buffer.used() == 0 {
                self.out.flush()?;
            }
        }
        self.out.flush()?;
        Ok(emitted)
    }
}
