//! Wires the producer and consumer together on two threads.

use crate::barrier::StartupBarrier;
use crate::config::TailConfig;
use crate::consumer::Consumer;
use crate::error::{Error, Result};
use crate::producer::Producer;
use crate::ring_buffer::RingBuffer;
use crate::watcher::WatchInterrupter;
use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A running tail: one producer thread reading the file and one consumer
/// thread writing lines out.
pub struct TailHandle {
    producer: JoinHandle<Result<()>>,
    consumer: JoinHandle<Result<u64>>,
    interrupter: Option<WatchInterrupter>,
}

/// Starts tailing according to `config`, writing lines to `out`.
///
/// Setup errors (missing file, no watcher available) are returned here,
/// before any thread is started.
pub fn spawn<O>(config: TailConfig, out: O) -> Result<TailHandle>
where
    O: Write + Send + 'static,
{
    let buffer = Arc::new(RingBuffer::new(config.lines()));
    let barrier = Arc::new(StartupBarrier::new());

    let producer = Producer::new(
        config.path(),
        config.follow(),
        buffer.clone(),
        barrier.clone(),
    )?;
    let interrupter = producer.interrupter();
    let consumer = Consumer::new(buffer.clone(), barrier.clone(), config.follow(), out);

    debug!(
        path = %config.path().display(),
        lines = config.lines(),
        follow = config.follow(),
        "starting tail"
    );

    let producer = thread::Builder::new()
        .name("tail-producer".to_string())
        .spawn(move || producer.run())?;

    let consumer = match thread::Builder::new()
        .name("tail-consumer".to_string())
        .spawn(move || consumer.run())
    {
        Ok(handle) => handle,
        Err(e) => {
            stop_producer(producer, &barrier, &buffer, interrupter.as_ref());
            return Err(e.into());
        }
    };

    Ok(TailHandle {
        producer,
        consumer,
        interrupter,
    })
}

impl TailHandle {
    /// Handle for waking the producer's watcher, present in follow mode.
    pub fn interrupter(&self) -> Option<WatchInterrupter> {
        self.interrupter.clone()
    }

    /// Waits for both threads and returns the number of lines written.
    ///
    /// A producer error takes precedence over a consumer error. In follow
    /// mode this only returns once either side fails.
    pub fn join(self) -> Result<u64> {
        let consumed = join_role(self.consumer, "consumer");

        if let Err(e) = &consumed {
            warn!(error = %e, "consumer stopped, stopping producer");
            if let Some(interrupter) = &self.interrupter {
                interrupter.interrupt();
            }
        }

        join_role(self.producer, "producer")?;
        consumed
    }
}

/// Winds down a producer whose consumer never started.
///
/// Arrives at the barrier in the consumer's place, closes the buffer and
/// wakes the watcher so a following producer notices and exits.
fn stop_producer(
    producer: JoinHandle<Result<()>>,
    barrier: &StartupBarrier,
    buffer: &RingBuffer<String>,
    interrupter: Option<&WatchInterrupter>,
) {
    buffer.close();
    barrier.arrive();
    if let Some(interrupter) = interrupter {
        interrupter.interrupt();
    }

    if let Err(e) = join_role(producer, "producer") {
        debug!(error = %e, "producer stopped without a consumer");
    }
}

fn join_role<T>(handle: JoinHandle<Result<T>>, role: &'static str) -> Result<T> {
    handle
        .join()
        .map_err(|_| Error::ThreadPanicked { role })?
}
