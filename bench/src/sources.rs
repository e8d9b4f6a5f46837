//! Scripted producer fixtures for benchmarks.
//!
//! A [`Script`] describes one finite producer: how many events it sends,
//! what capacity its stream has, and the seed its payloads are generated
//! from. Spawning a script starts the producer thread and hands back the
//! stream for a multiplexer to subscribe, so benchmarks measure the
//! consuming side against live producers. [`prefilled`] builds an already
//! closed stream instead, for measuring pure drain cost with no producer
//! in play.

use std::thread::{self, JoinHandle};

use conflux::{Stream, stream, stream_with_capacity};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration for one scripted producer.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    /// Number of events sent before the stream is closed.
    pub events: usize,
    /// Stream capacity; `None` builds an unbounded stream.
    pub capacity: Option<usize>,
    /// Seed for the payload generator, for reproducible runs.
    pub seed: u64,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            events: 10_000,
            capacity: Some(1_024),
            seed: 12345,
        }
    }
}

impl Script {
    /// Spawns the producer thread, returning the stream to subscribe and
    /// the handle to join once the drain is done.
    pub fn spawn(self) -> (Stream<u64>, JoinHandle<()>) {
        let (producer, feed) = match self.capacity {
            Some(capacity) => stream_with_capacity(capacity),
            None => stream(),
        };
        let handle = thread::spawn(move || {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            for _ in 0..self.events {
                producer.send(rng.gen_range(0..u64::MAX));
            }
            producer.close();
        });
        (feed, handle)
    }

    /// Spawns `n` producers with distinct seeds, for fan-in benchmarks.
    pub fn spawn_many(self, n: usize) -> (Vec<Stream<u64>>, Vec<JoinHandle<()>>) {
        (0..n)
            .map(|i| {
                Script {
                    seed: self.seed + i as u64,
                    ..self
                }
                .spawn()
            })
            .unzip()
    }
}

/// Builds a stream buffering `events` seeded payloads with its producer
/// already gone, so every event is immediately ready and the stream reports
/// closed right after the last one.
pub fn prefilled(events: usize, seed: u64) -> Stream<u64> {
    let (producer, feed) = stream();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..events {
        producer.send(rng.gen_range(0..u64::MAX));
    }
    producer.close();
    feed
}
