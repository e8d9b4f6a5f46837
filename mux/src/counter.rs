//! Shared counters behind a single lock.
//!
//! [`CounterStore`] keeps named `u64` counters that any number of threads can
//! bump and read concurrently. All state lives in one map guarded by one
//! [`Mutex`](std::sync::Mutex): every operation takes the lock, performs its
//! whole read-modify-write, and releases on the way out. Two threads
//! incrementing the same key can never interleave between the read and the
//! write, so no update is lost, and a reader never observes a half-applied
//! one.
//!
//! Keys spring into existence at zero: reading an unknown key returns 0, and
//! incrementing one creates it at 1. No operation can fail.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use conflux::CounterStore;
//!
//! let store = Arc::new(CounterStore::new());
//!
//! let worker = Arc::clone(&store);
//! std::thread::spawn(move || worker.increment("requests")).join().unwrap();
//!
//! assert_eq!(store.get("requests"), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A keyed set of `u64` counters sharing one exclusive lock.
///
/// The store is written to be held in an `Arc` and handed to as many threads
/// as needed; every method takes `&self`.
///
/// # Panic safety
///
/// The lock is released on every exit path, panics included. A panic in a
/// thread that held the lock does not spread: counter values are plain
/// integers written in a single step, so the map is structurally intact
/// after any interrupted operation and the store recovers it and keeps
/// going.
pub struct CounterStore {
    /// All counters, guarded as a unit. The lock is never exposed.
    counts: Mutex<HashMap<String, u64>>,
}

impl CounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        CounterStore {
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Adds 1 to the counter named `key`, creating it at 0 first if absent.
    ///
    /// The whole read-modify-write happens under the lock, so concurrent
    /// increments of the same key all land.
    pub fn increment(&self, key: &str) {
        let mut counts = self.lock();
        *counts.entry(key.to_owned()).or_insert(0) += 1;
    }

    /// Reads the counter named `key`. Absent keys read 0.
    pub fn get(&self, key: &str) -> u64 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    /// Returns every counter as `(key, value)` pairs, sorted by key.
    ///
    /// The snapshot is a consistent point-in-time copy: it holds the lock
    /// once for the whole walk, so no increment lands halfway through it.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let counts = self.lock();
        let mut entries: Vec<_> = counts
            .iter()
            .map(|(key, value)| (key.clone(), *value))
            .collect();
        entries.sort();
        entries
    }

    /// Number of distinct keys ever incremented.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no key has been incremented yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes the lock, recovering the map if a previous holder panicked.
    ///
    /// Safe because no operation leaves the map half-written: values are
    /// plain integers and each write is a single insert or add.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        match self.counts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    // ==================== Basics ====================

    #[test]
    fn absent_keys_read_zero() {
        let store = CounterStore::new();

        assert_eq!(store.get("never-touched"), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn increment_creates_keys_implicitly() {
        let store = CounterStore::new();

        store.increment("fresh");

        assert_eq!(store.get("fresh"), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sequential_increments_accumulate() {
        let store = CounterStore::new();

        for _ in 0..5 {
            store.increment("hits");
        }

        assert_eq!(store.get("hits"), 5);
    }

    #[test]
    fn get_does_not_create_the_key() {
        let store = CounterStore::new();

        store.get("ghost");

        assert!(store.is_empty());
    }

    // ==================== Concurrency ====================

    #[test]
    fn concurrent_increments_are_never_lost() {
        let store = Arc::new(CounterStore::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        store.increment("requests");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("requests"), 10_000);
    }

    #[test]
    fn distinct_keys_count_independently() {
        let store = Arc::new(CounterStore::new());

        let handles: Vec<_> = ["alpha", "beta", "gamma", "delta"]
            .into_iter()
            .map(|key| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..500 {
                        store.increment(key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for key in ["alpha", "beta", "gamma", "delta"] {
            assert_eq!(store.get(key), 500);
        }
    }

    #[test]
    fn reads_interleave_safely_with_writes() {
        let store = Arc::new(CounterStore::new());
        let writer = Arc::clone(&store);

        let handle = thread::spawn(move || {
            for _ in 0..1_000 {
                writer.increment("ticks");
            }
        });

        // A single writer means the value can only go up; a torn or lost
        // update would show here as a decrease.
        let mut last = 0;
        loop {
            let now = store.get("ticks");
            assert!(now >= last, "counter moved backwards: {last} -> {now}");
            last = now;
            if now == 1_000 {
                break;
            }
        }
        handle.join().unwrap();
    }

    #[test]
    fn recovers_from_a_poisoned_lock() {
        let store = Arc::new(CounterStore::new());
        let poisoner = Arc::clone(&store);

        // Panic while the guard is alive to poison the mutex.
        let result = thread::spawn(move || {
            let _guard = poisoner.counts.lock().unwrap();
            panic!("poison the counter lock");
        })
        .join();
        assert!(result.is_err());

        store.increment("hits");
        assert_eq!(store.get("hits"), 1);
    }

    // ==================== Snapshot ====================

    #[test]
    fn snapshot_is_sorted_by_key() {
        let store = CounterStore::new();
        store.increment("zebra");
        store.increment("ant");
        store.increment("ant");
        store.increment("mole");

        let snapshot = store.snapshot();

        assert_eq!(
            snapshot,
            [
                ("ant".to_string(), 2),
                ("mole".to_string(), 1),
                ("zebra".to_string(), 1),
            ]
        );
    }

    #[test]
    fn snapshot_of_an_empty_store_is_empty() {
        let store = CounterStore::new();

        assert!(store.snapshot().is_empty());
    }
}
