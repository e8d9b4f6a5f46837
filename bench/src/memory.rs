//! Heap profiling for the unbounded-buffer tradeoff.
//!
//! An unbounded stream never blocks its producer, so a producer that outruns
//! its consumer grows the buffer without limit. [`profile`] wraps a closure
//! in a dhat heap measurement and reports what that growth actually cost, so
//! the tradeoff shows up as numbers instead of folklore.
//!
//! Profiling adds overhead and is off by default; enable it with:
//!
//! ```bash
//! cargo bench -p conflux_bench --features memory_profiling
//! ```
//!
//! Each profiled run also writes `dhat-heap.json`, viewable at
//! <https://nnethercote.github.io/dh_view/dh_view.html>. Without the feature,
//! [`profile`] runs the closure and reports zeroed usage.

/// Heap activity observed across one profiled run.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapUsage {
    /// Bytes allocated over the whole run.
    pub allocated_bytes: u64,
    /// Number of allocations over the whole run.
    pub blocks: u64,
    /// High-water mark of live heap bytes.
    pub peak_bytes: u64,
}

impl HeapUsage {
    /// Average allocated bytes per event, for runs that moved `events`
    /// events. Zero events reads as zero cost.
    pub fn bytes_per_event(&self, events: usize) -> f64 {
        if events == 0 {
            0.0
        } else {
            self.allocated_bytes as f64 / events as f64
        }
    }
}

impl std::fmt::Display for HeapUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bytes in {} blocks, peak {} bytes",
            self.allocated_bytes, self.blocks, self.peak_bytes
        )
    }
}

/// Runs `f` under a dhat heap profiler and returns its result with the
/// observed heap usage.
///
/// Only one profiled run may be active at a time; dhat enforces this.
#[cfg(feature = "memory_profiling")]
pub fn profile<F, R>(f: F) -> (R, HeapUsage)
where
    F: FnOnce() -> R,
{
    let profiler = dhat::Profiler::new_heap();
    let result = f();
    let stats = dhat::HeapStats::get();
    drop(profiler);
    (
        result,
        HeapUsage {
            allocated_bytes: stats.total_bytes,
            blocks: stats.total_blocks,
            peak_bytes: stats.max_bytes as u64,
        },
    )
}

/// Runs `f` without measuring; usage reads zero. Enable the
/// `memory_profiling` feature for real numbers.
#[cfg(not(feature = "memory_profiling"))]
pub fn profile<F, R>(f: F) -> (R, HeapUsage)
where
    F: FnOnce() -> R,
{
    (f(), HeapUsage::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_reports_per_event_cost() {
        let usage = HeapUsage {
            allocated_bytes: 10_000,
            blocks: 100,
            peak_bytes: 5_000,
        };

        assert!((usage.bytes_per_event(100) - 100.0).abs() < f64::EPSILON);
        assert_eq!(usage.bytes_per_event(0), 0.0);
    }

    #[test]
    fn usage_displays_all_three_numbers() {
        let usage = HeapUsage {
            allocated_bytes: 1_024,
            blocks: 10,
            peak_bytes: 512,
        };

        assert_eq!(usage.to_string(), "1024 bytes in 10 blocks, peak 512 bytes");
    }

    #[test]
    fn profile_runs_the_closure() {
        // Fill an unbounded stream well past any sane buffer size; the
        // measurement wraps the growth whether or not profiling is on.
        let (buffered, _usage) = profile(|| {
            let (producer, feed) = conflux::stream::<u64>();
            for n in 0..10_000 {
                producer.send(n);
            }
            feed.len()
        });

        assert_eq!(buffered, 10_000);
    }
}
