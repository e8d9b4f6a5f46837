//! Benchmark utilities for conflux.
//!
//! This crate provides the benchmarking infrastructure for the multiplexer
//! and counter store, including:
//!
//! - **Microbenchmarks**: stream handoff and multiplexer drain throughput
//! - **Contention benchmarks**: `CounterStore` increments as threads pile up
//! - **Memory tracking**: heap allocation profiling via dhat, for watching
//!   unbounded streams grow under over-production
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p conflux_bench
//!
//! # Run a specific benchmark group
//! cargo bench -p conflux_bench -- fan_in
//!
//! # Run with memory profiling (slower)
//! cargo bench -p conflux_bench --features memory_profiling
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for
//! visualization. Memory profiling results are written to `dhat-heap.json`
//! for viewing with DHAT's viewer.

pub mod memory;
pub mod sources;
