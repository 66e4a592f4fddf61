//! smtbench - SMT throughput benchmark
//!
//! Measures achievable throughput of a trivial compute loop with
//! threads pinned one-per-physical-core versus one-per-hardware-thread,
//! to show what simultaneous multithreading buys a simple workload.

/// Processor topology detection and queries
pub mod topology;

/// Thread-to-core pinning
pub mod pin;

/// Benchmark driver and reporting
pub mod bench;

pub use bench::{BenchConfig, BenchReport, LogicalMapping, TrialResult};
pub use pin::{CorePinner, CpuBinder, PinError, SystemBinder};
pub use topology::Topology;
