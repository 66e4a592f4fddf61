//! SMT throughput benchmark binary.
//!
//! Takes no arguments: detects the machine topology, runs the physical
//! and logical trials with the default iteration count, and prints the
//! report to stdout. Exits non-zero if any worker cannot be pinned.

use anyhow::{Context, Result};

use smtbench_core::{bench, topology, BenchConfig, SystemBinder};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let topology = topology::detect_topology();
    tracing::debug!(?topology, "topology loaded");

    let report = bench::run(&topology, &SystemBinder, &BenchConfig::default())
        .context("benchmark run failed")?;

    println!("{report}");
    Ok(())
}
