//! Processor topology detection
//!
//! This module is responsible for:
//! - Loading a snapshot of the machine's core/thread hierarchy
//! - Answering read-only queries over it (core counts, sibling counts)

pub mod snapshot;

pub use snapshot::{PhysicalCore, Topology};

/// Load a snapshot of the current machine's processor topology
pub fn detect_topology() -> Topology {
    Topology::detect()
}
