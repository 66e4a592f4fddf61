//! Thread-to-core pinning
//!
//! This module resolves a (physical core, hardware thread) pair against
//! the topology snapshot and binds the calling thread to the resolved
//! processing unit.

use thiserror::Error;

use crate::topology::Topology;

/// Errors produced while resolving or applying a pin request
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// The requested hardware thread does not exist on the core
    #[error("logical unit index {index} out of range: core has {limit} hardware threads")]
    LogicalIndexOutOfRange { index: usize, limit: usize },

    /// The requested physical core does not exist on the machine
    #[error("physical core index {index} out of range: machine has {limit} physical cores")]
    CoreIndexOutOfRange { index: usize, limit: usize },

    /// The platform cannot enumerate bindable cores at all
    #[error("thread pinning is not supported on this platform")]
    Unsupported,

    /// The affinity call itself was refused by the OS
    #[error("failed to bind current thread to cpu {cpu}")]
    BindFailed { cpu: usize },
}

/// Applies an affinity binding for the calling thread.
///
/// The trait exists so pinning logic can be exercised in tests without
/// touching OS scheduler state.
pub trait CpuBinder {
    /// Restrict the calling thread's scheduling to the given OS CPU
    fn bind_current_thread(&self, cpu: usize) -> Result<(), PinError>;
}

/// Binder backed by the OS affinity interface
pub struct SystemBinder;

impl CpuBinder for SystemBinder {
    fn bind_current_thread(&self, cpu: usize) -> Result<(), PinError> {
        let core_ids = core_affinity::get_core_ids().ok_or(PinError::Unsupported)?;

        let core = core_ids
            .into_iter()
            .find(|c| c.id == cpu)
            .ok_or(PinError::BindFailed { cpu })?;

        if core_affinity::set_for_current(core) {
            Ok(())
        } else {
            Err(PinError::BindFailed { cpu })
        }
    }
}

/// Resolves (core, hardware thread) pairs and pins the calling thread.
///
/// Borrows the topology snapshot; the snapshot is read-only, so one
/// pinner can serve every worker thread of a trial concurrently.
pub struct CorePinner<'a, B: CpuBinder> {
    topology: &'a Topology,
    binder: &'a B,
}

impl<'a, B: CpuBinder> CorePinner<'a, B> {
    pub fn new(topology: &'a Topology, binder: &'a B) -> Self {
        Self { topology, binder }
    }

    /// Pin the calling thread to the `logical_index`-th hardware thread
    /// of the physical core at `core_index`, in sibling order.
    ///
    /// Both indices are validated against the snapshot before any OS
    /// state changes. The binding is not reverted; it stays in effect
    /// until the thread re-pins or exits.
    pub fn pin(&self, core_index: usize, logical_index: usize) -> Result<usize, PinError> {
        let sibling_count =
            self.topology
                .sibling_count(core_index)
                .ok_or(PinError::CoreIndexOutOfRange {
                    index: core_index,
                    limit: self.topology.physical_core_count(),
                })?;

        if logical_index >= sibling_count {
            return Err(PinError::LogicalIndexOutOfRange {
                index: logical_index,
                limit: sibling_count,
            });
        }

        let cpu = self.topology.cores()[core_index].units()[logical_index];
        self.binder.bind_current_thread(cpu)?;

        tracing::debug!(core_index, logical_index, cpu, "pinned worker thread");
        Ok(cpu)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{CpuBinder, PinError};
    use std::sync::Mutex;

    /// Records every bind request instead of touching OS affinity
    #[derive(Default)]
    pub struct RecordingBinder {
        cpus: Mutex<Vec<usize>>,
    }

    impl RecordingBinder {
        pub fn bound_cpus(&self) -> Vec<usize> {
            let mut cpus = self.cpus.lock().unwrap().clone();
            cpus.sort_unstable();
            cpus
        }

        pub fn bind_count(&self) -> usize {
            self.cpus.lock().unwrap().len()
        }
    }

    impl CpuBinder for RecordingBinder {
        fn bind_current_thread(&self, cpu: usize) -> Result<(), PinError> {
            self.cpus.lock().unwrap().push(cpu);
            Ok(())
        }
    }
}
