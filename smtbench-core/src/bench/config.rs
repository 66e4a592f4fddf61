//! Benchmark configuration

use crate::topology::Topology;

/// Iteration count used when none is configured
pub const DEFAULT_N_WORK: u64 = 1_000_000_000;

/// How the logical trial decomposes a worker ordinal into a
/// (physical core, hardware thread) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalMapping {
    /// `core = ordinal / physical_core_count`,
    /// `logical = ordinal % physical_core_count`.
    ///
    /// This is the historical mapping and the default. It is only
    /// consistent when every core's hardware-thread count equals the
    /// physical core count; on other machines it produces pairs the
    /// pinner rejects as out of range. Kept as-is for comparability
    /// with earlier runs rather than silently corrected.
    ModuloPhysicalCores,

    /// Enumerate (core, sibling) pairs in topology order, so ordinal
    /// `w` lands on the `w`-th hardware thread machine-wide. Valid on
    /// any topology, including non-uniform SMT.
    PerCoreSiblings,
}

impl LogicalMapping {
    /// Decompose a worker ordinal into a (core_index, logical_index)
    /// pair. May return an out-of-range pair; validation is the
    /// pinner's job.
    pub fn decompose(&self, ordinal: usize, topology: &Topology) -> (usize, usize) {
        match self {
            Self::ModuloPhysicalCores => {
                let physical = topology.physical_core_count();
                (ordinal / physical, ordinal % physical)
            }
            Self::PerCoreSiblings => {
                let mut seen = 0;
                for (core_index, core) in topology.cores().iter().enumerate() {
                    if ordinal < seen + core.unit_count() {
                        return (core_index, ordinal - seen);
                    }
                    seen += core.unit_count();
                }
                // Ordinal past the last unit; rejected downstream
                (topology.physical_core_count(), 0)
            }
        }
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    /// Iterations of the accumulation loop per worker
    pub n_work: u64,
    /// Worker-ordinal decomposition used by the logical trial
    pub logical_mapping: LogicalMapping,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            n_work: DEFAULT_N_WORK,
            logical_mapping: LogicalMapping::ModuloPhysicalCores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulo_mapping_smt2() {
        // 2 physical cores, 4 logical units: ordinals decompose to
        // (0,0),(0,1),(1,0),(1,1)
        let topology = Topology::mock(&[2, 2]);
        let mapping = LogicalMapping::ModuloPhysicalCores;

        let pairs: Vec<_> = (0..4).map(|w| mapping.decompose(w, &topology)).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_modulo_mapping_mismatch() {
        // 3 physical cores with 2 threads each: the modulo scheme
        // produces within-core indices up to 2, beyond the sibling count
        let topology = Topology::mock(&[2, 2, 2]);
        let mapping = LogicalMapping::ModuloPhysicalCores;

        assert_eq!(mapping.decompose(5, &topology), (1, 2));
        assert!(topology.sibling_count(1).unwrap() <= 2);
    }

    #[test]
    fn test_per_core_siblings_mapping() {
        let topology = Topology::mock(&[2, 1, 3]);
        let mapping = LogicalMapping::PerCoreSiblings;

        let pairs: Vec<_> = (0..6).map(|w| mapping.decompose(w, &topology)).collect();
        assert_eq!(
            pairs,
            vec![(0, 0), (0, 1), (1, 0), (2, 0), (2, 1), (2, 2)]
        );
    }

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.n_work, DEFAULT_N_WORK);
        assert_eq!(config.logical_mapping, LogicalMapping::ModuloPhysicalCores);
    }
}
