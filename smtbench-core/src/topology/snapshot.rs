//! Processor topology snapshot
//!
//! This module builds an immutable snapshot of the machine's processor
//! hierarchy: packages -> physical cores -> logical processing units.

use std::fmt;

/// A physical core and the logical processing units (hardware threads)
/// that share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalCore {
    /// Package (socket) this core belongs to
    pub package_id: usize,
    /// OS CPU ids of the hardware threads on this core, in sibling order
    units: Vec<usize>,
}

impl PhysicalCore {
    /// Create a new physical core with the given hardware threads
    pub fn new(package_id: usize, units: Vec<usize>) -> Self {
        Self { package_id, units }
    }

    /// Number of hardware threads sharing this core
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// OS CPU ids of this core's hardware threads, in sibling order
    pub fn units(&self) -> &[usize] {
        &self.units
    }
}

/// An immutable-after-load snapshot of the machine's core/thread
/// hierarchy. Loaded once at startup; read-only afterwards, so sharing
/// it across worker threads is safe.
#[derive(Clone)]
pub struct Topology {
    cores: Vec<PhysicalCore>,
    logical_units: usize,
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("physical_cores", &self.cores.len())
            .field("logical_units", &self.logical_units)
            .finish()
    }
}

impl Topology {
    fn from_cores(cores: Vec<PhysicalCore>) -> Self {
        let logical_units = cores.iter().map(PhysicalCore::unit_count).sum();
        Self {
            cores,
            logical_units,
        }
    }

    /// Detect the processor topology of the current machine.
    ///
    /// On Linux this reads the kernel's sysfs topology tree. Elsewhere,
    /// or when sysfs is unavailable, it falls back to a uniform layout
    /// derived from the logical and physical CPU counts.
    pub fn detect() -> Self {
        #[cfg(target_os = "linux")]
        {
            match Self::detect_sysfs() {
                Ok(cores) if !cores.is_empty() => return Self::from_cores(cores),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("sysfs topology detection failed: {err}");
                }
            }
        }

        Self::detect_fallback()
    }

    /// Number of physical cores on the machine
    pub fn physical_core_count(&self) -> usize {
        self.cores.len()
    }

    /// Number of logical processing units (hardware threads) machine-wide
    pub fn logical_unit_count(&self) -> usize {
        self.logical_units
    }

    /// Number of hardware threads on the physical core at `core_index`,
    /// or `None` if `core_index` is out of range
    pub fn sibling_count(&self, core_index: usize) -> Option<usize> {
        self.cores.get(core_index).map(PhysicalCore::unit_count)
    }

    /// All physical cores, in detection order
    pub fn cores(&self) -> &[PhysicalCore] {
        &self.cores
    }

    // Sysfs-based detection. Cores are identified by their
    // thread_siblings_list: every CPU sharing a core reports the same
    // sibling set, so unique sets enumerate the physical cores.
    #[cfg(target_os = "linux")]
    fn detect_sysfs() -> Result<Vec<PhysicalCore>, std::io::Error> {
        use std::fs;
        use std::path::Path;

        let cpu_root = Path::new("/sys/devices/system/cpu");
        if !cpu_root.exists() {
            return Ok(vec![]);
        }

        let mut cores: Vec<PhysicalCore> = Vec::new();

        for entry in fs::read_dir(cpu_root)? {
            let entry = entry?;
            let path = entry.path();

            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.starts_with("cpu") || file_name[3..].parse::<usize>().is_err() {
                continue;
            }

            let topo_dir = path.join("topology");
            let siblings_path = topo_dir.join("thread_siblings_list");
            if !siblings_path.exists() {
                // Offline CPUs have no topology directory
                continue;
            }

            let siblings = parse_cpu_list(&fs::read_to_string(siblings_path)?);
            if siblings.is_empty() {
                continue;
            }

            // Each core shows up once per sibling; keep the first sighting
            if cores.iter().any(|c| c.units == siblings) {
                continue;
            }

            let package_id = fs::read_to_string(topo_dir.join("physical_package_id"))
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(0);

            cores.push(PhysicalCore::new(package_id, siblings));
        }

        // Detection order follows directory iteration; fix it to
        // (package, first unit) so core indices are stable across runs.
        cores.sort_by_key(|c| (c.package_id, c.units.first().copied()));

        Ok(cores)
    }

    // Uniform synthetic layout from the logical/physical CPU counts.
    // The kernel enumerates SMT siblings as (c, c + physical, ...), and
    // the fallback mirrors that numbering.
    fn detect_fallback() -> Self {
        let logical = num_cpus::get();
        let physical = match num_cpus::get_physical() {
            count if count > 0 => count,
            _ => logical,
        };
        let threads_per_core = (logical / physical).max(1);

        let cores = (0..physical)
            .map(|c| {
                let units = (0..threads_per_core).map(|t| c + t * physical).collect();
                PhysicalCore::new(0, units)
            })
            .collect();

        Self::from_cores(cores)
    }

    /// Create a mock topology for testing: one physical core per entry,
    /// with the given number of hardware threads, OS CPU ids assigned
    /// sequentially in sibling order.
    #[cfg(test)]
    pub fn mock(sibling_counts: &[usize]) -> Self {
        let mut next_cpu = 0;
        let cores = sibling_counts
            .iter()
            .map(|&count| {
                let units: Vec<usize> = (next_cpu..next_cpu + count).collect();
                next_cpu += count;
                PhysicalCore::new(0, units)
            })
            .collect();

        Self::from_cores(cores)
    }
}

/// Parse a sysfs CPU list string like "0-2,4,6-8" into a vector of CPU ids
#[cfg(any(target_os = "linux", test))]
fn parse_cpu_list(cpulist: &str) -> Vec<usize> {
    let mut cpus = Vec::new();

    for part in cpulist.trim().split(',') {
        if let Some((start, end)) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (
                start.trim().parse::<usize>(),
                end.trim().parse::<usize>(),
            ) {
                cpus.extend(start..=end);
            }
        } else if let Ok(cpu) = part.trim().parse::<usize>() {
            cpus.push(cpu);
        }
    }

    cpus
}
