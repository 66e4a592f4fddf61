//! Benchmark report formatting

use std::fmt;

/// Results of one complete benchmark run, covering both trials.
///
/// The throughput figures are iteration counts per second scaled by
/// 1e9, not true floating-point operations; they are only meaningful
/// relative to each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchReport {
    pub physical_cores: usize,
    pub logical_cores: usize,
    pub t_phys: f64,
    pub t_logical: f64,
    pub gflops_phys: f64,
    pub gflops_logical: f64,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of physical cores: {}", self.physical_cores)?;
        writeln!(f, "Number of logical cores: {}", self.logical_cores)?;
        writeln!(f, "t_phys: {} t_logical: {}", self.t_phys, self.t_logical)?;
        write!(
            f,
            "gflops_phys: {} gflops_logical: {}",
            self.gflops_phys, self.gflops_logical
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_line_order() {
        let report = BenchReport {
            physical_cores: 2,
            logical_cores: 4,
            t_phys: 1.5,
            t_logical: 2.0,
            gflops_phys: 1.25,
            gflops_logical: 2.5,
        };

        let lines: Vec<String> = report.to_string().lines().map(String::from).collect();
        assert_eq!(
            lines,
            vec![
                "Number of physical cores: 2",
                "Number of logical cores: 4",
                "t_phys: 1.5 t_logical: 2",
                "gflops_phys: 1.25 gflops_logical: 2.5",
            ]
        );
    }
}
