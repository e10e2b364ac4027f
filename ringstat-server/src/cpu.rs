//! Host CPU utilization as a ringstat metric source.
//!
//! Wraps a `sysinfo::System` that only tracks CPU usage. Each acquisition
//! sleeps for the sampling interval and then refreshes, so the reported value
//! is the average utilization across that interval.

use std::time::Duration;

use ringstat::acquire::Acquire;
use ringstat::error::AcquireError;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Host-wide CPU utilization in percent (0 to 100).
pub struct CpuUsage {
    sys: System,
}

impl CpuUsage {
    /// Creates the source and takes the baseline reading.
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_cpu_usage()),
        );
        Self { sys }
    }
}

impl Default for CpuUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquire for CpuUsage {
    fn acquire(&mut self, interval: Duration) -> Result<f64, AcquireError> {
        // Usage is computed from the delta since the previous refresh
        std::thread::sleep(interval);
        self.sys.refresh_cpu_usage();

        if self.sys.cpus().is_empty() {
            return Err(AcquireError::new("no CPUs reported by the host"));
        }

        let usage = f64::from(self.sys.global_cpu_usage());
        if !usage.is_finite() {
            return Err(AcquireError::new(format!("invalid CPU usage reading: {usage}")));
        }

        Ok(usage)
    }
}
