use async_trait::async_trait;
use sysinfo::System;

use crate::error::Error;

/// Source of the monitored metric.
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Returns current memory utilization as a percentage (0-100).
    async fn sample(&self) -> Result<f64, Error>;
}

/// Samples system-wide memory usage via `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSampler;

impl SystemSampler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sampler for SystemSampler {
    async fn sample(&self) -> Result<f64, Error> {
        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(Error::Sample(
                "system reported zero total memory".to_string(),
            ));
        }

        Ok(system.used_memory() as f64 / total as f64 * 100.0)
    }
}
