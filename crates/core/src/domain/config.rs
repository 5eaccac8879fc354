// Simulation Configuration

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lower bound for a job's simulated duration (1s)
pub const DEFAULT_MIN_PROCESSING_TIME_MS: u64 = 1000;

/// Default upper bound for a job's simulated duration (5s)
pub const DEFAULT_MAX_PROCESSING_TIME_MS: u64 = 5000;

/// Default period of the job generation timer (2s)
pub const DEFAULT_JOB_CREATION_INTERVAL_MS: u64 = 2000;

/// Default period of the idle-worker dispatch sweep (500ms)
pub const DEFAULT_DISPATCH_INTERVAL_MS: u64 = 500;

/// Engine configuration, fixed for the lifetime of a Manager.
///
/// Changing any value means building a new Manager; the previous instance is
/// disposed of with `stop()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lower bound (inclusive) of a job's simulated duration
    pub min_processing_time_ms: u64,
    /// Upper bound (exclusive unless equal to the lower bound)
    pub max_processing_time_ms: u64,
    /// Period of the job generation timer
    pub job_creation_interval_ms: u64,
    /// Period of the idle-worker dispatch sweep
    pub dispatch_interval_ms: u64,
    /// Cadence of progress snapshots while a job runs (0 = disabled)
    pub progress_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_processing_time_ms: DEFAULT_MIN_PROCESSING_TIME_MS,
            max_processing_time_ms: DEFAULT_MAX_PROCESSING_TIME_MS,
            job_creation_interval_ms: DEFAULT_JOB_CREATION_INTERVAL_MS,
            dispatch_interval_ms: DEFAULT_DISPATCH_INTERVAL_MS,
            progress_interval_ms: 0,
        }
    }
}

impl SimulationConfig {
    /// Build a config with the given processing bounds and generation interval
    pub fn new(
        min_processing_time_ms: u64,
        max_processing_time_ms: u64,
        job_creation_interval_ms: u64,
    ) -> Self {
        Self {
            min_processing_time_ms,
            max_processing_time_ms,
            job_creation_interval_ms,
            ..Self::default()
        }
    }

    pub fn with_dispatch_interval_ms(mut self, ms: u64) -> Self {
        self.dispatch_interval_ms = ms;
        self
    }

    pub fn with_progress_interval_ms(mut self, ms: u64) -> Self {
        self.progress_interval_ms = ms;
        self
    }

    /// Reject zero durations and inverted processing bounds
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("min_processing_time_ms", self.min_processing_time_ms),
            ("max_processing_time_ms", self.max_processing_time_ms),
            ("job_creation_interval_ms", self.job_creation_interval_ms),
            ("dispatch_interval_ms", self.dispatch_interval_ms),
        ];
        for (name, value) in required {
            if value == 0 {
                return Err(DomainError::InvalidConfig(format!("{} must be > 0", name)));
            }
        }

        self.bounds().map(|_| ())
    }

    pub fn bounds(&self) -> Result<ProcessingTimeBounds> {
        ProcessingTimeBounds::new(self.min_processing_time_ms, self.max_processing_time_ms)
    }

    pub fn job_creation_interval(&self) -> Duration {
        Duration::from_millis(self.job_creation_interval_ms)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    pub fn progress_interval(&self) -> Option<Duration> {
        (self.progress_interval_ms > 0).then(|| Duration::from_millis(self.progress_interval_ms))
    }
}

/// Validated `[min, max)` range for simulated job durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingTimeBounds {
    min_ms: u64,
    max_ms: u64,
}

impl ProcessingTimeBounds {
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self> {
        if min_ms > max_ms {
            return Err(DomainError::InvalidConfig(format!(
                "min_processing_time_ms ({}) > max_processing_time_ms ({})",
                min_ms, max_ms
            )));
        }
        Ok(Self { min_ms, max_ms })
    }

    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// True when every draw yields `min_ms`
    pub fn is_fixed(&self) -> bool {
        self.min_ms == self.max_ms
    }
}
