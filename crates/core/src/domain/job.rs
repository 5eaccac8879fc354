// Job Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Job ID (assigned by the Manager's counter, never reused)
pub type JobId = u64;

/// Run epoch: bumped on every `start()`, tags jobs with the run that created them
pub type RunEpoch = u64;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Running,
    Done,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "QUEUED"),
            JobState::Running => write!(f, "RUNNING"),
            JobState::Done => write!(f, "DONE"),
        }
    }
}

/// Job Entity: a simulated unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub epoch: RunEpoch,
    pub processing_time_ms: u64,
    pub state: JobState,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl Job {
    /// Create a new Job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected by the Manager's counter)
    /// * `epoch` - Run the job belongs to
    /// * `processing_time_ms` - Simulated duration
    /// * `created_at` - Creation timestamp in ms (injected, not system time)
    pub fn new(id: JobId, epoch: RunEpoch, processing_time_ms: u64, created_at: i64) -> Self {
        Self {
            id,
            epoch,
            processing_time_ms,
            state: JobState::Queued,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    /// Transition to Running state with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        if self.state != JobState::Queued {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Running.to_string(),
            });
        }
        self.state = JobState::Running;
        // Clamp so created_at <= started_at holds even with a skewed clock
        self.started_at = Some(now_millis.max(self.created_at));
        Ok(())
    }

    /// Transition to Done state with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        let started_at = match (self.state, self.started_at) {
            (JobState::Running, Some(started_at)) => started_at,
            _ => {
                return Err(DomainError::InvalidStateTransition {
                    from: self.state.to_string(),
                    to: JobState::Done.to_string(),
                })
            }
        };
        self.state = JobState::Done;
        self.completed_at = Some(now_millis.max(started_at));
        Ok(())
    }

    /// Elapsed time from creation to completion (None until Done)
    pub fn lead_time_ms(&self) -> Option<u64> {
        self.completed_at
            .map(|completed_at| (completed_at - self.created_at).max(0) as u64)
    }
}
