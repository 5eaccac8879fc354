// Snapshot - immutable point-in-time view pushed to observers

use crate::domain::job::{Job, JobId, RunEpoch};
use serde::{Deserialize, Serialize};

/// Presentation view of a job (queued or in flight)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobView {
    pub id: JobId,
    pub processing_time_ms: u64,
    pub created_at: i64,
    pub started_at: Option<i64>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            processing_time_ms: job.processing_time_ms,
            created_at: job.created_at,
            started_at: job.started_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub id: usize,
    pub busy: bool,
    pub current_job: Option<JobView>,
    /// Percentage of the current job elapsed, 0 when idle
    pub progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadTimeMetrics {
    pub max_ms: u64,
    pub average_ms: f64,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub running: bool,
    pub epoch: RunEpoch,
    pub queued_jobs: Vec<JobView>,
    pub workers: Vec<WorkerSnapshot>,
    pub total_jobs_created: u64,
    pub max_queue_size_observed: usize,
    pub lead_time_metrics: LeadTimeMetrics,
    /// Percentage of workers busy, in [0, 100]
    pub utilization: f64,
}

impl Snapshot {
    pub fn busy_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.busy).count()
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let snapshot = Snapshot {
            running: true,
            epoch: 1,
            queued_jobs: vec![JobView {
                id: 4,
                processing_time_ms: 1200,
                created_at: 10,
                started_at: None,
            }],
            workers: vec![WorkerSnapshot {
                id: 0,
                busy: false,
                current_job: None,
                progress: 0.0,
            }],
            total_jobs_created: 5,
            max_queue_size_observed: 2,
            lead_time_metrics: LeadTimeMetrics::default(),
            utilization: 0.0,
        };

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["running"], true);
        assert_eq!(value["queued_jobs"][0]["processing_time_ms"], 1200);
        assert_eq!(value["workers"][0]["busy"], false);
        assert_eq!(value["lead_time_metrics"]["completed"], 0);
        assert_eq!(snapshot.busy_workers(), 0);
    }
}
