// Worker - single-job-at-a-time executor

pub mod constants;

use constants::MAX_PROGRESS_PERCENT;

use crate::domain::error::{DomainError, Result};
use crate::domain::{Job, JobView, WorkerSnapshot};
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Worker slot owned by the Manager.
///
/// Idle -> Busy (job assigned) -> Idle (job released). A busy worker never
/// takes another job; the Manager checks `is_busy` before dequeuing.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    current_job: Option<Job>,
    job_started_at: Option<i64>,
}

impl Worker {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            current_job: None,
            job_started_at: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_busy(&self) -> bool {
        self.current_job.is_some()
    }

    pub fn current_job(&self) -> Option<&Job> {
        self.current_job.as_ref()
    }

    /// Take ownership of a freshly dequeued job and mark it Running
    pub fn assign(&mut self, mut job: Job, now_millis: i64) -> Result<()> {
        if let Some(current) = &self.current_job {
            return Err(DomainError::InvalidStateTransition {
                from: format!("worker {} busy with job {}", self.id, current.id),
                to: format!("worker {} busy with job {}", self.id, job.id),
            });
        }
        job.start(now_millis)?;
        self.job_started_at = job.started_at;
        self.current_job = Some(job);
        Ok(())
    }

    /// Mark the held job Done; the worker keeps it until `release`
    pub fn complete_current(&mut self, now_millis: i64) -> Result<&Job> {
        let id = self.id;
        let job = self
            .current_job
            .as_mut()
            .ok_or_else(|| DomainError::InvalidStateTransition {
                from: format!("worker {} idle", id),
                to: "DONE".to_string(),
            })?;
        job.complete(now_millis)?;
        Ok(job)
    }

    /// Go back to Idle, handing the job back for disposal
    pub fn release(&mut self) -> Option<Job> {
        self.job_started_at = None;
        self.current_job.take()
    }

    /// Percentage of the current job elapsed, 0 when idle
    pub fn progress(&self, now_millis: i64) -> f64 {
        match (&self.current_job, self.job_started_at) {
            (Some(job), Some(started_at)) => {
                if job.processing_time_ms == 0 {
                    return MAX_PROGRESS_PERCENT;
                }
                let elapsed = (now_millis - started_at).max(0) as f64;
                (elapsed / job.processing_time_ms as f64 * 100.0).min(MAX_PROGRESS_PERCENT)
            }
            _ => 0.0,
        }
    }

    pub fn snapshot(&self, now_millis: i64) -> WorkerSnapshot {
        WorkerSnapshot {
            id: self.id,
            busy: self.is_busy(),
            current_job: self.current_job.as_ref().map(JobView::from),
            progress: self.progress(now_millis),
        }
    }
}

/// Simulated work: waits `processing` without consuming CPU.
///
/// With a progress cadence, `on_progress` fires at most once per period while
/// waiting. Completion wins any tie with a progress tick.
pub(crate) async fn simulate<F>(
    processing: Duration,
    progress_interval: Option<Duration>,
    mut on_progress: F,
) where
    F: FnMut(),
{
    let work = sleep(processing);
    tokio::pin!(work);

    let Some(period) = progress_interval else {
        work.await;
        return;
    };

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut work => break,
            _ = ticker.tick() => on_progress(),
        }
    }
}
