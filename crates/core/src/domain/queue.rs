// Queue Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::job::Job;
use std::collections::VecDeque;

/// Strict FIFO of pending jobs.
///
/// The queue itself is plain data; the Manager owns it inside its critical
/// section and publishes a snapshot after each mutation.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the back
    pub fn enqueue(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    /// Remove the front job, or `EmptyQueue`
    pub fn dequeue(&mut self) -> Result<Job> {
        self.jobs.pop_front().ok_or(DomainError::EmptyQueue)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drop every pending job, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let discarded = self.jobs.len();
        self.jobs.clear();
        discarded
    }

    /// Front-to-back view
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}
