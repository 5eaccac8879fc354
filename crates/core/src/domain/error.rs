// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal signal: dequeue found nothing. Never surfaced to observers.
    #[error("Queue is empty")]
    EmptyQueue,

    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Worker not found: {0}")]
    WorkerNotFound(usize),
}

pub type Result<T> = std::result::Result<T, DomainError>;
