// Domain Layer - Pure simulation entities

pub mod config;
pub mod error;
pub mod job;
pub mod queue;
pub mod snapshot;

// Re-exports
pub use config::{ProcessingTimeBounds, SimulationConfig};
pub use error::DomainError;
pub use job::{Job, JobId, JobState, RunEpoch};
pub use queue::JobQueue;
pub use snapshot::{JobView, LeadTimeMetrics, Snapshot, WorkerSnapshot};
