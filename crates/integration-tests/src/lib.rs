//! Shared harness for engine scenario tests

use queuesim_core::port::observer::mocks::RecordingObserver;
use queuesim_core::port::random_source::SeededRandomSource;
use queuesim_core::port::time_provider::TokioTimeProvider;
use queuesim_core::{Manager, SimulationConfig, Snapshot};
use std::collections::HashSet;
use std::sync::Arc;

/// Manager on the tokio clock with a seeded RNG, plus the observer recording
/// every snapshot it pushes
pub fn recorded_manager(
    workers: usize,
    config: SimulationConfig,
) -> (Manager, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let manager = Manager::with_ports(
        workers,
        observer.clone(),
        config,
        Arc::new(TokioTimeProvider::new()),
        Arc::new(SeededRandomSource::new(2024)),
    )
    .expect("valid test configuration");
    (manager, observer)
}

/// Fixed-duration jobs, generation timer effectively off
pub fn fixed_jobs(processing_ms: u64) -> SimulationConfig {
    SimulationConfig::new(processing_ms, processing_ms, 3_600_000)
}

/// Panics if any job id is held by two workers or is both queued and held
pub fn assert_exclusive_ownership(snapshot: &Snapshot) {
    let mut seen = HashSet::new();
    for job in snapshot.queued_jobs.iter() {
        assert!(seen.insert(job.id), "job {} queued twice", job.id);
    }
    for worker in snapshot.workers.iter() {
        if let Some(job) = &worker.current_job {
            assert!(
                seen.insert(job.id),
                "job {} held by worker {} is also queued or held elsewhere",
                job.id,
                worker.id
            );
        }
    }
}

/// Utilization must match the busy workers exactly
pub fn assert_utilization_consistent(snapshot: &Snapshot) {
    let expected = 100.0 * snapshot.busy_workers() as f64 / snapshot.workers.len() as f64;
    assert!((0.0..=100.0).contains(&snapshot.utilization));
    assert!(
        (snapshot.utilization - expected).abs() < 1e-9,
        "utilization {} != {}",
        snapshot.utilization,
        expected
    );
}
