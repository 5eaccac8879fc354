//! Generation, dispatch sweep and self-chaining scenarios

use queuesim_core::SimulationConfig;
use queuesim_integration_tests::{
    assert_exclusive_ownership, assert_utilization_consistent, fixed_jobs, recorded_manager,
};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_single_worker_drains_queue_sequentially() {
    let (manager, observer) = recorded_manager(1, fixed_jobs(100));
    manager.start();
    for _ in 0..3 {
        manager.generate_job();
    }
    assert_eq!(manager.snapshot().queued_jobs.len(), 3);

    // Nothing dispatches before the first sweep at t=500
    sleep(Duration::from_millis(450)).await;
    let waiting = manager.snapshot();
    assert_eq!(waiting.queued_jobs.len(), 3);
    assert!(!waiting.workers[0].busy);

    // Sweep at 500, then completions at 600, 700, 800 chain the rest
    sleep(Duration::from_millis(400)).await;
    let drained = manager.snapshot();
    assert!(drained.queued_jobs.is_empty());
    assert!(!drained.workers[0].busy);
    assert_eq!(drained.max_queue_size_observed, 3);

    let metrics = drained.lead_time_metrics;
    assert_eq!(metrics.completed, 3);
    assert!((800..810).contains(&metrics.max_ms), "max lead time {}", metrics.max_ms);
    assert!((700.0..710.0).contains(&metrics.average_ms), "avg lead time {}", metrics.average_ms);

    let lengths: Vec<usize> = observer.snapshots().iter().map(|s| s.queued_jobs.len()).collect();
    assert_eq!(lengths.iter().max(), Some(&3));
    let peak = lengths.iter().position(|&l| l == 3).unwrap();
    assert!(
        lengths[peak..].windows(2).all(|w| w[0] >= w[1]),
        "queue only drains after the peak: {:?}",
        lengths
    );
}

#[tokio::test(start_paused = true)]
async fn test_one_job_per_generation_tick() {
    let (manager, _) = recorded_manager(1, SimulationConfig::new(100, 100, 50));
    manager.start();

    sleep(Duration::from_millis(175)).await;
    assert_eq!(manager.snapshot().total_jobs_created, 3);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(manager.snapshot().total_jobs_created, 5);
}

#[tokio::test(start_paused = true)]
async fn test_generated_durations_respect_bounds() {
    let (manager, _) = recorded_manager(1, SimulationConfig::new(100, 150, 3_600_000));
    manager.start();
    for _ in 0..200 {
        manager.generate_job();
    }
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.queued_jobs.len(), 200);
    assert!(snapshot
        .queued_jobs
        .iter()
        .all(|j| (100..150).contains(&j.processing_time_ms)));

    let (fixed, _) = recorded_manager(1, fixed_jobs(250));
    fixed.start();
    for _ in 0..20 {
        fixed.generate_job();
    }
    assert!(fixed
        .snapshot()
        .queued_jobs
        .iter()
        .all(|j| j.processing_time_ms == 250));
}

#[tokio::test(start_paused = true)]
async fn test_jobs_are_served_in_fifo_order() {
    let (manager, observer) = recorded_manager(1, fixed_jobs(10));
    manager.start();
    let ids: Vec<u64> = (0..5).filter_map(|_| manager.generate_job()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    assert_eq!(manager.dispatch_idle_workers(), 1);
    sleep(Duration::from_millis(100)).await;

    let mut served: Vec<u64> = Vec::new();
    for snapshot in observer.snapshots() {
        if let Some(job) = &snapshot.workers[0].current_job {
            if served.last() != Some(&job.id) {
                served.push(job.id);
            }
        }
    }
    assert_eq!(served, ids);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_dispatches_job_enqueued_while_workers_idle() {
    let (manager, _) = recorded_manager(2, fixed_jobs(1_000));
    manager.start();
    manager.generate_job();

    sleep(Duration::from_millis(400)).await;
    assert_eq!(manager.snapshot().queued_jobs.len(), 1);

    sleep(Duration::from_millis(200)).await;
    let snapshot = manager.snapshot();
    assert!(snapshot.queued_jobs.is_empty());
    assert_eq!(snapshot.busy_workers(), 1);
    assert_eq!(snapshot.utilization, 50.0);
}

#[tokio::test(start_paused = true)]
async fn test_no_double_dispatch_between_sweep_and_self_chaining() {
    let config = SimulationConfig::new(10, 60, 20).with_dispatch_interval_ms(15);
    let (manager, observer) = recorded_manager(3, config);
    manager.start();

    sleep(Duration::from_secs(2)).await;

    let snapshots = observer.snapshots();
    assert!(snapshots.len() > 100);
    for snapshot in &snapshots {
        assert_exclusive_ownership(snapshot);
        assert_utilization_consistent(snapshot);
    }

    // Every created job is exactly one of: completed, in flight, queued
    let last = manager.snapshot();
    let accounted = last.lead_time_metrics.completed
        + last.busy_workers() as u64
        + last.queued_jobs.len() as u64;
    assert_eq!(accounted, last.total_jobs_created);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_serializes_for_presentation() {
    let (manager, _) = recorded_manager(2, fixed_jobs(500));
    manager.start();
    manager.generate_job();
    manager.dispatch_idle_workers();
    sleep(Duration::from_millis(250)).await;

    let json: serde_json::Value =
        serde_json::from_str(&manager.snapshot().to_json().unwrap()).unwrap();
    assert_eq!(json["running"], true);
    assert_eq!(json["utilization"], 50.0);
    assert_eq!(json["workers"][0]["current_job"]["id"], 0);
    let progress = json["workers"][0]["progress"].as_f64().unwrap();
    assert!((49.0..=51.0).contains(&progress), "progress {}", progress);
    assert!(json["workers"][1]["current_job"].is_null());
}
