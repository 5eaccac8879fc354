// Manager - owns the queue, the worker pool and the aggregate metrics

mod timers;

use crate::application::panic_guard::execute_guarded;
use crate::application::shutdown::{shutdown_channel, ShutdownSender};
use crate::application::worker::{self, Worker};
use crate::domain::error::DomainError;
use crate::domain::{
    Job, JobId, JobQueue, JobView, LeadTimeMetrics, ProcessingTimeBounds, RunEpoch,
    SimulationConfig, Snapshot,
};
use crate::error::{AppError, Result};
use crate::port::random_source::ThreadRandomSource;
use crate::port::time_provider::SystemTimeProvider;
use crate::port::{RandomSource, StateObserver, TimeProvider};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Simulation engine facade handed to the presentation layer.
///
/// All state lives behind one mutex; every public operation is a single
/// critical section that ends with exactly one observer notification per
/// mutation. Simulated work and the two periodic timers run as tokio tasks
/// that re-enter the critical section only to mutate.
pub struct Manager {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager").finish_non_exhaustive()
    }
}

struct EngineInner {
    state: Mutex<EngineState>,
    observer: Arc<dyn StateObserver>,
    time_provider: Arc<dyn TimeProvider>,
    random_source: Arc<dyn RandomSource>,
    config: SimulationConfig,
    bounds: ProcessingTimeBounds,
    runtime: Handle,
}

struct EngineState {
    running: bool,
    epoch: RunEpoch,
    queue: JobQueue,
    workers: Vec<Worker>,
    job_counter: u64,
    metrics: Aggregates,
    timers: Option<ShutdownSender>,
}

/// Running aggregates, reset on `stop()`
#[derive(Debug, Default)]
struct Aggregates {
    max_queue_size_observed: usize,
    total_lead_time_ms: u64,
    max_lead_time_ms: u64,
    completed_job_count: u64,
}

impl Aggregates {
    fn record(&mut self, lead_time_ms: u64) {
        self.total_lead_time_ms += lead_time_ms;
        self.max_lead_time_ms = self.max_lead_time_ms.max(lead_time_ms);
        self.completed_job_count += 1;
    }

    fn lead_time_metrics(&self) -> LeadTimeMetrics {
        let average_ms = if self.completed_job_count == 0 {
            0.0
        } else {
            self.total_lead_time_ms as f64 / self.completed_job_count as f64
        };
        LeadTimeMetrics {
            max_ms: self.max_lead_time_ms,
            average_ms,
            completed: self.completed_job_count,
        }
    }
}

impl Manager {
    /// Create a manager with the system clock and a thread-local RNG
    ///
    /// # Arguments
    ///
    /// * `worker_count` - Pool size (>= 1)
    /// * `observer` - Receives a snapshot after every mutation
    /// * `config` - Processing bounds and timer periods
    pub fn new(
        worker_count: usize,
        observer: Arc<dyn StateObserver>,
        config: SimulationConfig,
    ) -> Result<Self> {
        Self::with_ports(
            worker_count,
            observer,
            config,
            Arc::new(SystemTimeProvider),
            Arc::new(ThreadRandomSource),
        )
    }

    /// Create a manager with injected clock and random source
    ///
    /// Must be called from inside a tokio runtime; the runtime is captured to
    /// spawn timers and simulated work. The observer receives the initial
    /// (stopped, idle) snapshot before this returns.
    pub fn with_ports(
        worker_count: usize,
        observer: Arc<dyn StateObserver>,
        config: SimulationConfig,
        time_provider: Arc<dyn TimeProvider>,
        random_source: Arc<dyn RandomSource>,
    ) -> Result<Self> {
        if worker_count < 1 {
            return Err(DomainError::InvalidConfig(format!(
                "worker_count must be >= 1 (got {})",
                worker_count
            ))
            .into());
        }
        config.validate()?;
        let bounds = config.bounds()?;

        let runtime = Handle::try_current().map_err(|e| {
            AppError::Runtime(format!("Manager must be created inside a tokio runtime: {}", e))
        })?;

        let state = EngineState {
            running: false,
            epoch: 0,
            queue: JobQueue::new(),
            workers: (0..worker_count).map(Worker::new).collect(),
            job_counter: 0,
            metrics: Aggregates::default(),
            timers: None,
        };

        debug!(
            worker_count,
            min_processing_time_ms = config.min_processing_time_ms,
            max_processing_time_ms = config.max_processing_time_ms,
            job_creation_interval_ms = config.job_creation_interval_ms,
            "Manager created"
        );

        let inner = Arc::new(EngineInner {
            state: Mutex::new(state),
            observer,
            time_provider,
            random_source,
            config,
            bounds,
            runtime,
        });
        // Initial state, so observers can render before the first start()
        inner.notify(&inner.lock());

        Ok(Self { inner })
    }

    /// Start job generation and the dispatch sweep (no-op if running)
    pub fn start(&self) {
        self.inner.start();
    }

    /// Cancel timers, drop pending jobs and reset aggregates (no-op if stopped)
    ///
    /// Jobs already held by workers run to completion; their lead times belong
    /// to a finished run and are not recorded.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn worker_count(&self) -> usize {
        self.inner.lock().workers.len()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.inner.config
    }

    /// Point-in-time view of the engine (no side effects)
    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.lock();
        self.inner.snapshot_of(&state)
    }

    /// Create one job and enqueue it; what each generation tick does.
    ///
    /// Returns `None` when the manager is not running.
    pub fn generate_job(&self) -> Option<JobId> {
        self.inner.generate_job(None)
    }

    /// Nudge every idle worker to check the queue; what each sweep tick does.
    ///
    /// Returns how many workers picked up a job.
    pub fn dispatch_idle_workers(&self) -> usize {
        self.inner.dispatch_idle_workers(None)
    }

    /// Let one worker try to take the next job. `Ok(false)` if it is busy or
    /// the queue is empty.
    pub fn check_for_work(&self, worker_id: usize) -> Result<bool> {
        Ok(self.inner.check_for_work(worker_id)?)
    }

    /// Fold one completed job's lead time into the aggregates
    pub fn update_lead_time_metrics(&self, lead_time_ms: u64) {
        let mut state = self.inner.lock();
        state.metrics.record(lead_time_ms);
        self.inner.notify(&state);
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        // Timers and in-flight jobs hold the engine alive: cancel the timers
        // and drop the backlog so self-chaining ends with the current jobs
        let mut state = self.inner.lock();
        if let Some(timers) = state.timers.take() {
            timers.shutdown();
        }
        state.running = false;
        let discarded = state.queue.clear();
        debug!(epoch = state.epoch, discarded_jobs = discarded, "Manager dropped");
    }
}

impl EngineInner {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // Observers run under panic guard, so a poisoned lock still holds
        // consistent state
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now_millis(&self) -> i64 {
        self.time_provider.now_millis()
    }

    fn snapshot_of(&self, state: &EngineState) -> Snapshot {
        let now = self.now_millis();
        let workers: Vec<_> = state.workers.iter().map(|w| w.snapshot(now)).collect();
        let busy = workers.iter().filter(|w| w.busy).count();

        Snapshot {
            running: state.running,
            epoch: state.epoch,
            queued_jobs: state.queue.iter().map(JobView::from).collect(),
            utilization: busy as f64 / workers.len() as f64 * 100.0,
            workers,
            total_jobs_created: state.job_counter,
            max_queue_size_observed: state.metrics.max_queue_size_observed,
            lead_time_metrics: state.metrics.lead_time_metrics(),
        }
    }

    /// Push a fresh snapshot; called once per mutation, under the lock
    fn notify(&self, state: &EngineState) {
        let snapshot = self.snapshot_of(state);
        let observer = &self.observer;
        let _ = execute_guarded(AssertUnwindSafe(|| observer.on_state_change(&snapshot)));
    }

    fn is_current(state: &EngineState, expected_epoch: Option<RunEpoch>) -> bool {
        state.running && expected_epoch.map_or(true, |epoch| epoch == state.epoch)
    }

    fn is_live(&self, epoch: RunEpoch) -> bool {
        Self::is_current(&self.lock(), Some(epoch))
    }

    fn start(self: &Arc<Self>) {
        let mut state = self.lock();
        if state.running {
            debug!(epoch = state.epoch, "Start requested while running, ignoring");
            return;
        }

        state.running = true;
        state.epoch += 1;
        let epoch = state.epoch;

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        state.timers = Some(shutdown_tx);
        self.runtime.spawn(timers::generation_loop(
            Arc::clone(self),
            epoch,
            shutdown_rx.clone(),
        ));
        self.runtime
            .spawn(timers::dispatch_loop(Arc::clone(self), epoch, shutdown_rx));

        info!(
            epoch,
            workers = state.workers.len(),
            job_creation_interval_ms = self.config.job_creation_interval_ms,
            dispatch_interval_ms = self.config.dispatch_interval_ms,
            "Simulation started"
        );
        self.notify(&state);
    }

    fn stop(&self) {
        let mut state = self.lock();
        if !state.running {
            debug!(epoch = state.epoch, "Stop requested while stopped, ignoring");
            return;
        }

        state.running = false;
        if let Some(timers) = state.timers.take() {
            timers.shutdown();
        }
        let discarded = state.queue.clear();
        state.metrics = Aggregates::default();

        let in_flight = state.workers.iter().filter(|w| w.is_busy()).count();
        info!(
            epoch = state.epoch,
            discarded_jobs = discarded,
            in_flight_jobs = in_flight,
            "Simulation stopped"
        );
        self.notify(&state);
    }

    fn generate_job(&self, expected_epoch: Option<RunEpoch>) -> Option<JobId> {
        let mut state = self.lock();
        if !Self::is_current(&state, expected_epoch) {
            return None;
        }

        let id = state.job_counter;
        state.job_counter += 1;
        let processing_time_ms = draw_processing_time(&self.bounds, self.random_source.as_ref());
        let job = Job::new(id, state.epoch, processing_time_ms, self.now_millis());

        state.queue.enqueue(job);
        let queue_len = state.queue.len();
        let metrics = &mut state.metrics;
        metrics.max_queue_size_observed = metrics.max_queue_size_observed.max(queue_len);

        debug!(job_id = id, processing_time_ms, queue_len, "Job enqueued");
        self.notify(&state);
        Some(id)
    }

    fn dispatch_idle_workers(self: &Arc<Self>, expected_epoch: Option<RunEpoch>) -> usize {
        let idle: Vec<usize> = {
            let state = self.lock();
            if expected_epoch.is_some() && !Self::is_current(&state, expected_epoch) {
                return 0;
            }
            state
                .workers
                .iter()
                .filter(|w| !w.is_busy())
                .map(Worker::id)
                .collect()
        };

        // Each check re-validates under the lock; a worker that became busy
        // in between simply declines
        idle.into_iter()
            .filter(|&id| matches!(self.check_for_work(id), Ok(true)))
            .count()
    }

    fn check_for_work(self: &Arc<Self>, worker_id: usize) -> crate::domain::error::Result<bool> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let worker = state
            .workers
            .get_mut(worker_id)
            .ok_or(DomainError::WorkerNotFound(worker_id))?;
        if worker.is_busy() {
            return Ok(false);
        }

        let job = match state.queue.dequeue() {
            Ok(job) => job,
            Err(DomainError::EmptyQueue) => return Ok(false),
            Err(e) => return Err(e),
        };
        let job_id = job.id;
        let processing = Duration::from_millis(job.processing_time_ms);

        worker.assign(job, self.now_millis())?;
        self.runtime
            .spawn(process_job(Arc::clone(self), worker_id, processing));

        debug!(
            worker_id,
            job_id,
            processing_time_ms = processing.as_millis() as u64,
            "Worker started job"
        );
        self.notify(state);
        Ok(true)
    }

    fn report_progress(&self, worker_id: usize) {
        let state = self.lock();
        if state.workers.get(worker_id).is_some_and(Worker::is_busy) {
            self.notify(&state);
        }
    }

    fn complete_job(self: &Arc<Self>, worker_id: usize) {
        {
            let mut guard = self.lock();
            let state = &mut *guard;
            let now = self.now_millis();

            let Some(worker) = state.workers.get_mut(worker_id) else {
                warn!(worker_id, "Completion for unknown worker");
                return;
            };
            let (job_id, job_epoch, lead_time_ms) = match worker.complete_current(now) {
                Ok(job) => (job.id, job.epoch, job.lead_time_ms().unwrap_or(0)),
                Err(e) => {
                    warn!(worker_id, error = %e, "Completion without a running job");
                    return;
                }
            };

            if Self::is_current(state, Some(job_epoch)) {
                state.metrics.record(lead_time_ms);
                debug!(worker_id, job_id, lead_time_ms, "Job completed");
                self.notify(state);
            } else {
                debug!(
                    worker_id,
                    job_id,
                    job_epoch,
                    current_epoch = state.epoch,
                    "Job from a finished run completed, lead time not recorded"
                );
            }

            state.workers[worker_id].release();
            self.notify(state);
        }

        // Self-chain onto the next pending job
        if let Err(e) = self.check_for_work(worker_id) {
            warn!(worker_id, error = %e, "Self-dispatch failed");
        }
    }
}

/// Draw a simulated duration from `[min, max)`; fixed bounds always yield `min`
fn draw_processing_time(bounds: &ProcessingTimeBounds, rng: &dyn RandomSource) -> u64 {
    if bounds.is_fixed() {
        return bounds.min_ms();
    }
    rng.sample_range(bounds.min_ms(), bounds.max_ms())
}

/// Worker task: simulated delay, then completion inside the critical section
async fn process_job(inner: Arc<EngineInner>, worker_id: usize, processing: Duration) {
    let progress_interval = inner.config.progress_interval();
    worker::simulate(processing, progress_interval, || inner.report_progress(worker_id)).await;
    inner.complete_job(worker_id);
}
