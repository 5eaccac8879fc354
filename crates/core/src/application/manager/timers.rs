// Periodic tasks of one run: job generation and the dispatch sweep

use super::EngineInner;
use crate::application::shutdown::ShutdownToken;
use crate::domain::RunEpoch;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

/// First tick one period after start, like a browser interval timer
fn periodic(period: Duration) -> Interval {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

/// Create a job every `job_creation_interval` until the run ends
pub(super) async fn generation_loop(
    inner: Arc<EngineInner>,
    epoch: RunEpoch,
    mut shutdown: ShutdownToken,
) {
    let period = inner.config.job_creation_interval();
    let mut tick = periodic(period);
    debug!(epoch, period_ms = period.as_millis() as u64, "Generation timer started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            _ = tick.tick() => {
                // A tick racing with stop() finds a stale epoch and ends the loop
                if inner.generate_job(Some(epoch)).is_none() {
                    break;
                }
            }
        }
    }

    debug!(epoch, "Generation timer stopped");
}

/// Nudge idle workers every `dispatch_interval`.
///
/// Covers jobs enqueued while every worker was busy and no completion has
/// happened since.
pub(super) async fn dispatch_loop(
    inner: Arc<EngineInner>,
    epoch: RunEpoch,
    mut shutdown: ShutdownToken,
) {
    let period = inner.config.dispatch_interval();
    let mut tick = periodic(period);
    debug!(epoch, period_ms = period.as_millis() as u64, "Dispatch sweep started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            _ = tick.tick() => {
                if !inner.is_live(epoch) {
                    break;
                }
                let dispatched = inner.dispatch_idle_workers(Some(epoch));
                if dispatched > 0 {
                    debug!(epoch, dispatched, "Dispatch sweep assigned jobs");
                }
            }
        }
    }

    debug!(epoch, "Dispatch sweep stopped");
}
