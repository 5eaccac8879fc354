// State Observer Port - the engine's only outbound interface

use crate::domain::Snapshot;
use tokio::sync::mpsc;

/// Receives a fresh snapshot after every engine mutation, in mutation order,
/// starting with the initial state at construction.
///
/// Called from inside the engine's critical section: implementations must
/// return quickly and must not call back into the Manager. Forward to a
/// channel (see [`snapshot_channel`]) when the consumer needs to react.
pub trait StateObserver: Send + Sync {
    fn on_state_change(&self, snapshot: &Snapshot);
}

/// Adapts a closure into a [`StateObserver`]
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: Fn(&Snapshot) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> StateObserver for FnObserver<F>
where
    F: Fn(&Snapshot) + Send + Sync,
{
    fn on_state_change(&self, snapshot: &Snapshot) {
        (self.0)(snapshot)
    }
}

/// Forwards snapshots over an unbounded channel (order preserving)
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl StateObserver for ChannelObserver {
    fn on_state_change(&self, snapshot: &Snapshot) {
        // Receiver gone means nobody is rendering anymore
        let _ = self.tx.send(snapshot.clone());
    }
}

/// Create a channel observer and the receiving end
pub fn snapshot_channel() -> (ChannelObserver, mpsc::UnboundedReceiver<Snapshot>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelObserver { tx }, rx)
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every snapshot it is handed
    #[derive(Default)]
    pub struct RecordingObserver {
        snapshots: Mutex<Vec<Snapshot>>,
    }

    impl RecordingObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn snapshots(&self) -> Vec<Snapshot> {
            self.snapshots.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        pub fn count(&self) -> usize {
            self.snapshots.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        pub fn last(&self) -> Option<Snapshot> {
            self.snapshots
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .last()
                .cloned()
        }
    }

    impl StateObserver for RecordingObserver {
        fn on_state_change(&self, snapshot: &Snapshot) {
            self.snapshots
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(snapshot.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LeadTimeMetrics;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn empty_snapshot(total: u64) -> Snapshot {
        Snapshot {
            running: false,
            epoch: 0,
            queued_jobs: vec![],
            workers: vec![],
            total_jobs_created: total,
            max_queue_size_observed: 0,
            lead_time_metrics: LeadTimeMetrics::default(),
            utilization: 0.0,
        }
    }

    #[test]
    fn test_fn_observer_invokes_closure() {
        let calls = AtomicUsize::new(0);
        let observer = FnObserver::new(|s: &Snapshot| {
            calls.fetch_add(s.total_jobs_created as usize, Ordering::SeqCst);
        });
        observer.on_state_change(&empty_snapshot(3));
        observer.on_state_change(&empty_snapshot(4));
        assert_eq!(calls.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_channel_observer_preserves_order() {
        let (observer, mut rx) = snapshot_channel();
        for i in 0..5 {
            observer.on_state_change(&empty_snapshot(i));
        }
        for i in 0..5 {
            assert_eq!(rx.recv().await.unwrap().total_jobs_created, i);
        }
    }

    #[test]
    fn test_channel_observer_tolerates_dropped_receiver() {
        let (observer, rx) = snapshot_channel();
        drop(rx);
        observer.on_state_change(&empty_snapshot(1));
    }
}
