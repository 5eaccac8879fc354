//! Session - owns the current Manager and rebuilds it on configuration change

use anyhow::{Context, Result};
use queuesim_core::domain::Snapshot;
use queuesim_core::port::random_source::{SeededRandomSource, ThreadRandomSource};
use queuesim_core::port::time_provider::SystemTimeProvider;
use queuesim_core::port::{snapshot_channel, RandomSource};
use queuesim_core::{Manager, SimulationConfig};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

pub struct Session {
    worker_count: usize,
    seed: Option<u64>,
    manager: Manager,
    snapshots: mpsc::UnboundedReceiver<Snapshot>,
}

impl Session {
    pub fn new(worker_count: usize, config: SimulationConfig, seed: Option<u64>) -> Result<Self> {
        let (manager, snapshots) = Self::build(worker_count, config, seed)?;
        Ok(Self {
            worker_count,
            seed,
            manager,
            snapshots,
        })
    }

    // A fresh channel per Manager: in-flight jobs of a replaced Manager
    // report into a dropped receiver instead of the live dashboard
    fn build(
        worker_count: usize,
        config: SimulationConfig,
        seed: Option<u64>,
    ) -> Result<(Manager, mpsc::UnboundedReceiver<Snapshot>)> {
        let random_source: Arc<dyn RandomSource> = match seed {
            Some(seed) => Arc::new(SeededRandomSource::new(seed)),
            None => Arc::new(ThreadRandomSource),
        };
        let (observer, snapshots) = snapshot_channel();
        let manager = Manager::with_ports(
            worker_count,
            Arc::new(observer),
            config,
            Arc::new(SystemTimeProvider),
            random_source,
        )
        .context("Invalid simulation configuration")?;
        Ok((manager, snapshots))
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Next pushed snapshot of the current Manager
    pub async fn next_snapshot(&mut self) -> Option<Snapshot> {
        self.snapshots.recv().await
    }

    /// Start/stop intent
    pub fn toggle(&self) {
        if self.manager.is_running() {
            self.manager.stop();
        } else {
            self.manager.start();
        }
    }

    /// Configuration-change intent: build the replacement first so a rejected
    /// config leaves the current run untouched. The new Manager starts stopped.
    pub fn reconfigure(&mut self, config: SimulationConfig) -> Result<()> {
        let (manager, snapshots) = Self::build(self.worker_count, config, self.seed)?;
        self.manager.stop();
        self.manager = manager;
        self.snapshots = snapshots;
        info!(config = ?self.manager.config(), "Simulation reconfigured");
        Ok(())
    }

    /// Capture the final state, then stop
    pub fn shutdown(&self) -> Snapshot {
        let last = self.manager.snapshot();
        self.manager.stop();
        last
    }
}
