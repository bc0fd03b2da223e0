use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::models::Status;
use crate::probe::{normalize_target, Probe};
use crate::shutdown::Shutdown;
use crate::state::StatusTable;

/// Polling loop for exactly one host. Owns the writes to that host's entry.
pub struct HostMonitor {
    host: String,
    target: String,
    interval: Duration,
    table: StatusTable,
    prober: Arc<dyn Probe>,
}

impl HostMonitor {
    pub fn new(host: impl Into<String>, interval: Duration, table: StatusTable, prober: Arc<dyn Probe>) -> Self {
        let host = host.into();
        Self {
            target: normalize_target(&host),
            host,
            interval,
            table,
            prober,
        }
    }

    /// Publishes the INIT entry, then spawns the polling loop.
    pub async fn start(self, shutdown: Shutdown) -> JoinHandle<()> {
        self.table.register(&self.host).await;
        info!("Starting monitoring for host: {} at {:?} intervals", self.host, self.interval);
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, shutdown: Shutdown) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Status::Init;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // In-flight probes are not interrupted; the client timeout retires them.
            let outcome = self.prober.probe(&self.target).await;
            let Some(updated) = self.table.record(&self.host, outcome, Utc::now()).await else {
                break;
            };

            if updated.status != last {
                match updated.status {
                    Status::Down => warn!("[CHANGE] {} -> DOWN", self.host),
                    _ => info!("[CHANGE] {} -> UP ({:.2}ms)", self.host, updated.latency_ms),
                }
                last = updated.status;
            }
        }
        info!("Stopped monitoring for host: {}", self.host);
    }
}
