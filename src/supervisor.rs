use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{MonitorError, Result};
use crate::monitor::HostMonitor;
use crate::probe::Probe;
use crate::shutdown::{self, ShutdownTrigger};
use crate::state::StatusTable;

/// Owns one [`HostMonitor`] per configured host.
///
/// Monitors stop only through [`MonitorSupervisor::shutdown`]; dropping the
/// supervisor detaches them and they keep running.
pub struct MonitorSupervisor {
    trigger: ShutdownTrigger,
    tasks: Vec<JoinHandle<()>>,
}

impl MonitorSupervisor {
    /// Every host has its INIT entry in `table` by the time this returns.
    pub async fn start(
        hosts: &[String],
        interval: Duration,
        table: StatusTable,
        prober: Arc<dyn Probe>,
    ) -> Result<Self> {
        if hosts.is_empty() {
            return Err(MonitorError::NoHosts);
        }

        let (trigger, shutdown) = shutdown::channel();
        let mut tasks = Vec::with_capacity(hosts.len());
        for host in hosts {
            let monitor = HostMonitor::new(host.clone(), interval, table.clone(), Arc::clone(&prober));
            tasks.push(monitor.start(shutdown.clone()).await);
        }

        info!("Started {} host monitors", tasks.len());
        Ok(Self { trigger, tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signals every loop to stop and waits for them to exit.
    pub async fn shutdown(self) {
        self.trigger.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("Host monitor task failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_hosts;
    use crate::models::{ProbeOutcome, Status};
    use crate::monitor::tests::FixedProbe;

    #[tokio::test(start_paused = true)]
    async fn one_entry_per_unique_trimmed_host() {
        let hosts = parse_hosts("example.com, example.com ,");
        let table = StatusTable::new();
        let supervisor = MonitorSupervisor::start(
            &hosts,
            Duration::from_secs(1),
            table.clone(),
            FixedProbe::new(ProbeOutcome::down()),
        )
        .await
        .unwrap();

        assert_eq!(supervisor.len(), 1);
        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["example.com"]);
        assert_eq!(snapshot["example.com"].status, Status::Init);
        supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn empty_host_list_is_rejected() {
        let result = MonitorSupervisor::start(
            &[],
            Duration::from_secs(1),
            StatusTable::new(),
            FixedProbe::new(ProbeOutcome::down()),
        )
        .await;
        assert!(matches!(result, Err(MonitorError::NoHosts)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_supervisor_keeps_monitoring() {
        let hosts = parse_hosts("a.com");
        let table = StatusTable::new();
        let probe = FixedProbe::new(ProbeOutcome::down());
        let supervisor =
            MonitorSupervisor::start(&hosts, Duration::from_secs(1), table.clone(), probe).await.unwrap();
        drop(supervisor);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(table.get("a.com").await.unwrap().check_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_survive_shutdown() {
        let hosts = parse_hosts("a.com,b.com,c.com");
        let table = StatusTable::new();
        let probe = FixedProbe::new(ProbeOutcome::up(3.0));
        let supervisor =
            MonitorSupervisor::start(&hosts, Duration::from_secs(1), table.clone(), probe).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        supervisor.shutdown().await;

        let snapshot = table.snapshot().await;
        assert_eq!(snapshot.len(), 3);
        for status in snapshot.values() {
            assert_eq!(status.status, Status::Up);
            assert_eq!(status.check_count, 2);
        }
    }
}
