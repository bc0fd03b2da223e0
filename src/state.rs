use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::{HostStatus, ProbeOutcome};

/// Latest status per host. Each monitor writes only its own key, but all
/// readers and writers go through one table-wide lock so a snapshot is a
/// single point-in-time view.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    inner: Arc<RwLock<BTreeMap<String, HostStatus>>>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an INIT entry for `host` unless one already exists.
    pub async fn register(&self, host: &str) {
        let mut table = self.inner.write().await;
        table.entry(host.to_string()).or_insert_with(|| HostStatus::new(host));
    }

    /// Stamps a probe result into the host's entry. Returns the updated copy,
    /// or `None` when the host was never registered.
    pub async fn record(
        &self,
        host: &str,
        outcome: ProbeOutcome,
        checked_at: DateTime<Utc>,
    ) -> Option<HostStatus> {
        let mut table = self.inner.write().await;
        let entry = table.get_mut(host)?;
        entry.apply(outcome, checked_at);
        Some(entry.clone())
    }

    pub async fn get(&self, host: &str) -> Option<HostStatus> {
        self.inner.read().await.get(host).cloned()
    }

    pub async fn snapshot(&self) -> BTreeMap<String, HostStatus> {
        self.inner.read().await.clone()
    }

    /// Serializes the whole table under one read lock. `Ok(None)` when empty.
    pub async fn snapshot_json(&self) -> serde_json::Result<Option<String>> {
        let table = self.inner.read().await;
        if table.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&*table).map(Some)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    #[tokio::test]
    async fn register_is_idempotent() {
        let table = StatusTable::new();
        table.register("a.com").await;
        table.record("a.com", ProbeOutcome::up(5.0), Utc::now()).await;
        table.register("a.com").await;

        let entry = table.get("a.com").await.unwrap();
        assert_eq!(entry.status, Status::Up);
        assert_eq!(entry.check_count, 1);
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn record_ignores_unknown_hosts() {
        let table = StatusTable::new();
        assert!(table.record("ghost", ProbeOutcome::down(), Utc::now()).await.is_none());
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn empty_table_has_no_snapshot() {
        let table = StatusTable::new();
        assert_eq!(table.snapshot_json().await.unwrap(), None);
    }

    #[tokio::test]
    async fn snapshot_is_keyed_by_host() {
        let table = StatusTable::new();
        table.register("b.com").await;
        table.register("a.com").await;
        table.record("b.com", ProbeOutcome::down(), Utc::now()).await;

        let json = table.snapshot_json().await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a.com", "b.com"]);
        assert_eq!(value["a.com"]["status"], "INIT");
        assert_eq!(value["b.com"]["status"], "DOWN");
        assert_eq!(value["b.com"]["checkCount"], 1);
    }

    #[tokio::test]
    async fn clones_share_one_table() {
        let table = StatusTable::new();
        let writer = table.clone();
        writer.register("a.com").await;
        assert_eq!(table.snapshot().await.len(), 1);
    }
}
