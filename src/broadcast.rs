use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::shutdown::Shutdown;
use crate::state::StatusTable;

/// Pushes full table snapshots to any number of live subscribers.
///
/// Every subscriber gets its own loop and its own one-slot channel. A tick
/// that finds the slot still occupied means the subscriber fell behind, and
/// it is dropped instead of queued.
#[derive(Clone)]
pub struct UpdateBroadcaster {
    table: StatusTable,
    interval: Duration,
    shutdown: Shutdown,
    live: Arc<AtomicUsize>,
}

/// Receiving end of one subscription. Dropping it ends the subscriber loop.
pub struct Subscription {
    rx: mpsc::Receiver<String>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub fn into_stream(self) -> impl Stream<Item = String> + Send + 'static {
        stream::unfold(self.rx, |mut rx| async move { rx.recv().await.map(|payload| (payload, rx)) })
    }
}

enum Delivery {
    Sent,
    Skipped,
    Closed,
}

impl UpdateBroadcaster {
    pub fn new(table: StatusTable, interval: Duration, shutdown: Shutdown) -> Self {
        Self {
            table,
            interval,
            shutdown,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn subscribers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let this = self.clone();
        tokio::spawn(async move { this.run_subscriber(tx).await });
        Subscription { rx }
    }

    async fn run_subscriber(self, tx: mpsc::Sender<String>) {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Subscriber connected ({} live)", live);

        if !matches!(self.deliver(&tx).await, Delivery::Closed) {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = self.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Delivery::Closed = self.deliver(&tx).await {
                            break;
                        }
                    }
                }
            }
        }

        let live = self.live.fetch_sub(1, Ordering::SeqCst) - 1;
        info!("Client disconnected from event stream ({} live)", live);
    }

    async fn deliver(&self, tx: &mpsc::Sender<String>) -> Delivery {
        let payload = match self.table.snapshot_json().await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Delivery::Skipped,
            Err(e) => {
                warn!("Error serializing snapshot: {}", e);
                return Delivery::Skipped;
            }
        };

        match tx.try_send(payload) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => {
                warn!("Dropping subscriber that fell behind");
                Delivery::Closed
            }
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}
