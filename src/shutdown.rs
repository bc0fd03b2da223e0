use tokio::sync::watch;

/// Fires the stop signal observed by every [`Shutdown`] handle.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Cloneable view of the stop signal, raced against every wait point.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn subscribe(&self) -> Shutdown {
        Shutdown { rx: self.tx.subscribe() }
    }
}

impl Shutdown {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires. A dropped trigger never resolves it.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn every_handle_sees_the_trigger() {
        let (trigger, shutdown) = channel();
        let other = trigger.subscribe();
        assert!(!shutdown.is_cancelled());

        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), shutdown.cancelled()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), other.cancelled()).await.unwrap();
        assert!(other.is_cancelled());
    }

    #[tokio::test]
    async fn dropped_trigger_does_not_cancel() {
        let (trigger, shutdown) = channel();
        drop(trigger);
        let waited = tokio::time::timeout(Duration::from_millis(100), shutdown.cancelled()).await;
        assert!(waited.is_err());
        assert!(!shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn trigger_then_drop_still_cancels() {
        let (trigger, shutdown) = channel();
        trigger.trigger();
        drop(trigger);
        tokio::time::timeout(Duration::from_secs(1), shutdown.cancelled()).await.unwrap();
    }
}
