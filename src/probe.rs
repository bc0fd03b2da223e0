use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::models::ProbeOutcome;

#[async_trait]
pub trait Probe: Send + Sync {
    /// One reachability check. Failures are outcomes, never errors.
    async fn probe(&self, target: &str) -> ProbeOutcome;
}

/// HEAD-request prober sharing one client across all monitors.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, target: &str) -> ProbeOutcome {
        let start = Instant::now();
        match self.client.head(target).send().await {
            Ok(resp) if resp.status().is_success() => {
                ProbeOutcome::up(start.elapsed().as_secs_f64() * 1000.0)
            }
            Ok(resp) => {
                debug!("{} DOWN (Status: {})", target, resp.status());
                ProbeOutcome::down()
            }
            Err(e) => {
                let kind = if e.is_timeout() { "Timeout" } else { "Error" };
                debug!("{} DOWN ({}: {})", target, kind, e);
                ProbeOutcome::down()
            }
        }
    }
}

/// Turns a host identifier into a request URL, defaulting to plain HTTP.
pub fn normalize_target(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
