use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Parser)]
#[command(name = "hostpulse", version, about = "Live host reachability dashboard")]
pub struct Cli {
    /// Comma-separated list of hosts to monitor
    #[arg(long, default_value = "actiontarget.com, ksl.com, github.com")]
    pub hosts: String,

    /// Port for the web dashboard
    #[arg(long, default_value_t = 8080, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Monitoring interval in milliseconds
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Live feed cadence in milliseconds
    #[arg(long, default_value_t = default_broadcast_ms(), value_parser = clap::value_parser!(u64).range(1..))]
    pub broadcast_interval: u64,

    /// Per-probe timeout in milliseconds
    #[arg(long, default_value_t = default_probe_timeout_ms(), value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_timeout: u64,

    /// Directory holding the dashboard page
    #[arg(long, default_value = "public")]
    pub public_dir: PathBuf,
}

fn default_broadcast_ms() -> u64 { 500 }
fn default_probe_timeout_ms() -> u64 { 5000 }

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub hosts: Vec<String>,
    pub interval: Duration,
    pub probe_timeout: Duration,
    pub broadcast_interval: Duration,
    pub port: u16,
    pub public_dir: PathBuf,
}

impl MonitorConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let hosts = parse_hosts(&cli.hosts);
        if hosts.is_empty() {
            return Err(MonitorError::NoHosts);
        }

        let interval = Duration::from_millis(cli.interval);
        Ok(Self {
            hosts,
            interval,
            probe_timeout: probe_timeout(Duration::from_millis(cli.probe_timeout), interval),
            broadcast_interval: Duration::from_millis(cli.broadcast_interval),
            port: cli.port,
            public_dir: cli.public_dir.clone(),
        })
    }
}

/// A probe must retire before its loop's next tick, so the timeout is kept
/// strictly below the interval.
pub fn probe_timeout(requested: Duration, interval: Duration) -> Duration {
    if requested < interval {
        requested
    } else {
        interval * 3 / 4
    }
}

/// Splits a comma-separated host list, trimming entries and dropping blanks
/// and repeats. First occurrence wins the position.
pub fn parse_hosts(raw: &str) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for host in raw.split(',').map(str::trim).filter(|h| !h.is_empty()) {
        if !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_string());
        }
    }
    hosts
}
