use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value of `lastCheck` for a host that has never been probed.
pub const NEVER_CHECKED: &str = "0001-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Init,
    Up,
    Down,
}

/// Result of a single probe, before it is stamped into the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub status: Status,
    pub latency_ms: f64,
}

impl ProbeOutcome {
    pub fn up(latency_ms: f64) -> Self {
        Self { status: Status::Up, latency_ms: round_latency(latency_ms) }
    }

    pub fn down() -> Self {
        Self { status: Status::Down, latency_ms: 0.0 }
    }
}

pub fn round_latency(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStatus {
    pub host: String,
    pub status: Status,
    pub latency_ms: f64,
    // A single HEAD request cannot measure loss, so this stays 0.
    pub packet_loss: f64,
    #[serde(serialize_with = "serialize_last_check", deserialize_with = "deserialize_last_check")]
    pub last_check: Option<DateTime<Utc>>,
    pub check_count: u64,
}

impl HostStatus {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            status: Status::Init,
            latency_ms: 0.0,
            packet_loss: 0.0,
            last_check: None,
            check_count: 0,
        }
    }

    pub fn apply(&mut self, outcome: ProbeOutcome, checked_at: DateTime<Utc>) {
        // INIT is only ever the pre-probe state.
        (self.status, self.latency_ms) = match outcome.status {
            Status::Up => (Status::Up, outcome.latency_ms),
            Status::Down | Status::Init => (Status::Down, 0.0),
        };
        self.packet_loss = 0.0;
        self.last_check = Some(match self.last_check {
            Some(prev) if prev > checked_at => prev,
            _ => checked_at,
        });
        self.check_count += 1;
    }
}

fn serialize_last_check<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        None => serializer.serialize_str(NEVER_CHECKED),
    }
}

fn deserialize_last_check<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.starts_with("0001-01-01") {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(serde::de::Error::custom)
}
