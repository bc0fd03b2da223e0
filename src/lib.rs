pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod probe;
pub mod shutdown;
pub mod state;
pub mod supervisor;

pub use broadcast::{Subscription, UpdateBroadcaster};
pub use error::MonitorError;
pub use models::{HostStatus, ProbeOutcome, Status};
pub use monitor::HostMonitor;
pub use probe::{HttpProbe, Probe};
pub use state::StatusTable;
pub use supervisor::MonitorSupervisor;
