use std::io::Error as IoError;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("No hosts specified. Please use the --hosts flag.")]
    NoHosts,
    #[error("Failed to bind dashboard on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: IoError,
    },
    #[error("Failed to build HTTP probe client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Dashboard server failed: {0:#}")]
    Serve(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
