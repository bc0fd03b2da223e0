use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;

use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::broadcast::UpdateBroadcaster;
use crate::error::{MonitorError, Result};
use crate::models::HostStatus;
use crate::shutdown::Shutdown;
use crate::state::StatusTable;

#[derive(Clone)]
pub struct AppState {
    pub table: StatusTable,
    pub broadcaster: UpdateBroadcaster,
}

pub async fn get_stats(State(state): State<AppState>) -> Json<BTreeMap<String, HostStatus>> {
    Json(state.table.snapshot().await)
}

pub async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let stream = state
        .broadcaster
        .subscribe()
        .into_stream()
        .map(|payload| Ok::<_, Infallible>(Event::default().data(payload)));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(stream),
    )
}

pub fn create_router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/events", get(events))
        .route("/api/stats", get(get_stats))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| MonitorError::Bind { addr, source })
}

pub async fn start_server(listener: TcpListener, app: Router, shutdown: Shutdown) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Web Dashboard available at http://localhost:{}", addr.port());
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
