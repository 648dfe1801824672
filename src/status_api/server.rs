use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::StreamExt;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::status_api::config::StatusApiConfig;
use crate::status_api::types::{
    ApiStateResponse, HealthResponse, ServerEvent, SkySnapshot, API_VERSION,
};

#[derive(Clone)]
struct HttpState {
    latest_snapshot: Arc<Mutex<Option<SkySnapshot>>>,
    event_tx: broadcast::Sender<ServerEvent>,
}

pub struct StatusApiHandle {
    bind_addr: SocketAddr,
    latest_snapshot: Arc<Mutex<Option<SkySnapshot>>>,
    event_tx: broadcast::Sender<ServerEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_task: Option<JoinHandle<()>>,
}

impl StatusApiHandle {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn publish_snapshot(&self, snapshot: SkySnapshot) {
        if let Ok(mut slot) = self.latest_snapshot.lock() {
            *slot = Some(snapshot.clone());
        }
        let _ = self.event_tx.send(ServerEvent::Snapshot(snapshot));
    }

    pub fn latest_snapshot(&self) -> Option<SkySnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|snapshot| snapshot.clone())
    }

    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.server_task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StatusApiHandle {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

pub async fn start_status_api(config: &StatusApiConfig) -> Result<Option<StatusApiHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let bind_addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid status api bind addr: {}", config.bind_addr))?;

    if !bind_addr.ip().is_loopback() {
        bail!("status api must bind to loopback; got {}", bind_addr);
    }

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind status api on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to read local bind address")?;

    let (event_tx, _) = broadcast::channel::<ServerEvent>(64);
    let latest_snapshot = Arc::new(Mutex::new(None));
    let app = router(HttpState {
        latest_snapshot: Arc::clone(&latest_snapshot),
        event_tx: event_tx.clone(),
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        if let Err(err) = server.await {
            log::error!("status api server stopped with error: {err}");
        }
    });

    log::info!("status api listening on {local_addr}");
    Ok(Some(StatusApiHandle {
        bind_addr: local_addr,
        latest_snapshot,
        event_tx,
        shutdown_tx: Some(shutdown_tx),
        server_task: Some(server_task),
    }))
}

fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/state", get(state_handler))
        .route("/ws", get(ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        api_version: API_VERSION.to_string(),
    })
}

async fn state_handler(State(state): State<HttpState>) -> Json<ApiStateResponse> {
    Json(ApiStateResponse {
        api_version: API_VERSION.to_string(),
        snapshot: state.latest(),
    })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<HttpState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_client(socket, state))
}

impl HttpState {
    fn latest(&self) -> Option<SkySnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|snapshot| snapshot.clone())
    }
}

/// Streams snapshots to one client, starting with the current one. Only the
/// newest snapshot matters, so a lagging client skips straight to it.
async fn ws_client(mut socket: WebSocket, state: HttpState) {
    let mut event_rx = state.event_tx.subscribe();

    if let Some(initial) = state.latest() {
        if send_snapshot(&mut socket, initial).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let snapshot = match event {
                    Ok(ServerEvent::Snapshot(snapshot)) => Some(snapshot),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::debug!("status api client lagged by {skipped} snapshots");
                        state.latest()
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if let Some(snapshot) = snapshot {
                    if send_snapshot(&mut socket, snapshot).await.is_err() {
                        break;
                    }
                }
            }
            msg = socket.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
}

async fn send_snapshot(socket: &mut WebSocket, snapshot: SkySnapshot) -> Result<()> {
    let payload = serde_json::to_string(&ServerEvent::Snapshot(snapshot))
        .context("failed to serialize ws event")?;
    socket
        .send(Message::Text(payload))
        .await
        .context("failed to send ws event")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SkySnapshot {
        SkySnapshot {
            background: "#ff7d75".to_string(),
            foreground: "#000000".to_string(),
            sunrise: "06:00".to_string(),
            sunset: "18:00".to_string(),
            cloud: 0.0,
            seconds_since_midnight: 21_600.0,
            timestamp_ms: 1_718_917_200_000,
        }
    }

    #[tokio::test]
    async fn disabled_config_starts_nothing() {
        let handle = start_status_api(&StatusApiConfig::default()).await.unwrap();
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn refuses_non_loopback_bind() {
        let config = StatusApiConfig {
            enabled: true,
            bind_addr: "0.0.0.0:0".to_string(),
        };
        assert!(start_status_api(&config).await.is_err());
    }

    #[tokio::test]
    async fn published_snapshot_is_served_as_state() {
        let config = StatusApiConfig {
            enabled: true,
            bind_addr: "127.0.0.1:0".to_string(),
        };
        let handle = start_status_api(&config).await.unwrap().unwrap();
        assert!(handle.bind_addr().ip().is_loopback());
        assert_eq!(handle.latest_snapshot(), None);

        handle.publish_snapshot(snapshot());
        assert_eq!(handle.latest_snapshot(), Some(snapshot()));

        let state = HttpState {
            latest_snapshot: Arc::clone(&handle.latest_snapshot),
            event_tx: handle.event_tx.clone(),
        };
        let Json(response) = state_handler(State(state)).await;
        assert_eq!(response.api_version, API_VERSION);
        assert_eq!(response.snapshot, Some(snapshot()));

        handle.shutdown().await;
    }

    #[test]
    fn events_are_tagged() {
        let json = serde_json::to_value(ServerEvent::Snapshot(snapshot())).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["payload"]["background"], "#ff7d75");
    }
}
