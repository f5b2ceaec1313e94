use std::sync::Arc;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use courier_core::envelope::RawRecord;
use courier_core::ids::UserId;
use courier_dispatch::{BatchCoordinator, BatchReport};

use crate::client::{self, ClientRegistry};

/// Server configuration.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_send_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9280,
            max_send_queue: 256,
        }
    }
}

/// Shared application state passed to axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<BatchCoordinator>,
    pub client_registry: Arc<ClientRegistry>,
}

/// Build the axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/v1/batch", post(batch_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Create and start the server. The returned handle keeps the background
/// tasks alive for as long as it is held.
pub async fn start(
    config: ServerConfig,
    coordinator: Arc<BatchCoordinator>,
    client_registry: Arc<ClientRegistry>,
) -> Result<ServerHandle, std::io::Error> {
    let cleanup = client::start_cleanup_task(
        Arc::clone(&client_registry),
        std::time::Duration::from_secs(60),
    );

    let state = AppState {
        coordinator,
        client_registry,
    };

    let router = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "courier server started");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server,
        _cleanup: cleanup,
    })
}

/// Handle returned by [`start`].
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
    _cleanup: tokio::task::JoinHandle<()>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsQuery {
    user_id: String,
}

/// WebSocket upgrade. The connection is bound to the user named in the
/// query string for the whole of its lifetime.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user_id = UserId::from_raw(query.user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

async fn handle_socket(socket: WebSocket, user_id: UserId, state: AppState) {
    let (client_id, rx) = state.client_registry.register(user_id.clone());
    tracing::info!(client_id = %client_id, user_id = %user_id, "websocket client connected");

    client::handle_ws_connection(socket, client_id, rx, state.client_registry).await;
}

/// Batch intake: the queue infrastructure posts an ordered array of raw
/// records and gets back the partial-batch acknowledgment report. Record
/// failures never fail the request.
async fn batch_handler(
    State(state): State<AppState>,
    Json(records): Json<Vec<RawRecord>>,
) -> Json<BatchReport> {
    let outcome = state.coordinator.process_batch(records).await;
    Json(outcome.report())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "clients": state.client_registry.count(),
    }))
}
