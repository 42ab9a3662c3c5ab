//! WebSocket endpoint for radar viewers

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use munakas_broadcaster::{BroadcastEnvelope, BroadcastHub, Client};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::CatalogProvider;

/// Shared state handed to every connection
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<BroadcastHub>,
    pub catalog: Arc<CatalogProvider>,
    pub current_map: watch::Receiver<Option<String>>,
}

pub fn router(state: AppState, ws_path: &str) -> Router {
    Router::new()
        .route(ws_path, get(ws_upgrade))
        .with_state(state)
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Send the catalog, join the fan-out and wait for the viewer to leave.
///
/// The catalog goes out before registration, so after that point the hub
/// is the only writer on this socket.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();
    let sink = sender.with(|text: String| futures::future::ready(Ok::<_, axum::Error>(Message::Text(text))));
    let mut client = Client::new(sink);

    let maps = state.catalog.snapshot().await;
    let map_name = state.current_map.borrow().clone();
    let catalog = BroadcastEnvelope::MapsList { maps, map_name };
    if let Err(e) = client.send_event(&catalog).await {
        warn!(client_id = client.id(), "Failed to send maps list: {}", e);
        client.close().await;
        return;
    }

    let id = state.hub.register(client).await;
    info!(client_id = id, "Viewer connected");

    // Inbound frames only matter as a liveness signal
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(client_id = id, "Read error: {}", e);
                break;
            }
        }
    }

    state.hub.deregister(id).await;
    info!(client_id = id, "Viewer disconnected");
}
