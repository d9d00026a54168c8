use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Spawns an actor for the connection.
/// Clients identify themselves per event (user_id in message payloads);
/// the upgrade itself is unauthenticated.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    tracing::debug!("WebSocket connection upgrading");
    ws.on_upgrade(move |socket| actor::run_connection(socket, state))
}
