use crate::delivery::models::{DispenserRequest, IngestorRequest};
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Requests are handled on their own task so the caller is not held for the
// length of a shelf command; the outcome arrives on /ws/results.

pub async fn dispenser_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DispenserRequest>,
) -> impl IntoResponse {
    let relay = state.relay.clone();
    tokio::spawn(async move {
        relay.handle_dispenser_request(&payload).await;
    });
    accepted()
}

pub async fn ingestor_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IngestorRequest>,
) -> impl IntoResponse {
    let relay = state.relay.clone();
    tokio::spawn(async move {
        relay.handle_ingestor_request(&payload).await;
    });
    accepted()
}

fn accepted() -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "accepted"
        })),
    )
}

pub async fn results_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_results_socket(socket, state))
}

async fn handle_results_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.relay.subscribe();

    loop {
        match rx.recv().await {
            Ok(result) => {
                let Ok(msg) = serde_json::to_string(&result) else {
                    continue;
                };
                if socket.send(Message::Text(msg.into())).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Result subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
