use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub pose: [f64; 3],
    pub map_name: String,
    #[serde(default)]
    pub speed_limit: f64,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub activity: String,
    #[serde(default)]
    pub label: String,
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let connected = state.api.check_connection().await;

    // `None` while a pickup/dropoff is in flight.
    let delivery = state.relay.try_state();
    let robot_name = delivery
        .as_ref()
        .map(|d| d.robot_name.clone())
        .unwrap_or_else(|| state.config.delivery_robot());
    let robot = if connected {
        state.api.get_data(&robot_name).await
    } else {
        None
    };

    Json(serde_json::json!({
        "fleet": state.relay.fleet_name(),
        "connected": connected,
        "robot": robot_name,
        "docked": delivery.as_ref().map(|d| d.docked),
        "busy": delivery.is_none(),
        "state": robot,
    }))
}

pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Path(robot_name): Path<String>,
    Json(payload): Json<NavigateRequest>,
) -> impl IntoResponse {
    let success = state
        .api
        .navigate(&robot_name, payload.pose, &payload.map_name, payload.speed_limit)
        .await;
    Json(serde_json::json!({ "success": success }))
}

pub async fn start_activity(
    State(state): State<Arc<AppState>>,
    Path(robot_name): Path<String>,
    Json(payload): Json<ActivityRequest>,
) -> impl IntoResponse {
    let success = state
        .api
        .start_activity(&robot_name, &payload.activity, &payload.label)
        .await;
    Json(serde_json::json!({ "success": success }))
}

pub async fn stop(
    State(state): State<Arc<AppState>>,
    Path(robot_name): Path<String>,
) -> impl IntoResponse {
    let success = state.api.stop(&robot_name).await;
    Json(serde_json::json!({ "success": success }))
}

pub async fn get_robot_state(
    State(state): State<Arc<AppState>>,
    Path(robot_name): Path<String>,
) -> impl IntoResponse {
    match state.api.get_data(&robot_name).await {
        Some(data) => (StatusCode::OK, Json(data)).into_response(),
        None => unavailable(&robot_name),
    }
}

pub async fn get_position(
    State(state): State<Arc<AppState>>,
    Path(robot_name): Path<String>,
) -> impl IntoResponse {
    match state.api.position(&robot_name).await {
        Some(position) => Json(serde_json::json!({ "position": position })).into_response(),
        None => unavailable(&robot_name),
    }
}

pub async fn command_completed(
    State(state): State<Arc<AppState>>,
    Path(robot_name): Path<String>,
) -> impl IntoResponse {
    let completed = state.api.is_command_completed(&robot_name).await;
    Json(serde_json::json!({ "completed": completed }))
}

fn unavailable(robot_name: &str) -> axum::response::Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "status": "error",
            "message": format!("Robot {robot_name} did not answer")
        })),
    )
        .into_response()
}
