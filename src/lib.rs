pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod robot;

pub use config::Config;
pub use delivery::DeliveryRelay;
pub use error::{ApiError, ConfigError, ErrorKind};
pub use robot::RobotApi;
use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: Arc<RobotApi>,
    pub relay: Arc<DeliveryRelay>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // fleet framework bridge: dispenser/ingestor requests in, results out
    let delivery_routes = Router::new()
        .route(
            "/dispenser_requests",
            post(delivery::delivery_routes::dispenser_request),
        )
        .route(
            "/ingestor_requests",
            post(delivery::delivery_routes::ingestor_request),
        )
        .route("/ws/results", get(delivery::delivery_routes::results_ws));

    // fleet adapter commands, one robot at a time
    let robot_routes = Router::new()
        .route("/status", get(robot::command_routes::get_status))
        .route(
            "/robots/{name}/navigate",
            post(robot::command_routes::navigate),
        )
        .route(
            "/robots/{name}/activity",
            post(robot::command_routes::start_activity),
        )
        .route("/robots/{name}/stop", post(robot::command_routes::stop))
        .route(
            "/robots/{name}/state",
            get(robot::command_routes::get_robot_state),
        )
        .route(
            "/robots/{name}/position",
            get(robot::command_routes::get_position),
        )
        .route(
            "/robots/{name}/command_completed",
            get(robot::command_routes::command_completed),
        );

    Router::new()
        .route("/", get(root))
        .merge(delivery_routes)
        .merge(robot_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Kachaka Fleet Adapter - v0.1.0"
}
