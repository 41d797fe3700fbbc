#![allow(dead_code)]

use kachaka_fleet_adapter::{create_router, AppState, Config, DeliveryRelay, RobotApi};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FLEET: &str = "kachaka";
pub const ROBOT: &str = "kachaka1";

pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
}

/// `prefix` is used verbatim, so it carries the trailing slash.
pub fn prefix_for(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

/// A prefix nothing listens on.
pub async fn unreachable_prefix() -> String {
    let server = MockServer::start().await;
    let prefix = prefix_for(&server);
    drop(server);
    prefix
}

pub fn test_config(prefix: &str) -> Config {
    let yaml = format!(
        r#"
fleet_manager:
  prefix: "{prefix}"
  user: some_user
  password: some_password
  timeout: 2.0
rmf_fleet:
  name: {FLEET}
  robots:
    {ROBOT}:
      charger: charger1
delivery:
  poll_interval: 0.01
  poll_timeout: 2.0
"#
    );
    Config::from_yaml_str(&yaml).expect("test config should parse")
}

pub fn api_for(config: &Config) -> Arc<RobotApi> {
    Arc::new(RobotApi::from_config(config).expect("Failed to create robot client"))
}

pub fn relay_for(config: &Config) -> (Arc<RobotApi>, DeliveryRelay) {
    let api = api_for(config);
    let relay = DeliveryRelay::new(config, api.clone(), CancellationToken::new());
    (api, relay)
}

pub fn spawn_app(config: Config) -> TestApp {
    let api = api_for(&config);
    let relay = Arc::new(DeliveryRelay::new(&config, api.clone(), CancellationToken::new()));
    let state = Arc::new(AppState { config, api, relay });
    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

pub fn robot_path(suffix: &str) -> String {
    format!("/kachaka/{ROBOT}/{suffix}")
}

pub async fn mount_clear_command_state(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path(robot_path("command_state")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

pub async fn mount_command_state(server: &MockServer, code: i64) {
    Mock::given(method("GET"))
        .and(path(robot_path("command_state")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "value": [code, ""] }])))
        .mount(server)
        .await;
}

pub async fn mount_pose(server: &MockServer, x: f64, y: f64, theta: f64) {
    Mock::given(method("GET"))
        .and(path(robot_path("pose")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "value": { "x": x, "y": y, "theta": theta } }])),
        )
        .mount(server)
        .await;
}

pub async fn mount_map_name(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(robot_path("map_name")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "value": name }])))
        .mount(server)
        .await;
}

pub async fn mount_shelf(server: &MockServer, endpoint: &str, status: u16, task_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/kachaka/{endpoint}")))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "id": task_id })))
        .mount(server)
        .await;
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default()
}
