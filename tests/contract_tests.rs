use kachaka_fleet_adapter::delivery::models::{
    DeliveryRequest, DeliveryResult, ResultMessage, ResultStatus,
};
use kachaka_fleet_adapter::robot::endpoints::{ApiStyle, Endpoints, RobotRequest};
use kachaka_fleet_adapter::robot::models::{Activity, CompletionCheck, MapSource, RobotUpdateData};
use kachaka_fleet_adapter::{Config, ConfigError};
use serde_json::json;

const MINIMAL_CONFIG: &str = r#"
fleet_manager:
  prefix: "http://192.168.1.100:26502/"
  user: some_user
  password: some_password
rmf_fleet:
  name: kachaka
  robots:
    kachaka1:
      charger: charger1
"#;

#[test]
fn test_dispenser_request_contract() {
    // Extra fields from the fleet framework shouldn't break parsing
    let json_data = json!({
        "time": { "sec": 1, "nanosec": 0 },
        "request_guid": "req-1",
        "target_guid": "dispenser-A",
        "transporter_type": "kachaka",
        "items": []
    });

    let request: DeliveryRequest =
        serde_json::from_value(json_data).expect("Failed to deserialize DeliveryRequest");
    assert_eq!(request.request_guid, "req-1");
    assert_eq!(request.target_guid, "dispenser-A");
    assert_eq!(request.transporter_type, "kachaka");
}

#[test]
fn test_delivery_result_serialization() {
    let result = DeliveryResult::IngestorResult(ResultMessage {
        status: ResultStatus::Failed,
        time: chrono::Utc::now(),
        request_guid: "req-2".to_string(),
        source_guid: "ingestor-B".to_string(),
    });

    let json_val = serde_json::to_value(&result).expect("Failed to serialize");
    assert_eq!(json_val["topic"], "ingestor_result");
    assert_eq!(json_val["status"], "FAILED");
    assert_eq!(json_val["request_guid"], "req-2");
    assert_eq!(json_val["source_guid"], "ingestor-B");
    assert!(json_val["time"].is_string());
}

#[test]
fn test_robot_update_data_omits_unknown_replan() {
    let data = RobotUpdateData {
        robot_name: "kachaka1".to_string(),
        map: "L1".to_string(),
        position: [1.0, 2.0, 0.5],
        battery_soc: 0.8,
        requires_replan: None,
    };

    let json_val = serde_json::to_value(&data).unwrap();
    assert_eq!(json_val["position"], json!([1.0, 2.0, 0.5]));
    assert!(json_val.get("requires_replan").is_none());
}

#[test]
fn test_config_defaults() {
    let config = Config::from_yaml_str(MINIMAL_CONFIG).expect("minimal config");

    assert_eq!(config.fleet_manager.timeout, 5.0);
    assert_eq!(config.fleet_manager.api, ApiStyle::Command);
    assert_eq!(config.fleet_manager.route_root, "kachaka/");
    assert_eq!(config.fleet_manager.completion, CompletionCheck::CommandState);
    assert_eq!(config.fleet_manager.map_source, MapSource::Placeholder);
    assert_eq!(config.fleet_manager.map_placeholder, "L1");
    assert_eq!(
        config.fleet_manager.activities,
        vec![Activity::Dock, Activity::Pickup, Activity::Dropoff]
    );
    assert!(!config.fleet_manager.use_basic_auth);
    assert_eq!(config.delivery.poll_interval, 1.0);
    assert_eq!(config.delivery.poll_timeout, 300.0);
    assert_eq!(config.server.address, "0.0.0.0:3003");
    assert_eq!(config.delivery_robot(), "kachaka1");
}

#[test]
fn test_config_explicit_choices() {
    let yaml = r#"
fleet_manager:
  prefix: "http://robot/"
  user: u
  password: p
  api: rest
  completion: command_result
  map_source: map_list
  activities: [dock]
rmf_fleet:
  name: kachaka
delivery:
  robot: shelf_bot
  poll_timeout: 30
"#;
    let config = Config::from_yaml_str(yaml).expect("config");

    assert_eq!(config.fleet_manager.api, ApiStyle::Rest);
    assert_eq!(config.fleet_manager.completion, CompletionCheck::CommandResult);
    assert_eq!(config.fleet_manager.map_source, MapSource::MapList);
    assert_eq!(config.fleet_manager.activities, vec![Activity::Dock]);
    assert_eq!(config.delivery.poll_timeout, 30.0);
    assert_eq!(config.delivery_robot(), "shelf_bot");
}

#[test]
fn test_delivery_robot_falls_back_to_fleet_name() {
    let yaml = MINIMAL_CONFIG.replace("  robots:\n    kachaka1:\n      charger: charger1\n", "");
    let config = Config::from_yaml_str(&yaml).expect("config");
    assert_eq!(config.delivery_robot(), "kachaka");
}

#[test]
fn test_config_rejects_empty_prefix() {
    let yaml = MINIMAL_CONFIG.replace("http://192.168.1.100:26502/", "");
    assert!(matches!(
        Config::from_yaml_str(&yaml),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_rejects_non_positive_poll_interval() {
    let yaml = format!("{MINIMAL_CONFIG}delivery:\n  poll_interval: 0\n");
    assert!(matches!(
        Config::from_yaml_str(&yaml),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_rejects_out_of_range_durations() {
    let mut config = Config::from_yaml_str(MINIMAL_CONFIG).unwrap();
    config.fleet_manager.timeout = 1e20;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::from_yaml_str(MINIMAL_CONFIG).unwrap();
    config.delivery.poll_timeout = f64::MAX;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_rejects_rest_api_with_command_state_completion() {
    let yaml = MINIMAL_CONFIG.replace("  password: some_password\n", "  password: some_password\n  api: rest\n");
    assert!(matches!(
        Config::from_yaml_str(&yaml),
        Err(ConfigError::Invalid(_))
    ));

    let yaml = MINIMAL_CONFIG.replace(
        "  password: some_password\n",
        "  password: some_password\n  api: rest\n  completion: success_field\n",
    );
    assert!(Config::from_yaml_str(&yaml).is_ok());
}

#[test]
fn test_config_requires_fleet_manager() {
    let yaml = "rmf_fleet:\n  name: kachaka\n";
    assert!(matches!(
        Config::from_yaml_str(yaml),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_config_debug_redacts_password() {
    let config = Config::from_yaml_str(MINIMAL_CONFIG).unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("some_password"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_prefix_is_concatenated_verbatim() {
    let endpoints = Endpoints::new(ApiStyle::Command, "http://robot:26502/", "kachaka/");

    let pose = endpoints.route(RobotRequest::Pose { robot: "kachaka1" }).unwrap();
    assert_eq!(pose.method, reqwest::Method::GET);
    assert_eq!(pose.url, "http://robot:26502/kachaka/kachaka1/pose");

    let result = endpoints
        .route(RobotRequest::CommandResult { task_id: "t-1" })
        .unwrap();
    assert_eq!(result.url, "http://robot:26502/command_result?task_id=t-1");
    assert_eq!(result.body, Some(json!({ "id": "t-1" })));

    // No slash is inserted when the prefix lacks one.
    let bare = Endpoints::new(ApiStyle::Command, "http://robot", "kachaka/");
    assert_eq!(
        bare.route(RobotRequest::Health).unwrap().url,
        "http://robotkachaka/get_robot_serial_number"
    );
}

#[test]
fn test_rest_style_lacks_command_state_endpoints() {
    let endpoints = Endpoints::new(ApiStyle::Rest, "http://robot/", "kachaka/");

    assert!(endpoints.route(RobotRequest::ReturnHome { robot: "r" }).is_none());
    assert!(endpoints.route(RobotRequest::CommandState { robot: "r" }).is_none());
    assert!(endpoints
        .route(RobotRequest::ClearCommandState { robot: "r" })
        .is_none());

    let cancel = endpoints.route(RobotRequest::Cancel { robot: "r" }).unwrap();
    assert_eq!(cancel.method, reqwest::Method::GET);
    assert_eq!(cancel.url, "http://robot/r/cancel_command");
}
