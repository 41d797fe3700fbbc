use crate::error::ConfigError;
use crate::robot::endpoints::ApiStyle;
use crate::robot::models::{Activity, CompletionCheck, MapSource};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Environment variables with this prefix override file values,
/// e.g. `KACHAKA_FLEET_MANAGER__PREFIX`.
const ENV_PREFIX: &str = "KACHAKA";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub fleet_manager: FleetManagerConfig,
    pub rmf_fleet: RmfFleetConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection details of the robot REST surface.
#[derive(Clone, Deserialize)]
pub struct FleetManagerConfig {
    /// Concatenated verbatim with request paths; keep the trailing slash.
    pub prefix: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    #[serde(default)]
    pub api: ApiStyle,
    #[serde(default = "default_route_root")]
    pub route_root: String,
    #[serde(default)]
    pub completion: CompletionCheck,
    #[serde(default)]
    pub map_source: MapSource,
    #[serde(default = "default_map_placeholder")]
    pub map_placeholder: String,
    #[serde(default = "default_activities")]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub use_basic_auth: bool,
}

impl std::fmt::Debug for FleetManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetManagerConfig")
            .field("prefix", &self.prefix)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("api", &self.api)
            .field("route_root", &self.route_root)
            .field("completion", &self.completion)
            .field("map_source", &self.map_source)
            .field("map_placeholder", &self.map_placeholder)
            .field("activities", &self.activities)
            .field("use_basic_auth", &self.use_basic_auth)
            .finish()
    }
}

impl FleetManagerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RmfFleetConfig {
    pub name: String,
    /// Robot entries belong to the fleet framework; only the names are used.
    #[serde(default)]
    pub robots: BTreeMap<String, IgnoredAny>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub robot: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: f64,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: f64,
    #[serde(default)]
    pub shelf_title: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            robot: None,
            poll_interval: default_poll_interval(),
            poll_timeout: default_poll_timeout(),
            shelf_title: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
        }
    }
}

fn default_timeout() -> f64 {
    5.0
}
fn default_route_root() -> String {
    "kachaka/".to_string()
}
fn default_map_placeholder() -> String {
    "L1".to_string()
}
fn default_activities() -> Vec<Activity> {
    vec![Activity::Dock, Activity::Pickup, Activity::Dropoff]
}
fn default_poll_interval() -> f64 {
    1.0
}
fn default_poll_timeout() -> f64 {
    300.0
}
fn default_server_address() -> String {
    "0.0.0.0:3003".to_string()
}

impl Config {
    /// Load a YAML config file, applying `KACHAKA_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Yaml))
            .add_source(env_source())
            .build()?;
        Self::finish(settings)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: config::Config) -> Result<Self, ConfigError> {
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fleet_manager.prefix.is_empty() {
            return Err(ConfigError::Invalid("fleet_manager.prefix is empty".into()));
        }
        if self.rmf_fleet.name.is_empty() {
            return Err(ConfigError::Invalid("rmf_fleet.name is empty".into()));
        }
        for (key, value) in [
            ("fleet_manager.timeout", self.fleet_manager.timeout),
            ("delivery.poll_interval", self.delivery.poll_interval),
            ("delivery.poll_timeout", self.delivery.poll_timeout),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{key} must be positive, got {value}")));
            }
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(ConfigError::Invalid(format!("{key} is out of range, got {value}")));
            }
        }
        if self.fleet_manager.api == ApiStyle::Rest
            && self.fleet_manager.completion == CompletionCheck::CommandState
        {
            return Err(ConfigError::Invalid(
                "completion `command_state` needs `api: command`; the rest API has no command state"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Robot that serves dispenser/ingestor requests for this fleet.
    pub fn delivery_robot(&self) -> String {
        self.delivery
            .robot
            .clone()
            .or_else(|| self.rmf_fleet.robots.keys().next().cloned())
            .unwrap_or_else(|| self.rmf_fleet.name.clone())
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
