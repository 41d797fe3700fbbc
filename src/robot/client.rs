use crate::config::Config;
use crate::error::ApiError;
use crate::robot::endpoints::{ApiStyle, Endpoints, Route, RobotRequest};
use crate::robot::models::{
    Activity, CommandAck, CommandHandle, CompletionCheck, LastCommandResult, MapEntry, MapSource,
    PoseBody, Reading, RobotUpdateData, TaskId, BATTERY_SOC_PLACEHOLDER, COMMAND_STATE_IDLE,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Angular velocity sent with every navigation request.
const DEFAULT_ANGULAR_VELOCITY: f64 = 1.0;
/// Linear velocity used when the fleet imposes no speed limit.
const DEFAULT_LINEAR_VELOCITY: f64 = 1.0;

/// Client for the robot REST surface.
///
/// Public operations never fail loudly: every error is logged and collapsed
/// to `false` / `None`. The `try_*` variants expose the underlying
/// [`ApiError`] for callers that need to tell failures apart.
#[derive(Debug)]
pub struct RobotApi {
    http: reqwest::Client,
    endpoints: Endpoints,
    user: String,
    password: String,
    use_basic_auth: bool,
    completion: CompletionCheck,
    map_source: MapSource,
    map_placeholder: String,
    activities: Vec<Activity>,
    shelf_title: String,
    task_ids: RwLock<HashMap<String, TaskId>>,
}

impl RobotApi {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let fm = &config.fleet_manager;
        let http = reqwest::Client::builder()
            .timeout(fm.request_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoints: Endpoints::new(fm.api, fm.prefix.clone(), fm.route_root.clone()),
            user: fm.user.clone(),
            password: fm.password.clone(),
            use_basic_auth: fm.use_basic_auth,
            completion: fm.completion,
            map_source: fm.map_source,
            map_placeholder: fm.map_placeholder.clone(),
            activities: fm.activities.clone(),
            shelf_title: config.delivery.shelf_title.clone(),
            task_ids: RwLock::new(HashMap::new()),
        })
    }

    pub fn prefix(&self) -> &str {
        self.endpoints.prefix()
    }

    /// Last task id tracked for `robot_name`, if any.
    pub async fn task_id(&self, robot_name: &str) -> Option<TaskId> {
        self.task_ids.read().await.get(robot_name).cloned()
    }

    pub async fn check_connection(&self) -> bool {
        match self.fetch(RobotRequest::Health).await {
            Ok(_) => true,
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "Robot API connection check failed");
                false
            }
        }
    }

    pub async fn navigate(
        &self,
        robot_name: &str,
        pose: [f64; 3],
        map_name: &str,
        speed_limit: f64,
    ) -> bool {
        let result = self.try_navigate(robot_name, pose, map_name, speed_limit).await;
        report("navigate", robot_name, result).is_some()
    }

    pub async fn try_navigate(
        &self,
        robot_name: &str,
        pose: [f64; 3],
        map_name: &str,
        speed_limit: f64,
    ) -> Result<CommandHandle, ApiError> {
        let linear = if speed_limit > 0.0 {
            speed_limit
        } else {
            DEFAULT_LINEAR_VELOCITY
        };
        debug!(robot = %robot_name, ?pose, map = %map_name, linear, "Navigate");

        // The velocity request is fire-and-forget; only the move decides the outcome.
        let velocity = RobotRequest::SetVelocity {
            robot: robot_name,
            linear,
            angular: DEFAULT_ANGULAR_VELOCITY,
        };
        if let Err(e) = self.issue(robot_name, velocity).await {
            warn!(robot = %robot_name, error = %e, "Setting robot velocity failed");
        }

        let [x, y, yaw] = pose;
        self.issue(robot_name, RobotRequest::MoveToPose { robot: robot_name, x, y, yaw })
            .await
    }

    /// `activity` outside the configured capability list is refused before
    /// any request is made.
    pub async fn start_activity(&self, robot_name: &str, activity: &str, label: &str) -> bool {
        let Some(parsed) = Activity::parse(activity) else {
            warn!(robot = %robot_name, activity, "Unknown activity");
            return false;
        };
        let result = self.try_start_activity(robot_name, parsed, label).await;
        report("start_activity", robot_name, result).is_some()
    }

    pub async fn try_start_activity(
        &self,
        robot_name: &str,
        activity: Activity,
        label: &str,
    ) -> Result<CommandHandle, ApiError> {
        if !self.activities.contains(&activity) {
            return Err(ApiError::Unsupported(format!("activity `{activity}` is not enabled")));
        }

        let title = if label.is_empty() {
            self.shelf_title.as_str()
        } else {
            label
        };
        let request = match activity {
            Activity::Dock => RobotRequest::ReturnHome { robot: robot_name },
            Activity::Pickup => RobotRequest::DockShelf { title },
            Activity::Dropoff => RobotRequest::UndockShelf { title },
        };
        info!(robot = %robot_name, %activity, title, "Starting activity");
        self.issue(robot_name, request).await
    }

    pub async fn stop(&self, robot_name: &str) -> bool {
        let result = self.try_stop(robot_name).await;
        report("stop", robot_name, result).unwrap_or(false)
    }

    pub async fn try_stop(&self, robot_name: &str) -> Result<bool, ApiError> {
        self.clear_command_state(robot_name).await;
        let body = self.fetch(RobotRequest::Cancel { robot: robot_name }).await?;
        let ack: CommandAck = parse(&body)?;
        Ok(ack.success.unwrap_or(false))
    }

    pub async fn position(&self, robot_name: &str) -> Option<[f64; 3]> {
        let result = self.try_position(robot_name).await;
        report("position", robot_name, result)
    }

    pub async fn try_position(&self, robot_name: &str) -> Result<[f64; 3], ApiError> {
        let body = self.fetch(RobotRequest::Pose { robot: robot_name }).await?;
        let pose: PoseBody = self.reading(&body)?;
        Ok(pose.into())
    }

    pub async fn map(&self, robot_name: &str) -> Option<String> {
        let result = self.try_map(robot_name).await;
        report("map", robot_name, result)
    }

    pub async fn try_map(&self, robot_name: &str) -> Result<String, ApiError> {
        let body = self.fetch(RobotRequest::MapName { robot: robot_name }).await?;
        let reported = match self.endpoints.style {
            ApiStyle::Command => self.reading::<String>(&body)?,
            ApiStyle::Rest => parse::<LastCommandResult>(&body)?
                .name
                .ok_or_else(|| ApiError::shape("missing field `name`"))?,
        };

        match self.map_source {
            MapSource::Placeholder => Ok(self.map_placeholder.clone()),
            MapSource::Reported => Ok(reported),
            MapSource::MapList => {
                let body = self.fetch(RobotRequest::MapList { robot: robot_name }).await?;
                let maps: Vec<MapEntry> = self.reading(&body)?;
                maps.into_iter()
                    .find(|m| m.id == reported)
                    .map(|m| m.name)
                    .ok_or_else(|| ApiError::shape(format!("map id `{reported}` not in map list")))
            }
        }
    }

    /// Always the placeholder value; the robot API has no battery reading yet.
    pub async fn battery_soc(&self, _robot_name: &str) -> Option<f64> {
        Some(BATTERY_SOC_PLACEHOLDER)
    }

    /// Completion of the last command tracked for `robot_name`.
    pub async fn is_command_completed(&self, robot_name: &str) -> bool {
        let handle = CommandHandle {
            robot_name: robot_name.to_string(),
            task_id: self.task_id(robot_name).await,
        };
        self.is_handle_completed(&handle).await
    }

    pub async fn is_handle_completed(&self, handle: &CommandHandle) -> bool {
        let result = self.try_is_completed(handle).await;
        report("is_command_completed", &handle.robot_name, result).unwrap_or(false)
    }

    pub async fn try_is_completed(&self, handle: &CommandHandle) -> Result<bool, ApiError> {
        match self.completion {
            CompletionCheck::CommandState => {
                let request = RobotRequest::CommandState { robot: &handle.robot_name };
                let body = self.fetch(request).await?;
                let state: Vec<Value> = self.reading(&body)?;
                // Some bridges report the code as a float.
                let code = state
                    .first()
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ApiError::shape("command state code is not a number"))?;
                Ok(code == COMMAND_STATE_IDLE as f64)
            }
            CompletionCheck::CommandResult => {
                let Some(task_id) = &handle.task_id else {
                    return Err(ApiError::Unsupported(
                        "command_result completion needs a tracked task id".into(),
                    ));
                };
                match self.fetch(RobotRequest::CommandResult { task_id: &task_id.0 }).await {
                    Ok(_) => Ok(true),
                    // Anything but 200 means the task is still running.
                    Err(ApiError::BadStatus(_)) => Ok(false),
                    Err(e) => Err(e),
                }
            }
            CompletionCheck::SuccessField => {
                let body = self.fetch(RobotRequest::LastCommandResult).await?;
                let result: LastCommandResult = parse(&body)?;
                Ok(result.success)
            }
        }
    }

    /// Map, position and battery combined; `None` if any of them failed.
    pub async fn get_data(&self, robot_name: &str) -> Option<RobotUpdateData> {
        let map = self.map(robot_name).await?;
        let position = self.position(robot_name).await?;
        let battery_soc = self.battery_soc(robot_name).await?;
        Some(RobotUpdateData {
            robot_name: robot_name.to_string(),
            map,
            position,
            battery_soc,
            requires_replan: None,
        })
    }

    /// Send a command and remember the task id it was assigned.
    async fn issue(
        &self,
        robot_name: &str,
        request: RobotRequest<'_>,
    ) -> Result<CommandHandle, ApiError> {
        let route = self.resolve(request)?;
        self.clear_command_state(robot_name).await;
        let body = self.send(route).await?;

        // Not every bridge acknowledges with a task id.
        let ack: CommandAck = parse(&body).unwrap_or_default();
        let task_id = ack.id.map(TaskId);
        if let Some(id) = &task_id {
            self.task_ids
                .write()
                .await
                .insert(robot_name.to_string(), id.clone());
        }
        debug!(robot = %robot_name, task_id = ?task_id, "Command accepted");

        Ok(CommandHandle {
            robot_name: robot_name.to_string(),
            task_id,
        })
    }

    async fn clear_command_state(&self, robot_name: &str) {
        let Some(route) = self
            .endpoints
            .route(RobotRequest::ClearCommandState { robot: robot_name })
        else {
            return;
        };
        if let Err(e) = self.send(route).await {
            debug!(robot = %robot_name, error = %e, "Clearing command state failed");
        }
    }

    fn resolve(&self, request: RobotRequest<'_>) -> Result<Route, ApiError> {
        self.endpoints.route(request).ok_or_else(|| {
            ApiError::Unsupported(format!("{request:?} has no {:?} endpoint", self.endpoints.style))
        })
    }

    async fn fetch(&self, request: RobotRequest<'_>) -> Result<Vec<u8>, ApiError> {
        let route = self.resolve(request)?;
        self.send(route).await
    }

    async fn send(&self, route: Route) -> Result<Vec<u8>, ApiError> {
        debug!(method = %route.method, url = %route.url, "Robot API request");

        let mut builder = self.http.request(route.method, &route.url);
        if let Some(body) = &route.body {
            builder = builder.json(body);
        }
        if self.use_basic_auth {
            builder = builder.basic_auth(&self.user, Some(&self.password));
        }

        let response = builder.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::BadStatus(status));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Unwrap a reading according to the configured endpoint style.
    fn reading<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ApiError> {
        match self.endpoints.style {
            ApiStyle::Command => parse::<Vec<Reading<T>>>(body)?
                .into_iter()
                .next()
                .map(|r| r.value)
                .ok_or_else(|| ApiError::shape("empty reading list")),
            ApiStyle::Rest => parse(body),
        }
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::shape(e.to_string()))
}

fn report<T>(op: &'static str, robot_name: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(op, robot = %robot_name, kind = ?e.kind(), error = %e, "Robot API call failed");
            None
        }
    }
}
