//! Mapping from adapter requests to the robot's HTTP surface.
//!
//! Two endpoint shapes exist in the field:
//!
//! | Style | Commands | Readings |
//! |---|---|---|
//! | [`ApiStyle::Command`] | `PUT {robot}/command` with `{method, args}` | `[{"value": ..}]` |
//! | [`ApiStyle::Rest`] | one `POST`/`GET` path per command | plain JSON objects |
//!
//! `route` returns `None` when a style has no endpoint for a request.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStyle {
    #[default]
    Command,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RobotRequest<'a> {
    Health,
    SetVelocity { robot: &'a str, linear: f64, angular: f64 },
    MoveToPose { robot: &'a str, x: f64, y: f64, yaw: f64 },
    ReturnHome { robot: &'a str },
    Cancel { robot: &'a str },
    ClearCommandState { robot: &'a str },
    CommandState { robot: &'a str },
    Pose { robot: &'a str },
    MapName { robot: &'a str },
    MapList { robot: &'a str },
    DockShelf { title: &'a str },
    UndockShelf { title: &'a str },
    CommandResult { task_id: &'a str },
    LastCommandResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl Route {
    fn new(method: Method, url: String) -> Self {
        Self { method, url, body: None }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Where the robot HTTP surface lives: `prefix` plus the bridge's route root.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub style: ApiStyle,
    prefix: String,
    root: String,
}

impl Endpoints {
    pub fn new(style: ApiStyle, prefix: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            style,
            prefix: prefix.into(),
            root: root.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn under_root(&self, path: &str) -> String {
        format!("{}{}{}", self.prefix, self.root, path)
    }

    fn command(&self, robot: &str, method: &str, args: Value) -> Route {
        Route::new(Method::PUT, self.under_root(&format!("{robot}/command")))
            .with_body(json!({ "method": method, "args": args }))
    }

    pub fn route(&self, request: RobotRequest<'_>) -> Option<Route> {
        use RobotRequest::*;

        // Shared by both styles.
        match request {
            Health => return Some(Route::new(Method::GET, self.under_root("get_robot_serial_number"))),
            DockShelf { title } => {
                return Some(
                    Route::new(Method::POST, self.under_root("dock_shelf"))
                        .with_body(json!({ "title": title })),
                )
            }
            UndockShelf { title } => {
                return Some(
                    Route::new(Method::POST, self.under_root("undock_shelf"))
                        .with_body(json!({ "title": title })),
                )
            }
            CommandResult { task_id } => {
                return Some(
                    Route::new(
                        Method::POST,
                        format!("{}command_result?task_id={}", self.prefix, task_id),
                    )
                    .with_body(json!({ "id": task_id })),
                )
            }
            LastCommandResult => {
                return Some(Route::new(Method::GET, self.under_root("get_last_command_result")))
            }
            _ => {}
        }

        match self.style {
            ApiStyle::Command => Some(match request {
                SetVelocity { robot, linear, angular } => self.command(
                    robot,
                    "set_robot_velocity",
                    json!({ "linear": linear, "angular": angular }),
                ),
                MoveToPose { robot, x, y, yaw } => {
                    self.command(robot, "move_to_pose", json!({ "x": x, "y": y, "yaw": yaw }))
                }
                ReturnHome { robot } => self.command(robot, "return_home", json!({})),
                Cancel { robot } => self.command(robot, "cancel_command", json!({})),
                ClearCommandState { robot } => {
                    Route::new(Method::DELETE, self.under_root(&format!("{robot}/command_state")))
                }
                CommandState { robot } => {
                    Route::new(Method::GET, self.under_root(&format!("{robot}/command_state")))
                }
                Pose { robot } => Route::new(Method::GET, self.under_root(&format!("{robot}/pose"))),
                MapName { robot } => {
                    Route::new(Method::GET, self.under_root(&format!("{robot}/map_name")))
                }
                MapList { robot } => {
                    Route::new(Method::GET, self.under_root(&format!("{robot}/map_list")))
                }
                _ => return None,
            }),
            ApiStyle::Rest => match request {
                SetVelocity { robot, linear, angular } => Some(
                    Route::new(Method::POST, format!("{}{robot}/set_robot_velocity", self.prefix))
                        .with_body(json!({ "linear": linear, "angular": angular })),
                ),
                MoveToPose { robot, x, y, yaw } => Some(
                    Route::new(Method::POST, format!("{}{robot}/move_to_pose", self.prefix))
                        .with_body(json!({ "x": x, "y": y, "yaw": yaw })),
                ),
                Cancel { robot } => Some(Route::new(
                    Method::GET,
                    format!("{}{robot}/cancel_command", self.prefix),
                )),
                Pose { robot } => Some(Route::new(
                    Method::GET,
                    format!("{}{robot}/get_robot_pose", self.prefix),
                )),
                // This bridge reports the map name alongside the last command result.
                MapName { .. } => {
                    Some(Route::new(Method::GET, self.under_root("get_last_command_result")))
                }
                _ => None,
            },
        }
    }
}
