use serde::{Deserialize, Serialize};
use std::fmt;

/// Command-state code the robot reports when it is waiting for requests.
pub const COMMAND_STATE_IDLE: i64 = 1;

/// Placeholder state of charge; the robot API does not expose the battery yet.
pub const BATTERY_SOC_PLACEHOLDER: f64 = 0.8;

/// Snapshot of one robot, rebuilt on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotUpdateData {
    pub robot_name: String,
    pub map: String,
    /// `[x, y, theta]` in the robot's own frame.
    pub position: [f64; 3],
    pub battery_soc: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_replan: Option<bool>,
}

/// Server-assigned handle for an in-flight command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returned by every command-issuing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHandle {
    pub robot_name: String,
    pub task_id: Option<TaskId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Dock,
    Pickup,
    Dropoff,
}

impl Activity {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "dock" => Some(Activity::Dock),
            "pickup" => Some(Activity::Pickup),
            "dropoff" => Some(Activity::Dropoff),
            _ => None,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Dock => write!(f, "dock"),
            Activity::Pickup => write!(f, "pickup"),
            Activity::Dropoff => write!(f, "dropoff"),
        }
    }
}

/// How "the last command has finished" is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCheck {
    /// `command_state[0].value[0] == 1`
    #[default]
    CommandState,
    /// `command_result?task_id=..` answers 200
    CommandResult,
    /// `get_last_command_result` reports `success: true`
    SuccessField,
}

/// Where the map name returned by `map()` comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSource {
    /// Query the robot, then answer with the configured placeholder.
    #[default]
    Placeholder,
    Reported,
    MapList,
}

// Wire shapes of the robot HTTP surface.

/// The command-style bridge wraps every reading as `[{"value": ..}]`.
#[derive(Debug, Deserialize)]
pub struct Reading<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct PoseBody {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl From<PoseBody> for [f64; 3] {
    fn from(p: PoseBody) -> Self {
        [p.x, p.y, p.theta]
    }
}

#[derive(Debug, Deserialize)]
pub struct MapEntry {
    pub id: String,
    pub name: String,
}

/// Acknowledgement of a command request.
#[derive(Debug, Default, Deserialize)]
pub struct CommandAck {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LastCommandResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub name: Option<String>,
}
