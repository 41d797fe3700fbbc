use super::models::{
    DeliveryKind, DeliveryRequest, DeliveryResult, DispenserRequest, IngestorRequest,
    ResultMessage, ResultStatus,
};
use super::poll::{wait_for_completion, PollOutcome, PollSettings};
use crate::config::Config;
use crate::error::ErrorKind;
use crate::robot::models::TaskId;
use crate::robot::RobotApi;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffered results before slow WebSocket subscribers start lagging.
pub const RESULT_CHANNEL_CAPACITY: usize = 100;

/// Delivery state of the robot that serves this fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryState {
    pub robot_name: String,
    /// True between a successful pickup and the next successful dropoff.
    pub docked: bool,
    pub last_task: Option<TaskId>,
}

/// What happened to the shelf command behind an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The robot API refused or never received the command, or its
    /// completion cannot be checked.
    Refused(ErrorKind),
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Addressed to another fleet.
    Ignored,
    /// Not allowed in the current docked state; no result is published.
    Rejected,
    Published {
        status: ResultStatus,
        action: ActionOutcome,
    },
}

/// Turns dispenser/ingestor requests into shelf dock/undock commands and
/// publishes one result per accepted request.
///
/// The state lock is held for the whole command, so requests are handled
/// one at a time even when they arrive concurrently.
#[derive(Debug)]
pub struct DeliveryRelay {
    fleet_name: String,
    api: Arc<RobotApi>,
    state: Mutex<DeliveryState>,
    poll: PollSettings,
    results: broadcast::Sender<DeliveryResult>,
    shutdown: CancellationToken,
}

impl DeliveryRelay {
    pub fn new(config: &Config, api: Arc<RobotApi>, shutdown: CancellationToken) -> Self {
        let (results, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);
        let robot_name = config.delivery_robot();
        info!(fleet = %config.rmf_fleet.name, robot = %robot_name, "Delivery relay ready");

        Self {
            fleet_name: config.rmf_fleet.name.clone(),
            api,
            state: Mutex::new(DeliveryState {
                robot_name,
                docked: false,
                last_task: None,
            }),
            poll: PollSettings::from(&config.delivery),
            results,
            shutdown,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryResult> {
        self.results.subscribe()
    }

    pub fn fleet_name(&self) -> &str {
        &self.fleet_name
    }

    /// Current state, waiting for any in-flight request to finish.
    pub async fn state(&self) -> DeliveryState {
        self.state.lock().await.clone()
    }

    /// Current state, or `None` while a request is being handled.
    pub fn try_state(&self) -> Option<DeliveryState> {
        self.state.try_lock().ok().map(|s| s.clone())
    }

    pub async fn handle_dispenser_request(&self, request: &DispenserRequest) -> RelayOutcome {
        self.handle(DeliveryKind::Pickup, request).await
    }

    pub async fn handle_ingestor_request(&self, request: &IngestorRequest) -> RelayOutcome {
        self.handle(DeliveryKind::Dropoff, request).await
    }

    async fn handle(&self, kind: DeliveryKind, request: &DeliveryRequest) -> RelayOutcome {
        if request.transporter_type != self.fleet_name {
            debug!(
                %kind,
                transporter_type = %request.transporter_type,
                "Ignoring request for another fleet"
            );
            return RelayOutcome::Ignored;
        }
        info!(%kind, request_guid = %request.request_guid, "Received request");

        let mut state = self.state.lock().await;
        if state.docked != kind.requires_docked() {
            if state.docked {
                info!(robot = %state.robot_name, request_guid = %request.request_guid, "Already docked. Cannot pickup");
            } else {
                info!(robot = %state.robot_name, request_guid = %request.request_guid, "Not docked. Cannot dropoff");
            }
            return RelayOutcome::Rejected;
        }

        let action = self.run_shelf_action(kind, &mut state).await;
        let status = if action == ActionOutcome::Completed {
            state.docked = !state.docked;
            ResultStatus::Success
        } else {
            ResultStatus::Failed
        };

        let message = ResultMessage {
            status,
            time: Utc::now(),
            request_guid: request.request_guid.clone(),
            source_guid: request.target_guid.clone(),
        };
        info!(
            %kind,
            request_guid = %message.request_guid,
            status = ?status,
            docked = state.docked,
            "Sending result"
        );
        if self.results.send(kind.result(message)).is_err() {
            debug!(%kind, "No result subscribers");
        }

        RelayOutcome::Published { status, action }
    }

    async fn run_shelf_action(&self, kind: DeliveryKind, state: &mut DeliveryState) -> ActionOutcome {
        let handle = match self
            .api
            .try_start_activity(&state.robot_name, kind.activity(), "")
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(robot = %state.robot_name, %kind, kind_of_error = ?e.kind(), error = %e, "Shelf command refused");
                return ActionOutcome::Refused(e.kind());
            }
        };
        state.last_task = handle.task_id.clone();

        match wait_for_completion(&self.api, &handle, self.poll, &self.shutdown).await {
            PollOutcome::Completed => ActionOutcome::Completed,
            PollOutcome::TimedOut => {
                warn!(
                    robot = %state.robot_name,
                    %kind,
                    timeout_secs = self.poll.timeout.as_secs_f64(),
                    "Shelf command timed out"
                );
                ActionOutcome::TimedOut
            }
            PollOutcome::Cancelled => {
                warn!(robot = %state.robot_name, %kind, "Shelf command abandoned on shutdown");
                ActionOutcome::Cancelled
            }
            PollOutcome::Unsupported => ActionOutcome::Refused(ErrorKind::Unsupported),
        }
    }
}
