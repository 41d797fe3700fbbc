use crate::config::DeliveryConfig;
use crate::error::ApiError;
use crate::robot::models::CommandHandle;
use crate::robot::RobotApi;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&DeliveryConfig> for PollSettings {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            interval: Duration::from_secs_f64(config.poll_interval),
            timeout: Duration::from_secs_f64(config.poll_timeout),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    TimedOut,
    Cancelled,
    /// Completion of this command can never be confirmed.
    Unsupported,
}

/// Sleep one interval, ask whether the command finished, repeat.
///
/// Bounded by `settings.timeout` and aborted as soon as `cancel` fires.
/// Transport and status errors count as "not yet"; an unsupported check
/// ends the wait immediately.
pub async fn wait_for_completion(
    api: &RobotApi,
    handle: &CommandHandle,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> PollOutcome {
    let poll = async {
        let mut attempts: u32 = 0;
        loop {
            tokio::time::sleep(settings.interval).await;
            attempts += 1;
            match api.try_is_completed(handle).await {
                Ok(true) => {
                    debug!(robot = %handle.robot_name, attempts, "Command completed");
                    return PollOutcome::Completed;
                }
                Ok(false) => {}
                Err(e @ ApiError::Unsupported(_)) => {
                    warn!(robot = %handle.robot_name, error = %e, "Cannot confirm completion");
                    return PollOutcome::Unsupported;
                }
                Err(e) => {
                    debug!(robot = %handle.robot_name, attempts, error = %e, "Completion check failed");
                }
            }
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => PollOutcome::Cancelled,
        res = tokio::time::timeout(settings.timeout, poll) => res.unwrap_or(PollOutcome::TimedOut),
    }
}
