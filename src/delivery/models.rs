use crate::robot::models::Activity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispenser and ingestor requests share one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub request_guid: String,
    pub target_guid: String,
    pub transporter_type: String,
}

pub type DispenserRequest = DeliveryRequest;
pub type IngestorRequest = DeliveryRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub status: ResultStatus,
    pub time: DateTime<Utc>,
    pub request_guid: String,
    /// The dispenser/ingestor that asked, i.e. the request's `target_guid`.
    pub source_guid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum DeliveryResult {
    DispenserResult(ResultMessage),
    IngestorResult(ResultMessage),
}

impl DeliveryResult {
    pub fn message(&self) -> &ResultMessage {
        match self {
            DeliveryResult::DispenserResult(m) | DeliveryResult::IngestorResult(m) => m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Dispenser request: dock under the shelf.
    Pickup,
    /// Ingestor request: undock from the shelf.
    Dropoff,
}

impl DeliveryKind {
    pub fn activity(self) -> Activity {
        match self {
            DeliveryKind::Pickup => Activity::Pickup,
            DeliveryKind::Dropoff => Activity::Dropoff,
        }
    }

    /// Docked state the robot must be in to accept this request.
    pub fn requires_docked(self) -> bool {
        matches!(self, DeliveryKind::Dropoff)
    }

    pub fn result(self, message: ResultMessage) -> DeliveryResult {
        match self {
            DeliveryKind::Pickup => DeliveryResult::DispenserResult(message),
            DeliveryKind::Dropoff => DeliveryResult::IngestorResult(message),
        }
    }
}

impl fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryKind::Pickup => write!(f, "dispenser"),
            DeliveryKind::Dropoff => write!(f, "ingestor"),
        }
    }
}
