pub mod delivery_routes;
pub mod models;
pub mod poll;
pub mod relay;

pub use relay::{ActionOutcome, DeliveryRelay, DeliveryState, RelayOutcome};
