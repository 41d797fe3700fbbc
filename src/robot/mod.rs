pub mod client;
pub mod command_routes;
pub mod endpoints;
pub mod models;

pub use client::RobotApi;
