//! Aviation weather tools: configuration, storage and the flight check.

pub mod check;
pub mod config;
pub mod logging;
pub mod persistence;

pub use check::{CheckOutcome, CheckRequest, FlightCheck};
pub use config::{Config, Environment};
