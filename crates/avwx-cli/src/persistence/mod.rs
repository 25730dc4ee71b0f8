//! Persistence layer for weather bulletins.
//!
//! SQLite-backed storage for AIRMET/SIGMETs, TAFs and METARs, plus the
//! queries the flight check runs against them.

pub mod airsigmets;
pub mod db;
pub mod metars;
pub mod tafs;

pub use airsigmets::{airsigmets_in_window, store_airsigmets};
pub use db::{init_database, Database};
pub use metars::{metars_for_station, store_metars};
pub use tafs::{store_tafs, taf_valid_at, tafs_for_flight};
