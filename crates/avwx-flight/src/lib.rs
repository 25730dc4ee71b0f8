//! Flight-data provider client.
//!
//! Resolves a flight ident to the provider's flight record and decodes its
//! filed route into waypoints.

pub mod client;
pub mod lookup;
pub mod models;

pub use client::{route_points, FlightDataClient, FlightProvider, DEFAULT_FLIGHTAWARE_URL};
pub use lookup::find_flight;
pub use models::{FlightEndpoint, FlightInfo, ProviderTime, Waypoint};
