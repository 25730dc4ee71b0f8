//! Core logic for aviation weather route checks.
//!
//! Great-circle geometry, the route/hazard intersection engine, and the
//! weather record models shared by the ingest and check tools.

pub mod airports;
pub mod error;
pub mod geometry;
pub mod hazard;
pub mod models;

pub use airports::{airport_position, parse_dms, Airport, AirportLookup, AirportTable};
pub use error::{AirportError, GeometryError};
pub use geometry::{great_circle_intersection, haversine_distance, points_equal, GeoPoint};
pub use hazard::{
    hazard_edges, intersecting_hazards, route_distance_m, route_segments,
    segment_intersects_hazard, Edge, Hazard, HazardArea, RouteSegment,
};
pub use models::{
    AirSigmet, Forecast, IcingCondition, Metar, SkyCondition, Taf, TurbulenceCondition,
};
