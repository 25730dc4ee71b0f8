//! Flight weather check.
//!
//! Resolves a flight through the provider and answers one of three questions
//! against the stored bulletins: METARs at both ends, the TAFs valid at
//! departure and arrival, or the AIRMET/SIGMETs crossed by the filed route.

use anyhow::{Context, Result};
use avwx_core::{
    airport_position, intersecting_hazards, route_distance_m, route_segments, AirportLookup,
    GeoPoint,
};
use avwx_flight::{find_flight, FlightInfo, FlightProvider};
use avwx_ingest::WeatherType;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::persistence::{airsigmets_in_window, metars_for_station, tafs_for_flight};

#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub weather_type: WeatherType,
    pub ident: String,
    /// Departure airport, IATA code.
    pub dep_apt: String,
    /// Arrival airport, IATA code.
    pub arr_apt: String,
    pub departure_epoch: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// JSON report.
    Report(String),
    FlightNotFound,
    /// The provider had no route and no fallback was possible.
    NoRoute,
}

/// Collaborators of a check.
pub struct FlightCheck<'a, P> {
    provider: &'a P,
    pool: &'a SqlitePool,
    airports: Option<&'a dyn AirportLookup>,
}

impl<'a, P: FlightProvider> FlightCheck<'a, P> {
    pub fn new(provider: &'a P, pool: &'a SqlitePool) -> Self {
        Self {
            provider,
            pool,
            airports: None,
        }
    }

    /// Use `airports` for a direct route when the provider has none.
    pub fn with_airports(mut self, airports: &'a dyn AirportLookup) -> Self {
        self.airports = Some(airports);
        self
    }

    pub async fn run(&self, request: &CheckRequest) -> Result<CheckOutcome> {
        let flights = self
            .provider
            .flight_info_status(&request.ident)
            .await
            .with_context(|| format!("Failed to look up flight {}", request.ident))?;

        let Some(flight) = find_flight(
            &flights,
            &request.ident,
            &request.dep_apt,
            &request.arr_apt,
            request.departure_epoch,
        ) else {
            info!(
                ident = %request.ident,
                dep = %request.dep_apt,
                arr = %request.arr_apt,
                "no matching flight found"
            );
            return Ok(CheckOutcome::FlightNotFound);
        };

        debug!(flight_id = %flight.fa_flight_id, "flight resolved");

        match request.weather_type {
            WeatherType::Metar => self.metars(flight).await,
            WeatherType::Taf => self.tafs(flight).await,
            WeatherType::AirSigmet => self.airsigmets(flight).await,
        }
    }

    async fn metars(&self, flight: &FlightInfo) -> Result<CheckOutcome> {
        let departure = metars_for_station(self.pool, &flight.origin.code).await?;
        let arrival = metars_for_station(self.pool, &flight.destination.code).await?;
        let report = serde_json::json!({
            "departure": departure,
            "arrival": arrival,
        });
        Ok(CheckOutcome::Report(report.to_string()))
    }

    async fn tafs(&self, flight: &FlightInfo) -> Result<CheckOutcome> {
        let (dep_time, arr_time) = flight_window(flight)?;
        let (departure, arrival) = tafs_for_flight(
            self.pool,
            &flight.origin.code,
            dep_time,
            &flight.destination.code,
            arr_time,
        )
        .await?;
        Ok(CheckOutcome::Report(serde_json::to_string(&[departure, arrival])?))
    }

    async fn airsigmets(&self, flight: &FlightInfo) -> Result<CheckOutcome> {
        let (dep_time, arr_time) = flight_window(flight)?;

        let mut waypoints = self
            .provider
            .decode_flight_route(&flight.fa_flight_id)
            .await
            .with_context(|| format!("Failed to decode route for {}", flight.fa_flight_id))?;

        if waypoints.len() < 2 {
            match self.direct_route(flight) {
                Some(direct) => {
                    info!(flight_id = %flight.fa_flight_id, "no filed route, using direct route");
                    waypoints = direct;
                }
                None => {
                    warn!(flight_id = %flight.fa_flight_id, "no route available");
                    return Ok(CheckOutcome::NoRoute);
                }
            }
        }

        let route = route_segments(&waypoints);
        let hazards = airsigmets_in_window(self.pool, dep_time, arr_time).await?;
        let hits = intersecting_hazards(&hazards, &route);
        info!(
            flight_id = %flight.fa_flight_id,
            route_km = route_distance_m(&route) / 1000.0,
            checked = hazards.len(),
            intersecting = hits.len(),
            "route checked against AIRMET/SIGMETs"
        );

        Ok(CheckOutcome::Report(serde_json::to_string(&hits)?))
    }

    fn direct_route(&self, flight: &FlightInfo) -> Option<Vec<GeoPoint>> {
        let airports = self.airports?;
        let resolve = |code: &str| match airport_position(airports, code) {
            Ok(point) => Some(point),
            Err(err) => {
                warn!("direct route unavailable: {}", err);
                None
            }
        };
        let origin = resolve(&flight.origin.code)?;
        let destination = resolve(&flight.destination.code)?;
        Some(vec![origin, destination])
    }
}

/// Filed departure and arrival of the flight.
fn flight_window(flight: &FlightInfo) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let to_time = |epoch: Option<i64>, what: &str| {
        epoch
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| anyhow::anyhow!("{} has no {} time", flight.fa_flight_id, what))
    };
    Ok((
        to_time(flight.departure_epoch(), "departure")?,
        to_time(flight.arrival_epoch(), "arrival")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use avwx_flight::ProviderTime;

    #[test]
    fn window_requires_both_times() {
        let mut flight = FlightInfo {
            fa_flight_id: "JBU669-1".to_string(),
            filed_departure_time: Some(ProviderTime { epoch: 1541901600, tz: None }),
            ..FlightInfo::default()
        };
        assert!(flight_window(&flight).is_err());

        flight.filed_arrival_time = Some(ProviderTime { epoch: 1541916000, tz: None });
        let (dep, arr) = flight_window(&flight).unwrap();
        assert_eq!(dep.timestamp(), 1541901600);
        assert_eq!(arr.timestamp(), 1541916000);
    }
}
