//! FlightXML3 HTTP client.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use avwx_core::GeoPoint;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::models::{
    DecodeFlightRouteResponse, FlightInfo, FlightInfoStatusResponse, Waypoint,
};

pub const DEFAULT_FLIGHTAWARE_URL: &str = "https://flightxml.flightaware.com/json/FlightXML3";

/// Source of flight schedules and decoded routes.
pub trait FlightProvider {
    fn flight_info_status(&self, ident: &str)
        -> impl Future<Output = Result<Vec<FlightInfo>>> + Send;

    /// Waypoints of the filed route. Provider faults yield an empty route;
    /// a waypoint with invalid coordinates is an error.
    fn decode_flight_route(&self, flight_id: &str)
        -> impl Future<Output = Result<Vec<GeoPoint>>> + Send;
}

/// HTTP client for the FlightXML3 JSON API.
pub struct FlightDataClient {
    client: Client,
    base_url: String,
    username: String,
    api_key: String,
}

impl FlightDataClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            api_key: api_key.into(),
        })
    }

    async fn get(&self, operation: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, operation);
        debug!(%url, "flight provider request");
        self.client
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_key))
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to call {}", operation))
    }
}

impl FlightProvider for FlightDataClient {
    async fn flight_info_status(&self, ident: &str) -> Result<Vec<FlightInfo>> {
        let response = self.get("FlightInfoStatus", &[("ident", ident)]).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "FlightInfoStatus request failed: {} {}",
                status,
                body
            ));
        }

        let payload = response
            .json::<FlightInfoStatusResponse>()
            .await
            .context("Failed to parse FlightInfoStatus response")?;

        if let Some(message) = payload.error {
            warn!(ident, "{} is not a known flight: {}", ident, message);
            return Ok(Vec::new());
        }
        Ok(payload.result.map(|result| result.flights).unwrap_or_default())
    }

    async fn decode_flight_route(&self, flight_id: &str) -> Result<Vec<GeoPoint>> {
        let response = self
            .get("DecodeFlightRoute", &[("faFlightID", flight_id)])
            .await?;

        let status = response.status();
        let payload = match response.json::<DecodeFlightRouteResponse>().await {
            Ok(payload) if status.is_success() => payload,
            Ok(_) | Err(_) => {
                error!(flight_id, %status, "Could not find route data for flight");
                return Ok(Vec::new());
            }
        };

        if let Some(message) = payload.error {
            error!(flight_id, "Could not find route data for flight: {}", message);
            return Ok(Vec::new());
        }
        let waypoints = payload.result.map(|result| result.data).unwrap_or_default();
        route_points(&waypoints).with_context(|| format!("Invalid route for {}", flight_id))
    }
}

/// Convert waypoints to points, in route order.
///
/// Fails on the first waypoint with out-of-range coordinates, naming it.
pub fn route_points(waypoints: &[Waypoint]) -> Result<Vec<GeoPoint>> {
    waypoints
        .iter()
        .enumerate()
        .map(|(index, waypoint)| {
            GeoPoint::new(waypoint.latitude, waypoint.longitude).with_context(|| {
                format!(
                    "waypoint {} ({})",
                    index,
                    waypoint.name.as_deref().unwrap_or("unnamed")
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLIGHT_INFO: &str = r#"{
        "FlightInfoStatusResult": {
            "next_offset": -1,
            "flights": [{
                "ident": "DAL6404",
                "faFlightID": "DAL6404-1551418000-airline-0266",
                "origin": {"code": "KJFK", "alternate_ident": "JFK", "airport_name": "John F Kennedy Intl", "city": "New York, NY"},
                "destination": {"code": "KLAX", "alternate_ident": "LAX", "airport_name": "Los Angeles Intl", "city": "Los Angeles, CA"},
                "filed_departure_time": {"epoch": 1551650700, "tz": "EST", "dow": "Sunday", "time": "05:05PM", "date": "03/03/2019", "localtime": 1551632700},
                "filed_arrival_time": {"epoch": 1551673080, "tz": "PST"},
                "estimated_arrival_time": {"epoch": 1551672000, "tz": "PST"},
                "status": "Scheduled"
            }]
        }
    }"#;

    #[test]
    fn parses_flight_info_status() {
        let payload: FlightInfoStatusResponse = serde_json::from_str(FLIGHT_INFO).unwrap();
        let flights = payload.result.unwrap().flights;
        assert_eq!(flights.len(), 1);

        let flight = &flights[0];
        assert_eq!(flight.fa_flight_id, "DAL6404-1551418000-airline-0266");
        assert_eq!(flight.origin.code, "KJFK");
        assert_eq!(flight.destination.alternate_ident, "LAX");
        assert_eq!(flight.departure_epoch(), Some(1551650700));
        assert_eq!(flight.arrival_epoch(), Some(1551673080));
    }

    #[test]
    fn arrival_falls_back_to_estimate() {
        let mut payload: FlightInfoStatusResponse = serde_json::from_str(FLIGHT_INFO).unwrap();
        let mut flight = payload.result.take().unwrap().flights.remove(0);
        flight.filed_arrival_time = None;
        assert_eq!(flight.arrival_epoch(), Some(1551672000));
    }

    #[test]
    fn error_payload_is_recognised() {
        let payload: FlightInfoStatusResponse =
            serde_json::from_str(r#"{"error": "INVALID ARGUMENT ident"}"#).unwrap();
        assert!(payload.result.is_none());
        assert_eq!(payload.error.as_deref(), Some("INVALID ARGUMENT ident"));
    }

    fn decoded_route(json: &str) -> Vec<Waypoint> {
        let payload: DecodeFlightRouteResponse = serde_json::from_str(json).unwrap();
        payload.result.unwrap().data
    }

    #[test]
    fn route_points_keep_order() {
        let waypoints = decoded_route(
            r#"{"DecodeFlightRouteResult": {"data": [
                {"name": "KJFK", "type": "Origin Airport", "latitude": 40.64, "longitude": -73.78},
                {"name": "PARKE", "type": "Waypoint", "latitude": 40.52, "longitude": -76.27},
                {"name": "KLAX", "type": "Destination Airport", "latitude": 33.94, "longitude": -118.41}
            ]}}"#,
        );
        let points = route_points(&waypoints).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].lat(), 40.64);
        assert_eq!(points[1].lon(), -76.27);
        assert_eq!(points[2].lon(), -118.41);
    }

    #[test]
    fn invalid_waypoint_rejects_the_whole_route() {
        // Dropping the bad waypoint would splice A and B into one unfiled leg.
        let waypoints = decoded_route(
            r#"{"DecodeFlightRouteResult": {"data": [
                {"name": "A", "latitude": 0.0, "longitude": 0.0},
                {"name": "BAD", "latitude": 200.0, "longitude": 10.0},
                {"name": "B", "latitude": 0.0, "longitude": 20.0}
            ]}}"#,
        );
        let err = route_points(&waypoints).unwrap_err();
        assert!(err.to_string().contains("waypoint 1 (BAD)"), "{err}");
        assert!(err.root_cause().to_string().contains("lat"), "{err:#}");
    }

    #[test]
    fn base_url_is_normalised() {
        let client = FlightDataClient::new("https://example.test/json/", "user", "key").unwrap();
        assert_eq!(client.base_url, "https://example.test/json");
    }
}
