//! Provider payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightInfo {
    #[serde(rename = "faFlightID", default)]
    pub fa_flight_id: String,
    #[serde(default)]
    pub ident: String,
    #[serde(default)]
    pub origin: FlightEndpoint,
    #[serde(default)]
    pub destination: FlightEndpoint,
    #[serde(default)]
    pub filed_departure_time: Option<ProviderTime>,
    #[serde(default)]
    pub filed_arrival_time: Option<ProviderTime>,
    #[serde(default)]
    pub estimated_arrival_time: Option<ProviderTime>,
}

impl FlightInfo {
    pub fn departure_epoch(&self) -> Option<i64> {
        self.filed_departure_time.as_ref().map(|time| time.epoch)
    }

    /// Filed arrival, falling back to the estimated arrival.
    pub fn arrival_epoch(&self) -> Option<i64> {
        self.filed_arrival_time
            .as_ref()
            .or(self.estimated_arrival_time.as_ref())
            .map(|time| time.epoch)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    /// ICAO code (KJFK).
    #[serde(default)]
    pub code: String,
    /// IATA code (JFK).
    #[serde(default)]
    pub alternate_ident: String,
    #[serde(default)]
    pub airport_name: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderTime {
    pub epoch: i64,
    #[serde(default)]
    pub tz: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Waypoint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlightInfoStatusResponse {
    #[serde(rename = "FlightInfoStatusResult")]
    pub result: Option<FlightInfoStatusResult>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlightInfoStatusResult {
    #[serde(default)]
    pub flights: Vec<FlightInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecodeFlightRouteResponse {
    #[serde(rename = "DecodeFlightRouteResult")]
    pub result: Option<DecodeFlightRouteResult>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecodeFlightRouteResult {
    #[serde(default)]
    pub data: Vec<Waypoint>,
}
