//! Airport position lookup by ICAO code.
//!
//! The table is read once and handed to whoever needs it; there is no global
//! instance. Anything implementing [`AirportLookup`] can stand in for it.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::AirportError;
use crate::geometry::GeoPoint;

const ICAO_COLUMN: usize = 5;
const LATITUDE_COLUMN: usize = 6;
const LONGITUDE_COLUMN: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub icao: String,
    pub position: GeoPoint,
}

/// Read-only ICAO code to airport mapping.
pub trait AirportLookup {
    fn airport(&self, icao: &str) -> Option<&Airport>;
}

/// In-memory airport table.
#[derive(Debug, Default)]
pub struct AirportTable {
    airports: HashMap<String, Airport>,
}

impl AirportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a headerless CSV file.
    ///
    /// Column 5 holds the ICAO code, columns 6 and 7 the latitude and
    /// longitude as colon-separated DMS (`41:58:42.9586N`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AirportError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AirportError::NotFound(path.to_path_buf()));
        }
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    /// Load the table from any CSV source (same layout as [`from_path`](Self::from_path)).
    pub fn from_reader<R: Read>(source: R) -> Result<Self, AirportError> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, AirportError> {
        let mut table = Self::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let (Some(icao), Some(lat), Some(lon)) = (
                record.get(ICAO_COLUMN),
                record.get(LATITUDE_COLUMN),
                record.get(LONGITUDE_COLUMN),
            ) else {
                return Err(AirportError::ShortRow {
                    row,
                    columns: record.len(),
                });
            };
            let icao = icao.trim();
            if icao.is_empty() {
                continue;
            }
            let position = GeoPoint::new(parse_dms(lat)?, parse_dms(lon)?)?;
            table.insert(Airport {
                icao: icao.to_string(),
                position,
            });
        }
        Ok(table)
    }

    pub fn insert(&mut self, airport: Airport) {
        self.airports.insert(airport.icao.to_ascii_uppercase(), airport);
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl AirportLookup for AirportTable {
    fn airport(&self, icao: &str) -> Option<&Airport> {
        self.airports.get(&icao.trim().to_ascii_uppercase())
    }
}

/// Resolve an ICAO code to its position.
pub fn airport_position<L: AirportLookup + ?Sized>(
    lookup: &L,
    icao: &str,
) -> Result<GeoPoint, AirportError> {
    lookup
        .airport(icao)
        .map(|airport| airport.position)
        .ok_or_else(|| AirportError::UnknownAirport(icao.to_string()))
}

/// Parse a colon-separated degrees:minutes:seconds value.
///
/// A trailing hemisphere letter (`N`, `S`, `E`, `W`) or a leading `-` sets the
/// sign. Minutes and seconds are optional, so plain decimal degrees parse too.
pub fn parse_dms(value: &str) -> Result<f64, AirportError> {
    let invalid = || AirportError::InvalidDms {
        value: value.to_string(),
    };

    let mut text = value.trim();
    let mut negative = false;

    if let Some(hemisphere) = text.chars().last().filter(char::is_ascii_alphabetic) {
        negative = match hemisphere.to_ascii_uppercase() {
            'N' | 'E' => false,
            'S' | 'W' => true,
            _ => return Err(invalid()),
        };
        text = text[..text.len() - 1].trim_end();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest;
    }

    let parts = text
        .split(':')
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    let sexagesimal = |value: f64| (0.0..60.0).contains(&value);
    let degrees = match parts.as_slice() {
        [d] => *d,
        [d, m] if sexagesimal(*m) => d + m / 60.0,
        [d, m, s] if sexagesimal(*m) && sexagesimal(*s) => d + m / 60.0 + s / 3600.0,
        _ => return Err(invalid()),
    };
    if !degrees.is_finite() || degrees < 0.0 {
        return Err(invalid());
    }

    Ok(if negative { -degrees } else { degrees })
}
