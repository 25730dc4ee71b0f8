//! Aviation weather bulletin ingest.
//!
//! Downloads the ADDS cache files, strips their gzip layers and converts the
//! XML records into the shared weather models.

pub mod client;
pub mod convert;
pub mod decode;
pub mod error;
pub mod record;
pub mod xml;

pub use client::{DataServerClient, WeatherType, DEFAULT_DATASERVER_URL};
pub use convert::{parse_airsigmets, parse_metars, parse_tafs, Bulletin};
pub use decode::decompress;
pub use error::IngestError;
