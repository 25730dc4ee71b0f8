//! ADDS data server HTTP client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::convert::Bulletin;
use crate::decode::decompress;
use crate::error::IngestError;

pub const DEFAULT_DATASERVER_URL: &str =
    "https://www.aviationweather.gov/adds/dataserver_current/current";

/// Bulletin kinds published by the data server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherType {
    AirSigmet,
    Taf,
    Metar,
}

impl WeatherType {
    pub const ALL: [WeatherType; 3] = [WeatherType::AirSigmet, WeatherType::Taf, WeatherType::Metar];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherType::AirSigmet => "airsigmet",
            WeatherType::Taf => "taf",
            WeatherType::Metar => "metar",
        }
    }

    /// Name of the compressed cache file for this bulletin kind.
    pub fn cache_file(&self) -> &'static str {
        match self {
            WeatherType::AirSigmet => "airsigmets.cache.xml.gz",
            WeatherType::Taf => "tafs.cache.xml.gz",
            WeatherType::Metar => "metars.cache.xml.gz",
        }
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherType {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "airsigmet" | "airsigmets" => Ok(WeatherType::AirSigmet),
            "taf" | "tafs" => Ok(WeatherType::Taf),
            "metar" | "metars" => Ok(WeatherType::Metar),
            _ => Err(IngestError::UnknownWeatherType(value.to_string())),
        }
    }
}

/// HTTP client for the bulletin cache files.
pub struct DataServerClient {
    client: Client,
    base_url: String,
}

impl DataServerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, weather_type: WeatherType) -> String {
        format!("{}/{}", self.base_url, weather_type.cache_file())
    }

    /// Download the raw (compressed) cache file.
    pub async fn fetch(&self, weather_type: WeatherType) -> Result<Vec<u8>> {
        let url = self.url_for(weather_type);
        info!(%weather_type, %url, "downloading bulletin");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!("Bulletin request failed: {} {}", status, url));
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read bulletin body")?;
        Ok(body.to_vec())
    }

    /// Download, decompress and convert one bulletin.
    pub async fn fetch_bulletin(&self, weather_type: WeatherType) -> Result<Bulletin> {
        let raw = self.fetch(weather_type).await?;
        let xml = decompress(&raw).context("Failed to decompress bulletin")?;
        let bulletin = Bulletin::parse(weather_type, &xml)
            .with_context(|| format!("Failed to convert {} bulletin", weather_type))?;
        info!(%weather_type, records = bulletin.len(), "bulletin converted");
        Ok(bulletin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_type_parses_case_insensitively() {
        assert_eq!("METAR".parse::<WeatherType>().unwrap(), WeatherType::Metar);
        assert_eq!("airsigmets".parse::<WeatherType>().unwrap(), WeatherType::AirSigmet);
        assert_eq!(" taf ".parse::<WeatherType>().unwrap(), WeatherType::Taf);
    }

    #[test]
    fn unknown_weather_type_is_rejected() {
        let err = "pirep".parse::<WeatherType>().unwrap_err();
        assert!(matches!(err, IngestError::UnknownWeatherType(ref value) if value == "pirep"));
    }

    #[test]
    fn display_round_trips() {
        for weather_type in WeatherType::ALL {
            assert_eq!(weather_type.to_string().parse::<WeatherType>().unwrap(), weather_type);
        }
    }

    #[test]
    fn cache_urls() {
        let client = DataServerClient::new(format!("{}/", DEFAULT_DATASERVER_URL)).unwrap();
        assert_eq!(
            client.url_for(WeatherType::AirSigmet),
            "https://www.aviationweather.gov/adds/dataserver_current/current/airsigmets.cache.xml.gz"
        );
        assert!(client.url_for(WeatherType::Taf).ends_with("/tafs.cache.xml.gz"));
        assert!(client.url_for(WeatherType::Metar).ends_with("/metars.cache.xml.gz"));
    }
}
