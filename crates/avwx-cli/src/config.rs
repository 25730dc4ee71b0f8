//! Tool configuration from environment.

use std::env;
use std::path::PathBuf;

use avwx_flight::DEFAULT_FLIGHTAWARE_URL;
use avwx_ingest::DEFAULT_DATASERVER_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub dataserver_url: String,
    pub flightaware_url: String,
    pub flightaware_username: String,
    pub flightaware_api_key: String,
    pub airports_csv: Option<PathBuf>,
    pub environment: Environment,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any variable source; unset or unparsable values take defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            db_path: var("AVWX_DB_PATH").unwrap_or_else(|| "data/avwx.db".to_string()),
            db_max_connections: var("AVWX_DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            dataserver_url: var("AVWX_DATASERVER_URL")
                .unwrap_or_else(|| DEFAULT_DATASERVER_URL.to_string()),
            flightaware_url: var("FLIGHTAWARE_URL")
                .unwrap_or_else(|| DEFAULT_FLIGHTAWARE_URL.to_string()),
            flightaware_username: var("FLIGHTAWARE_USERNAME").unwrap_or_default(),
            flightaware_api_key: var("FLIGHTAWARE_API_KEY").unwrap_or_default(),
            airports_csv: var("AVWX_AIRPORTS_CSV")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            environment: match var("AVWX_ENV").as_deref().map(str::trim) {
                None | Some("") | Some("development") | Some("dev") => Environment::Development,
                Some(_) => Environment::Production,
            },
            log_dir: var("AVWX_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]);
        assert_eq!(config.db_path, "data/avwx.db");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.dataserver_url, DEFAULT_DATASERVER_URL);
        assert_eq!(config.flightaware_url, DEFAULT_FLIGHTAWARE_URL);
        assert!(config.airports_csv.is_none());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("AVWX_DB_PATH", "/var/lib/avwx/wx.db"),
            ("AVWX_DB_MAX_CONNECTIONS", "2"),
            ("AVWX_AIRPORTS_CSV", "/etc/avwx/airports.csv"),
            ("AVWX_ENV", "production"),
            ("AVWX_LOG_DIR", "/var/log/avwx"),
            ("FLIGHTAWARE_USERNAME", "pilot"),
        ]);
        assert_eq!(config.db_path, "/var/lib/avwx/wx.db");
        assert_eq!(config.db_max_connections, 2);
        assert_eq!(config.airports_csv, Some(PathBuf::from("/etc/avwx/airports.csv")));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/avwx"));
        assert_eq!(config.flightaware_username, "pilot");
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = config(&[("AVWX_DB_MAX_CONNECTIONS", "many")]);
        assert_eq!(config.db_max_connections, 5);
    }
}
