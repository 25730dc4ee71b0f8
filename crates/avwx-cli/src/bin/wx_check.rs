use anyhow::{Context, Result};
use avwx_cli::check::{CheckOutcome, CheckRequest, FlightCheck};
use avwx_cli::config::Config;
use avwx_cli::logging::init_logging;
use avwx_cli::persistence::init_database;
use avwx_core::AirportTable;
use avwx_flight::FlightDataClient;
use avwx_ingest::WeatherType;
use clap::Parser;
use tracing::{error, info, warn};

/// Report stored weather relevant to one flight.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report type: airsigmet, taf or metar
    weather_type: WeatherType,

    /// Airline and flight number (e.g. DAL2093)
    ident: String,

    /// Departure airport, IATA code
    dep_apt: String,

    /// Arrival airport, IATA code
    arr_apt: String,

    /// Filed departure time, epoch seconds
    departure_epoch: Option<f64>,
}

async fn check(config: &Config, args: &Args) -> Result<CheckOutcome> {
    let provider = FlightDataClient::new(
        config.flightaware_url.clone(),
        config.flightaware_username.clone(),
        config.flightaware_api_key.clone(),
    )?;
    let db = init_database(&config.db_path, config.db_max_connections)
        .await
        .context("Failed to open database")?;

    let airports = match &config.airports_csv {
        Some(path) => match AirportTable::from_path(path) {
            Ok(table) => Some(table),
            Err(err) => {
                warn!("airport table unavailable: {}", err);
                None
            }
        },
        None => None,
    };

    let request = CheckRequest {
        weather_type: args.weather_type,
        ident: args.ident.trim().to_ascii_uppercase(),
        dep_apt: args.dep_apt.trim().to_ascii_uppercase(),
        arr_apt: args.arr_apt.trim().to_ascii_uppercase(),
        departure_epoch: args
            .departure_epoch
            .filter(|epoch| epoch.is_finite() && *epoch > 0.0)
            .map(|epoch| epoch as i64),
    };

    let mut flight_check = FlightCheck::new(&provider, db.pool());
    if let Some(table) = &airports {
        flight_check = flight_check.with_airports(table);
    }
    flight_check.run(&request).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_logging(&config)?;

    match check(&config, &args).await {
        Ok(CheckOutcome::Report(json)) => println!("{}", json),
        Ok(CheckOutcome::FlightNotFound) => info!("{} not found", args.ident),
        Ok(CheckOutcome::NoRoute) => info!("no route for {}", args.ident),
        Err(err) => {
            error!("{} check for {} failed: {:#}", args.weather_type, args.ident, err);
            return Err(err);
        }
    }
    Ok(())
}
