use anyhow::{Context, Result};
use avwx_cli::config::Config;
use avwx_cli::logging::init_logging;
use avwx_cli::persistence::{init_database, store_airsigmets, store_metars, store_tafs};
use avwx_ingest::{Bulletin, DataServerClient, WeatherType};
use clap::Parser;
use tracing::{error, info};

/// Download one bulletin type and store its records.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bulletin type: airsigmet, taf or metar
    weather_type: WeatherType,

    /// SQLite database path (overrides AVWX_DB_PATH)
    #[arg(long)]
    db_path: Option<String>,
}

async fn ingest(config: &Config, weather_type: WeatherType) -> Result<()> {
    let client = DataServerClient::new(config.dataserver_url.clone())?;
    let bulletin = client.fetch_bulletin(weather_type).await?;

    let db = init_database(&config.db_path, config.db_max_connections)
        .await
        .context("Failed to open database")?;

    let received = bulletin.len();
    let stored = match &bulletin {
        Bulletin::AirSigmets(records) => store_airsigmets(db.pool(), records).await?,
        Bulletin::Tafs(records) => store_tafs(db.pool(), records).await?,
        Bulletin::Metars(records) => store_metars(db.pool(), records).await?,
    };

    info!(%weather_type, received, stored, "ingest complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }
    init_logging(&config)?;

    if let Err(err) = ingest(&config, args.weather_type).await {
        error!("{} ingest failed: {:#}", args.weather_type, err);
        return Err(err);
    }
    Ok(())
}
