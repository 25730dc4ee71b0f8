//! Log output setup.
//!
//! Development logs everything to stderr. Production appends only errors to
//! `<log_dir>/errors.log`.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{Config, Environment};

const DEFAULT_DIRECTIVES: [&str; 6] = [
    "avwx_cli=debug",
    "avwx_ingest=debug",
    "avwx_flight=debug",
    "avwx_core=debug",
    "wx_ingest=debug",
    "wx_check=debug",
];

fn env_filter() -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

pub fn init_logging(config: &Config) -> Result<()> {
    match config.environment {
        Environment::Development => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(env_filter()?)
                .try_init()?;
        }
        Environment::Production => {
            fs::create_dir_all(&config.log_dir).with_context(|| {
                format!("Failed to create log directory {}", config.log_dir.display())
            })?;
            let path = config.log_dir.join("errors.log");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .with_filter(LevelFilter::ERROR),
                )
                .with(env_filter()?)
                .try_init()?;
        }
    }
    Ok(())
}
