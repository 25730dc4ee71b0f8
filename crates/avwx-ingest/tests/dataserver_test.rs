//! Live data server tests.
//!
//! Run with: cargo test --test dataserver_test -- --ignored
//!
//! Note: Requires network access to the data server,
//! or set AVWX_DATASERVER_URL to a mirror.

use avwx_ingest::{Bulletin, DataServerClient, WeatherType, DEFAULT_DATASERVER_URL};

fn base_url() -> String {
    std::env::var("AVWX_DATASERVER_URL").unwrap_or_else(|_| DEFAULT_DATASERVER_URL.to_string())
}

#[tokio::test]
#[ignore] // Run only with network access
async fn test_fetch_metar_bulletin() {
    let client = DataServerClient::new(base_url()).expect("client");
    let bulletin = client
        .fetch_bulletin(WeatherType::Metar)
        .await
        .expect("Failed to fetch METARs");

    match bulletin {
        Bulletin::Metars(metars) => {
            assert!(!metars.is_empty());
            assert!(metars.iter().all(|m| !m.station_id.is_empty()));
        }
        other => panic!("unexpected bulletin kind: {:?}", other),
    }
}

#[tokio::test]
#[ignore]
async fn test_fetch_airsigmet_areas_are_valid() {
    let client = DataServerClient::new(base_url()).expect("client");
    let bulletin = client
        .fetch_bulletin(WeatherType::AirSigmet)
        .await
        .expect("Failed to fetch AIRMETs/SIGMETs");

    if let Bulletin::AirSigmets(records) = bulletin {
        for record in records {
            assert!(record.valid_time_from <= record.valid_time_to);
        }
    } else {
        panic!("expected AIR/SIGMETs");
    }
}
