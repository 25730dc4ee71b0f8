//! TAF persistence operations.

use anyhow::Result;
use avwx_core::{Forecast, Taf};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::db::{from_epoch, from_epoch_opt, to_epoch};

/// Store a batch of TAFs with their forecast periods in one transaction.
///
/// Returns the number of new TAFs; already stored ones are skipped.
pub async fn store_tafs(pool: &SqlitePool, records: &[Taf]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for record in records {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO tafs (
                raw_text, station_id, issue_time, bulletin_time, valid_time_from,
                valid_time_to, remarks, latitude, longitude, elevation_m
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&record.raw_text)
        .bind(&record.station_id)
        .bind(record.issue_time.as_ref().map(to_epoch))
        .bind(record.bulletin_time.as_ref().map(to_epoch))
        .bind(to_epoch(&record.valid_time_from))
        .bind(to_epoch(&record.valid_time_to))
        .bind(&record.remarks)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.elevation_m)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            continue;
        }
        let taf_id = result.last_insert_rowid();

        for (seq, forecast) in record.forecast.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO forecasts (
                    taf_id, seq, time_from, time_to, change_indicator, time_becoming,
                    probability, wind_dir_degrees, wind_speed_kt, wind_gust_kt,
                    wind_shear_hgt_ft_agl, wind_shear_dir_degrees, wind_shear_speed_kt,
                    visibility_statute_mi, altim_in_hg, vert_vis_ft, wx_string, not_decoded,
                    sky_condition, turbulence_condition, icing_condition
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
                "#,
            )
            .bind(taf_id)
            .bind(seq as i64)
            .bind(to_epoch(&forecast.time_from))
            .bind(to_epoch(&forecast.time_to))
            .bind(&forecast.change_indicator)
            .bind(forecast.time_becoming.as_ref().map(to_epoch))
            .bind(forecast.probability)
            .bind(forecast.wind_dir_degrees)
            .bind(forecast.wind_speed_kt)
            .bind(forecast.wind_gust_kt)
            .bind(forecast.wind_shear_hgt_ft_agl)
            .bind(forecast.wind_shear_dir_degrees)
            .bind(forecast.wind_shear_speed_kt)
            .bind(forecast.visibility_statute_mi)
            .bind(forecast.altim_in_hg)
            .bind(forecast.vert_vis_ft)
            .bind(&forecast.wx_string)
            .bind(&forecast.not_decoded)
            .bind(serde_json::to_string(&forecast.sky_condition)?)
            .bind(serde_json::to_string(&forecast.turbulence_condition)?)
            .bind(serde_json::to_string(&forecast.icing_condition)?)
            .execute(&mut *tx)
            .await?;
        }
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// First stored TAF for `station` whose validity covers `at`.
pub async fn taf_valid_at(
    pool: &SqlitePool,
    station: &str,
    at: DateTime<Utc>,
) -> Result<Option<Taf>> {
    let row = sqlx::query_as::<_, TafRow>(
        r#"
        SELECT id, raw_text, station_id, issue_time, bulletin_time, valid_time_from,
               valid_time_to, remarks, latitude, longitude, elevation_m
        FROM tafs
        WHERE station_id = ?1 AND valid_time_from <= ?2 AND valid_time_to >= ?2
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(station)
    .bind(to_epoch(&at))
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let forecasts = sqlx::query_as::<_, ForecastRow>(
        r#"
        SELECT time_from, time_to, change_indicator, time_becoming, probability,
               wind_dir_degrees, wind_speed_kt, wind_gust_kt, wind_shear_hgt_ft_agl,
               wind_shear_dir_degrees, wind_shear_speed_kt, visibility_statute_mi,
               altim_in_hg, vert_vis_ft, wx_string, not_decoded,
               sky_condition, turbulence_condition, icing_condition
        FROM forecasts
        WHERE taf_id = ?1
        ORDER BY seq
        "#,
    )
    .bind(row.id)
    .fetch_all(pool)
    .await?;

    let mut taf = Taf::try_from(row)?;
    taf.forecast = forecasts
        .into_iter()
        .map(Forecast::try_from)
        .collect::<Result<_>>()?;
    Ok(Some(taf))
}

/// Departure and arrival TAFs valid at the respective times.
///
/// Fails when either station has no covering TAF.
pub async fn tafs_for_flight(
    pool: &SqlitePool,
    dep_apt: &str,
    dep_time: DateTime<Utc>,
    arr_apt: &str,
    arr_time: DateTime<Utc>,
) -> Result<(Taf, Taf)> {
    let departure = taf_valid_at(pool, dep_apt, dep_time).await?;
    let arrival = taf_valid_at(pool, arr_apt, arr_time).await?;
    match (departure, arrival) {
        (Some(departure), Some(arrival)) => Ok((departure, arrival)),
        (None, _) => Err(anyhow::anyhow!(
            "No TAF for {} valid at {}",
            dep_apt,
            dep_time.to_rfc3339()
        )),
        (_, None) => Err(anyhow::anyhow!(
            "No TAF for {} valid at {}",
            arr_apt,
            arr_time.to_rfc3339()
        )),
    }
}

// Internal row types for SQLx
#[derive(sqlx::FromRow)]
struct TafRow {
    id: i64,
    raw_text: String,
    station_id: String,
    issue_time: Option<i64>,
    bulletin_time: Option<i64>,
    valid_time_from: i64,
    valid_time_to: i64,
    remarks: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation_m: Option<f64>,
}

impl TryFrom<TafRow> for Taf {
    type Error = anyhow::Error;

    fn try_from(row: TafRow) -> Result<Self> {
        Ok(Taf {
            raw_text: row.raw_text,
            station_id: row.station_id,
            issue_time: from_epoch_opt(row.issue_time)?,
            bulletin_time: from_epoch_opt(row.bulletin_time)?,
            valid_time_from: from_epoch(row.valid_time_from)?,
            valid_time_to: from_epoch(row.valid_time_to)?,
            remarks: row.remarks,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation_m: row.elevation_m,
            forecast: Vec::new(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct ForecastRow {
    time_from: i64,
    time_to: i64,
    change_indicator: Option<String>,
    time_becoming: Option<i64>,
    probability: Option<i64>,
    wind_dir_degrees: Option<i64>,
    wind_speed_kt: Option<i64>,
    wind_gust_kt: Option<i64>,
    wind_shear_hgt_ft_agl: Option<i64>,
    wind_shear_dir_degrees: Option<i64>,
    wind_shear_speed_kt: Option<i64>,
    visibility_statute_mi: Option<f64>,
    altim_in_hg: Option<f64>,
    vert_vis_ft: Option<i64>,
    wx_string: Option<String>,
    not_decoded: Option<String>,
    sky_condition: String,
    turbulence_condition: String,
    icing_condition: String,
}

impl TryFrom<ForecastRow> for Forecast {
    type Error = anyhow::Error;

    fn try_from(row: ForecastRow) -> Result<Self> {
        Ok(Forecast {
            time_from: from_epoch(row.time_from)?,
            time_to: from_epoch(row.time_to)?,
            change_indicator: row.change_indicator,
            time_becoming: from_epoch_opt(row.time_becoming)?,
            probability: row.probability,
            wind_dir_degrees: row.wind_dir_degrees,
            wind_speed_kt: row.wind_speed_kt,
            wind_gust_kt: row.wind_gust_kt,
            wind_shear_hgt_ft_agl: row.wind_shear_hgt_ft_agl,
            wind_shear_dir_degrees: row.wind_shear_dir_degrees,
            wind_shear_speed_kt: row.wind_shear_speed_kt,
            visibility_statute_mi: row.visibility_statute_mi,
            altim_in_hg: row.altim_in_hg,
            vert_vis_ft: row.vert_vis_ft,
            wx_string: row.wx_string,
            not_decoded: row.not_decoded,
            sky_condition: serde_json::from_str(&row.sky_condition)?,
            turbulence_condition: serde_json::from_str(&row.turbulence_condition)?,
            icing_condition: serde_json::from_str(&row.icing_condition)?,
        })
    }
}
