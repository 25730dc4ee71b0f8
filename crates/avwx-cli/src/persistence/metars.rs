//! METAR persistence operations.

use anyhow::Result;
use avwx_core::Metar;
use sqlx::SqlitePool;

use super::db::{from_epoch, to_epoch};

/// Store a batch of observations in one transaction.
///
/// Returns the number of new rows; already stored observations are skipped.
pub async fn store_metars(pool: &SqlitePool, records: &[Metar]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for record in records {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO metars (
                raw_text, station_id, observation_time, latitude, longitude, temp_c,
                dewpoint_c, wind_dir_degrees, wind_speed_kt, wind_gust_kt,
                visibility_statute_mi, altim_in_hg, sea_level_pressure_mb,
                quality_control_flags, wx_string, flight_category,
                three_hr_pressure_tendency_mb, max_t_c, min_t_c, max_t24hr_c, min_t24hr_c,
                precip_in, pcp3hr_in, pcp6hr_in, pcp24hr_in, snow_in, vert_vis_ft,
                metar_type, elevation_m, sky_condition
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)
            "#,
        )
        .bind(&record.raw_text)
        .bind(&record.station_id)
        .bind(to_epoch(&record.observation_time))
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.temp_c)
        .bind(record.dewpoint_c)
        .bind(record.wind_dir_degrees)
        .bind(record.wind_speed_kt)
        .bind(record.wind_gust_kt)
        .bind(record.visibility_statute_mi)
        .bind(record.altim_in_hg)
        .bind(record.sea_level_pressure_mb)
        .bind(&record.quality_control_flags)
        .bind(&record.wx_string)
        .bind(&record.flight_category)
        .bind(record.three_hr_pressure_tendency_mb)
        .bind(record.max_t_c)
        .bind(record.min_t_c)
        .bind(record.max_t24hr_c)
        .bind(record.min_t24hr_c)
        .bind(record.precip_in)
        .bind(record.pcp3hr_in)
        .bind(record.pcp6hr_in)
        .bind(record.pcp24hr_in)
        .bind(record.snow_in)
        .bind(record.vert_vis_ft)
        .bind(&record.metar_type)
        .bind(record.elevation_m)
        .bind(serde_json::to_string(&record.sky_condition)?)
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected() as usize;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// All stored observations for `station`, oldest first.
pub async fn metars_for_station(pool: &SqlitePool, station: &str) -> Result<Vec<Metar>> {
    let rows = sqlx::query_as::<_, MetarRow>(
        r#"
        SELECT raw_text, station_id, observation_time, latitude, longitude, temp_c,
               dewpoint_c, wind_dir_degrees, wind_speed_kt, wind_gust_kt,
               visibility_statute_mi, altim_in_hg, sea_level_pressure_mb,
               quality_control_flags, wx_string, flight_category,
               three_hr_pressure_tendency_mb, max_t_c, min_t_c, max_t24hr_c, min_t24hr_c,
               precip_in, pcp3hr_in, pcp6hr_in, pcp24hr_in, snow_in, vert_vis_ft,
               metar_type, elevation_m, sky_condition
        FROM metars
        WHERE station_id = ?1
        ORDER BY observation_time, id
        "#,
    )
    .bind(station)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct MetarRow {
    raw_text: String,
    station_id: String,
    observation_time: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
    temp_c: Option<f64>,
    dewpoint_c: Option<f64>,
    wind_dir_degrees: Option<i64>,
    wind_speed_kt: Option<i64>,
    wind_gust_kt: Option<i64>,
    visibility_statute_mi: Option<f64>,
    altim_in_hg: Option<f64>,
    sea_level_pressure_mb: Option<f64>,
    quality_control_flags: Option<String>,
    wx_string: Option<String>,
    flight_category: Option<String>,
    three_hr_pressure_tendency_mb: Option<f64>,
    max_t_c: Option<f64>,
    min_t_c: Option<f64>,
    max_t24hr_c: Option<f64>,
    min_t24hr_c: Option<f64>,
    precip_in: Option<f64>,
    pcp3hr_in: Option<f64>,
    pcp6hr_in: Option<f64>,
    pcp24hr_in: Option<f64>,
    snow_in: Option<f64>,
    vert_vis_ft: Option<i64>,
    metar_type: Option<String>,
    elevation_m: Option<f64>,
    sky_condition: String,
}

impl TryFrom<MetarRow> for Metar {
    type Error = anyhow::Error;

    fn try_from(row: MetarRow) -> Result<Self> {
        Ok(Metar {
            raw_text: row.raw_text,
            station_id: row.station_id,
            observation_time: from_epoch(row.observation_time)?,
            latitude: row.latitude,
            longitude: row.longitude,
            temp_c: row.temp_c,
            dewpoint_c: row.dewpoint_c,
            wind_dir_degrees: row.wind_dir_degrees,
            wind_speed_kt: row.wind_speed_kt,
            wind_gust_kt: row.wind_gust_kt,
            visibility_statute_mi: row.visibility_statute_mi,
            altim_in_hg: row.altim_in_hg,
            sea_level_pressure_mb: row.sea_level_pressure_mb,
            quality_control_flags: row.quality_control_flags,
            wx_string: row.wx_string,
            flight_category: row.flight_category,
            three_hr_pressure_tendency_mb: row.three_hr_pressure_tendency_mb,
            max_t_c: row.max_t_c,
            min_t_c: row.min_t_c,
            max_t24hr_c: row.max_t24hr_c,
            min_t24hr_c: row.min_t24hr_c,
            precip_in: row.precip_in,
            pcp3hr_in: row.pcp3hr_in,
            pcp6hr_in: row.pcp6hr_in,
            pcp24hr_in: row.pcp24hr_in,
            snow_in: row.snow_in,
            vert_vis_ft: row.vert_vis_ft,
            metar_type: row.metar_type,
            elevation_m: row.elevation_m,
            sky_condition: serde_json::from_str(&row.sky_condition)?,
        })
    }
}
