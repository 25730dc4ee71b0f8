//! AIRMET/SIGMET persistence operations.

use anyhow::Result;
use avwx_core::{AirSigmet, GeoPoint, HazardArea};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::db::{from_epoch, to_epoch};

/// Store a batch of advisories in one transaction.
///
/// Advisories already stored (same text and start time) are skipped.
/// Returns the number of new rows.
pub async fn store_airsigmets(pool: &SqlitePool, records: &[AirSigmet]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for record in records {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO airsigmets (
                raw_text, valid_time_from, valid_time_to, airsigmet_type,
                hazard_type, hazard_severity, altitude_min_ft_msl, altitude_max_ft_msl,
                movement_dir_degrees, movement_speed_kt, area_num_points
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&record.raw_text)
        .bind(to_epoch(&record.valid_time_from))
        .bind(to_epoch(&record.valid_time_to))
        .bind(&record.airsigmet_type)
        .bind(&record.hazard_type)
        .bind(&record.hazard_severity)
        .bind(record.altitude_min_ft_msl)
        .bind(record.altitude_max_ft_msl)
        .bind(record.movement_dir_degrees)
        .bind(record.movement_speed_kt)
        .bind(record.area_num_points)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            continue;
        }
        let id = result.last_insert_rowid();

        for (seq, point) in record.area.vertices().iter().enumerate() {
            sqlx::query(
                "INSERT INTO airsigmet_points (airsigmet_id, seq, latitude, longitude) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(seq as i64)
            .bind(point.lat())
            .bind(point.lon())
            .execute(&mut *tx)
            .await?;
        }
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Advisories whose validity overlaps `[departure, arrival]`.
pub async fn airsigmets_in_window(
    pool: &SqlitePool,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
) -> Result<Vec<AirSigmet>> {
    let rows = sqlx::query_as::<_, AirSigmetRow>(
        r#"
        SELECT id, raw_text, valid_time_from, valid_time_to, airsigmet_type,
               hazard_type, hazard_severity, altitude_min_ft_msl, altitude_max_ft_msl,
               movement_dir_degrees, movement_speed_kt, area_num_points
        FROM airsigmets
        WHERE valid_time_from <= ?2 AND valid_time_to >= ?1
        ORDER BY id
        "#,
    )
    .bind(to_epoch(&departure))
    .bind(to_epoch(&arrival))
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let points = sqlx::query_as::<_, (f64, f64)>(
            "SELECT latitude, longitude FROM airsigmet_points WHERE airsigmet_id = ?1 ORDER BY seq",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;

        let vertices = points
            .into_iter()
            .map(|(lat, lon)| GeoPoint::new(lat, lon))
            .collect::<Result<Vec<_>, _>>()?;

        let mut record = AirSigmet::try_from(row)?;
        record.area = HazardArea::new(vertices);
        records.push(record);
    }
    Ok(records)
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct AirSigmetRow {
    id: i64,
    raw_text: String,
    valid_time_from: i64,
    valid_time_to: i64,
    airsigmet_type: String,
    hazard_type: Option<String>,
    hazard_severity: Option<String>,
    altitude_min_ft_msl: Option<i64>,
    altitude_max_ft_msl: Option<i64>,
    movement_dir_degrees: Option<i64>,
    movement_speed_kt: Option<i64>,
    area_num_points: Option<i64>,
}

impl TryFrom<AirSigmetRow> for AirSigmet {
    type Error = anyhow::Error;

    fn try_from(row: AirSigmetRow) -> Result<Self> {
        Ok(AirSigmet {
            raw_text: row.raw_text,
            valid_time_from: from_epoch(row.valid_time_from)?,
            valid_time_to: from_epoch(row.valid_time_to)?,
            airsigmet_type: row.airsigmet_type,
            hazard_type: row.hazard_type,
            hazard_severity: row.hazard_severity,
            altitude_min_ft_msl: row.altitude_min_ft_msl,
            altitude_max_ft_msl: row.altitude_max_ft_msl,
            movement_dir_degrees: row.movement_dir_degrees,
            movement_speed_kt: row.movement_speed_kt,
            area_num_points: row.area_num_points,
            area: HazardArea::default(),
        })
    }
}
