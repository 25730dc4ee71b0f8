//! Weather bulletin records.
//!
//! These mirror the rows stored by the ingest pipeline. JSON output renders
//! timestamps as floating-point epoch seconds and leaves out unset fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hazard::{Hazard, HazardArea};

/// An AIRMET or SIGMET advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirSigmet {
    pub raw_text: String,
    #[serde(with = "epoch_seconds")]
    pub valid_time_from: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub valid_time_to: DateTime<Utc>,
    /// AIRMET, SIGMET, OUTLOOK...
    pub airsigmet_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_min_ft_msl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_max_ft_msl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_dir_degrees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_speed_kt: Option<i64>,
    /// Vertex count as declared by the bulletin, not necessarily `area.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_num_points: Option<i64>,
    #[serde(default)]
    pub area: HazardArea,
}

impl AirSigmet {
    /// Whether the advisory is valid at any time within `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.valid_time_from <= to && self.valid_time_to >= from
    }
}

impl Hazard for AirSigmet {
    fn area(&self) -> &HazardArea {
        &self.area
    }
}

/// Terminal aerodrome forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taf {
    pub raw_text: String,
    pub station_id: String,
    #[serde(default, with = "epoch_seconds::option", skip_serializing_if = "Option::is_none")]
    pub issue_time: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_seconds::option", skip_serializing_if = "Option::is_none")]
    pub bulletin_time: Option<DateTime<Utc>>,
    #[serde(with = "epoch_seconds")]
    pub valid_time_from: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub valid_time_to: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
    #[serde(default)]
    pub forecast: Vec<Forecast>,
}

impl Taf {
    /// Whether the forecast is valid at `at` (inclusive bounds).
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.valid_time_from <= at && at <= self.valid_time_to
    }
}

/// One forecast period inside a TAF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(with = "epoch_seconds")]
    pub time_from: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub time_to: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_indicator: Option<String>,
    #[serde(default, with = "epoch_seconds::option", skip_serializing_if = "Option::is_none")]
    pub time_becoming: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_dir_degrees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_kt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gust_kt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_shear_hgt_ft_agl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_shear_dir_degrees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_shear_speed_kt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_statute_mi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altim_in_hg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vert_vis_ft: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wx_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_decoded: Option<String>,
    #[serde(default)]
    pub sky_condition: Vec<SkyCondition>,
    #[serde(default)]
    pub turbulence_condition: Vec<TurbulenceCondition>,
    #[serde(default)]
    pub icing_condition: Vec<IcingCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyCondition {
    pub sky_cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_base_ft_agl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbulence_intensity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbulence_min_alt_ft_agl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbulence_max_alt_ft_agl: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcingCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icing_intensity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icing_min_alt_ft_agl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icing_max_alt_ft_agl: Option<i64>,
}

/// Routine surface observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metar {
    pub raw_text: String,
    pub station_id: String,
    #[serde(with = "epoch_seconds")]
    pub observation_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dewpoint_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_dir_degrees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_kt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gust_kt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_statute_mi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altim_in_hg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_level_pressure_mb: Option<f64>,
    /// Comma-separated names of the raised QC flags (e.g. `auto_station`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_control_flags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wx_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_hr_pressure_tendency_mb: Option<f64>,
    #[serde(default, rename = "maxT_c", skip_serializing_if = "Option::is_none")]
    pub max_t_c: Option<f64>,
    #[serde(default, rename = "minT_c", skip_serializing_if = "Option::is_none")]
    pub min_t_c: Option<f64>,
    #[serde(default, rename = "maxT24hr_c", skip_serializing_if = "Option::is_none")]
    pub max_t24hr_c: Option<f64>,
    #[serde(default, rename = "minT24hr_c", skip_serializing_if = "Option::is_none")]
    pub min_t24hr_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcp3hr_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcp6hr_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcp24hr_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vert_vis_ft: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metar_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
    #[serde(default)]
    pub sky_condition: Vec<SkyCondition>,
}

/// Convert a timestamp to floating-point epoch seconds.
pub fn to_epoch_seconds(value: &DateTime<Utc>) -> f64 {
    value.timestamp() as f64 + f64::from(value.timestamp_subsec_nanos()) / 1e9
}

/// Convert floating-point epoch seconds to a timestamp.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Serde adapter writing timestamps as epoch seconds.
pub mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::to_epoch_seconds(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        super::from_epoch_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {secs}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&super::super::to_epoch_seconds(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<f64>::deserialize(deserializer)? {
                Some(secs) => super::super::from_epoch_seconds(secs)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {secs}"))),
                None => Ok(None),
            }
        }
    }
}
