//! Conversion of ADDS XML bulletins into weather records.
//!
//! A record that fails validation is logged and skipped; the rest of the
//! bulletin is still converted. A malformed document fails as a whole.
//!
//! Elements carrying attributes contribute one field per attribute, named
//! `<element>_<attribute>` (`<area num_points="5">` sets `area_num_points`).

use avwx_core::{
    AirSigmet, Forecast, GeoPoint, HazardArea, IcingCondition, Metar, SkyCondition, Taf,
    TurbulenceCondition,
};
use tracing::{debug, warn};

use crate::client::WeatherType;
use crate::error::IngestError;
use crate::record::FieldKind::{self, *};
use crate::record::{FieldSpec, Fields, RecordBuilder, Schema};
use crate::xml::{parse_document, Element};

const fn req(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec::required(name, kind)
}

const fn opt(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec::optional(name, kind)
}

static AIRSIGMET: Schema = Schema {
    record: "AIRSIGMET",
    fields: &[
        req("raw_text", Text),
        req("valid_time_from", Timestamp),
        req("valid_time_to", Timestamp),
        req("airsigmet_type", Text),
        opt("hazard_type", Text),
        opt("hazard_severity", Text),
        opt("altitude_min_ft_msl", Integer),
        opt("altitude_max_ft_msl", Integer),
        opt("movement_dir_degrees", Integer),
        opt("movement_speed_kt", Integer),
        opt("area_num_points", Integer),
    ],
    aliases: &[],
};

static POINT: Schema = Schema {
    record: "point",
    fields: &[req("latitude", Float), req("longitude", Float)],
    aliases: &[],
};

static TAF: Schema = Schema {
    record: "TAF",
    fields: &[
        req("raw_text", Text),
        req("station_id", Text),
        opt("issue_time", Timestamp),
        opt("bulletin_time", Timestamp),
        req("valid_time_from", Timestamp),
        req("valid_time_to", Timestamp),
        opt("remarks", Text),
        opt("latitude", Float),
        opt("longitude", Float),
        opt("elevation_m", Float),
    ],
    aliases: &[],
};

static FORECAST: Schema = Schema {
    record: "forecast",
    fields: &[
        req("time_from", Timestamp),
        req("time_to", Timestamp),
        opt("change_indicator", Text),
        opt("time_becoming", Timestamp),
        opt("probability", Integer),
        opt("wind_dir_degrees", Integer),
        opt("wind_speed_kt", Integer),
        opt("wind_gust_kt", Integer),
        opt("wind_shear_hgt_ft_agl", Integer),
        opt("wind_shear_dir_degrees", Integer),
        opt("wind_shear_speed_kt", Integer),
        opt("visibility_statute_mi", Float),
        opt("altim_in_hg", Float),
        opt("vert_vis_ft", Integer),
        opt("wx_string", Text),
        opt("not_decoded", Text),
    ],
    aliases: &[("fcst_time_from", "time_from"), ("fcst_time_to", "time_to")],
};

static SKY: Schema = Schema {
    record: "sky_condition",
    fields: &[
        req("sky_cover", Text),
        opt("cloud_base_ft_agl", Integer),
        opt("cloud_type", Text),
    ],
    aliases: &[],
};

static TURBULENCE: Schema = Schema {
    record: "turbulence_condition",
    fields: &[
        opt("turbulence_intensity", Text),
        opt("turbulence_min_alt_ft_agl", Integer),
        opt("turbulence_max_alt_ft_agl", Integer),
    ],
    aliases: &[],
};

static ICING: Schema = Schema {
    record: "icing_condition",
    fields: &[
        opt("icing_intensity", Text),
        opt("icing_min_alt_ft_agl", Integer),
        opt("icing_max_alt_ft_agl", Integer),
    ],
    aliases: &[],
};

static METAR: Schema = Schema {
    record: "METAR",
    fields: &[
        req("raw_text", Text),
        req("station_id", Text),
        req("observation_time", Timestamp),
        opt("latitude", Float),
        opt("longitude", Float),
        opt("temp_c", Float),
        opt("dewpoint_c", Float),
        opt("wind_dir_degrees", Integer),
        opt("wind_speed_kt", Integer),
        opt("wind_gust_kt", Integer),
        opt("visibility_statute_mi", Float),
        opt("altim_in_hg", Float),
        opt("sea_level_pressure_mb", Float),
        opt("quality_control_flags", Text),
        opt("wx_string", Text),
        opt("flight_category", Text),
        opt("three_hr_pressure_tendency_mb", Float),
        opt("maxT_c", Float),
        opt("minT_c", Float),
        opt("maxT24hr_c", Float),
        opt("minT24hr_c", Float),
        opt("precip_in", Float),
        opt("pcp3hr_in", Float),
        opt("pcp6hr_in", Float),
        opt("pcp24hr_in", Float),
        opt("snow_in", Float),
        opt("vert_vis_ft", Integer),
        opt("metar_type", Text),
        opt("elevation_m", Float),
    ],
    aliases: &[],
};

/// Converted records of one bulletin.
#[derive(Debug, Clone, PartialEq)]
pub enum Bulletin {
    AirSigmets(Vec<AirSigmet>),
    Tafs(Vec<Taf>),
    Metars(Vec<Metar>),
}

impl Bulletin {
    pub fn parse(weather_type: WeatherType, xml: &str) -> Result<Self, IngestError> {
        Ok(match weather_type {
            WeatherType::AirSigmet => Bulletin::AirSigmets(parse_airsigmets(xml)?),
            WeatherType::Taf => Bulletin::Tafs(parse_tafs(xml)?),
            WeatherType::Metar => Bulletin::Metars(parse_metars(xml)?),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            Bulletin::AirSigmets(records) => records.len(),
            Bulletin::Tafs(records) => records.len(),
            Bulletin::Metars(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn parse_airsigmets(xml: &str) -> Result<Vec<AirSigmet>, IngestError> {
    let root = parse_document(xml)?;
    Ok(convert_all(&root, "AIRSIGMET", convert_airsigmet))
}

pub fn parse_tafs(xml: &str) -> Result<Vec<Taf>, IngestError> {
    let root = parse_document(xml)?;
    Ok(convert_all(&root, "TAF", convert_taf))
}

pub fn parse_metars(xml: &str) -> Result<Vec<Metar>, IngestError> {
    let root = parse_document(xml)?;
    Ok(convert_all(&root, "METAR", convert_metar))
}

fn convert_all<T>(
    root: &Element,
    tag: &str,
    convert: fn(&Element) -> Result<T, IngestError>,
) -> Vec<T> {
    let Some(data) = root.child("data") else {
        warn!(root = %root.name, "response has no <data> element");
        return Vec::new();
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, element) in data.children_named(tag).enumerate() {
        match convert(element) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!(index, "skipping {} record: {}", tag, err);
            }
        }
    }
    debug!(tag, converted = records.len(), skipped, "bulletin converted");
    records
}

/// Feed one child element into the builder: its text, or its attributes.
fn apply(builder: &mut RecordBuilder, element: &Element) -> Result<(), IngestError> {
    if element.attributes.is_empty() {
        builder.set(&element.name, &element.text)?;
    } else {
        for (key, value) in &element.attributes {
            builder.set(&format!("{}_{}", element.name, key), value)?;
        }
    }
    Ok(())
}

/// Build a record whose fields are all attributes of one element.
fn attribute_fields(schema: &'static Schema, element: &Element) -> Result<Fields, IngestError> {
    let mut builder = RecordBuilder::new(schema);
    for (key, value) in &element.attributes {
        builder.set(key, value)?;
    }
    builder.finish()
}

fn convert_point(element: &Element) -> Result<GeoPoint, IngestError> {
    let mut builder = RecordBuilder::new(&POINT);
    for child in &element.children {
        builder.set(&child.name, &child.text)?;
    }
    let fields = builder.finish()?;
    Ok(GeoPoint::new(
        fields.required_float("latitude")?,
        fields.required_float("longitude")?,
    )?)
}

fn convert_airsigmet(element: &Element) -> Result<AirSigmet, IngestError> {
    let mut builder = RecordBuilder::new(&AIRSIGMET);
    let mut vertices = Vec::new();
    for child in &element.children {
        apply(&mut builder, child)?;
        if child.name == "area" {
            for point in child.children_named("point") {
                vertices.push(convert_point(point)?);
            }
        }
    }

    let mut fields = builder.finish()?;
    Ok(AirSigmet {
        raw_text: fields.required_text("raw_text")?,
        valid_time_from: fields.required_timestamp("valid_time_from")?,
        valid_time_to: fields.required_timestamp("valid_time_to")?,
        airsigmet_type: fields.required_text("airsigmet_type")?,
        hazard_type: fields.text("hazard_type"),
        hazard_severity: fields.text("hazard_severity"),
        altitude_min_ft_msl: fields.integer("altitude_min_ft_msl"),
        altitude_max_ft_msl: fields.integer("altitude_max_ft_msl"),
        movement_dir_degrees: fields.integer("movement_dir_degrees"),
        movement_speed_kt: fields.integer("movement_speed_kt"),
        area_num_points: fields.integer("area_num_points"),
        area: HazardArea::new(vertices),
    })
}

fn convert_taf(element: &Element) -> Result<Taf, IngestError> {
    let mut builder = RecordBuilder::new(&TAF);
    let mut forecast = Vec::new();
    for child in &element.children {
        if child.name == "forecast" {
            forecast.push(convert_forecast(child)?);
        } else {
            apply(&mut builder, child)?;
        }
    }

    let mut fields = builder.finish()?;
    Ok(Taf {
        raw_text: fields.required_text("raw_text")?,
        station_id: fields.required_text("station_id")?,
        issue_time: fields.timestamp("issue_time"),
        bulletin_time: fields.timestamp("bulletin_time"),
        valid_time_from: fields.required_timestamp("valid_time_from")?,
        valid_time_to: fields.required_timestamp("valid_time_to")?,
        remarks: fields.text("remarks"),
        latitude: fields.float("latitude"),
        longitude: fields.float("longitude"),
        elevation_m: fields.float("elevation_m"),
        forecast,
    })
}

fn convert_forecast(element: &Element) -> Result<Forecast, IngestError> {
    let mut builder = RecordBuilder::new(&FORECAST);
    let mut sky_condition = Vec::new();
    let mut turbulence_condition = Vec::new();
    let mut icing_condition = Vec::new();

    for child in &element.children {
        match child.name.as_str() {
            "sky_condition" => sky_condition.push(convert_sky(child)?),
            "turbulence_condition" => {
                let mut fields = attribute_fields(&TURBULENCE, child)?;
                turbulence_condition.push(TurbulenceCondition {
                    turbulence_intensity: fields.text("turbulence_intensity"),
                    turbulence_min_alt_ft_agl: fields.integer("turbulence_min_alt_ft_agl"),
                    turbulence_max_alt_ft_agl: fields.integer("turbulence_max_alt_ft_agl"),
                });
            }
            "icing_condition" => {
                let mut fields = attribute_fields(&ICING, child)?;
                icing_condition.push(IcingCondition {
                    icing_intensity: fields.text("icing_intensity"),
                    icing_min_alt_ft_agl: fields.integer("icing_min_alt_ft_agl"),
                    icing_max_alt_ft_agl: fields.integer("icing_max_alt_ft_agl"),
                });
            }
            _ => apply(&mut builder, child)?,
        }
    }

    let mut fields = builder.finish()?;
    Ok(Forecast {
        time_from: fields.required_timestamp("time_from")?,
        time_to: fields.required_timestamp("time_to")?,
        change_indicator: fields.text("change_indicator"),
        time_becoming: fields.timestamp("time_becoming"),
        probability: fields.integer("probability"),
        wind_dir_degrees: fields.integer("wind_dir_degrees"),
        wind_speed_kt: fields.integer("wind_speed_kt"),
        wind_gust_kt: fields.integer("wind_gust_kt"),
        wind_shear_hgt_ft_agl: fields.integer("wind_shear_hgt_ft_agl"),
        wind_shear_dir_degrees: fields.integer("wind_shear_dir_degrees"),
        wind_shear_speed_kt: fields.integer("wind_shear_speed_kt"),
        visibility_statute_mi: fields.float("visibility_statute_mi"),
        altim_in_hg: fields.float("altim_in_hg"),
        vert_vis_ft: fields.integer("vert_vis_ft"),
        wx_string: fields.text("wx_string"),
        not_decoded: fields.text("not_decoded"),
        sky_condition,
        turbulence_condition,
        icing_condition,
    })
}

fn convert_sky(element: &Element) -> Result<SkyCondition, IngestError> {
    let mut fields = attribute_fields(&SKY, element)?;
    Ok(SkyCondition {
        sky_cover: fields.required_text("sky_cover")?,
        cloud_base_ft_agl: fields.integer("cloud_base_ft_agl"),
        cloud_type: fields.text("cloud_type"),
    })
}

fn convert_metar(element: &Element) -> Result<Metar, IngestError> {
    let mut builder = RecordBuilder::new(&METAR);
    let mut sky_condition = Vec::new();
    for child in &element.children {
        match child.name.as_str() {
            "sky_condition" => sky_condition.push(convert_sky(child)?),
            "quality_control_flags" => {
                let raised = raised_flags(child);
                if !raised.is_empty() {
                    builder.set("quality_control_flags", &raised.join(","))?;
                }
            }
            _ => apply(&mut builder, child)?,
        }
    }

    let mut fields = builder.finish()?;
    Ok(Metar {
        raw_text: fields.required_text("raw_text")?,
        station_id: fields.required_text("station_id")?,
        observation_time: fields.required_timestamp("observation_time")?,
        latitude: fields.float("latitude"),
        longitude: fields.float("longitude"),
        temp_c: fields.float("temp_c"),
        dewpoint_c: fields.float("dewpoint_c"),
        wind_dir_degrees: fields.integer("wind_dir_degrees"),
        wind_speed_kt: fields.integer("wind_speed_kt"),
        wind_gust_kt: fields.integer("wind_gust_kt"),
        visibility_statute_mi: fields.float("visibility_statute_mi"),
        altim_in_hg: fields.float("altim_in_hg"),
        sea_level_pressure_mb: fields.float("sea_level_pressure_mb"),
        quality_control_flags: fields.text("quality_control_flags"),
        wx_string: fields.text("wx_string"),
        flight_category: fields.text("flight_category"),
        three_hr_pressure_tendency_mb: fields.float("three_hr_pressure_tendency_mb"),
        max_t_c: fields.float("maxT_c"),
        min_t_c: fields.float("minT_c"),
        max_t24hr_c: fields.float("maxT24hr_c"),
        min_t24hr_c: fields.float("minT24hr_c"),
        precip_in: fields.float("precip_in"),
        pcp3hr_in: fields.float("pcp3hr_in"),
        pcp6hr_in: fields.float("pcp6hr_in"),
        pcp24hr_in: fields.float("pcp24hr_in"),
        snow_in: fields.float("snow_in"),
        vert_vis_ft: fields.integer("vert_vis_ft"),
        metar_type: fields.text("metar_type"),
        elevation_m: fields.float("elevation_m"),
        sky_condition,
    })
}

/// Names of the QC flags set to `TRUE`.
fn raised_flags(element: &Element) -> Vec<&str> {
    element
        .children
        .iter()
        .filter(|flag| flag.text.trim().eq_ignore_ascii_case("true"))
        .map(|flag| flag.name.as_str())
        .collect()
}
