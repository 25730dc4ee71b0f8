//! Schema-checked record builder.
//!
//! Each bulletin record type declares its fields up front: name, value kind
//! and whether the field is required. Tag text is parsed into the declared
//! kind as it arrives, and `finish` refuses to produce a record while any
//! required field is still unset.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Timestamp,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// Field list for one record type.
#[derive(Debug)]
pub struct Schema {
    pub record: &'static str,
    pub fields: &'static [FieldSpec],
    /// Alternate tag names, mapped to the declared field name.
    pub aliases: &'static [(&'static str, &'static str)],
}

impl Schema {
    fn lookup(&self, tag: &str) -> Option<&FieldSpec> {
        let name = self
            .aliases
            .iter()
            .find(|(alias, _)| *alias == tag)
            .map(|(_, name)| *name)
            .unwrap_or(tag);
        self.fields.iter().find(|spec| spec.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

/// Accumulates parsed field values for one record.
#[derive(Debug)]
pub struct RecordBuilder {
    schema: &'static Schema,
    values: HashMap<&'static str, FieldValue>,
}

impl RecordBuilder {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: HashMap::new(),
        }
    }

    /// Parse and store one field.
    ///
    /// Returns `Ok(false)` for tags the schema does not declare; those are
    /// ignored. Blank values leave the field unset.
    pub fn set(&mut self, tag: &str, raw: &str) -> Result<bool, IngestError> {
        let Some(spec) = self.schema.lookup(tag) else {
            return Ok(false);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(true);
        }
        let value = parse_value(spec.kind, raw).ok_or_else(|| IngestError::InvalidField {
            record: self.schema.record,
            field: spec.name,
            value: raw.to_string(),
            kind: spec.kind,
        })?;
        self.values.insert(spec.name, value);
        Ok(true)
    }

    #[cfg(test)]
    fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Required fields that have not been set, in declaration order.
    pub fn missing(&self) -> Vec<&'static str> {
        self.schema
            .fields
            .iter()
            .filter(|spec| spec.required && !self.values.contains_key(spec.name))
            .map(|spec| spec.name)
            .collect()
    }

    pub fn finish(self) -> Result<Fields, IngestError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(IngestError::MissingFields {
                record: self.schema.record,
                fields: missing,
            });
        }
        Ok(Fields {
            record: self.schema.record,
            values: self.values,
        })
    }
}

/// Validated field values of a finished record.
#[derive(Debug)]
pub struct Fields {
    record: &'static str,
    values: HashMap<&'static str, FieldValue>,
}

impl Fields {
    pub fn text(&mut self, name: &str) -> Option<String> {
        match self.values.remove(name) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(FieldValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name) {
            Some(FieldValue::Timestamp(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn required_text(&mut self, name: &'static str) -> Result<String, IngestError> {
        let record = self.record;
        self.text(name).ok_or_else(|| missing(record, name))
    }

    pub fn required_float(&self, name: &'static str) -> Result<f64, IngestError> {
        self.float(name).ok_or_else(|| missing(self.record, name))
    }

    pub fn required_timestamp(&self, name: &'static str) -> Result<DateTime<Utc>, IngestError> {
        self.timestamp(name).ok_or_else(|| missing(self.record, name))
    }
}

fn missing(record: &'static str, field: &'static str) -> IngestError {
    IngestError::MissingFields {
        record,
        fields: vec![field],
    }
}

fn parse_value(kind: FieldKind, raw: &str) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
        FieldKind::Integer => parse_integer(raw).map(FieldValue::Integer),
        FieldKind::Float => parse_float(raw).map(FieldValue::Float),
        FieldKind::Timestamp => parse_timestamp(raw).map(FieldValue::Timestamp),
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    // Some feeds write whole numbers as "17000.0".
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

fn parse_float(raw: &str) -> Option<f64> {
    // Visibility is reported as "10+" when unrestricted.
    let raw = raw.strip_suffix('+').unwrap_or(raw);
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    static SAMPLE: Schema = Schema {
        record: "SAMPLE",
        fields: &[
            FieldSpec::required("station_id", FieldKind::Text),
            FieldSpec::required("observed", FieldKind::Timestamp),
            FieldSpec::optional("wind_kt", FieldKind::Integer),
            FieldSpec::optional("visibility", FieldKind::Float),
        ],
        aliases: &[("obs_time", "observed")],
    };

    #[test]
    fn unknown_tags_are_ignored() {
        let mut builder = RecordBuilder::new(&SAMPLE);
        assert!(!builder.set("no_such_field", "x").unwrap());
        assert!(builder.set("station_id", "KJFK").unwrap());
    }

    #[test]
    fn finish_lists_every_missing_required_field() {
        let mut builder = RecordBuilder::new(&SAMPLE);
        builder.set("wind_kt", "12").unwrap();
        match builder.finish() {
            Err(IngestError::MissingFields { record, fields }) => {
                assert_eq!(record, "SAMPLE");
                assert_eq!(fields, vec!["station_id", "observed"]);
            }
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn values_are_parsed_into_declared_kinds() {
        let mut builder = RecordBuilder::new(&SAMPLE);
        builder.set("station_id", " KSTK ").unwrap();
        builder.set("obs_time", "2018-11-11T01:40:00Z").unwrap();
        builder.set("wind_kt", "17000.0").unwrap();
        builder.set("visibility", "10+").unwrap();

        let mut fields = builder.finish().unwrap();
        assert_eq!(fields.required_text("station_id").unwrap(), "KSTK");
        assert_eq!(
            fields.required_timestamp("observed").unwrap(),
            Utc.with_ymd_and_hms(2018, 11, 11, 1, 40, 0).unwrap()
        );
        assert_eq!(fields.integer("wind_kt"), Some(17000));
        assert_eq!(fields.float("visibility"), Some(10.0));
    }

    #[test]
    fn blank_values_leave_field_unset() {
        let mut builder = RecordBuilder::new(&SAMPLE);
        builder.set("wind_kt", "   ").unwrap();
        assert!(!builder.is_set("wind_kt"));
    }

    #[test]
    fn bad_values_name_the_field() {
        let mut builder = RecordBuilder::new(&SAMPLE);
        let err = builder.set("wind_kt", "calm").unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidField { field: "wind_kt", kind: FieldKind::Integer, .. }
        ));
        assert_eq!(err.to_string(), "SAMPLE.wind_kt: cannot parse \"calm\" as integer");
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        assert_eq!(
            parse_timestamp("2018-11-20 02:00:00"),
            Some(Utc.with_ymd_and_hms(2018, 11, 20, 2, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
