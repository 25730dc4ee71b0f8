use avwx_core::GeometryError;

use crate::record::FieldKind;

/// Errors raised while decoding and converting bulletins.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unknown weather type {0:?} (expected airsigmet, taf or metar)")]
    UnknownWeatherType(String),

    #[error("gzip decode failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("decoded payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("XML error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("{record}: missing required fields: {}", fields.join(", "))]
    MissingFields {
        record: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{record}.{field}: cannot parse {value:?} as {kind}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        value: String,
        kind: FieldKind,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
