//! Payload decompression.
//!
//! Cache files are gzip-compressed, and some mirrors compress them a second
//! time in transit. Up to two gzip layers are removed; anything that does not
//! start with the gzip magic is passed through unchanged.

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::IngestError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const MAX_LAYERS: usize = 2;

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, IngestError> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(IngestError::Decompress)?;
    Ok(out)
}

/// Strip gzip layers and return the document text.
pub fn decompress(bytes: &[u8]) -> Result<String, IngestError> {
    let mut data = bytes.to_vec();
    for layer in 0..MAX_LAYERS {
        if !is_gzip(&data) {
            break;
        }
        debug!(layer, compressed = data.len(), "removing gzip layer");
        data = gunzip(&data)?;
    }
    Ok(String::from_utf8(data)?)
}
