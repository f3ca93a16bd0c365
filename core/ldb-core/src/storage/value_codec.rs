//! Row value encoding.
//!
//! Stored values carry a one-byte tag so decoding never has to guess:
//!
//! | Tag    | Body                          |
//! |--------|-------------------------------|
//! | `0x00` | raw row buffer                |
//! | `0x01` | zstd frame of the row buffer  |
//!
//! Compression is only kept when it makes the body smaller; otherwise the raw
//! row is stored. Decoding follows the tag, so changing the configured
//! algorithm never strands existing values.

use crate::config::{CompressionAlgorithm, CompressionConfig};
use crate::error::{LdbError, LdbResult};
use tracing::debug;

/// Tag of an uncompressed row.
pub const TAG_RAW: u8 = 0x00;
/// Tag of a zstd-compressed row.
pub const TAG_ZSTD: u8 = 0x01;

/// Encoder for row values, parameterised by the active compression setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec {
    compression: CompressionConfig,
}

impl ValueCodec {
    pub fn new(compression: CompressionConfig) -> Self {
        Self { compression }
    }

    /// Encode a row for storage.
    pub fn encode(&self, row: &[u8]) -> Vec<u8> {
        if self.compression.algorithm() == CompressionAlgorithm::Zstd {
            match zstd::bulk::compress(row, self.compression.level()) {
                Ok(compressed) if compressed.len() < row.len() => {
                    return tagged(TAG_ZSTD, &compressed);
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "zstd compression failed, storing raw row"),
            }
        }
        tagged(TAG_RAW, row)
    }

    /// Decode a stored value back into a row of exactly `record_length` bytes.
    pub fn decode(stored: &[u8], record_length: usize) -> LdbResult<Vec<u8>> {
        let (tag, body) = stored
            .split_first()
            .ok_or_else(|| LdbError::Corruption("empty value".to_string()))?;

        let row = match *tag {
            TAG_RAW => body.to_vec(),
            TAG_ZSTD => zstd::bulk::decompress(body, record_length)
                .map_err(|e| LdbError::Corruption(format!("zstd decompression failed: {e}")))?,
            other => {
                return Err(LdbError::Corruption(format!(
                    "unknown value tag {other:#04x}"
                )));
            }
        };

        if row.len() != record_length {
            return Err(LdbError::Corruption(format!(
                "decoded row has {} bytes, record length is {record_length}",
                row.len()
            )));
        }
        Ok(row)
    }
}

fn tagged(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut value = Vec::with_capacity(body.len() + 1);
    value.push(tag);
    value.extend_from_slice(body);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressible_row() -> Vec<u8> {
        let mut row = vec![0u8; 512];
        row[..5].copy_from_slice(b"alice");
        row
    }

    #[test]
    fn compressible_row_is_zstd_tagged() {
        let codec = ValueCodec::new(CompressionConfig::zstd());
        let row = compressible_row();
        let stored = codec.encode(&row);
        assert_eq!(stored[0], TAG_ZSTD);
        assert!(stored.len() < row.len());
        assert_eq!(ValueCodec::decode(&stored, row.len()).unwrap(), row);
    }

    #[test]
    fn incompressible_row_falls_back_to_raw() {
        let codec = ValueCodec::new(CompressionConfig::zstd());
        // Too short for a zstd frame to win
        let row = vec![0x5A, 0x13, 0xC7, 0x01];
        let stored = codec.encode(&row);
        assert_eq!(stored[0], TAG_RAW);
        assert_eq!(&stored[1..], &row[..]);
        assert_eq!(ValueCodec::decode(&stored, row.len()).unwrap(), row);
    }

    #[test]
    fn compression_disabled_stores_raw() {
        let codec = ValueCodec::new(CompressionConfig::none());
        let row = compressible_row();
        let stored = codec.encode(&row);
        assert_eq!(stored[0], TAG_RAW);
        assert_eq!(stored.len(), row.len() + 1);
    }

    #[test]
    fn raw_values_decode_after_enabling_compression() {
        let row = compressible_row();
        let stored = ValueCodec::new(CompressionConfig::none()).encode(&row);
        assert_eq!(ValueCodec::decode(&stored, row.len()).unwrap(), row);
    }

    #[test]
    fn corrupt_values_rejected() {
        assert!(matches!(
            ValueCodec::decode(&[], 4),
            Err(LdbError::Corruption(_))
        ));
        assert!(matches!(
            ValueCodec::decode(&[0x7F, 1, 2, 3, 4], 4),
            Err(LdbError::Corruption(_))
        ));
        assert!(matches!(
            ValueCodec::decode(&[TAG_ZSTD, 1, 2, 3], 4),
            Err(LdbError::Corruption(_))
        ));
        // raw body of the wrong size
        assert!(matches!(
            ValueCodec::decode(&[TAG_RAW, 1, 2], 4),
            Err(LdbError::Corruption(_))
        ));
    }
}
