//! Flate (zlib) codec, built on the `flate2` crate.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Tolerates a missing trailing checksum: if the stream ends mid-deflate, return what
/// was decoded up to the error rather than failing the whole stream (§4.5).
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(_) if !out.is_empty() => {
            log::warn!("FlateDecode: truncated/corrupt stream, returning {} bytes decoded before the error", out.len());
            Ok(out)
        }
        Err(e) => Err(Error::filter(format!("FlateDecode: {e}"))),
    }
}

pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(|e| Error::filter(format!("FlateDecode encode: {e}")))?;
    encoder.finish().map_err(|e| Error::filter(format!("FlateDecode encode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let encoded = encode(&data).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn truncated_stream_returns_partial() {
        let data = b"some reasonably compressible text text text text".to_vec();
        let encoded = encode(&data).unwrap();
        let truncated = &encoded[..encoded.len() - 4];
        // Should not panic; either succeeds fully or returns a partial prefix.
        let _ = decode(truncated);
    }
}
