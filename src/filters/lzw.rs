//! LZW codec (§4.5): 9- to 12-bit variable-width codes, clear code 256, end-of-data 257,
//! early-change defaulting to `true`. Built on the `weezl` crate, which implements
//! exactly this TIFF/PDF-flavored LZW variant.

use weezl::{decode::Decoder, encode::Encoder, BitOrder};

use crate::error::{Error, Result};
use crate::object::Dict;

fn early_change(parm: Option<&Dict>) -> bool {
    parm.and_then(|p| p.get("EarlyChange")).and_then(|o| o.as_i64()).map(|v| v != 0).unwrap_or(true)
}

pub fn decode(data: &[u8], parm: Option<&Dict>) -> Result<Vec<u8>> {
    let mut decoder = if early_change(parm) {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        Decoder::new(BitOrder::Msb, 8)
    };
    decoder.decode(data).map_err(|e| Error::filter(format!("LZWDecode: {e}")))
}

pub fn encode(data: &[u8], parm: Option<&Dict>) -> Result<Vec<u8>> {
    let mut encoder = if early_change(parm) {
        Encoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        Encoder::new(BitOrder::Msb, 8)
    };
    encoder.encode(data).map_err(|e| Error::filter(format!("LZWDecode encode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"TOBEORNOTTOBEORTOBEORNOT".to_vec();
        let encoded = encode(&data, None).unwrap();
        let decoded = decode(&encoded, None).unwrap();
        assert_eq!(decoded, data);
    }
}
