//! Pass-through for the image codecs the engine treats as opaque payloads
//! (CCITTFaxDecode, DCTDecode, JBIG2Decode, JPXDecode, §4.5 non-goals): the engine moves
//! these bytes around without understanding their internal structure.

pub fn decode(data: &[u8]) -> Vec<u8> {
    data.to_vec()
}

pub fn encode(data: &[u8]) -> Vec<u8> {
    data.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity() {
        let data = b"\xFF\xD8\xFF\xE0 jpeg-ish bytes".to_vec();
        assert_eq!(decode(&data), data);
        assert_eq!(encode(&data), data);
    }
}
