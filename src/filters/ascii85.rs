//! ASCII85Decode (§4.5): base-85 over `!`..`u`, `z` shorthand for a zero group, `~>` ends
//! the stream.

use crate::error::{Error, Result};

pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut group = [0u8; 5];
    let mut group_len = 0usize;

    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if b == b'~' {
            break;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b'z' && group_len == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            i += 1;
            continue;
        }
        if !(b'!'..=b'u').contains(&b) {
            return Err(Error::filter(format!("ASCII85Decode: byte {b:#x} out of range")));
        }
        group[group_len] = b - b'!';
        group_len += 1;
        i += 1;
        if group_len == 5 {
            out.extend_from_slice(&decode_group(&group, 5));
            group_len = 0;
        }
    }
    if group_len > 0 {
        // Pad the partial group with 'u' (84) before decoding, per Adobe's tuple rule.
        for slot in group.iter_mut().skip(group_len) {
            *slot = 84;
        }
        let full = decode_group(&group, 5);
        out.extend_from_slice(&full[..group_len - 1]);
    }
    Ok(out)
}

fn decode_group(digits: &[u8; 5], _len: usize) -> [u8; 4] {
    let mut value: u32 = 0;
    for &d in digits {
        value = value.wrapping_mul(85).wrapping_add(d as u32);
    }
    value.to_be_bytes()
}

pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 5 / 4 + 2);
    for chunk in data.chunks(4) {
        if chunk.len() == 4 && chunk == [0, 0, 0, 0] {
            out.push(b'z');
            continue;
        }
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        let value = u32::from_be_bytes(buf);
        let mut digits = [0u8; 5];
        let mut v = value;
        for d in digits.iter_mut().rev() {
            *d = (v % 85) as u8;
            v /= 85;
        }
        let n = chunk.len() + 1;
        for &d in &digits[..n] {
            out.push(d + b'!');
        }
    }
    out.extend_from_slice(b"~>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"Man is distinguished".to_vec();
        let encoded = encode(&data).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn z_shorthand() {
        let decoded = decode(b"z~>").unwrap();
        assert_eq!(decoded, vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(decode(b"~>").unwrap(), Vec::<u8>::new());
    }
}
