//! RunLengthDecode (§4.5): length byte `0..=127` copies the next `len+1` literal bytes;
//! `129..=255` repeats the following byte `257-len` times; `128` is end-of-data.

use crate::error::Result;

pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let len = data[i];
        i += 1;
        if len == 128 {
            break;
        } else if len < 128 {
            let n = len as usize + 1;
            let end = (i + n).min(data.len());
            out.extend_from_slice(&data[i..end]);
            i = end;
        } else {
            if i >= data.len() {
                break;
            }
            let count = 257 - len as usize;
            out.extend(std::iter::repeat(data[i]).take(count));
            i += 1;
        }
    }
    Ok(out)
}

pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        // Look for a run of identical bytes first.
        let mut run = 1;
        while i + run < data.len() && data[i + run] == data[i] && run < 128 {
            run += 1;
        }
        if run >= 2 {
            out.push((257 - run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }
        // Otherwise accumulate a literal run until a repeat of length >= 2 appears.
        let start = i;
        i += 1;
        while i < data.len() && (i - start) < 128 {
            let next_run = {
                let mut r = 1;
                while i + r < data.len() && data[i + r] == data[i] && r < 128 {
                    r += 1;
                }
                r
            };
            if next_run >= 2 {
                break;
            }
            i += 1;
        }
        let len = i - start;
        out.push((len - 1) as u8);
        out.extend_from_slice(&data[start..i]);
    }
    out.push(128);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"aaaaaaaahello world bbbbbbbbbbbbc".to_vec();
        let encoded = encode(&data).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn literal_run() {
        assert_eq!(decode(&[2, b'a', b'b', b'c', 128]).unwrap(), b"abc");
    }

    #[test]
    fn repeat_run() {
        assert_eq!(decode(&[(257 - 5) as u8, b'x', 128]).unwrap(), b"xxxxx");
    }
}
