//! Content-stream parser (§4.7): operand/operator machine plus the inline-image (`BI …
//! ID … EI`) mode switch and its per-filter end-detection heuristic.

use crate::error::{Result, Stage, Warning};
use crate::object::StringFormat;

use super::operators::operand_arity;
use super::token::{CToken, ContentTokenizer};

/// An operand value in the content-stream grammar. A smaller sibling of
/// [`crate::object::Object`] — no `Ref`/`Stream` variants exist in this grammar, and
/// names are plain `String`s rather than interned (a per-page content stream does not
/// warrant its own interner).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Null,
    Bool(bool),
    Number(f64),
    Name(String),
    String(Vec<u8>, StringFormat),
    Array(Vec<Operand>),
    Dict(Vec<(String, Operand)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: String,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub params: Vec<(String, Operand)>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Operation(Operation),
    InlineImage(InlineImage),
}

pub fn parse_content_stream(data: &[u8]) -> Result<(Vec<ContentItem>, Vec<Warning>)> {
    let mut parser = ContentParser::new(data);
    let items = parser.run()?;
    Ok((items, parser.warnings))
}

struct ContentParser<'a> {
    tok: ContentTokenizer<'a>,
    data: &'a [u8],
    warnings: Vec<Warning>,
}

impl<'a> ContentParser<'a> {
    fn new(data: &'a [u8]) -> Self {
        ContentParser { tok: ContentTokenizer::new(data), data, warnings: Vec::new() }
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning::new(Stage::ContentStream, message.into()));
    }

    fn run(&mut self) -> Result<Vec<ContentItem>> {
        let mut items = Vec::new();
        let mut operands: Vec<Operand> = Vec::new();
        loop {
            let token = self.tok.next_token();
            match token {
                CToken::Eof => {
                    if !operands.is_empty() {
                        self.warn(format!("{} trailing operand(s) with no terminating operator", operands.len()));
                    }
                    break;
                }
                CToken::Operator(op) if op == "BI" => {
                    let inline = self.parse_inline_image()?;
                    items.push(ContentItem::InlineImage(inline));
                    operands.clear();
                }
                CToken::Operator(op) => {
                    items.push(ContentItem::Operation(Operation { op, operands: std::mem::take(&mut operands) }));
                }
                CToken::ArrayClose | CToken::DictClose => {
                    self.warn("unexpected closing delimiter, skipped");
                }
                other => {
                    operands.push(self.operand_from_token(other));
                }
            }
        }
        for (offset, message) in std::mem::take(&mut self.tok.warnings) {
            self.warnings.push(Warning::new(Stage::ContentStream, format!("offset {offset}: {message}")));
        }
        Ok(items)
    }

    fn operand_from_token(&mut self, token: CToken) -> Operand {
        match token {
            CToken::Number(n) => Operand::Number(n),
            CToken::Name(s) => Operand::Name(s),
            CToken::String(b, f) => Operand::String(b, f),
            CToken::Bool(b) => Operand::Bool(b),
            CToken::Null => Operand::Null,
            CToken::ArrayOpen => self.parse_array(),
            CToken::DictOpen => self.parse_dict(),
            _ => Operand::Null,
        }
    }

    fn parse_array(&mut self) -> Operand {
        let mut items = Vec::new();
        loop {
            let token = self.tok.next_token();
            match token {
                CToken::ArrayClose | CToken::Eof => break,
                other => items.push(self.operand_from_token(other)),
            }
        }
        Operand::Array(items)
    }

    fn parse_dict(&mut self) -> Operand {
        let mut entries = Vec::new();
        loop {
            match self.tok.next_token() {
                CToken::DictClose | CToken::Eof => break,
                CToken::Name(key) => {
                    let value_tok = self.tok.next_token();
                    let value = self.operand_from_token(value_tok);
                    entries.push((key, value));
                }
                _ => continue,
            }
        }
        Operand::Dict(entries)
    }

    /// `BI` already consumed. Parses `/Key value` pairs until `ID`, then captures the
    /// image body and scans past `EI`.
    fn parse_inline_image(&mut self) -> Result<InlineImage> {
        let mut params = Vec::new();
        loop {
            match self.tok.next_token() {
                CToken::Operator(op) if op == "ID" => break,
                CToken::Eof => {
                    self.warn("inline image truncated before 'ID'");
                    return Ok(InlineImage { params, data: Vec::new() });
                }
                CToken::Name(key) => {
                    let value_tok = self.tok.next_token();
                    let value = self.operand_from_token(value_tok);
                    params.push((key, value));
                }
                _ => continue,
            }
        }
        // 'ID' is followed by exactly one whitespace byte, then raw image data.
        if crate::scanner::is_whitespace(self.tok.scanner.peek() as u8) {
            self.tok.scanner.advance();
        }
        let body_start = self.tok.scanner.pos();
        let filter = inline_filter_name(&params);
        let (rel_end, warn_msg) = find_inline_image_end(&self.data[body_start..], filter.as_deref());
        if let Some(msg) = warn_msg {
            self.warn(msg);
        }
        let data_end = body_start + rel_end;
        let data = self.data[body_start..data_end].to_vec();
        self.tok.scanner.seek(data_end);

        // scan past EI
        self.tok.scanner.skip_while(crate::scanner::is_whitespace);
        match self.tok.next_token() {
            CToken::Operator(op) if op == "EI" => {}
            _ => self.warn("expected 'EI' after inline image data"),
        }
        Ok(InlineImage { params, data })
    }
}

fn inline_filter_name(params: &[(String, Operand)]) -> Option<String> {
    let key = params.iter().find(|(k, _)| k == "F" || k == "Filter")?;
    match &key.1 {
        Operand::Name(n) => Some(crate::filters::resolve_alias(n).to_string()),
        Operand::Array(items) => items.first().and_then(|o| match o {
            Operand::Name(n) => Some(crate::filters::resolve_alias(n).to_string()),
            _ => None,
        }),
        _ => None,
    }
}

/// Returns the relative end offset (exclusive of the terminator) within `data`, plus an
/// optional warning message if detection had to fall back to a heuristic recovery.
fn find_inline_image_end(data: &[u8], filter: Option<&str>) -> (usize, Option<String>) {
    match filter {
        Some("DCTDecode") => match dct_end(data) {
            Some(end) => (end, None),
            None => (data.len(), Some("inline image: DCT end-of-image marker not found, took remainder as data".into())),
        },
        Some("ASCII85Decode") => match ascii85_end(data) {
            Some(end) => (end, None),
            None => (data.len(), Some("inline image: ASCII85 '~>' terminator not found, took remainder as data".into())),
        },
        Some("ASCIIHexDecode") => match data.iter().position(|&b| b == b'>') {
            Some(pos) => (pos + 1, None),
            None => (data.len(), Some("inline image: ASCIIHex '>' terminator not found, took remainder as data".into())),
        },
        _ => heuristic_end(data),
    }
}

fn dct_end(data: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        match marker {
            0x00 => i += 2,                  // stuffed byte
            0xFF => i += 1,                  // fill byte, don't advance past it
            0xD9 => return scan_for_ei(data, i + 2), // EOI
            m if (0xD0..=0xD7).contains(&m) || m == 0x01 || m == 0xD8 => i += 2,
            _ => {
                if i + 4 > data.len() {
                    return None;
                }
                let len = ((data[i + 2] as usize) << 8) | data[i + 3] as usize;
                i += 2 + len.max(2);
            }
        }
    }
    None
}

fn scan_for_ei(data: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 2 < data.len() {
        if crate::scanner::is_whitespace(data[i]) && &data[i + 1..i + 3] == b"EI" {
            return Some(i);
        }
        i += 1;
    }
    Some(from) // EOI found but no clean EI boundary; end the image right after EOI
}

fn ascii85_end(data: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < data.len() {
        if data[i] == b'~' {
            let mut j = i + 1;
            while j < data.len() && data[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < data.len() && data[j] == b'>' {
                return Some(j + 1);
            }
            if data.get(i + 1..i + 3) == Some(b"EI".as_ref()) {
                return Some(i + 1);
            }
        }
        i += 1;
    }
    None
}

/// Heuristic recovery for an unknown/absent filter (§4.7 last bullet): search for
/// whitespace-preceded `EI`, require the following 15 bytes to be ASCII-printable
/// (single NULs tolerated, consecutive NULs reject), and require a syntactically valid
/// operator with matching arity to follow.
fn heuristic_end(data: &[u8]) -> (usize, Option<String>) {
    let mut best_ascii_candidate = None;
    let mut i = 0;
    while i + 2 < data.len() {
        if crate::scanner::is_whitespace(data[i]) && &data[i + 1..i + 3] == b"EI" {
            let after = i + 3;
            if ascii_printable_window(&data[after.min(data.len())..]) {
                if best_ascii_candidate.is_none() {
                    best_ascii_candidate = Some(i);
                }
                if next_token_validates(&data[after.min(data.len())..]) {
                    return (i, None);
                }
            }
        }
        i += 1;
    }
    if let Some(i) = best_ascii_candidate {
        return (i, Some("inline image: no EI candidate validated against operator grammar, using the last ASCII-plausible candidate".into()));
    }
    (data.len(), Some("inline image: no EI candidate found, took remainder as data".into()))
}

fn ascii_printable_window(data: &[u8]) -> bool {
    let window = &data[..data.len().min(15)];
    let mut prev_nul = false;
    for &b in window {
        if b == 0 {
            if prev_nul {
                return false;
            }
            prev_nul = true;
            continue;
        }
        prev_nul = false;
        if !(0x20..=0x7E).contains(&b) && !crate::scanner::is_whitespace(b) {
            return false;
        }
    }
    true
}

fn next_token_validates(data: &[u8]) -> bool {
    let mut t = ContentTokenizer::new(data);
    let mut operands = Vec::new();
    loop {
        match t.next_token() {
            CToken::Eof => return false,
            CToken::Operator(op) => return operand_arity(&op).map(|n| n == operands.len()).unwrap_or(true),
            _ => operands.push(()),
        }
        if operands.len() > 16 {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_operations() {
        let (items, _) = parse_content_stream(b"1 0 0 1 0 0 cm q 1 0 0 RG 10 10 100 100 re S Q").unwrap();
        assert_eq!(items.len(), 4);
        match &items[0] {
            ContentItem::Operation(op) => {
                assert_eq!(op.op, "cm");
                assert_eq!(op.operands.len(), 6);
            }
            _ => panic!("expected operation"),
        }
    }

    #[test]
    fn inline_image_no_filter_roundtrip() {
        let stream = b"q BI /W 2 /H 2 /BPC 8 /CS /G ID \x01\x02\x03\x04 EI Q";
        let (items, _) = parse_content_stream(stream).unwrap();
        let inline = items.iter().find_map(|i| match i {
            ContentItem::InlineImage(img) => Some(img),
            _ => None,
        });
        assert!(inline.is_some());
        assert_eq!(inline.unwrap().data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn inline_image_ascii_hex() {
        let stream = b"BI /F /AHx ID 48656C6C6F> EI";
        let (items, _) = parse_content_stream(stream).unwrap();
        match &items[0] {
            ContentItem::InlineImage(img) => assert_eq!(img.data, b"48656C6C6F>"),
            _ => panic!("expected inline image"),
        }
    }

    #[test]
    fn trailing_operands_warn() {
        let (_items, warnings) = parse_content_stream(b"1 2 3").unwrap();
        assert!(!warnings.is_empty());
    }

    #[test]
    fn stray_closing_delimiter_recovers() {
        let (items, warnings) = parse_content_stream(b"q > Q").unwrap();
        assert_eq!(items.len(), 2);
        assert!(!warnings.is_empty());
    }
}
