//! Object parser (§4.3): turns the token stream from [`crate::lexer`] into [`Object`]
//! values, and owns the classic-xref-table / xref-stream ingestion that produces one
//! unified `(obj, gen) -> Location` mapping (§4.3 "Xref ingestion").

use std::collections::HashMap;

use crate::error::{Error, Result, Stage, Warning};
use crate::lexer::{Lexer, Token};
use crate::object::{Dict, Interner, Object, ObjectId, Stream};

/// Where an indirect object's bytes live, after xref ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Regular object at a byte offset in the file.
    Offset(usize),
    /// Object `index`-th member of the object stream with object number `stream_obj`.
    InStream { stream_obj: u32, index: u32 },
}

#[derive(Debug, Default)]
pub struct XrefTable {
    pub entries: HashMap<ObjectId, Location>,
    pub trailer: Dict,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    interner: &'a Interner,
    pub warnings: Vec<Warning>,
}

impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8], interner: &'a Interner) -> Self {
        Parser { lexer: Lexer::new(buf), interner, warnings: Vec::new() }
    }

    pub fn at(buf: &'a [u8], pos: usize, interner: &'a Interner) -> Self {
        Parser { lexer: Lexer::at(buf, pos), interner, warnings: Vec::new() }
    }

    pub fn pos(&self) -> usize {
        self.lexer.scanner.pos()
    }

    pub fn seek(&mut self, pos: usize) {
        self.lexer.scanner.seek(pos);
    }

    /// Peeks the next token without consuming it (used to decide between a classic
    /// `xref` table and an xref-stream indirect object at the same kind of offset).
    pub fn peek_token(&mut self) -> Token {
        let checkpoint = self.lexer.scanner.pos();
        let token = self.lexer.next_token();
        self.lexer.scanner.seek(checkpoint);
        token
    }

    pub fn advance_one_token(&mut self) {
        self.lexer.next_token();
    }

    fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.warnings.push(Warning::new(stage, message));
    }

    fn flush_lexer_warnings(&mut self, stage: Stage) {
        for (offset, message) in std::mem::take(&mut self.lexer.warnings) {
            self.warnings.push(Warning::new(stage, format!("offset {offset}: {message}")));
        }
    }

    /// Parses one direct object starting at the current position. Does not consume a
    /// trailing `obj`/`endobj` wrapper — callers of `parse_indirect_object` handle that.
    pub fn parse_object(&mut self) -> Result<Object> {
        let token = self.lexer.next_token();
        self.parse_object_from(token)
    }

    fn parse_object_from(&mut self, token: Token) -> Result<Object> {
        let obj = match token {
            Token::Eof => return Err(Error::lexical(Stage::ObjectParse, self.pos(), "unexpected end of input")),
            Token::Number(n) => self.parse_number_or_ref(n)?,
            Token::Name(s) => Object::Name(self.interner.intern(&s)),
            Token::String(bytes, fmt) => Object::String(bytes, fmt),
            Token::Keyword(k) => match k.as_str() {
                "true" => Object::Bool(true),
                "false" => Object::Bool(false),
                "null" => Object::Null,
                other => {
                    self.warn(Stage::ObjectParse, format!("unexpected keyword '{other}' in object position, treating as null"));
                    Object::Null
                }
            },
            Token::ArrayOpen => self.parse_array()?,
            Token::DictOpen => self.parse_dict_or_stream()?,
            Token::ProcOpen | Token::ProcClose | Token::ArrayClose | Token::DictClose => {
                self.warn(Stage::ObjectParse, "stray delimiter in object position");
                Object::Null
            }
        };
        self.flush_lexer_warnings(Stage::Lex);
        Ok(obj)
    }

    /// A bare number might be the first part of `N G R` (an indirect reference) or
    /// `N G obj` (an indirect object definition, only relevant at the top level). Peeks
    /// ahead without committing if it turns out to be a plain number.
    fn parse_number_or_ref(&mut self, first: f64) -> Result<Object> {
        if first.fract() != 0.0 || first < 0.0 {
            return Ok(Object::Number(first));
        }
        let checkpoint = self.lexer.scanner.pos();
        let second = self.lexer.next_token();
        if let Token::Number(gen) = second {
            if gen.fract() == 0.0 && gen >= 0.0 {
                let checkpoint2 = self.lexer.scanner.pos();
                let third = self.lexer.next_token();
                if let Token::Keyword(k) = &third {
                    if k == "R" {
                        return Ok(Object::Ref((first as u32, gen as u16)));
                    }
                }
                self.lexer.scanner.seek(checkpoint2);
            }
        }
        self.lexer.scanner.seek(checkpoint);
        Ok(Object::Number(first))
    }

    fn parse_array(&mut self) -> Result<Object> {
        let mut items = Vec::new();
        loop {
            let token = self.lexer.next_token();
            if matches!(token, Token::ArrayClose) {
                break;
            }
            if matches!(token, Token::Eof) {
                self.warn(Stage::ObjectParse, "unterminated array");
                break;
            }
            items.push(self.parse_object_from(token)?);
        }
        Ok(Object::Array(items))
    }

    fn parse_dict_or_stream(&mut self) -> Result<Object> {
        let dict = self.parse_dict_body()?;
        let checkpoint = self.lexer.scanner.pos();
        let token = self.lexer.next_token();
        if let Token::Keyword(k) = &token {
            if k == "stream" {
                return self.parse_stream_body(dict);
            }
        }
        self.lexer.scanner.seek(checkpoint);
        Ok(Object::Dict(dict))
    }

    fn parse_dict_body(&mut self) -> Result<Dict> {
        let mut dict = Dict::new();
        loop {
            let token = self.lexer.next_token();
            match token {
                Token::DictClose => break,
                Token::Eof => {
                    self.warn(Stage::ObjectParse, "unterminated dictionary");
                    break;
                }
                Token::Name(key) => {
                    let value = self.parse_object()?;
                    let key = self.interner.intern(&key);
                    if dict.contains_key(key.as_str()) {
                        self.warn(Stage::ObjectParse, format!("duplicate key /{key} in dictionary, last write wins"));
                    }
                    dict.insert(key, value);
                }
                other => {
                    self.warn(Stage::ObjectParse, format!("expected a name key in dictionary, got {other:?}"));
                }
            }
        }
        Ok(dict)
    }

    /// Stream contract (§4.3): `stream` keyword already consumed by the caller. Requires
    /// an EOL (`LF`, or `CRLF`; bare `CR` tolerated with a warning), then either
    /// `/Length` bytes verbatim or, failing that, a byte-scan for `endstream`.
    fn parse_stream_body(&mut self, dict: Dict) -> Result<Object> {
        let scanner = &mut self.lexer.scanner;
        match scanner.peek() as u8 {
            b'\r' => {
                scanner.advance();
                if scanner.peek() == b'\n' as i32 {
                    scanner.advance();
                } else {
                    self.warn(Stage::ObjectParse, "bare CR after 'stream' keyword, not CRLF");
                }
            }
            b'\n' => {
                scanner.advance();
            }
            _ => self.warn(Stage::ObjectParse, "missing EOL after 'stream' keyword"),
        }

        let body_start = self.lexer.scanner.pos();
        let declared_len = dict.get("Length").and_then(|o| o.as_i64()).filter(|n| *n >= 0).map(|n| n as usize);

        let scan_boundary = find_endstream(self.lexer.scanner.remaining()).map(|rel| body_start + rel);

        let end = match (declared_len, scan_boundary) {
            (Some(len), Some(scanned)) => {
                let declared_end = body_start + len;
                let tail = self.lexer.scanner.slice(declared_end, declared_end + 20);
                let tail = skip_leading_eol(tail);
                if declared_end == scanned || tail.starts_with(b"endstream") {
                    declared_end
                } else {
                    self.warn(Stage::ObjectParse, "declared /Length disagrees with byte-scanned 'endstream' boundary, using the scanned boundary");
                    scanned
                }
            }
            (None, Some(scanned)) => scanned,
            (Some(len), None) => {
                self.warn(Stage::ObjectParse, "could not locate 'endstream', trusting declared /Length");
                body_start + len
            }
            (None, None) => {
                self.warn(Stage::ObjectParse, "stream has neither a usable /Length nor a locatable 'endstream'; treating rest of file as payload");
                self.lexer.scanner.len()
            }
        };

        let raw = self.lexer.scanner.slice(body_start, end).to_vec();
        self.lexer.scanner.seek(end);

        // Optional EOL, then the 'endstream' keyword.
        self.lexer.scanner.skip_while(crate::scanner::is_whitespace);
        let kw = self.lexer.next_token();
        if !matches!(&kw, Token::Keyword(k) if k == "endstream") {
            self.warn(Stage::ObjectParse, "expected 'endstream' keyword");
        }

        Ok(Object::Stream(Stream::new(dict, raw)))
    }

    /// Parses a full indirect object definition: `N G obj ... endobj`. Assumes the
    /// scanner is positioned at `N`.
    pub fn parse_indirect_object(&mut self) -> Result<(ObjectId, Object)> {
        let num = self.expect_number()? as u32;
        let gen = self.expect_number()? as u16;
        self.expect_keyword("obj")?;
        let obj = self.parse_object()?;
        let checkpoint = self.lexer.scanner.pos();
        match self.lexer.next_token() {
            Token::Keyword(k) if k == "endobj" => {}
            _ => {
                self.lexer.scanner.seek(checkpoint);
                self.warn(Stage::ObjectParse, format!("object {num} {gen}: missing 'endobj'"));
            }
        }
        Ok(((num, gen), obj))
    }

    fn expect_number(&mut self) -> Result<f64> {
        match self.lexer.next_token() {
            Token::Number(n) => Ok(n),
            other => Err(Error::lexical(Stage::ObjectParse, self.pos(), format!("expected a number, got {other:?}"))),
        }
    }

    fn expect_keyword(&mut self, expected: &str) -> Result<()> {
        match self.lexer.next_token() {
            Token::Keyword(k) if k == expected => Ok(()),
            other => Err(Error::lexical(Stage::ObjectParse, self.pos(), format!("expected keyword '{expected}', got {other:?}"))),
        }
    }

    // ---- xref ingestion (§4.3) ----

    /// Parses a classic `xref` table starting at the current position (the `xref`
    /// keyword already consumed by the caller) followed by its `trailer` dict.
    pub fn parse_classic_xref(&mut self) -> Result<(HashMap<ObjectId, Location>, Dict)> {
        let mut entries = HashMap::new();
        loop {
            let checkpoint = self.lexer.scanner.pos();
            let first = self.lexer.next_token();
            match first {
                Token::Number(start) => {
                    let count = match self.lexer.next_token() {
                        Token::Number(c) => c as u32,
                        _ => return Err(Error::structural(Stage::Xref, "malformed xref subsection header")),
                    };
                    let start = start as u32;
                    for i in 0..count {
                        self.lexer.scanner.skip_while(crate::scanner::is_whitespace);
                        let line = self.lexer.scanner.slice(self.lexer.scanner.pos(), self.lexer.scanner.pos() + 20);
                        let text = String::from_utf8_lossy(line);
                        let mut fields = text.split_whitespace();
                        let offset: usize = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                        let gen: u16 = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                        let kind = fields.next().unwrap_or("n");
                        self.lexer.scanner.advance_by(20);
                        if kind == "n" {
                            entries.entry((start + i, gen)).or_insert(Location::Offset(offset));
                        }
                    }
                }
                Token::Keyword(k) if k == "trailer" => {
                    let trailer = match self.parse_object()? {
                        Object::Dict(d) => d,
                        _ => return Err(Error::structural(Stage::Xref, "trailer is not a dictionary")),
                    };
                    return Ok((entries, trailer));
                }
                _ => {
                    self.lexer.scanner.seek(checkpoint);
                    return Err(Error::structural(Stage::Xref, "expected subsection header or 'trailer'"));
                }
            }
        }
    }

    /// Parses a cross-reference stream (`/Type /XRef`) whose indirect-object header has
    /// already been consumed; `dict`/`raw` are the stream's own dict and encoded bytes.
    pub fn parse_xref_stream(dict: &Dict, raw: &[u8]) -> Result<(HashMap<ObjectId, Location>, Dict)> {
        let decoded = crate::filters::decode_chain(dict, raw)?;
        let widths: Vec<usize> = dict
            .get("W")
            .and_then(|o| o.as_array())
            .map(|a| a.iter().filter_map(|o| o.as_i64()).map(|n| n as usize).collect())
            .ok_or_else(|| Error::structural(Stage::Xref, "xref stream missing /W"))?;
        if widths.len() != 3 {
            return Err(Error::structural(Stage::Xref, "/W must have exactly 3 entries"));
        }
        let size = dict.get("Size").and_then(|o| o.as_i64()).unwrap_or(0) as u32;
        let index: Vec<i64> = dict
            .get("Index")
            .and_then(|o| o.as_array())
            .map(|a| a.iter().filter_map(|o| o.as_i64()).collect())
            .unwrap_or_else(|| vec![0, size as i64]);

        let entry_len = widths.iter().sum::<usize>();
        let mut entries = HashMap::new();
        let mut cursor = 0usize;
        for pair in index.chunks(2) {
            let (start, count) = match pair {
                [s, c] => (*s as u32, *c as u32),
                _ => break,
            };
            for i in 0..count {
                if cursor + entry_len > decoded.len() {
                    break;
                }
                let fields = read_xref_fields(&decoded[cursor..cursor + entry_len], &widths);
                cursor += entry_len;
                let obj = start + i;
                match fields[0] {
                    0 => { /* free */ }
                    1 => {
                        entries.entry((obj, fields[2] as u16)).or_insert(Location::Offset(fields[1] as usize));
                    }
                    2 => {
                        entries.entry((obj, 0)).or_insert(Location::InStream {
                            stream_obj: fields[1] as u32,
                            index: fields[2] as u32,
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok((entries, dict.clone()))
    }
}

/// Reads the 3 fixed-width big-endian fields of one xref-stream entry. A zero-width
/// field (permitted for field 1, meaning "default type 1") yields its PDF-defined
/// default.
fn read_xref_fields(entry: &[u8], widths: &[usize]) -> [i64; 3] {
    let mut out = [1i64, 0, 0];
    let mut pos = 0;
    for (i, &w) in widths.iter().enumerate() {
        if w == 0 {
            continue;
        }
        let mut value: i64 = 0;
        for &b in &entry[pos..pos + w] {
            value = (value << 8) | b as i64;
        }
        out[i] = value;
        pos += w;
    }
    out
}

fn skip_leading_eol(data: &[u8]) -> &[u8] {
    match data {
        [b'\r', b'\n', rest @ ..] => rest,
        [b'\r', rest @ ..] | [b'\n', rest @ ..] => rest,
        other => other,
    }
}

/// Finds the byte offset of `endstream` in `data`, skipping at most one trailing EOL
/// that belongs to the payload rather than the keyword.
fn find_endstream(data: &[u8]) -> Option<usize> {
    const NEEDLE: &[u8] = b"endstream";
    data.windows(NEEDLE.len()).position(|w| w == NEEDLE).map(|idx| {
        let mut end = idx;
        if end > 0 && data[end - 1] == b'\n' {
            end -= 1;
            if end > 0 && data[end - 1] == b'\r' {
                end -= 1;
            }
        } else if end > 0 && data[end - 1] == b'\r' {
            end -= 1;
        }
        end
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> (Object, Vec<Warning>) {
        let interner = Interner::new();
        let mut p = Parser::new(input, &interner);
        let obj = p.parse_object().unwrap();
        (obj, p.warnings)
    }

    #[test]
    fn parses_ref() {
        let (obj, _) = parse(b"12 0 R");
        assert_eq!(obj, Object::Ref((12, 0)));
    }

    #[test]
    fn parses_plain_number_not_ref() {
        let (obj, _) = parse(b"12 0 obj");
        assert_eq!(obj, Object::Number(12.0));
    }

    #[test]
    fn parses_array_of_mixed_objects() {
        let (obj, _) = parse(b"[1 2 (hi) /Name]");
        match obj {
            Object::Array(items) => assert_eq!(items.len(), 4),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn parses_dict() {
        let (obj, _) = parse(b"<< /Type /Page /Count 3 >>");
        let dict = obj.as_dict().unwrap();
        assert_eq!(dict.type_name(), Some("Page"));
        assert_eq!(dict.get("Count").unwrap().as_i64(), Some(3));
    }

    #[test]
    fn duplicate_key_last_wins_with_warning() {
        let (obj, warnings) = parse(b"<< /A 1 /A 2 >>");
        assert_eq!(obj.as_dict().unwrap().get("A").unwrap().as_i64(), Some(2));
        assert!(!warnings.is_empty());
    }

    #[test]
    fn stream_with_correct_length() {
        let input = b"<< /Length 5 >>\nstream\nhello\nendstream";
        let (obj, _) = parse(input);
        match obj {
            Object::Stream(s) => assert_eq!(s.raw, b"hello"),
            _ => panic!("expected stream"),
        }
    }

    #[test]
    fn stream_with_wrong_length_uses_byte_scan() {
        let input = b"<< /Length 1000 >>\nstream\nhello\nendstream";
        let (obj, warnings) = parse(input);
        match obj {
            Object::Stream(s) => assert_eq!(s.raw, b"hello"),
            _ => panic!("expected stream"),
        }
        assert!(warnings.iter().any(|w| w.message.contains("disagrees")));
    }

    #[test]
    fn indirect_object_roundtrip() {
        let interner = Interner::new();
        let mut p = Parser::new(b"7 0 obj\n(hi)\nendobj", &interner);
        let (id, obj) = p.parse_indirect_object().unwrap();
        assert_eq!(id, (7, 0));
        assert_eq!(obj.as_str_bytes(), Some(b"hi".as_ref()));
    }

    #[test]
    fn classic_xref_table() {
        let interner = Interner::new();
        let input = b"0 2\n0000000000 65535 f \n0000000017 00000 n \ntrailer\n<< /Size 2 /Root 1 0 R >>";
        let mut p = Parser::new(input, &interner);
        let (entries, trailer) = p.parse_classic_xref().unwrap();
        assert_eq!(entries.get(&(1, 0)), Some(&Location::Offset(17)));
        assert_eq!(trailer.get("Size").unwrap().as_i64(), Some(2));
    }
}
