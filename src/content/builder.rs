//! Content-stream builder/serializer (§4.8): an append-only ordered sequence of
//! operations that emits bit-exact PDF content-stream bytes.

use crate::object::StringFormat;

use super::parser::{InlineImage, Operand, Operation};

/// Append-only ordered sequence of content-stream operations. Deliberately does not
/// expose a semantic drawing API (path builders, gradient helpers, …) — those are
/// layered on top by callers, outside this engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Builder {
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Operation(Operation),
    InlineImage(InlineImage),
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    pub fn from_operations(ops: Vec<Operation>) -> Self {
        Builder { items: ops.into_iter().map(Item::Operation).collect() }
    }

    pub fn from_items(items: Vec<super::parser::ContentItem>) -> Self {
        Builder {
            items: items
                .into_iter()
                .map(|i| match i {
                    super::parser::ContentItem::Operation(op) => Item::Operation(op),
                    super::parser::ContentItem::InlineImage(img) => Item::InlineImage(img),
                })
                .collect(),
        }
    }

    pub fn push(&mut self, op: impl Into<String>, operands: Vec<Operand>) -> &mut Self {
        self.items.push(Item::Operation(Operation { op: op.into(), operands }));
        self
    }

    pub fn push_if(&mut self, cond: bool, op: impl Into<String>, operands: Vec<Operand>) -> &mut Self {
        if cond {
            self.push(op, operands);
        }
        self
    }

    pub fn push_inline_image(&mut self, image: InlineImage) -> &mut Self {
        self.items.push(Item::InlineImage(image));
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wraps `other`'s operations in `q ... Q` and appends them after this builder's own
    /// content (§4.9: appending new content after the page's original stream must start
    /// from a clean graphics state).
    pub fn append_isolated(&mut self, other: &Builder) -> &mut Self {
        self.push("q", Vec::new());
        self.items.extend(other.items.iter().cloned());
        self.push("Q", Vec::new());
        self
    }

    pub fn emit(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                Item::Operation(op) => emit_operation(&mut out, op),
                Item::InlineImage(img) => emit_inline_image(&mut out, img),
            }
        }
        out
    }
}

fn emit_operation(out: &mut Vec<u8>, op: &Operation) {
    for operand in &op.operands {
        emit_operand(out, operand);
        out.push(b' ');
    }
    out.extend_from_slice(op.op.as_bytes());
    out.push(b'\n');
}

fn emit_inline_image(out: &mut Vec<u8>, img: &InlineImage) {
    out.extend_from_slice(b"BI\n");
    for (key, value) in &img.params {
        out.push(b'/');
        emit_name_body(out, key);
        out.push(b' ');
        emit_operand(out, value);
        out.push(b'\n');
    }
    out.extend_from_slice(b"ID ");
    out.extend_from_slice(&img.data);
    out.extend_from_slice(b"\nEI\n");
}

fn emit_operand(out: &mut Vec<u8>, operand: &Operand) {
    match operand {
        Operand::Null => out.extend_from_slice(b"null"),
        Operand::Bool(true) => out.extend_from_slice(b"true"),
        Operand::Bool(false) => out.extend_from_slice(b"false"),
        Operand::Number(n) => out.extend_from_slice(format_number(*n).as_bytes()),
        Operand::Name(n) => {
            out.push(b'/');
            emit_name_body(out, n);
        }
        Operand::String(bytes, StringFormat::Literal) => emit_literal_string(out, bytes),
        Operand::String(bytes, StringFormat::Hex) => emit_hex_string(out, bytes),
        Operand::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                emit_operand(out, item);
            }
            out.push(b']');
        }
        Operand::Dict(entries) => {
            out.extend_from_slice(b"<<");
            for (key, value) in entries {
                out.push(b' ');
                out.push(b'/');
                emit_name_body(out, key);
                out.push(b' ');
                emit_operand(out, value);
            }
            out.extend_from_slice(b" >>");
        }
    }
}

/// Shortest decimal form that round-trips to the same `f64`, no exponent notation,
/// integers without a trailing `.` (§4.8 emission rules).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let mut s = format!("{n}");
    if s.contains('e') || s.contains('E') {
        // Fall back to a fixed-point rendering with enough precision to round-trip,
        // then trim trailing zeros — content streams never use exponent notation.
        s = format!("{n:.10}");
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

fn emit_name_body(out: &mut Vec<u8>, name: &str) {
    for &b in name.as_bytes() {
        if (0x21..=0x7E).contains(&b) && !matches!(b, b'#' | b'%' | b'(' | b')' | b'/' | b'<' | b'>' | b'[' | b']' | b'{' | b'}') {
            out.push(b);
        } else {
            out.push(b'#');
            out.push(hex_upper(b >> 4));
            out.push(hex_upper(b & 0x0F));
        }
    }
}

fn emit_literal_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
}

fn emit_hex_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'<');
    for &b in bytes {
        out.push(hex_upper(b >> 4));
        out.push(hex_upper(b & 0x0F));
    }
    out.push(b'>');
}

fn hex_upper(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'A' + (nibble - 10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_operands_then_operator_then_lf() {
        let mut b = Builder::new();
        b.push("cm", vec![
            Operand::Number(1.0),
            Operand::Number(0.0),
            Operand::Number(0.0),
            Operand::Number(1.0),
            Operand::Number(0.0),
            Operand::Number(0.0),
        ]);
        assert_eq!(b.emit(), b"1 0 0 1 0 0 cm\n");
    }

    #[test]
    fn integers_emit_without_dot() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn fractional_shortest_form() {
        assert_eq!(format_number(0.5), "0.5");
    }

    #[test]
    fn name_escapes_reserved_bytes() {
        let mut out = Vec::new();
        emit_name_body(&mut out, "A#B");
        assert_eq!(out, b"A#23B");
    }

    #[test]
    fn literal_string_escapes_parens_and_backslash() {
        let mut out = Vec::new();
        emit_literal_string(&mut out, b"a(b)c\\d");
        assert_eq!(out, b"(a\\(b\\)c\\\\d)");
    }

    #[test]
    fn hex_string_upper_case() {
        let mut out = Vec::new();
        emit_hex_string(&mut out, b"\xAB\xCD");
        assert_eq!(out, b"<ABCD>");
    }

    #[test]
    fn append_isolated_wraps_in_q_q() {
        let mut base = Builder::new();
        base.push("q", vec![]);
        let mut addition = Builder::new();
        addition.push("Do", vec![Operand::Name("Fm1".into())]);
        base.append_isolated(&addition);
        let emitted = String::from_utf8(base.emit()).unwrap();
        assert_eq!(emitted, "q\nq\n/Fm1 Do\nQ\n");
    }
}
