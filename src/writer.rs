//! PDF file serialization (§4.11): header, body, xref (classic or stream), trailer, and
//! the incremental-update path signing builds on (§4.12).
//!
//! Object-stream packing is opt-in via [`WriterConfig::object_stream_policy`] and only
//! ever takes effect together with xref-stream output — a classic xref table has no entry
//! type that can address an object-stream member, so `Repack` silently behaves like
//! `Preserve` when the effective version stays below 1.5 and xref streams aren't forced.

use std::collections::HashMap;

use crate::config::{ObjectStreamPolicy, WriterConfig};
use crate::content::builder::format_number;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{name, Dict, Object, ObjectId, Stream, StringFormat};
use crate::signing::{DigestAlgorithm, Signer};
use crate::utils::random_character_string_32;

/// Traditional four-byte "binary file" sentinel following the header comment line: any
/// bytes with the high bit set, so naive text-mode transfers reveal themselves early.
const BINARY_SENTINEL: [u8; 4] = [0xE2, 0xE3, 0xCF, 0xD3];

/// Where an object's bytes ended up in the rendered body.
#[derive(Debug, Clone, Copy)]
enum BodyLoc {
    /// Its own `N G obj ... endobj` at this byte offset.
    Direct(usize),
    /// The `index`-th member of the `ObjStm` numbered `stream_obj`.
    Packed { stream_obj: u32, index: u32 },
}

/// Renders the document from scratch (§4.11 steps 1-5) with [`WriterConfig::default`].
pub fn write(doc: &Document) -> Result<Vec<u8>> {
    write_with_config(doc, &WriterConfig::default())
}

/// Renders the document from scratch (§4.11 steps 1-5, §10.3): walks every object
/// reachable from `/Root` and a freshly registered `/Info`, then emits a classic xref
/// table or an xref stream depending on the effective version and `config`.
pub fn write_with_config(doc: &Document, config: &WriterConfig) -> Result<Vec<u8>> {
    let info_id = doc.registry.register(Object::Dict(doc.info.to_dict()));
    let version = effective_version(doc, config)?;
    let use_xref_stream = config.use_xref_streams || version >= (1, 5);

    let reachable = doc.registry.reachable_from(&[doc.root, info_id])?;
    let mut ids: Vec<ObjectId> = reachable.into_iter().collect();
    ids.sort();

    let mut out = Vec::new();
    write_header(&mut out, version);
    let header_len = out.len();

    let (body, locations, max_obj) = render_body(doc, &ids, config, use_xref_stream)?;
    out.extend_from_slice(&body);
    let locations = rebase_locations(locations, header_len);

    let id_pair = document_id(doc);
    let xref_offset = out.len();
    if use_xref_stream {
        write_xref_stream(&mut out, doc.root, info_id, max_obj, &locations, &id_pair, None, xref_offset);
    } else {
        let offsets = direct_offsets_only(&locations);
        write_classic_xref_and_trailer(&mut out, doc.root, info_id, max_obj, &offsets, &id_pair, None);
    }
    write_startxref(&mut out, xref_offset);
    Ok(out)
}

/// Writes every id in `ids` as its own indirect object (`Preserve`), or partitions them
/// into one fresh `ObjStm` of packable members plus the remaining direct objects
/// (`Repack`, only when `use_xref_stream` holds).
fn render_body(
    doc: &Document,
    ids: &[ObjectId],
    config: &WriterConfig,
    use_xref_stream: bool,
) -> Result<(Vec<u8>, HashMap<ObjectId, BodyLoc>, u32)> {
    let repacking = config.object_stream_policy == ObjectStreamPolicy::Repack && use_xref_stream;
    let max_existing = ids.iter().map(|(n, _)| *n).max().unwrap_or(0);

    if !repacking {
        let mut out = Vec::new();
        let mut locations = HashMap::with_capacity(ids.len());
        for id in ids {
            locations.insert(*id, BodyLoc::Direct(out.len()));
            let obj = doc.registry.resolve(*id)?;
            write_indirect_object(&mut out, *id, &obj);
        }
        return Ok((out, locations, max_existing));
    }

    // Plain (non-stream, generation-0) objects go into one ObjStm; streams and any object
    // with a nonzero generation (only possible for a loaded-and-untouched object carried
    // through a full rewrite) are written directly, as PDF requires (§4.4/§9).
    let mut direct = Vec::new();
    let mut packable = Vec::new();
    for id in ids {
        let obj = doc.registry.resolve(*id)?;
        if id.1 == 0 && !matches!(obj, Object::Stream(_)) {
            packable.push((*id, obj));
        } else {
            direct.push((*id, obj));
        }
    }

    let mut out = Vec::new();
    let mut locations = HashMap::with_capacity(ids.len());
    for (id, obj) in &direct {
        locations.insert(*id, BodyLoc::Direct(out.len()));
        write_indirect_object(&mut out, *id, obj);
    }

    if packable.is_empty() {
        return Ok((out, locations, max_existing));
    }

    let objstm_num = max_existing + 1;
    let mut header_buf = Vec::new();
    let mut body_buf = Vec::new();
    for (index, (id, obj)) in packable.iter().enumerate() {
        header_buf.extend_from_slice(format!("{} {} ", id.0, body_buf.len()).as_bytes());
        write_object(&mut body_buf, obj);
        body_buf.push(b' ');
        locations.insert(*id, BodyLoc::Packed { stream_obj: objstm_num, index: index as u32 });
    }
    let first = header_buf.len();
    let mut decoded = header_buf;
    decoded.extend_from_slice(&body_buf);

    let mut stm_dict = Dict::new();
    stm_dict.insert(name("Filter"), Object::Name(name("FlateDecode")));
    let compressed = crate::filters::encode_chain(&stm_dict, &decoded)?;
    stm_dict.insert(name("Type"), Object::Name(name("ObjStm")));
    stm_dict.insert(name("N"), Object::Number(packable.len() as f64));
    stm_dict.insert(name("First"), Object::Number(first as f64));

    let objstm_id = (objstm_num, 0);
    locations.insert(objstm_id, BodyLoc::Direct(out.len()));
    write_indirect_object(&mut out, objstm_id, &Object::Stream(Stream::new(stm_dict, compressed)));

    Ok((out, locations, objstm_num))
}

/// `render_body` renders into a standalone buffer starting at 0, so every `BodyLoc::Direct`
/// offset it returns is relative to the start of the body, not the start of the file.
/// Shifts each one by `header_len` (the header's `%PDF-…`/binary-sentinel bytes already
/// written to `out`) so the xref table points at the right place in the final file.
/// `Packed` locations reference an object-stream number and in-stream index, not a file
/// offset, so they pass through unchanged.
fn rebase_locations(locations: HashMap<ObjectId, BodyLoc>, header_len: usize) -> HashMap<ObjectId, BodyLoc> {
    locations
        .into_iter()
        .map(|(id, loc)| {
            let loc = match loc {
                BodyLoc::Direct(offset) => BodyLoc::Direct(offset + header_len),
                packed => packed,
            };
            (id, loc)
        })
        .collect()
}

fn direct_offsets_only(locations: &HashMap<ObjectId, BodyLoc>) -> HashMap<ObjectId, usize> {
    locations
        .iter()
        .filter_map(|(id, loc)| match loc {
            BodyLoc::Direct(offset) => Some((*id, *offset)),
            BodyLoc::Packed { .. } => None,
        })
        .collect()
}

/// Incremental-update signing (§4.11 "Incremental update mode", §4.12). The original
/// byte image is kept verbatim; only objects registered or overwritten since load (plus
/// a fresh `/Info` and the reserved signature dict) are appended, with a new xref
/// section chaining `/Prev` to the previous `startxref`. Object-stream repacking never
/// applies here — an incremental update by definition leaves every prior object alone.
///
/// The signature dict's `/ByteRange` and `/Contents` are written as fixed-width
/// placeholders first so their final values can be substituted in place without shifting
/// any byte this or any other object's offset depends on.
pub fn write_incremental_signed(doc: &Document, signer: &dyn Signer, algo: DigestAlgorithm) -> Result<Vec<u8>> {
    const BYTE_RANGE_FIELD_WIDTH: usize = 10;

    let info_id = doc.registry.register(Object::Dict(doc.info.to_dict()));
    let sig_id = doc.registry.register(Object::Dict(Dict::new()));

    let mut dirty: Vec<ObjectId> = doc.registry.modified_ids();
    if !dirty.contains(&info_id) {
        dirty.push(info_id);
    }
    dirty.push(sig_id);
    dirty.sort();
    dirty.dedup();

    let config = WriterConfig::default();
    let version = effective_version(doc, &config)?;
    let id_pair = document_id(doc);

    let mut out = doc.registry.raw_buf().to_vec();
    if out.is_empty() {
        write_header(&mut out, version);
    }

    let contents_hex_len = signer.max_signature_len().max(config.signature_placeholder_len) * 2;
    let mut offsets = HashMap::with_capacity(dirty.len());
    let mut sig_spans = None;
    for id in &dirty {
        offsets.insert(*id, out.len());
        if *id == sig_id {
            sig_spans = Some(write_sig_placeholder(&mut out, sig_id, BYTE_RANGE_FIELD_WIDTH, contents_hex_len));
        } else {
            let obj = doc.registry.resolve(*id)?;
            write_indirect_object(&mut out, *id, &obj);
        }
    }
    let (byte_range_span, contents_span) = sig_spans.expect("sig_id is always in `dirty`");

    let max_obj = dirty.iter().map(|(n, _)| *n).max().unwrap_or(0);
    let xref_offset = out.len();
    let locations: HashMap<ObjectId, BodyLoc> = offsets.iter().map(|(id, off)| (*id, BodyLoc::Direct(*off))).collect();
    if version >= (1, 5) {
        write_xref_stream(&mut out, doc.root, info_id, max_obj, &locations, &id_pair, doc.prev_startxref, xref_offset);
    } else {
        write_classic_xref_and_trailer(&mut out, doc.root, info_id, max_obj, &offsets, &id_pair, doc.prev_startxref);
    }
    write_startxref(&mut out, xref_offset);

    let a = contents_span.0;
    let b = contents_span.1;
    let c = out.len() - b;
    let covered: Vec<u8> = out[..a].iter().chain(out[b..].iter()).copied().collect();
    let signature = signer.sign(&covered, algo).map_err(|e| Error::Signing(e.0))?;

    let mut hex_contents = vec![b'0'; contents_hex_len];
    for (i, byte) in signature.iter().enumerate() {
        if i * 2 + 1 >= hex_contents.len() {
            break; // longer than the reserved placeholder: truncated rather than grown,
                    // since growing now would shift every offset already written.
        }
        hex_contents[i * 2] = hex_upper(byte >> 4);
        hex_contents[i * 2 + 1] = hex_upper(byte & 0x0F);
    }
    out[a..b].copy_from_slice(&hex_contents);

    let final_byte_range = format_byte_range(0, a, b, c, BYTE_RANGE_FIELD_WIDTH);
    out[byte_range_span.0..byte_range_span.1].copy_from_slice(final_byte_range.as_bytes());

    Ok(out)
}

fn write_sig_placeholder(
    out: &mut Vec<u8>,
    sig_id: ObjectId,
    byte_range_width: usize,
    contents_hex_len: usize,
) -> ((usize, usize), (usize, usize)) {
    out.extend_from_slice(format!("{} {} obj\n", sig_id.0, sig_id.1).as_bytes());
    out.extend_from_slice(b"<< /Type /Sig /Filter /Adobe.PPKLite /SubFilter /adbe.pkcs7.detached /ByteRange ");
    let byte_range_start = out.len();
    out.extend_from_slice(format_byte_range(0, 0, 0, 0, byte_range_width).as_bytes());
    let byte_range_end = out.len();
    out.extend_from_slice(b" /Contents <");
    let contents_start = out.len();
    out.extend(std::iter::repeat(b'0').take(contents_hex_len));
    let contents_end = out.len();
    out.extend_from_slice(b"> >>\nendobj\n");
    ((byte_range_start, byte_range_end), (contents_start, contents_end))
}

fn format_byte_range(a: usize, b: usize, c: usize, d: usize, width: usize) -> String {
    format!("[{a:0width$} {b:0width$} {c:0width$} {d:0width$}]")
}

fn effective_version(doc: &Document, config: &WriterConfig) -> Result<(u8, u8)> {
    let catalog = doc.registry.resolve(doc.root)?;
    let declared = catalog
        .as_dict()
        .and_then(|d| d.get("Version"))
        .and_then(|o| o.as_name())
        .and_then(parse_version_name);
    let mut version = doc.version;
    if let Some(v) = declared {
        if v > version {
            version = v;
        }
    }
    if config.min_version > version {
        version = config.min_version;
    }
    Ok(version)
}

fn parse_version_name(s: &str) -> Option<(u8, u8)> {
    let mut parts = s.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// `[original, new]` for the trailer `/ID` (§4.11 step 4): the first element is carried
/// forward from the loaded file (or freshly minted for a document built with
/// [`Document::create`]); the second is a digest of the `/Info` metadata and the current
/// time, so two saves of the same unchanged document still mint distinct new ids.
fn document_id(doc: &Document) -> (Vec<u8>, Vec<u8>) {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let original = doc.original_id.clone().unwrap_or_else(|| random_character_string_32().into_bytes());

    let mut hasher = DefaultHasher::new();
    doc.info.title.hash(&mut hasher);
    doc.info.author.hash(&mut hasher);
    doc.info.producer.hash(&mut hasher);
    doc.info.modification_date.unix_timestamp().hash(&mut hasher);
    crate::date::OffsetDateTime::now_utc().unix_timestamp().hash(&mut hasher);
    (original, hasher.finish().to_be_bytes().to_vec())
}

fn write_header(out: &mut Vec<u8>, version: (u8, u8)) {
    out.extend_from_slice(format!("%PDF-{}.{}\n", version.0, version.1).as_bytes());
    out.push(b'%');
    out.extend_from_slice(&BINARY_SENTINEL);
    out.push(b'\n');
}

fn write_startxref(out: &mut Vec<u8>, offset: usize) {
    out.extend_from_slice(b"startxref\n");
    out.extend_from_slice(offset.to_string().as_bytes());
    out.extend_from_slice(b"\n%%EOF");
}

/// Overwrites `/Length` from the stream's actual `raw` length rather than trusting
/// whatever is already in `dict` — callers that build a stream by hand (e.g. a page
/// appending a fresh content stream) are not required to keep it in sync themselves.
fn write_indirect_object(out: &mut Vec<u8>, id: ObjectId, obj: &Object) {
    out.extend_from_slice(format!("{} {} obj\n", id.0, id.1).as_bytes());
    match obj {
        Object::Stream(stream) => {
            let mut dict = stream.dict.clone();
            dict.insert(name("Length"), Object::Number(stream.raw.len() as f64));
            write_dict(out, &dict);
            out.extend_from_slice(b"\nstream\n");
            out.extend_from_slice(&stream.raw);
            if !stream.raw.ends_with(b"\n") {
                out.push(b'\n');
            }
            out.extend_from_slice(b"endstream\n");
        }
        other => {
            write_object(out, other);
            out.push(b'\n');
        }
    }
    out.extend_from_slice(b"endobj\n");
}

fn write_object(out: &mut Vec<u8>, obj: &Object) {
    match obj {
        Object::Null => out.extend_from_slice(b"null"),
        Object::Bool(true) => out.extend_from_slice(b"true"),
        Object::Bool(false) => out.extend_from_slice(b"false"),
        Object::Number(n) => out.extend_from_slice(format_number(*n).as_bytes()),
        Object::Name(n) => write_name(out, n.as_str()),
        Object::String(bytes, StringFormat::Literal) => write_literal_string(out, bytes),
        Object::String(bytes, StringFormat::Hex) => write_hex_string(out, bytes),
        Object::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_object(out, item);
            }
            out.push(b']');
        }
        Object::Dict(d) => write_dict(out, d),
        // Streams only ever appear as top-level indirect objects in practice; fall back
        // to the dict if one is ever found nested.
        Object::Stream(s) => write_dict(out, &s.dict),
        Object::Ref(id) => out.extend_from_slice(format!("{} {} R", id.0, id.1).as_bytes()),
    }
}

fn write_dict(out: &mut Vec<u8>, dict: &Dict) {
    out.extend_from_slice(b"<<");
    for (key, value) in dict.iter() {
        out.push(b' ');
        write_name(out, key.as_str());
        out.push(b' ');
        write_object(out, value);
    }
    out.extend_from_slice(b" >>");
}

fn write_name(out: &mut Vec<u8>, s: &str) {
    out.push(b'/');
    for &b in s.as_bytes() {
        if (0x21..=0x7E).contains(&b) && !matches!(b, b'#' | b'%' | b'(' | b')' | b'/' | b'<' | b'>' | b'[' | b']' | b'{' | b'}') {
            out.push(b);
        } else {
            out.push(b'#');
            out.push(hex_upper(b >> 4));
            out.push(hex_upper(b & 0x0F));
        }
    }
}

fn write_literal_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
}

fn write_hex_string(out: &mut Vec<u8>, bytes: &[u8]) {
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

fn write_classic_xref_and_trailer(
    out: &mut Vec<u8>,
    root: ObjectId,
    info_id: ObjectId,
    max_obj: u32,
    offsets: &HashMap<ObjectId, usize>,
    id_pair: &(Vec<u8>, Vec<u8>),
    prev: Option<usize>,
) {
    out.extend_from_slice(b"xref\n");
    out.extend_from_slice(format!("0 {}\n", max_obj + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f\r\n");
    for n in 1..=max_obj {
        match offsets.get(&(n, 0)) {
            Some(&offset) => out.extend_from_slice(format!("{offset:010} 00000 n\r\n").as_bytes()),
            None => out.extend_from_slice(b"0000000000 65535 f\r\n"),
        }
    }

    out.extend_from_slice(b"trailer\n");
    let mut trailer = Dict::new();
    trailer.insert(name("Size"), Object::Number((max_obj + 1) as f64));
    trailer.insert(name("Root"), Object::Ref(root));
    trailer.insert(name("Info"), Object::Ref(info_id));
    if let Some(p) = prev {
        trailer.insert(name("Prev"), Object::Number(p as f64));
    }
    trailer.insert(name("ID"), id_array(id_pair));
    write_dict(out, &trailer);
    out.push(b'\n');
}

#[allow(clippy::too_many_arguments)]
fn write_xref_stream(
    out: &mut Vec<u8>,
    root: ObjectId,
    info_id: ObjectId,
    max_obj: u32,
    locations: &HashMap<ObjectId, BodyLoc>,
    id_pair: &(Vec<u8>, Vec<u8>),
    prev: Option<usize>,
    xref_offset: usize,
) {
    let xref_obj_num = max_obj + 1;
    let size = xref_obj_num + 1;

    let mut entries = Vec::with_capacity(size as usize * 7);
    push_xref_entry(&mut entries, 0, 0, 65535);
    for n in 1..=xref_obj_num {
        if n == xref_obj_num {
            push_xref_entry(&mut entries, 1, xref_offset as u32, 0);
        } else {
            match locations.get(&(n, 0)) {
                Some(BodyLoc::Direct(offset)) => push_xref_entry(&mut entries, 1, *offset as u32, 0),
                Some(BodyLoc::Packed { stream_obj, index }) => push_xref_entry(&mut entries, 2, *stream_obj, *index as u16),
                None => push_xref_entry(&mut entries, 0, 0, 65535),
            }
        }
    }

    let mut dict = Dict::new();
    dict.insert(name("Type"), Object::Name(name("XRef")));
    dict.insert(name("Size"), Object::Number(size as f64));
    dict.insert(name("W"), Object::Array(vec![Object::Number(1.0), Object::Number(4.0), Object::Number(2.0)]));
    dict.insert(name("Index"), Object::Array(vec![Object::Number(0.0), Object::Number(size as f64)]));
    dict.insert(name("Root"), Object::Ref(root));
    dict.insert(name("Info"), Object::Ref(info_id));
    if let Some(p) = prev {
        dict.insert(name("Prev"), Object::Number(p as f64));
    }
    dict.insert(name("ID"), id_array(id_pair));
    dict.insert(name("Length"), Object::Number(entries.len() as f64));

    out.extend_from_slice(format!("{xref_obj_num} 0 obj\n").as_bytes());
    write_dict(out, &dict);
    out.extend_from_slice(b"\nstream\n");
    out.extend_from_slice(&entries);
    out.extend_from_slice(b"\nendstream\nendobj\n");
}

fn push_xref_entry(buf: &mut Vec<u8>, field_type: u8, field2: u32, field3: u16) {
    buf.push(field_type);
    buf.extend_from_slice(&field2.to_be_bytes());
    buf.extend_from_slice(&field3.to_be_bytes());
}

fn id_array(id_pair: &(Vec<u8>, Vec<u8>)) -> Object {
    Object::Array(vec![
        Object::String(id_pair.0.clone(), StringFormat::Hex),
        Object::String(id_pair.1.clone(), StringFormat::Hex),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Pt;

    struct NullSigner;

    impl Signer for NullSigner {
        fn sign(&self, _covered: &[u8], _algo: DigestAlgorithm) -> std::result::Result<Vec<u8>, crate::signing::SignError> {
            Ok(vec![0xAB; 4])
        }

        fn max_signature_len(&self) -> usize {
            64
        }
    }

    #[test]
    fn fresh_document_round_trips_through_the_header() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
        let bytes = write(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert!(bytes.windows(b"%%EOF".len()).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn every_reachable_object_gets_an_obj_header() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
        let bytes = write(&doc).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Type /Pages"));
        assert!(text.contains("/Type /Page"));
    }

    #[test]
    fn signed_save_substitutes_byte_range_and_contents() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
        let bytes = write_incremental_signed(&doc, &NullSigner, DigestAlgorithm::Sha256).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Type /Sig"));
        assert!(!text.contains("/Contents <0000"));
        assert!(text.contains("ABAB"));
    }

    #[test]
    fn version_upgrade_never_downgrades() {
        assert!((1, 7) >= (1, 4));
        assert_eq!(parse_version_name("1.6"), Some((1, 6)));
    }

    #[test]
    fn repack_policy_produces_an_objstm_and_stays_loadable() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
        let config = WriterConfig { object_stream_policy: ObjectStreamPolicy::Repack, ..WriterConfig::default() };
        let bytes = write_with_config(&doc, &config).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.7"));
        assert!(text.contains("/Type /XRef"));
        assert!(text.contains("/Type /ObjStm"));
    }

    #[test]
    fn repack_policy_is_a_no_op_below_version_1_5() {
        let mut doc = Document::create();
        doc.version = (1, 4);
        doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
        let config = WriterConfig { object_stream_policy: ObjectStreamPolicy::Repack, ..WriterConfig::default() };
        let bytes = write_with_config(&doc, &config).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("/Type /ObjStm"));
        assert!(text.contains("xref\n"));
    }
}
