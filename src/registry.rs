//! Object registry (§4.4): owns the `(obj, gen) -> Object` mapping, resolves references
//! lazily from the byte image (recursing into object streams), and hands out fresh refs
//! for newly registered objects.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result, Stage, Warning};
use crate::object::{Dict, Interner, Object, ObjectId};
use crate::parser::{Location, Parser};

pub struct Registry<'doc> {
    buf: &'doc [u8],
    interner: &'doc Interner,
    xref: HashMap<ObjectId, Location>,
    /// Objects already materialized, either loaded from the byte image or registered
    /// fresh by a writer-side mutation. Lazily populated by [`Registry::resolve`].
    cache: RefCell<HashMap<ObjectId, Object>>,
    /// Members of object streams, decoded once per stream and cached whole (decoding one
    /// member means decoding the whole container).
    objstm_cache: RefCell<HashMap<u32, Vec<(u32, Object)>>>,
    /// `Cell`, not a plain field: registering a fresh object (minting a new ref for a
    /// page appending content, a widget's appearance stream, ...) only needs a shared
    /// `&Registry`, the same way the resolve cache does.
    next_obj_num: Cell<u32>,
    warnings: RefCell<Vec<Warning>>,
    /// Objects written fresh or overwritten since load, tracked separately from `cache`
    /// (which also holds unmodified objects once `resolve` pulls them off disk) so the
    /// incremental writer knows exactly what to append (§4.11 "Incremental update mode").
    modified: RefCell<HashSet<ObjectId>>,
}

impl<'doc> Registry<'doc> {
    pub fn new(buf: &'doc [u8], interner: &'doc Interner, xref: HashMap<ObjectId, Location>) -> Self {
        let next_obj_num = xref.keys().map(|(n, _)| *n).max().map(|n| n + 1).unwrap_or(1);
        Registry {
            buf,
            interner,
            xref,
            cache: RefCell::new(HashMap::new()),
            objstm_cache: RefCell::new(HashMap::new()),
            next_obj_num: Cell::new(next_obj_num),
            warnings: RefCell::new(Vec::new()),
            modified: RefCell::new(HashSet::new()),
        }
    }

    pub fn empty(interner: &'doc Interner) -> Self {
        Registry::new(&[], interner, HashMap::new())
    }

    /// The byte image this registry was loaded from (empty for a document built with
    /// [`crate::document::Document::create`]). Read by the incremental writer, which
    /// appends to this buffer verbatim rather than re-rendering it.
    pub fn raw_buf(&self) -> &'doc [u8] {
        self.buf
    }

    /// Objects registered or overwritten since this registry was constructed, in no
    /// particular order.
    pub fn modified_ids(&self) -> Vec<ObjectId> {
        self.modified.borrow().iter().copied().collect()
    }

    pub fn add_warning(&self, message: impl Into<String>) {
        let warning = Warning::new(Stage::ObjectParse, message);
        log::warn!("{warning}");
        self.warnings.borrow_mut().push(warning);
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    /// Materializes a fresh indirect object with generation 0 and stores `value` under
    /// it, returning the new `Ref`. Used by the writer and by anything that needs to
    /// point at a newly created object (e.g. an XObject).
    pub fn register(&self, value: Object) -> ObjectId {
        let id = (self.next_obj_num.get(), 0);
        self.next_obj_num.set(id.0 + 1);
        self.cache.borrow_mut().insert(id, value);
        self.modified.borrow_mut().insert(id);
        id
    }

    /// Overwrites an already-registered object in place (used by in-place field/page
    /// mutation once an id is known).
    pub fn set(&self, id: ObjectId, value: Object) {
        self.cache.borrow_mut().insert(id, value);
        self.modified.borrow_mut().insert(id);
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.cache.borrow().contains_key(&id) || self.xref.contains_key(&id)
    }

    pub fn live_ids(&self) -> Vec<ObjectId> {
        let mut ids: HashSet<ObjectId> = self.xref.keys().copied().collect();
        ids.extend(self.cache.borrow().keys().copied());
        ids.into_iter().collect()
    }

    /// Every object reachable from `roots` by following `Ref`s through arrays, dicts and
    /// stream dicts (§4.11 point 2 "live" determination, §10.5 "object garbage collection
    /// on save"). The writer uses this to decide what to emit; [`Document::prune_unreachable`]
    /// exposes it for dropping orphaned cache entries (e.g. a flattened widget's appearance
    /// XObject) ahead of time.
    pub fn reachable_from(&self, roots: &[ObjectId]) -> Result<HashSet<ObjectId>> {
        let mut visited = HashSet::new();
        let mut stack: Vec<ObjectId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let obj = self.resolve(id)?;
            push_refs(&obj, &mut stack);
        }
        Ok(visited)
    }

    /// Drops every cached object not in `reachable`, so a subsequent `resolve` of a
    /// pruned, xref-backed id re-loads it from the byte image rather than returning a
    /// value this call intended to discard. Objects that exist only in the cache (minted
    /// by `register`, never backed by `xref`) are dropped outright.
    pub fn prune_cache_to(&self, reachable: &HashSet<ObjectId>) {
        self.cache.borrow_mut().retain(|id, _| reachable.contains(id));
    }

    /// Resolves `id` to its direct object, loading from the byte image on first access.
    /// Cycle-safe: a reference encountered while already resolving the same id collapses
    /// to `Object::Null` rather than recursing forever.
    pub fn resolve(&self, id: ObjectId) -> Result<Object> {
        self.resolve_inner(id, &mut HashSet::new())
    }

    /// Resolves `obj`, following a `Ref` chain if the located value is itself a
    /// reference (permitted but unusual — e.g. `/Length` pointing at another indirect
    /// number).
    pub fn resolve_deep(&self, obj: &Object) -> Result<Object> {
        match obj {
            Object::Ref(id) => self.resolve(*id),
            other => Ok(other.clone()),
        }
    }

    fn resolve_inner(&self, id: ObjectId, visited: &mut HashSet<ObjectId>) -> Result<Object> {
        if let Some(obj) = self.cache.borrow().get(&id) {
            return Ok(obj.clone());
        }
        if !visited.insert(id) {
            self.add_warning(format!("cycle detected resolving object {}:{}", id.0, id.1));
            return Ok(Object::Null);
        }
        let loaded = match self.xref.get(&id) {
            Some(Location::Offset(offset)) => self.load_at_offset(*offset, id)?,
            Some(Location::InStream { stream_obj, index }) => self.load_from_objstm(*stream_obj, *index, visited)?,
            None => {
                self.add_warning(format!("unresolved reference {}:{}", id.0, id.1));
                Object::Null
            }
        };
        self.cache.borrow_mut().insert(id, loaded.clone());
        Ok(loaded)
    }

    fn load_at_offset(&self, offset: usize, expected: ObjectId) -> Result<Object> {
        let mut parser = Parser::at(self.buf, offset, self.interner);
        let (id, obj) = parser.parse_indirect_object()?;
        if id != expected {
            self.add_warning(format!(
                "xref pointed at object {}:{} but found {}:{} at offset {offset}",
                expected.0, expected.1, id.0, id.1
            ));
        }
        self.warnings.borrow_mut().extend(parser.warnings);
        Ok(obj)
    }

    /// Decodes the object stream `stream_obj` (§4.4: a compressed container of N direct
    /// objects with an `(obj_i, offset_i)` header) and returns its `index`-th member.
    fn load_from_objstm(&self, stream_obj: u32, index: u32, visited: &mut HashSet<ObjectId>) -> Result<Object> {
        if let Some(members) = self.objstm_cache.borrow().get(&stream_obj) {
            return Ok(members.get(index as usize).map(|(_, o)| o.clone()).unwrap_or(Object::Null));
        }
        let stream_obj_value = self.resolve_inner((stream_obj, 0), visited)?;
        let stream = match stream_obj_value.as_stream() {
            Some(s) => s,
            None => {
                self.add_warning(format!("object {stream_obj} is not a stream, cannot use as an ObjStm"));
                return Ok(Object::Null);
            }
        };
        log::debug!("decoding ObjStm {stream_obj}");
        let n = stream.dict.get("N").and_then(|o| o.as_i64()).unwrap_or(0) as usize;
        let first = stream.dict.get("First").and_then(|o| o.as_i64()).unwrap_or(0) as usize;
        let decoded = stream.decoded_bytes()?;

        let mut header_parser = Parser::new(&decoded, self.interner);
        let mut header = Vec::with_capacity(n);
        for _ in 0..n {
            let obj_num = header_parser.parse_object()?.as_i64().unwrap_or(0) as u32;
            let rel_offset = header_parser.parse_object()?.as_i64().unwrap_or(0) as usize;
            header.push((obj_num, rel_offset));
        }

        let mut members = Vec::with_capacity(n);
        for (i, &(obj_num, rel_offset)) in header.iter().enumerate() {
            let start = first + rel_offset;
            if start > decoded.len() {
                self.add_warning(format!("ObjStm {stream_obj} member {i} offset out of range"));
                members.push((obj_num, Object::Null));
                continue;
            }
            let mut member_parser = Parser::new(&decoded, self.interner);
            member_parser.seek(start);
            let obj = member_parser.parse_object().unwrap_or(Object::Null);
            self.warnings.borrow_mut().extend(member_parser.warnings);
            members.push((obj_num, obj));
        }

        let result = members.get(index as usize).map(|(_, o)| o.clone()).unwrap_or(Object::Null);
        self.objstm_cache.borrow_mut().insert(stream_obj, members);
        Ok(result)
    }
}

fn push_refs(obj: &Object, out: &mut Vec<ObjectId>) {
    match obj {
        Object::Ref(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|o| push_refs(o, out)),
        Object::Dict(d) => d.iter().for_each(|(_, v)| push_refs(v, out)),
        Object::Stream(s) => s.dict.iter().for_each(|(_, v)| push_refs(v, out)),
        _ => {}
    }
}

/// Ties together parsing and xref-chain following for a complete byte image (§4.3
/// "Xref ingestion"): follow `/Prev` through every incremental-update layer, earliest
/// first, so later layers override earlier ones in the merged map.
pub fn ingest_xref_chain(buf: &[u8], interner: &Interner, start_offset: usize) -> Result<(HashMap<ObjectId, Location>, Dict)> {
    let mut layers = Vec::new();
    let mut offset = Some(start_offset);
    let mut visited_offsets = HashSet::new();

    while let Some(off) = offset {
        if !visited_offsets.insert(off) {
            break; // defend against a /Prev cycle in hostile input
        }
        log::debug!("ingesting xref section at offset {off}");
        let (entries, trailer, prev) = ingest_one_xref_section(buf, interner, off)?;
        offset = prev;
        layers.push((entries, trailer));
    }

    let mut merged = HashMap::new();
    let mut trailer = Dict::new();
    for (entries, layer_trailer) in layers.into_iter().rev() {
        for (k, v) in entries {
            merged.insert(k, v);
        }
        for (k, v) in layer_trailer.iter() {
            trailer.insert(k.clone(), v.clone());
        }
    }
    Ok((merged, trailer))
}

fn ingest_one_xref_section(
    buf: &[u8],
    interner: &Interner,
    offset: usize,
) -> Result<(HashMap<ObjectId, Location>, Dict, Option<usize>)> {
    let mut parser = Parser::at(buf, offset, interner);
    let is_classic = matches!(parser.peek_token(), crate::lexer::Token::Keyword(k) if k == "xref");

    if is_classic {
        parser.advance_one_token(); // consume the 'xref' keyword itself
        let (entries, trailer) = parser.parse_classic_xref()?;
        let prev = trailer.get("Prev").and_then(|o| o.as_i64()).map(|n| n as usize);
        Ok((entries, trailer, prev))
    } else {
        // cross-reference stream: an ordinary indirect object whose dict has /Type /XRef
        let (_, obj) = parser.parse_indirect_object()?;
        let stream = obj
            .as_stream()
            .ok_or_else(|| Error::structural(Stage::Xref, "expected classic xref table or an xref stream"))?;
        let (entries, trailer) = Parser::parse_xref_stream(&stream.dict, &stream.raw)?;
        let prev = trailer.get("Prev").and_then(|o| o.as_i64()).map(|n| n as usize);
        Ok((entries, trailer, prev))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::name;

    #[test]
    fn register_then_resolve() {
        let interner = Interner::new();
        let mut reg = Registry::empty(&interner);
        let id = reg.register(Object::Number(42.0));
        assert_eq!(reg.resolve(id).unwrap(), Object::Number(42.0));
    }

    #[test]
    fn unresolved_ref_is_null_with_warning() {
        let interner = Interner::new();
        let reg = Registry::empty(&interner);
        let resolved = reg.resolve((99, 0)).unwrap();
        assert_eq!(resolved, Object::Null);
        assert!(!reg.warnings().is_empty());
    }

    #[test]
    fn resolve_loads_from_byte_image() {
        let interner = Interner::new();
        let buf = b"7 0 obj\n<< /Type /Catalog >>\nendobj";
        let mut xref = HashMap::new();
        xref.insert((7, 0), Location::Offset(0));
        let reg = Registry::new(buf, &interner, xref);
        let obj = reg.resolve((7, 0)).unwrap();
        assert_eq!(obj.as_dict().unwrap().get("Type"), Some(&Object::Name(name("Catalog"))));
    }
}
