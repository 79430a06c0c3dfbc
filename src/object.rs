//! The PDF object algebra (§3 of the design: a closed tagged variant, not a class
//! hierarchy) plus the two small supporting types everything else is built from:
//! interned [`Name`]s and [`ObjectId`] references.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::filters;

/// `(object_number, generation)` — the address of an indirect object in the registry.
pub type ObjectId = (u32, u16);

/// An interned PDF name (`/Foo`). Two `Name`s compare equal iff their text is equal;
/// interning just means repeated occurrences of the same name share one allocation
/// instead of re-allocating a `String` per occurrence, which matters for documents with
/// thousands of `/Type`/`/Subtype` keys.
#[derive(Debug, Clone, Eq)]
pub struct Name(pub(crate) Rc<str>);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.as_ref() == other.0.as_ref()
    }
}

impl std::hash::Hash for Name {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}

impl std::ops::Deref for Name {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

/// Per-document name interner. Append-only, so it is safe to hand out `Name`s that
/// outlive any single parse call; never global/static (a host embedding multiple
/// documents on multiple threads gets one interner per document).
#[derive(Debug, Default)]
pub struct Interner {
    table: RefCell<HashMap<Box<str>, Rc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Name {
        if let Some(existing) = self.table.borrow().get(s) {
            return Name(existing.clone());
        }
        let rc: Rc<str> = Rc::from(s);
        self.table.borrow_mut().insert(s.into(), rc.clone());
        Name(rc)
    }
}

/// Whether a PDF string literal was written in `(...)` or `<...>` form. Preserved so the
/// serializer can round-trip the author's original form when the string is untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Literal,
    Hex,
}

/// An ordered `Name -> Object` map. Order is insertion order, not preserved for
/// round-trip cosmetics but because duplicate-key resolution and deterministic output
/// both depend on it (§3, §8.2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(Vec<(Name, Object)>);

impl Dict {
    pub fn new() -> Self {
        Dict(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.0.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.0.iter_mut().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `key -> value`. A pre-existing entry is overwritten in place (last write
    /// wins) rather than appended again, per §4.3's duplicate-key rule.
    pub fn insert(&mut self, key: Name, value: Object) -> Option<Object> {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.0.push((key, value));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        let idx = self.0.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Name, Object)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn type_name(&self) -> Option<&str> {
        match self.get("Type") {
            Some(Object::Name(n)) => Some(n.as_str()),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = &'a (Name, Object);
    type IntoIter = std::slice::Iter<'a, (Name, Object)>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Name, Object)> for Dict {
    fn from_iter<T: IntoIterator<Item = (Name, Object)>>(iter: T) -> Self {
        let mut d = Dict::new();
        for (k, v) in iter {
            d.insert(k, v);
        }
        d
    }
}

/// A stream object: a dict plus a raw byte payload, with a lazily computed and cached
/// decoded form (§3 Stream contract). Equality ignores the decode cache.
#[derive(Debug, Clone)]
pub struct Stream {
    pub dict: Dict,
    /// Bytes exactly as stored (i.e. still filter-encoded).
    pub raw: Vec<u8>,
    decoded: RefCell<Option<Rc<[u8]>>>,
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.dict == other.dict && self.raw == other.raw
    }
}

impl Stream {
    pub fn new(dict: Dict, raw: Vec<u8>) -> Self {
        Stream { dict, raw, decoded: RefCell::new(None) }
    }

    /// Runs the filter chain declared in `dict` over `raw`, caching the result. Returns a
    /// clone of the cached `Rc<[u8]>` (cheap — shares the backing allocation).
    pub fn decoded_bytes(&self) -> crate::error::Result<Rc<[u8]>> {
        if let Some(cached) = self.decoded.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let bytes: Rc<[u8]> = filters::decode_chain(&self.dict, &self.raw)?.into();
        *self.decoded.borrow_mut() = Some(bytes.clone());
        Ok(bytes)
    }

    /// Replaces the decoded payload, re-encoding it with the stream's current filter
    /// chain and invalidating the cache (writes must go through this, never through
    /// `raw` directly, or `/Length` would drift from the encoded byte count).
    pub fn set_decoded_bytes(&mut self, decoded: Vec<u8>) -> crate::error::Result<()> {
        self.raw = filters::encode_chain(&self.dict, &decoded)?;
        self.dict.insert(crate::object::name("Length"), Object::Number(self.raw.len() as f64));
        self.decoded = RefCell::new(Some(decoded.into()));
        Ok(())
    }

    pub fn subtype(&self) -> Option<&str> {
        match self.dict.get("Subtype") {
            Some(Object::Name(n)) => Some(n.as_str()),
            _ => None,
        }
    }
}

/// The PDF object algebra. A closed sum type — every other aggregate in the engine
/// (catalog, page, field, …) is a view over `Dict`/`Array` values reached through this.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    /// Integers and reals share this representation; integer-ness is recovered at
    /// serialization time by checking `n.fract() == 0.0`.
    Number(f64),
    Name(Name),
    String(Vec<u8>, StringFormat),
    Array(Vec<Object>),
    Dict(Dict),
    Stream(Stream),
    Ref(ObjectId),
}

impl Object {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n.as_str()),
            _ => None,
        }
    }

    pub fn as_str_bytes(&self) -> Option<&[u8]> {
        match self {
            Object::String(b, _) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream(s) => Some(&mut s.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<ObjectId> {
        match self {
            Object::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
}

impl From<f64> for Object {
    fn from(n: f64) -> Self {
        Object::Number(n)
    }
}

impl From<i64> for Object {
    fn from(n: i64) -> Self {
        Object::Number(n as f64)
    }
}

impl From<crate::units::Pt> for Object {
    fn from(pt: crate::units::Pt) -> Self {
        Object::Number(pt.0 as f64)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Bool(b)
    }
}

impl From<Dict> for Object {
    fn from(d: Dict) -> Self {
        Object::Dict(d)
    }
}

impl From<Vec<Object>> for Object {
    fn from(a: Vec<Object>) -> Self {
        Object::Array(a)
    }
}

/// Convenience for building a `Name` without going through an [`Interner`] — used for
/// well-known keys (`/Type`, `/Length`, …) where sharing an allocation with a parsed
/// document is not worth the indirection.
pub fn name(s: &str) -> Name {
    Name(Rc::from(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_last_write_wins() {
        let mut d = Dict::new();
        d.insert(name("Foo"), Object::Number(1.0));
        d.insert(name("Foo"), Object::Number(2.0));
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("Foo"), Some(&Object::Number(2.0)));
    }

    #[test]
    fn interner_dedups() {
        let interner = Interner::new();
        let a = interner.intern("Page");
        let b = interner.intern("Page");
        assert!(Rc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn dict_preserves_insertion_order() {
        let mut d = Dict::new();
        d.insert(name("B"), Object::Null);
        d.insert(name("A"), Object::Null);
        let keys: Vec<&str> = d.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }
}
