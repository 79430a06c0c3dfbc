//! Document / page tree façade (§4.9): `load`/`create`, the page-leaf cache, and
//! inherited-attribute resolution.

use crate::content::Builder;
use crate::document_info::DocumentInfo;
use crate::error::{Error, Result, Stage};
use crate::object::{name, Dict, Interner, Object, ObjectId};
use crate::page::Page;
use crate::registry::{ingest_xref_chain, Registry};
use crate::rectangle::Rect;
use crate::units::Pt;

pub struct Document {
    pub registry: Registry<'static>,
    pub root: ObjectId,
    pub info: DocumentInfo,
    pub version: (u8, u8),
    /// The previous file's `startxref` offset, chained via `/Prev` by an incremental
    /// save (§4.11). `None` for a document built with [`Document::create`].
    pub prev_startxref: Option<usize>,
    /// The trailer `/ID`'s first element, carried forward across saves so the pair keeps
    /// identifying the same logical document (§4.11 step 4).
    pub original_id: Option<Vec<u8>>,
    /// Page leaves, cached in depth-first order at load/creation time and kept in sync
    /// by `add_page`.
    page_ids: Vec<ObjectId>,
}

// The registry borrows the byte buffer and interner it was constructed from. `Document`
// gives both a `'static` lifetime via `Box::leak`, matching the engine's single-owner
// per-document model (§5) without threading a lifetime parameter through the whole
// public façade.
fn leak_buf(buf: Vec<u8>) -> &'static [u8] {
    Box::leak(buf.into_boxed_slice())
}

fn leak_interner(interner: Interner) -> &'static Interner {
    Box::leak(Box::new(interner))
}

impl Document {
    /// `PDF.create()` (§4.9): an empty Catalog, empty Pages, version 1.7.
    pub fn create() -> Self {
        let interner = leak_interner(Interner::new());
        let registry = Registry::new(leak_buf(Vec::new()), interner, Default::default());

        let pages_id = registry.register(Object::Dict({
            let mut d = Dict::new();
            d.insert(name("Type"), Object::Name(name("Pages")));
            d.insert(name("Kids"), Object::Array(Vec::new()));
            d.insert(name("Count"), Object::Number(0.0));
            d
        }));

        let root_id = registry.register(Object::Dict({
            let mut d = Dict::new();
            d.insert(name("Type"), Object::Name(name("Catalog")));
            d.insert(name("Pages"), Object::Ref(pages_id));
            d
        }));

        Document {
            registry,
            root: root_id,
            info: DocumentInfo::new(),
            version: (1, 7),
            prev_startxref: None,
            original_id: None,
            page_ids: Vec::new(),
        }
    }

    /// `PDF.load(bytes)` (§4.9): drives Scanner/Parser/Registry, reads `/Root`, caches
    /// page leaves in depth-first order.
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        let buf: &'static [u8] = leak_buf(bytes);
        let interner: &'static Interner = leak_interner(Interner::new());

        let version = parse_header_version(buf);
        let startxref = find_startxref(buf).ok_or_else(|| Error::structural(Stage::Xref, "missing 'startxref'"))?;
        let (xref, trailer) = ingest_xref_chain(buf, interner, startxref)?;

        let registry = Registry::new(buf, interner, xref);

        let root_ref = trailer.get("Root").and_then(|o| o.as_ref_id()).ok_or_else(|| {
            Error::structural(Stage::Catalog, "trailer missing /Root")
        })?;

        let info = trailer
            .get("Info")
            .and_then(|o| o.as_ref_id())
            .and_then(|id| registry.resolve(id).ok())
            .and_then(|o| o.as_dict().cloned())
            .map(|d| DocumentInfo::from_dict(&d))
            .unwrap_or_default();

        let original_id = trailer
            .get("ID")
            .and_then(|o| o.as_array())
            .and_then(|a| a.first())
            .and_then(|o| o.as_str_bytes())
            .map(|b| b.to_vec());

        let mut doc = Document {
            registry,
            root: root_ref,
            info,
            version,
            prev_startxref: Some(startxref),
            original_id,
            page_ids: Vec::new(),
        };
        doc.reload_page_cache()?;
        Ok(doc)
    }

    fn catalog(&self) -> Result<Dict> {
        self.registry
            .resolve(self.root)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::structural(Stage::Catalog, "/Root does not resolve to a dictionary"))
    }

    fn pages_root(&self) -> Result<ObjectId> {
        let catalog = self.catalog()?;
        catalog
            .get("Pages")
            .and_then(|o| o.as_ref_id())
            .ok_or_else(|| Error::structural(Stage::PageTree, "catalog missing /Pages"))
    }

    fn reload_page_cache(&mut self) -> Result<()> {
        let pages_root = self.pages_root()?;
        let mut leaves = Vec::new();
        let mut visited = std::collections::HashSet::new();
        self.collect_leaves(pages_root, &mut leaves, &mut visited)?;
        self.page_ids = leaves;
        Ok(())
    }

    fn collect_leaves(&self, id: ObjectId, out: &mut Vec<ObjectId>, visited: &mut std::collections::HashSet<ObjectId>) -> Result<()> {
        if !visited.insert(id) {
            self.registry.add_warning(format!("cycle in page tree at object {}:{}", id.0, id.1));
            return Ok(());
        }
        let node = self.registry.resolve(id)?;
        let dict = match node.as_dict() {
            Some(d) => d,
            None => return Ok(()),
        };
        match dict.get("Kids").and_then(|o| o.as_array()) {
            Some(kids) => {
                for kid in kids {
                    if let Some(kid_id) = kid.as_ref_id() {
                        self.collect_leaves(kid_id, out, visited)?;
                    }
                }
            }
            None => out.push(id),
        }
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn get_page(&self, index: usize) -> Result<Page<'_>> {
        let id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| Error::semantic(format!("page index {index} out of range (have {})", self.page_ids.len())))?;
        Page::new(self, id)
    }

    /// Walks `/Parent` looking for the first ancestor (including the page itself) that
    /// defines `key` (§4.9 inherited-attribute resolution: first definition wins).
    pub fn inherited_attribute(&self, mut id: ObjectId, key: &str) -> Result<Option<Object>> {
        let mut visited = std::collections::HashSet::new();
        loop {
            if !visited.insert(id) {
                return Ok(None);
            }
            let node = self.registry.resolve(id)?;
            let dict = match node.as_dict() {
                Some(d) => d,
                None => return Ok(None),
            };
            if let Some(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }
            match dict.get("Parent").and_then(|o| o.as_ref_id()) {
                Some(parent) => id = parent,
                None => return Ok(None),
            }
        }
    }

    /// `addPage(size)` (§4.9): appends a new leaf with a fresh empty content stream.
    pub fn add_page(&mut self, width: Pt, height: Pt) -> Result<ObjectId> {
        let pages_root = self.pages_root()?;
        let content_id = self.registry.register(Object::Stream(crate::object::Stream::new(Dict::new(), Vec::new())));

        let mut page_dict = Dict::new();
        page_dict.insert(name("Type"), Object::Name(name("Page")));
        page_dict.insert(name("Parent"), Object::Ref(pages_root));
        page_dict.insert(name("MediaBox"), Rect::new(Pt(0.0), Pt(0.0), width, height).to_object());
        page_dict.insert(name("Resources"), Object::Dict(Dict::new()));
        page_dict.insert(name("Contents"), Object::Ref(content_id));
        page_dict.insert(name("Annots"), Object::Array(Vec::new()));
        let page_id = self.registry.register(Object::Dict(page_dict));

        let mut pages_node = self
            .registry
            .resolve(pages_root)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::structural(Stage::PageTree, "/Pages is not a dictionary"))?;
        let mut kids = pages_node.get("Kids").and_then(|o| o.as_array()).map(|a| a.to_vec()).unwrap_or_default();
        kids.push(Object::Ref(page_id));
        let count = kids.len();
        pages_node.insert(name("Kids"), Object::Array(kids));
        pages_node.insert(name("Count"), Object::Number(count as f64));
        self.registry.set(pages_root, Object::Dict(pages_node));

        self.page_ids.push(page_id);
        Ok(page_id)
    }

    pub fn empty_builder(&self) -> Builder {
        Builder::new()
    }

    pub fn acro_form(&self) -> Result<Option<crate::acroform::AcroForm<'_>>> {
        let catalog = self.catalog()?;
        Ok(catalog.get("AcroForm").and_then(|o| o.as_ref_id()).map(|id| crate::acroform::AcroForm::new(self, id)))
    }

    /// Drops cache entries no longer reachable from `/Root` (§10.5): a flattened widget's
    /// appearance-stream XObject, or any other object a mutation orphaned, is forgotten
    /// rather than carried into the next `save`. `save` already filters by reachability on
    /// its own, so this is a memory/hygiene convenience, not a correctness requirement.
    pub fn prune_unreachable(&self) -> Result<()> {
        let info_id = self.registry.register(Object::Dict(self.info.to_dict()));
        let reachable = self.registry.reachable_from(&[self.root, info_id])?;
        self.registry.prune_cache_to(&reachable);
        Ok(())
    }

    /// Renders the whole document fresh (§4.11 steps 1-5) with [`crate::config::WriterConfig::default`].
    pub fn save(&self) -> Result<Vec<u8>> {
        crate::writer::write(self)
    }

    /// Renders the whole document fresh under an explicit [`crate::config::WriterConfig`]
    /// (§10.3), e.g. to force xref-stream output or opt into object-stream repacking.
    pub fn save_with_config(&self, config: &crate::config::WriterConfig) -> Result<Vec<u8>> {
        crate::writer::write_with_config(self, config)
    }

    /// Incremental-update save with a reserved, then substituted, signature (§4.11
    /// "Incremental update mode", §4.12).
    pub fn save_with_signature(
        &self,
        signer: &dyn crate::signing::Signer,
        algo: crate::signing::DigestAlgorithm,
    ) -> Result<Vec<u8>> {
        crate::writer::write_incremental_signed(self, signer, algo)
    }
}

fn parse_header_version(buf: &[u8]) -> (u8, u8) {
    if let Some(pos) = buf.windows(5).position(|w| w == b"%PDF-") {
        let rest = &buf[pos + 5..];
        let text: String = rest.iter().take(3).map(|&b| b as char).collect();
        let mut parts = text.split('.');
        if let (Some(maj), Some(min)) = (parts.next(), parts.next()) {
            if let (Ok(maj), Ok(min)) = (maj.parse(), min.trim_end_matches(|c: char| !c.is_ascii_digit()).parse()) {
                return (maj, min);
            }
        }
    }
    (1, 7)
}

fn find_startxref(buf: &[u8]) -> Option<usize> {
    const NEEDLE: &[u8] = b"startxref";
    let tail_start = buf.len().saturating_sub(2048);
    let search_space = &buf[tail_start..];
    let rel = search_space.windows(NEEDLE.len()).rposition(|w| w == NEEDLE)?;
    let mut pos = tail_start + rel + NEEDLE.len();
    while pos < buf.len() && crate::scanner::is_whitespace(buf[pos]) {
        pos += 1;
    }
    let digits_start = pos;
    while pos < buf.len() && buf[pos].is_ascii_digit() {
        pos += 1;
    }
    std::str::from_utf8(&buf[digits_start..pos]).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_has_one_root_no_pages() {
        let doc = Document::create();
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn add_page_appears_in_cache() {
        let mut doc = Document::create();
        doc.add_page(Pt(612.0), Pt(792.0)).unwrap();
        doc.add_page(Pt(612.0), Pt(792.0)).unwrap();
        assert_eq!(doc.page_count(), 2);
        let page = doc.get_page(0).unwrap();
        assert_eq!(page.media_box().unwrap().width(), Pt(612.0));
    }

    #[test]
    fn header_version_parses() {
        assert_eq!(parse_header_version(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n"), (1, 4));
    }

    #[test]
    fn startxref_found_near_eof() {
        let buf = b"...garbage...\nstartxref\n1234\n%%EOF";
        assert_eq!(find_startxref(buf), Some(1234));
    }
}
