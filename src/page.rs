//! A single page leaf (§4.9): inherited-attribute resolution, the Resources dict, and
//! the two content-stream ownership modes (rebuild-on-save vs. append-with-isolation).

use crate::content::{Builder, ContentItem};
use crate::document::Document;
use crate::error::{Error, Result, Stage};
use crate::object::{name, Dict, Object, ObjectId};
use crate::rectangle::Rect;

/// A resource-dict subdictionary category, used by the `register_*` helpers to place a
/// new entry under the right `/Resources` key and mint a non-colliding local name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ResourceCategory {
    Font,
    XObject,
    ExtGState,
    Shading,
    Pattern,
}

impl ResourceCategory {
    fn dict_key(self) -> &'static str {
        match self {
            ResourceCategory::Font => "Font",
            ResourceCategory::XObject => "XObject",
            ResourceCategory::ExtGState => "ExtGState",
            ResourceCategory::Shading => "Shading",
            ResourceCategory::Pattern => "Pattern",
        }
    }

    fn name_prefix(self) -> &'static str {
        match self {
            ResourceCategory::Font => "F",
            ResourceCategory::XObject => "X",
            ResourceCategory::ExtGState => "G",
            ResourceCategory::Shading => "Sh",
            ResourceCategory::Pattern => "P",
        }
    }
}

pub struct Page<'doc> {
    doc: &'doc Document,
    pub id: ObjectId,
}

impl<'doc> Page<'doc> {
    pub(crate) fn new(doc: &'doc Document, id: ObjectId) -> Result<Self> {
        Ok(Page { doc, id })
    }

    fn dict(&self) -> Result<Dict> {
        self.doc
            .registry
            .resolve(self.id)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::structural(Stage::PageTree, "page object is not a dictionary"))
    }

    pub fn media_box(&self) -> Result<Rect> {
        let value = self
            .doc
            .inherited_attribute(self.id, "MediaBox")?
            .ok_or_else(|| Error::structural(Stage::PageTree, "no /MediaBox in scope for this page"))?;
        Rect::from_object(&value).ok_or_else(|| Error::structural(Stage::PageTree, "/MediaBox is not a 4-element rectangle"))
    }

    pub fn crop_box(&self) -> Result<Option<Rect>> {
        Ok(self.doc.inherited_attribute(self.id, "CropBox")?.and_then(|o| Rect::from_object(&o)))
    }

    pub fn rotation(&self) -> Result<i64> {
        Ok(self.doc.inherited_attribute(self.id, "Rotate")?.and_then(|o| o.as_i64()).unwrap_or(0))
    }

    fn resources(&self) -> Result<Dict> {
        Ok(self
            .doc
            .inherited_attribute(self.id, "Resources")?
            .and_then(|o| o.as_dict().cloned())
            .unwrap_or_default())
    }

    /// Decodes and concatenates every stream named in `/Contents` (a single stream or an
    /// array of streams, per the standard's allowance for split content).
    pub fn content_stream_bytes(&self) -> Result<Vec<u8>> {
        let dict = self.dict()?;
        let contents = dict.get("Contents").cloned().unwrap_or(Object::Null);
        let mut out = Vec::new();
        for id in content_stream_ids(&contents) {
            let obj = self.doc.registry.resolve(id)?;
            if let Some(stream) = obj.as_stream() {
                out.extend_from_slice(&stream.decoded_bytes()?);
                out.push(b'\n');
            }
        }
        Ok(out)
    }

    pub fn content_items(&self) -> Result<Vec<ContentItem>> {
        let bytes = self.content_stream_bytes()?;
        let (items, warnings) = crate::content::parse_content_stream(&bytes)?;
        for w in warnings {
            self.doc.registry.add_warning(w.message);
        }
        Ok(items)
    }

    /// Mode (b) of the two content-ownership modes (§4.9): wraps `builder`'s emitted
    /// operators in `q`/`Q` isolation and appends them as a brand-new content stream
    /// object, leaving every pre-existing content stream untouched. Mode (a)
    /// (rebuild-on-save, replacing `/Contents` wholesale) belongs to the writer, which
    /// has visibility into every page at once.
    pub fn append_content(&self, builder: Builder) -> Result<()> {
        let mut isolated = Builder::new();
        isolated.append_isolated(&builder);
        self.append_raw_stream(isolated.emit())
    }

    fn append_raw_stream(&self, bytes: Vec<u8>) -> Result<()> {
        let registry = &self.doc.registry;
        let new_stream_id = registry.register(Object::Stream(crate::object::Stream::new(Dict::new(), bytes)));

        let mut page_dict = self.dict()?;
        let existing = page_dict.get("Contents").cloned().unwrap_or(Object::Null);
        let mut ids = content_stream_ids(&existing);
        ids.push(new_stream_id);
        let array = ids.into_iter().map(Object::Ref).collect();
        page_dict.insert(name("Contents"), Object::Array(array));
        registry.set(self.id, Object::Dict(page_dict));
        Ok(())
    }

    fn register(&self, category: ResourceCategory, value: Object) -> Result<String> {
        let mut page_dict = self.dict()?;
        let mut resources = self.resources()?;
        let mut sub = resources.get(category.dict_key()).and_then(|o| o.as_dict().cloned()).unwrap_or_default();

        let mut n = sub.len() + 1;
        let mut local_name = format!("{}{n}", category.name_prefix());
        while sub.contains_key(&local_name) {
            n += 1;
            local_name = format!("{}{n}", category.name_prefix());
        }

        let object_id = self.doc.registry.register(value);
        sub.insert(name(&local_name), Object::Ref(object_id));
        resources.insert(name(category.dict_key()), Object::Dict(sub));
        page_dict.insert(name("Resources"), Object::Dict(resources));
        self.doc.registry.set(self.id, Object::Dict(page_dict));
        Ok(local_name)
    }

    pub fn register_font(&self, font_dict: Object) -> Result<String> {
        self.register(ResourceCategory::Font, font_dict)
    }

    pub fn register_xobject(&self, xobject: Object) -> Result<String> {
        self.register(ResourceCategory::XObject, xobject)
    }

    pub fn register_ext_gstate(&self, ext_gstate: Object) -> Result<String> {
        self.register(ResourceCategory::ExtGState, ext_gstate)
    }

    pub fn register_shading(&self, shading: Object) -> Result<String> {
        self.register(ResourceCategory::Shading, shading)
    }

    pub fn register_pattern(&self, pattern: Object) -> Result<String> {
        self.register(ResourceCategory::Pattern, pattern)
    }
}

fn content_stream_ids(contents: &Object) -> Vec<ObjectId> {
    match contents {
        Object::Ref(id) => vec![*id],
        Object::Array(items) => items.iter().filter_map(|o| o.as_ref_id()).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Pt;

    #[test]
    fn media_box_inherits_from_pages_root_when_absent_on_leaf() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(300.0)).unwrap();
        let page = doc.get_page(0).unwrap();
        let mb = page.media_box().unwrap();
        assert_eq!(mb.width(), Pt(200.0));
        assert_eq!(mb.height(), Pt(300.0));
    }

    #[test]
    fn register_font_returns_unique_local_names() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(300.0)).unwrap();
        let page = doc.get_page(0).unwrap();
        let a = page.register_font(Object::Dict(Dict::new())).unwrap();
        let b = page.register_font(Object::Dict(Dict::new())).unwrap();
        assert_ne!(a, b);
    }
}
