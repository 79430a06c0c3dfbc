//! Widget annotations (§4.10): the on-page visual for a terminal field, appearance
//! streams indexed by state, flags, and rect.

use crate::document::Document;
use crate::error::{Error, Result, Stage};
use crate::object::{Dict, Object, ObjectId};
use crate::rectangle::Rect;

pub mod flags {
    pub const INVISIBLE: u32 = 1 << 0;
    pub const HIDDEN: u32 = 1 << 1;
    pub const NO_VIEW: u32 = 1 << 5;
}

pub struct Widget<'doc> {
    doc: &'doc Document,
    pub id: ObjectId,
}

impl<'doc> Widget<'doc> {
    pub(super) fn new(doc: &'doc Document, id: ObjectId) -> Self {
        Widget { doc, id }
    }

    fn dict(&self) -> Result<Dict> {
        self.doc
            .registry
            .resolve(self.id)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::structural(Stage::AcroForm, "widget object is not a dictionary"))
    }

    pub fn rect(&self) -> Result<Rect> {
        let dict = self.dict()?;
        let obj = dict.get("Rect").ok_or_else(|| Error::structural(Stage::AcroForm, "widget missing /Rect"))?;
        Rect::from_object(obj).map(|r| r.normalized()).ok_or_else(|| Error::structural(Stage::AcroForm, "/Rect is not a 4-element rectangle"))
    }

    pub fn flags(&self) -> Result<u32> {
        Ok(self.dict()?.get("F").and_then(|o| o.as_i64()).unwrap_or(0) as u32)
    }

    pub fn is_visible(&self) -> Result<bool> {
        let f = self.flags()?;
        Ok(f & (flags::HIDDEN | flags::INVISIBLE | flags::NO_VIEW) == 0)
    }

    /// `/AP /N` is either a single stream (a field with one constant appearance) or a
    /// subdictionary keyed by state name (checkboxes, radio buttons). `/AS` selects among
    /// the latter.
    pub fn normal_appearance_id(&self) -> Result<Option<ObjectId>> {
        let dict = self.dict()?;
        let ap = match dict.get("AP").and_then(|o| o.as_dict().cloned()) {
            Some(ap) => ap,
            None => return Ok(None),
        };
        match ap.get("N") {
            Some(Object::Ref(id)) => {
                let resolved = self.doc.registry.resolve(*id)?;
                if resolved.as_stream().is_some() {
                    Ok(Some(*id))
                } else if let Some(states) = resolved.as_dict() {
                    Ok(self.selected_state_id(states, &dict))
                } else {
                    Ok(None)
                }
            }
            Some(Object::Dict(states)) => Ok(self.selected_state_id(states, &dict)),
            _ => Ok(None),
        }
    }

    fn selected_state_id(&self, states: &Dict, widget_dict: &Dict) -> Option<ObjectId> {
        let current_state = widget_dict.get("AS").and_then(|o| o.as_name()).unwrap_or("Off");
        states.get(current_state).and_then(|o| o.as_ref_id())
    }

    pub fn has_appearance_state(&self, state: &str) -> Result<bool> {
        let dict = self.dict()?;
        let ap = match dict.get("AP").and_then(|o| o.as_dict().cloned()) {
            Some(ap) => ap,
            None => return Ok(false),
        };
        let states = match ap.get("N") {
            Some(Object::Dict(d)) => d.clone(),
            Some(Object::Ref(id)) => match self.doc.registry.resolve(*id)?.as_dict().cloned() {
                Some(d) => d,
                None => return Ok(false),
            },
            _ => return Ok(false),
        };
        Ok(states.contains_key(state))
    }

    pub fn set_appearance_state(&self, state: &str) -> Result<()> {
        let mut dict = self.dict()?;
        dict.insert(crate::object::name("AS"), Object::Name(crate::object::name(state)));
        self.doc.registry.set(self.id, Object::Dict(dict));
        Ok(())
    }

    /// Overwrites `/AP /N` with a single freshly rendered stream (text-like fields have
    /// one constant appearance, unlike the per-state subdictionary buttons use).
    pub fn set_normal_appearance(&self, stream_id: ObjectId) -> Result<()> {
        let mut dict = self.dict()?;
        let mut ap = dict.get("AP").and_then(|o| o.as_dict().cloned()).unwrap_or_default();
        ap.insert(crate::object::name("N"), Object::Ref(stream_id));
        dict.insert(crate::object::name("AP"), Object::Dict(ap));
        self.doc.registry.set(self.id, Object::Dict(dict));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::object::name;
    use crate::units::Pt;

    #[test]
    fn visible_widget_has_no_blocking_flags() {
        let mut doc = Document::create();
        doc.add_page(Pt(200.0), Pt(200.0)).unwrap();
        let mut d = Dict::new();
        d.insert(name("Rect"), Rect::new(Pt(0.0), Pt(0.0), Pt(10.0), Pt(10.0)).to_object());
        let id = doc.registry.register(Object::Dict(d));
        let w = Widget::new(&doc, id);
        assert!(w.is_visible().unwrap());
    }
}
