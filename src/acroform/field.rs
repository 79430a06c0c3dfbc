//! Field-tree construction and the per-type value contracts (§4.10).

use std::collections::HashSet;

use crate::document::Document;
use crate::error::{Error, Result, Stage};
use crate::object::{name, Object, ObjectId, StringFormat};

use super::widget::Widget;

/// Field flag bits (LSB = bit 1), shared across field types; a given bit's meaning
/// depends on `/FT`.
pub mod flags {
    pub const READ_ONLY: u32 = 1 << 0;
    pub const REQUIRED: u32 = 1 << 1;
    pub const NO_EXPORT: u32 = 1 << 2;
    pub const MULTILINE: u32 = 1 << 12;
    pub const PASSWORD: u32 = 1 << 13;
    pub const NO_TOGGLE_TO_OFF: u32 = 1 << 14;
    pub const RADIO: u32 = 1 << 15;
    pub const PUSHBUTTON: u32 = 1 << 16;
    pub const COMBO: u32 = 1 << 17;
    pub const EDIT: u32 = 1 << 18;
    pub const SORT: u32 = 1 << 19;
    pub const FILE_SELECT: u32 = 1 << 20;
    pub const MULTI_SELECT: u32 = 1 << 21;
    pub const DO_NOT_SPELL_CHECK: u32 = 1 << 22;
    pub const DO_NOT_SCROLL: u32 = 1 << 23;
    pub const COMB: u32 = 1 << 24;
    pub const RICH_TEXT_OR_RADIOS_IN_UNISON: u32 = 1 << 25;
    pub const COMMIT_ON_SEL_CHANGE: u32 = 1 << 26;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Checkbox,
    Radio,
    Dropdown,
    Listbox,
    Signature,
    Pushbutton,
}

pub struct Field<'doc> {
    doc: &'doc Document,
    pub id: ObjectId,
    pub qualified_name: String,
    pub children: Vec<Field<'doc>>,
}

impl<'doc> Field<'doc> {
    pub(super) fn dict(&self) -> Result<crate::object::Dict> {
        self.doc
            .registry
            .resolve(self.id)?
            .as_dict()
            .cloned()
            .ok_or_else(|| Error::structural(Stage::AcroForm, "field object is not a dictionary"))
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    pub fn field_flags(&self) -> Result<u32> {
        Ok(self.inherited("Ff")?.and_then(|o| o.as_i64()).unwrap_or(0) as u32)
    }

    /// `/FT` is inheritable: a terminal field may omit it and take its parent's type.
    fn ft(&self) -> Result<String> {
        Ok(self.inherited("FT")?.and_then(|o| o.as_name().map(str::to_string)).unwrap_or_default())
    }

    /// Walks `/Parent` the same way [`Document::inherited_attribute`] does, starting at
    /// this field's own dict.
    fn inherited(&self, key: &str) -> Result<Option<Object>> {
        self.doc.inherited_attribute(self.id, key)
    }

    pub fn field_type(&self) -> Result<Option<FieldType>> {
        if !self.is_terminal() {
            return Ok(None);
        }
        let ff = self.field_flags()?;
        let ft = self.ft()?;
        Ok(Some(match ft.as_str() {
            "Tx" => FieldType::Text,
            "Sig" => FieldType::Signature,
            "Ch" if ff & flags::COMBO != 0 => FieldType::Dropdown,
            "Ch" => FieldType::Listbox,
            "Btn" if ff & flags::RADIO != 0 => FieldType::Radio,
            "Btn" if ff & flags::PUSHBUTTON != 0 => FieldType::Pushbutton,
            "Btn" => FieldType::Checkbox,
            other => return Err(Error::semantic(format!("field {} has unknown /FT {:?}", self.qualified_name, other))),
        }))
    }

    pub fn widgets(&self) -> Result<Vec<Widget<'doc>>> {
        let dict = self.dict()?;
        let ids = match dict.get("Kids").and_then(|o| o.as_array()) {
            Some(kids) if !kids.is_empty() => kids.iter().filter_map(|o| o.as_ref_id()).collect(),
            _ => vec![self.id],
        };
        Ok(ids.into_iter().map(|id| Widget::new(self.doc, id)).collect())
    }

    fn current_value(&self) -> Result<Option<Object>> {
        Ok(self.inherited("V")?)
    }

    pub fn get_value(&self) -> Result<Option<String>> {
        match self.field_type()? {
            Some(FieldType::Text) | Some(FieldType::Dropdown) => Ok(self
                .current_value()?
                .and_then(|o| o.as_str_bytes().map(|b| String::from_utf8_lossy(b).into_owned()))),
            Some(FieldType::Checkbox) | Some(FieldType::Radio) => {
                Ok(self.current_value()?.and_then(|o| o.as_name().map(str::to_string)))
            }
            _ => Ok(None),
        }
    }

    pub fn get_list_values(&self) -> Result<Vec<String>> {
        match self.current_value()? {
            Some(Object::Array(items)) => Ok(items
                .iter()
                .filter_map(|o| o.as_str_bytes().map(|b| String::from_utf8_lossy(b).into_owned()))
                .collect()),
            Some(Object::String(b, _)) => Ok(vec![String::from_utf8_lossy(&b).into_owned()]),
            _ => Ok(Vec::new()),
        }
    }

    fn options(&self) -> Result<Vec<String>> {
        Ok(self
            .inherited("Opt")?
            .and_then(|o| o.as_array().map(|a| a.to_vec()))
            .unwrap_or_default()
            .iter()
            .filter_map(option_display_text)
            .collect())
    }

    fn set_field(&self, key: &str, value: Object) -> Result<()> {
        let mut dict = self.dict()?;
        dict.insert(name(key), value);
        self.doc.registry.set(self.id, Object::Dict(dict));
        Ok(())
    }

    fn reject_if_readonly(&self) -> Result<()> {
        if self.field_flags()? & flags::READ_ONLY != 0 {
            return Err(Error::semantic(format!("field {} is read-only", self.qualified_name)));
        }
        Ok(())
    }

    pub fn set_text(&self, value: &str) -> Result<()> {
        self.reject_if_readonly()?;
        let max_len = self.inherited("MaxLen")?.and_then(|o| o.as_i64()).unwrap_or(0);
        let truncated: String = if max_len > 0 {
            value.chars().take(max_len as usize).collect()
        } else {
            value.to_string()
        };
        self.set_field("V", Object::String(truncated.into_bytes(), StringFormat::Literal))?;
        self.mark_needs_appearance()
    }

    pub fn set_checkbox(&self, on_value: Option<&str>) -> Result<()> {
        self.reject_if_readonly()?;
        let value = on_value.unwrap_or("Off");
        if value != "Off" {
            let declared = self.widgets()?.iter().any(|w| w.has_appearance_state(value).unwrap_or(false));
            if !declared {
                return Err(Error::semantic(format!("{value:?} is not a declared on-value for {}", self.qualified_name)));
            }
        }
        self.set_field("V", Object::Name(name(value)))?;
        self.mark_needs_appearance()
    }

    pub fn set_radio(&self, option: Option<&str>) -> Result<()> {
        self.reject_if_readonly()?;
        let ff = self.field_flags()?;
        match option {
            None if ff & flags::NO_TOGGLE_TO_OFF != 0 => {
                Err(Error::semantic(format!("{} has NoToggleToOff set, cannot clear", self.qualified_name)))
            }
            None => {
                self.set_field("V", Object::Name(name("Off")))?;
                self.mark_needs_appearance()
            }
            Some(v) => {
                self.set_field("V", Object::Name(name(v)))?;
                self.mark_needs_appearance()
            }
        }
    }

    pub fn set_dropdown(&self, value: &str) -> Result<()> {
        self.reject_if_readonly()?;
        let ff = self.field_flags()?;
        if ff & flags::EDIT == 0 {
            let options = self.options()?;
            if !options.iter().any(|o| o == value) {
                return Err(Error::semantic(format!("{value:?} is not in /Opt for {}", self.qualified_name)));
            }
        }
        self.set_field("V", Object::String(value.as_bytes().to_vec(), StringFormat::Literal))?;
        self.mark_needs_appearance()
    }

    pub fn set_list_values(&self, values: &[String]) -> Result<()> {
        self.reject_if_readonly()?;
        let ff = self.field_flags()?;
        if values.len() > 1 && ff & flags::MULTI_SELECT == 0 {
            return Err(Error::semantic(format!("{} does not allow multiple selection", self.qualified_name)));
        }
        let options = self.options()?;
        for v in values {
            if !options.iter().any(|o| o == v) {
                return Err(Error::semantic(format!("{v:?} is not in /Opt for {}", self.qualified_name)));
            }
        }
        let value_array = values.iter().map(|v| Object::String(v.as_bytes().to_vec(), StringFormat::Literal)).collect();
        let indices: Vec<Object> = values
            .iter()
            .filter_map(|v| options.iter().position(|o| o == v))
            .map(|i| Object::Number(i as f64))
            .collect();
        self.set_field("V", Object::Array(value_array))?;
        self.set_field("I", Object::Array(indices))?;
        self.mark_needs_appearance()
    }

    /// Text/Dropdown/Listbox/Checkbox/Radio regenerate; button (pushbutton) and
    /// read-only/signature fields never do (§4.10 "Setting a value...").
    fn mark_needs_appearance(&self) -> Result<()> {
        match self.field_type()? {
            Some(FieldType::Pushbutton) | Some(FieldType::Signature) | None => Ok(()),
            Some(_) => super::appearance::regenerate(self),
        }
    }
}

impl<'doc> Field<'doc> {
    pub(super) fn store_appearance(&self, stream: crate::object::Stream) -> Result<ObjectId> {
        Ok(self.doc.registry.register(Object::Stream(stream)))
    }

    /// Looks `font_name` up in the AcroForm's `/DR /Font` subdictionary, returning the
    /// (unresolved) `Ref` so the appearance's own resources share the same font object
    /// rather than duplicating it.
    pub(super) fn acroform_default_font(&self, font_name: &str) -> Result<Option<Object>> {
        let catalog = match self.doc.registry.resolve(self.doc.root)?.as_dict().cloned() {
            Some(d) => d,
            None => return Ok(None),
        };
        let acroform_id = match catalog.get("AcroForm").and_then(|o| o.as_ref_id()) {
            Some(id) => id,
            None => return Ok(None),
        };
        let acroform = match self.doc.registry.resolve(acroform_id)?.as_dict().cloned() {
            Some(d) => d,
            None => return Ok(None),
        };
        let dr = match acroform.get("DR").and_then(|o| o.as_dict().cloned()) {
            Some(d) => d,
            None => return Ok(None),
        };
        let font_dict = match dr.get("Font").and_then(|o| o.as_dict().cloned()) {
            Some(d) => d,
            None => return Ok(None),
        };
        Ok(font_dict.get(font_name).cloned())
    }
}

fn option_display_text(opt: &Object) -> Option<String> {
    match opt {
        Object::String(b, _) => Some(String::from_utf8_lossy(b).into_owned()),
        // A two-element [export, display] pair: the display text is what set_dropdown
        // and set_list_values compare against (the export value lives in position 0).
        Object::Array(items) => items.get(1).and_then(|o| o.as_str_bytes()).map(|b| String::from_utf8_lossy(b).into_owned()),
        _ => None,
    }
}

/// Builds the field forest from the AcroForm's `/Fields` array (§4.10 field-tree
/// construction), detecting cycles via a visited `(obj,gen)` set.
pub(super) fn build_tree<'doc>(doc: &'doc Document, roots: &[ObjectId]) -> Result<Vec<Field<'doc>>> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    for &id in roots {
        if let Some(field) = build_node(doc, id, None, &mut visited)? {
            out.push(field);
        }
    }
    Ok(out)
}

fn build_node<'doc>(
    doc: &'doc Document,
    id: ObjectId,
    parent_name: Option<&str>,
    visited: &mut HashSet<ObjectId>,
) -> Result<Option<Field<'doc>>> {
    if !visited.insert(id) {
        doc.registry.add_warning(format!("cycle in AcroForm field tree at object {}:{}", id.0, id.1));
        return Ok(None);
    }
    let dict = doc
        .registry
        .resolve(id)?
        .as_dict()
        .cloned()
        .ok_or_else(|| Error::structural(Stage::AcroForm, "field object is not a dictionary"))?;

    let own_t = dict.get("T").and_then(|o| o.as_str_bytes()).map(|b| String::from_utf8_lossy(b).into_owned());
    let qualified_name = match (parent_name, &own_t) {
        (Some(p), Some(t)) => format!("{p}.{t}"),
        (None, Some(t)) => t.clone(),
        (Some(p), None) => p.to_string(),
        (None, None) => String::new(),
    };

    let kids = dict.get("Kids").and_then(|o| o.as_array()).map(|a| a.to_vec()).unwrap_or_default();
    let child_field_ids: Vec<ObjectId> = kids
        .iter()
        .filter_map(|k| k.as_ref_id())
        .filter(|kid_id| {
            doc.registry
                .resolve(*kid_id)
                .ok()
                .and_then(|o| o.as_dict().cloned())
                .map(|d| d.contains_key("T"))
                .unwrap_or(false)
        })
        .collect();

    let mut children = Vec::new();
    for child_id in child_field_ids {
        if let Some(child) = build_node(doc, child_id, Some(&qualified_name), visited)? {
            children.push(child);
        }
    }

    Ok(Some(Field { doc, id, qualified_name, children }))
}
