//! The interactive-form model (§4.10): field tree, widget annotations, value mutation,
//! appearance regeneration, and flattening.

pub mod appearance;
pub mod field;
pub mod flatten;
pub mod widget;

pub use field::{Field, FieldType};
pub use widget::Widget;

use crate::document::Document;
use crate::error::Result;
use crate::object::ObjectId;

pub struct AcroForm<'doc> {
    doc: &'doc Document,
    dict_id: ObjectId,
}

impl<'doc> AcroForm<'doc> {
    pub(crate) fn new(doc: &'doc Document, dict_id: ObjectId) -> Self {
        AcroForm { doc, dict_id }
    }

    fn dict(&self) -> Result<crate::object::Dict> {
        Ok(self.doc.registry.resolve(self.dict_id)?.as_dict().cloned().unwrap_or_default())
    }

    pub fn needs_appearances(&self) -> Result<bool> {
        Ok(self.dict()?.get("NeedAppearances").map(|o| matches!(o, crate::object::Object::Bool(true))).unwrap_or(false))
    }

    pub fn root_fields(&self) -> Result<Vec<Field<'doc>>> {
        let dict = self.dict()?;
        let roots: Vec<ObjectId> = dict
            .get("Fields")
            .and_then(|o| o.as_array())
            .map(|a| a.iter().filter_map(|o| o.as_ref_id()).collect())
            .unwrap_or_default();
        field::build_tree(self.doc, &roots)
    }

    /// Flattens all terminal fields (§4.10): bakes current appearances into page content,
    /// removes widget annotations, and clears the interactive form state. Routes every
    /// mutation through the registry's interior mutability, so only a shared borrow of
    /// the document is needed.
    pub fn flatten(&self) -> Result<()> {
        let roots = self.root_fields()?;
        flatten::flatten_all(self.doc, roots)
    }
}

/// Recursively searches a field forest for the terminal field with the given dotted
/// qualified name.
pub fn find_field<'doc, 'a>(fields: &'a [Field<'doc>], qualified_name: &str) -> Option<&'a Field<'doc>> {
    for field in fields {
        if field.qualified_name == qualified_name {
            return Some(field);
        }
        if let Some(found) = find_field(&field.children, qualified_name) {
            return Some(found);
        }
    }
    None
}
