//! Form flattening (§4.10): bakes each terminal field's current appearance into its
//! page's content stream and removes the interactive field tree.

use crate::content::{Builder, Operand};
use crate::document::Document;
use crate::error::Result;
use crate::matrix::{placement_matrix, Matrix};
use crate::object::{name, Object};

use super::field::Field;

pub(super) fn flatten_all(doc: &Document, roots: Vec<Field<'_>>) -> Result<()> {
    let mut stack = roots;
    while let Some(field) = stack.pop() {
        flatten_field(doc, &field)?;
        stack.extend(field.children);
    }

    clear_form_state(doc)?;
    Ok(())
}

fn flatten_field(doc: &Document, field: &Field<'_>) -> Result<()> {
    if !field.is_terminal() {
        return Ok(());
    }
    for widget in field.widgets()? {
        if !widget.is_visible()? {
            continue;
        }
        let ap_id = match widget.normal_appearance_id()? {
            Some(id) => id,
            None => continue,
        };
        let ap_obj = doc.registry.resolve(ap_id)?;
        let stream = match ap_obj.as_stream() {
            Some(s) => s,
            None => continue,
        };

        let bbox = stream
            .dict
            .get("BBox")
            .and_then(crate::rectangle::Rect::from_object)
            .map(|r| r.as_array())
            .unwrap_or([0.0, 0.0, 0.0, 0.0]);
        if (bbox[2] - bbox[0]).abs() < f32::EPSILON || (bbox[3] - bbox[1]).abs() < f32::EPSILON {
            continue;
        }

        let appearance_matrix = matrix_from_object(stream.dict.get("Matrix"));
        let transformed_bbox = appearance_matrix.transform_bbox(bbox);

        let rect = widget.rect()?;
        let placement = placement_matrix(transformed_bbox, rect.as_array());

        let page = find_owning_page(doc, widget.id)?;
        let page = match page {
            Some(p) => p,
            None => continue,
        };

        let local_name = page.register_xobject(Object::Ref(ap_id))?;

        let mut xobj_builder = Builder::new();
        xobj_builder.push("cm", placement.0.iter().map(|v| Operand::Number(*v as f64)).collect());
        xobj_builder.push("Do", vec![Operand::Name(local_name)]);
        page.append_content(xobj_builder)?;

        remove_annot(doc, page.id, widget.id)?;
    }
    Ok(())
}

fn matrix_from_object(obj: Option<&Object>) -> Matrix {
    let values = match obj.and_then(|o| o.as_array()) {
        Some(a) if a.len() == 6 => a,
        _ => return Matrix::IDENTITY,
    };
    let mut m = [0.0f32; 6];
    for (i, v) in values.iter().enumerate() {
        m[i] = v.as_f64().unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 }) as f32;
    }
    Matrix(m)
}

fn find_owning_page<'doc>(doc: &'doc Document, widget_id: crate::object::ObjectId) -> Result<Option<crate::page::Page<'doc>>> {
    for i in 0..doc.page_count() {
        let page = doc.get_page(i)?;
        let dict = doc.registry.resolve(page.id)?;
        if let Some(d) = dict.as_dict() {
            if let Some(annots) = d.get("Annots").and_then(|o| o.as_array()) {
                if annots.iter().any(|a| a.as_ref_id() == Some(widget_id)) {
                    return Ok(Some(page));
                }
            }
        }
    }
    Ok(None)
}

fn remove_annot(doc: &Document, page_id: crate::object::ObjectId, widget_id: crate::object::ObjectId) -> Result<()> {
    let mut dict = doc
        .registry
        .resolve(page_id)?
        .as_dict()
        .cloned()
        .unwrap_or_default();
    if let Some(annots) = dict.get("Annots").and_then(|o| o.as_array()) {
        let kept: Vec<Object> = annots.iter().filter(|a| a.as_ref_id() != Some(widget_id)).cloned().collect();
        dict.insert(name("Annots"), Object::Array(kept));
        doc.registry.set(page_id, Object::Dict(dict));
    }
    Ok(())
}

fn clear_form_state(doc: &Document) -> Result<()> {
    let catalog = doc.registry.resolve(doc.root)?.as_dict().cloned().unwrap_or_default();
    let acroform_id = match catalog.get("AcroForm").and_then(|o| o.as_ref_id()) {
        Some(id) => id,
        None => return Ok(()),
    };
    let mut acroform = doc.registry.resolve(acroform_id)?.as_dict().cloned().unwrap_or_default();
    acroform.insert(name("Fields"), Object::Array(Vec::new()));
    acroform.remove("NeedAppearances");
    acroform.remove("XFA");
    if acroform.get("SigFlags").and_then(|o| o.as_i64()).unwrap_or(0) == 0 {
        acroform.remove("SigFlags");
    }
    doc.registry.set(acroform_id, Object::Dict(acroform));
    Ok(())
}
