//! Appearance-stream regeneration (§4.10): rebuilds the `/AP /N` Form-XObject content for
//! a field whose value changed.

use crate::content::{Builder, Operand};
use crate::error::Result;
use crate::object::{name, Dict, Object};

use super::field::{Field, FieldType};

const DEFAULT_FONT_SIZE: f32 = 12.0;
const MIN_AUTO_SIZE: f32 = 4.0;
const PADDING: f32 = 2.0;

struct DefaultAppearance {
    font_name: String,
    size: f32,
}

fn parse_da(da: &str) -> DefaultAppearance {
    let tokens: Vec<&str> = da.split_whitespace().collect();
    let mut font_name = "Helv".to_string();
    let mut size = DEFAULT_FONT_SIZE;
    for (i, tok) in tokens.iter().enumerate() {
        if *tok == "Tf" && i >= 2 {
            font_name = tokens[i - 2].trim_start_matches('/').to_string();
            size = tokens[i - 1].parse().unwrap_or(DEFAULT_FONT_SIZE);
        }
    }
    DefaultAppearance { font_name, size }
}

/// Crude per-character width estimate (no real font metrics available): good enough to
/// decide when auto-sized text needs to shrink to fit, not to lay out kerned text.
fn estimate_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

fn fitting_size(text: &str, requested: f32, available_width: f32) -> f32 {
    if requested > 0.0 {
        return requested;
    }
    let mut size = DEFAULT_FONT_SIZE;
    while size > MIN_AUTO_SIZE && estimate_text_width(text, size) > available_width {
        size -= 0.5;
    }
    size
}

/// Dispatches per field type: text-like fields get a freshly rendered glyph run, button
/// fields just pick among their author-supplied `/AP /N` states (§4.10: "Setting a value
/// marks the field as needs appearance update"; button authors' artwork is preserved).
pub(super) fn regenerate(field: &Field) -> Result<()> {
    match field.field_type()? {
        Some(FieldType::Text) => regenerate_text(field, &field.get_value()?.unwrap_or_default()),
        Some(FieldType::Dropdown) => regenerate_text(field, &field.get_value()?.unwrap_or_default()),
        Some(FieldType::Listbox) => regenerate_text(field, &field.get_list_values()?.join("\n")),
        Some(FieldType::Checkbox) | Some(FieldType::Radio) => sync_widget_state(field),
        _ => Ok(()),
    }
}

fn sync_widget_state(field: &Field) -> Result<()> {
    let state = field.get_value()?.unwrap_or_else(|| "Off".to_string());
    for widget in field.widgets()? {
        widget.set_appearance_state(&state)?;
    }
    Ok(())
}

fn regenerate_text(field: &Field, text: &str) -> Result<()> {
    let da = field.dict()?.get("DA").and_then(|o| o.as_str_bytes()).map(|b| String::from_utf8_lossy(b).into_owned());
    let appearance = parse_da(&da.unwrap_or_else(|| "/Helv 0 Tf 0 g".to_string()));
    let quadding = field.dict()?.get("Q").and_then(|o| o.as_i64()).unwrap_or(0);

    for widget in field.widgets()? {
        let rect = widget.rect()?;
        let width = rect.width().0;
        let height = rect.height().0;
        let available = (width - 2.0 * PADDING).max(1.0);
        let size = fitting_size(text, appearance.size, available);

        let text_width = estimate_text_width(text, size);
        let x = match quadding {
            1 => ((width - text_width) / 2.0).max(PADDING),
            2 => (width - text_width - PADDING).max(PADDING),
            _ => PADDING,
        };
        let y = ((height - size) / 2.0).max(PADDING);

        let mut builder = Builder::new();
        builder.push("q", vec![]);
        builder.push("re", vec![
            Operand::Number(0.0),
            Operand::Number(0.0),
            Operand::Number(width as f64),
            Operand::Number(height as f64),
        ]);
        builder.push("W", vec![]);
        builder.push("n", vec![]);
        builder.push("BT", vec![]);
        builder.push("Tf", vec![Operand::Name(appearance.font_name.clone()), Operand::Number(size as f64)]);
        builder.push("g", vec![Operand::Number(0.0)]);
        builder.push("Td", vec![Operand::Number(x as f64), Operand::Number(y as f64)]);
        builder.push("Tj", vec![Operand::String(text.as_bytes().to_vec(), crate::object::StringFormat::Literal)]);
        builder.push("ET", vec![]);
        builder.push("Q", vec![]);

        let content_bytes = builder.emit();

        let mut resources = Dict::new();
        let mut font_dict = Dict::new();
        font_dict.insert(name(&appearance.font_name), default_ref_or_fallback(field, &appearance.font_name)?);
        resources.insert(name("Font"), Object::Dict(font_dict));

        let mut ap_dict = Dict::new();
        ap_dict.insert(name("Type"), Object::Name(name("XObject")));
        ap_dict.insert(name("Subtype"), Object::Name(name("Form")));
        ap_dict.insert(
            name("BBox"),
            Object::Array(vec![Object::Number(0.0), Object::Number(0.0), Object::Number(width as f64), Object::Number(height as f64)]),
        );
        ap_dict.insert(name("Resources"), Object::Dict(resources));
        let stream = crate::object::Stream::new(ap_dict, content_bytes);
        let stream_id = field.store_appearance(stream)?;

        widget.set_normal_appearance(stream_id)?;
    }
    Ok(())
}

/// Looks the font up in the AcroForm's `/DR`; falls back to a bare Type1 Helvetica
/// reference if the resource dict doesn't declare it (common for a minimally specified
/// `/DA`), registering the fallback once and reusing it.
fn default_ref_or_fallback(field: &Field, font_name: &str) -> Result<Object> {
    if let Some(dr_font) = field.acroform_default_font(font_name)? {
        return Ok(dr_font);
    }
    let mut fallback = Dict::new();
    fallback.insert(name("Type"), Object::Name(name("Font")));
    fallback.insert(name("Subtype"), Object::Name(name("Type1")));
    fallback.insert(name("BaseFont"), Object::Name(name("Helvetica")));
    Ok(Object::Dict(fallback))
}
