//! AcroForm fill + flatten, exercised through hand-built field/widget dictionaries (there
//! is no public "add field" builder — callers wire the object graph directly, the same
//! way a loader would have found it in a real interactive form).

use pdf_engine::units::Pt;
use pdf_engine::{name, Dict, Document, Object};

fn build_text_field(doc: &mut Document, page_id: pdf_engine::ObjectId, field_name: &str, rect: [f64; 4]) -> pdf_engine::ObjectId {
    let mut d = Dict::new();
    d.insert(name("FT"), Object::Name(name("Tx")));
    d.insert(name("T"), Object::String(field_name.as_bytes().to_vec(), pdf_engine::StringFormat::Literal));
    d.insert(name("Subtype"), Object::Name(name("Widget")));
    d.insert(name("DA"), Object::String(b"/Helv 10 Tf 0 g".to_vec(), pdf_engine::StringFormat::Literal));
    d.insert(
        name("Rect"),
        Object::Array(rect.iter().map(|v| Object::Number(*v)).collect()),
    );
    let field_id = doc.registry.register(Object::Dict(d));

    let mut page_dict = doc.registry.resolve(page_id).unwrap().as_dict().cloned().unwrap();
    let mut annots = page_dict.get("Annots").and_then(|o| o.as_array()).map(|a| a.to_vec()).unwrap_or_default();
    annots.push(Object::Ref(field_id));
    page_dict.insert(name("Annots"), Object::Array(annots));
    doc.registry.set(page_id, Object::Dict(page_dict));

    field_id
}

fn wire_acroform(doc: &mut Document, field_ids: &[pdf_engine::ObjectId]) {
    let mut acroform = Dict::new();
    acroform.insert(
        name("Fields"),
        Object::Array(field_ids.iter().map(|id| Object::Ref(*id)).collect()),
    );
    let acroform_id = doc.registry.register(Object::Dict(acroform));

    let mut catalog = doc.registry.resolve(doc.root).unwrap().as_dict().cloned().unwrap();
    catalog.insert(name("AcroForm"), Object::Ref(acroform_id));
    doc.registry.set(doc.root, Object::Dict(catalog));
}

#[test]
fn filling_a_text_field_regenerates_its_appearance() {
    let mut doc = Document::create();
    let page_id = doc.add_page(Pt(300.0), Pt(300.0)).unwrap();
    let field_id = build_text_field(&mut doc, page_id, "name", [50.0, 50.0, 250.0, 80.0]);
    wire_acroform(&mut doc, &[field_id]);

    let acro = doc.acro_form().unwrap().expect("AcroForm was just wired");
    let roots = acro.root_fields().unwrap();
    let field = pdf_engine::acroform::find_field(&roots, "name").expect("field by qualified name");

    field.set_text("Jane Doe").unwrap();
    assert_eq!(field.get_value().unwrap().as_deref(), Some("Jane Doe"));

    let widget = &field.widgets().unwrap()[0];
    assert!(widget.normal_appearance_id().unwrap().is_some());
}

#[test]
fn flatten_bakes_the_appearance_into_the_page_and_clears_the_form() {
    let mut doc = Document::create();
    let page_id = doc.add_page(Pt(300.0), Pt(300.0)).unwrap();
    let field_id = build_text_field(&mut doc, page_id, "name", [50.0, 50.0, 250.0, 80.0]);
    wire_acroform(&mut doc, &[field_id]);

    {
        let acro = doc.acro_form().unwrap().unwrap();
        let roots = acro.root_fields().unwrap();
        let field = pdf_engine::acroform::find_field(&roots, "name").unwrap();
        field.set_text("Jane Doe").unwrap();
    }

    {
        let acro = doc.acro_form().unwrap().unwrap();
        acro.flatten().unwrap();
    }

    let page = doc.get_page(0).unwrap();
    let items = page.content_items().unwrap();
    assert!(items.iter().any(|item| matches!(
        item,
        pdf_engine::content::ContentItem::Operation(op) if op.op == "Do"
    )));

    let acro_after = doc.acro_form().unwrap().unwrap();
    assert!(acro_after.root_fields().unwrap().is_empty());

    let page_dict = doc.registry.resolve(page_id).unwrap().as_dict().cloned().unwrap();
    let annots = page_dict.get("Annots").and_then(|o| o.as_array()).map(|a| a.to_vec()).unwrap_or_default();
    assert!(annots.is_empty());
}

#[test]
fn flattened_form_round_trips_through_a_save() {
    let mut doc = Document::create();
    let page_id = doc.add_page(Pt(300.0), Pt(300.0)).unwrap();
    let field_id = build_text_field(&mut doc, page_id, "name", [50.0, 50.0, 250.0, 80.0]);
    wire_acroform(&mut doc, &[field_id]);

    {
        let acro = doc.acro_form().unwrap().unwrap();
        let roots = acro.root_fields().unwrap();
        let field = pdf_engine::acroform::find_field(&roots, "name").unwrap();
        field.set_text("Jane Doe").unwrap();
        acro.flatten().unwrap();
    }

    let bytes = doc.save().unwrap();
    let reloaded = Document::load(bytes).unwrap();
    assert_eq!(reloaded.page_count(), 1);
    let items = reloaded.get_page(0).unwrap().content_items().unwrap();
    assert!(items.iter().any(|item| matches!(
        item,
        pdf_engine::content::ContentItem::Operation(op) if op.op == "Do"
    )));
}
