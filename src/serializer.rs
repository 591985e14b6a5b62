//! Document serializer
//!
//! Mirrors the parser's node shapes. Optional attributes are written only
//! when present, so a parsed document serializes back to an equivalent tree.

use crate::model::{Base, Document, Enum, Field, Struct, Value};
use crate::tree::{Element, WriteOptions};
use crate::ROOT_TAG;

/// Serialize with the default [`WriteOptions`]
pub fn serialize(doc: &Document) -> String {
    serialize_with(doc, &WriteOptions::default())
}

pub fn serialize_with(doc: &Document, options: &WriteOptions) -> String {
    to_tree(doc).render(options).to_string()
}

/// Build the attributed tree for a document
pub fn to_tree(doc: &Document) -> Element {
    let mut root = Element::new(ROOT_TAG);
    if !doc.base.name.is_empty() {
        root.set_attr("name", &doc.base.name);
    }
    root.set_opt_attr("prefix", doc.base.prefix.as_deref());
    root.set_opt_attr("info", doc.base.info.as_deref());

    for enumerate in &doc.enumerates {
        root.push_child(enum_element(enumerate));
    }
    for structure in &doc.structures {
        root.push_child(struct_element(structure));
    }
    root
}

fn base_element(tag: &str, base: &Base) -> Element {
    let mut element = Element::new(tag);
    element.set_attr("name", &base.name);
    element.set_opt_attr("prefix", base.prefix.as_deref());
    element.set_opt_attr("info", base.info.as_deref());
    element
}

fn value_element(value: &Value) -> Element {
    let mut element = base_element("value", &value.base);
    element.set_attr("value", value.value);
    element
}

fn field_element(field: &Field) -> Element {
    let mut element = base_element("field", &field.base);
    element.set_attr("start", field.start);
    element.set_attr("end", field.end);
    element.set_attr("type", &field.ty);
    element.set_opt_attr("default", field.default_value);
    for choice in field.choices.iter().flatten() {
        element.push_child(value_element(choice));
    }
    element
}

fn enum_element(enumerate: &Enum) -> Element {
    let mut element = base_element("enum", &enumerate.base);
    for value in &enumerate.values {
        element.push_child(value_element(value));
    }
    element
}

fn struct_element(structure: &Struct) -> Element {
    let mut element = base_element("struct", &structure.base);
    element.set_attr("length", structure.length);
    for field in &structure.fields {
        element.push_child(field_element(field));
    }
    element
}
