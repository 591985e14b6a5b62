//! Document parser
//!
//! Walks an [`Element`] tree and builds the [`Document`] model. Errors are
//! collected rather than returned early: a node that fails is reported and
//! left out of its parent's collection, and its siblings keep parsing. When
//! a child of a required collection fails, the parent is rejected as well,
//! one level at a time, up to (but never including) the root.

use tracing::{debug, warn};

use crate::error::{NodeKind, ParseError, ParseErrorKind, Result, SchemaError};
use crate::model::{Base, Document, Enum, Field, Struct, Value};
use crate::tree::{decode_u32, decode_u64, read_tree, Element};
use crate::ROOT_TAG;

/// A parsed document plus every error found while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub document: Document,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Strict view: any collected error fails the whole parse
    pub fn into_result(self) -> std::result::Result<Document, Vec<ParseError>> {
        if self.errors.is_empty() {
            Ok(self.document)
        } else {
            Err(self.errors)
        }
    }
}

/// Parse genxml text
///
/// Fails only when the text is not well-formed XML or has no `<genxml>` root
/// element; per-node problems end up in [`ParseOutcome::errors`].
pub fn parse(text: &str) -> Result<ParseOutcome> {
    let root = read_tree(text)?;
    parse_tree(&root)
}

/// Parse an already-read tree
pub fn parse_tree(root: &Element) -> Result<ParseOutcome> {
    if root.tag != ROOT_TAG {
        return Err(SchemaError::MissingRootNode {
            expected: ROOT_TAG,
            found: Some(root.tag.clone()),
        });
    }

    let mut parser = Parser::default();
    let document = parser.document(root);
    if !parser.errors.is_empty() {
        warn!(
            errors = parser.errors.len(),
            structures = document.structures.len(),
            enumerates = document.enumerates.len(),
            "document parsed with errors"
        );
    }

    Ok(ParseOutcome {
        document,
        errors: parser.errors,
    })
}

/// Per-call parse state; holds nothing but the error list
#[derive(Default)]
struct Parser {
    errors: Vec<ParseError>,
}

/// Marker for a rejected node; its reason is already in `Parser::errors`
struct Rejected;

type NodeResult<T> = std::result::Result<T, Rejected>;

impl Parser {
    fn reject(&mut self, element: &Element, kind: ParseErrorKind) -> Rejected {
        let mut error = ParseError::new(element.line, kind);
        if let Some(name) = element.attr("name").filter(|name| !name.is_empty()) {
            error = error.with_subject(name);
        }
        warn!("{}", error);
        self.errors.push(error);
        Rejected
    }

    /// Parse every `tag` child, keeping the ones that succeed
    ///
    /// Returns the survivors and whether every child succeeded.
    fn children<T>(
        &mut self,
        element: &Element,
        kind: NodeKind,
        mut parse_child: impl FnMut(&mut Self, &Element) -> NodeResult<T>,
    ) -> (Vec<T>, bool) {
        let mut items = Vec::new();
        let mut all_ok = true;
        for child in element.children_named(kind.tag()) {
            match parse_child(self, child) {
                Ok(item) => items.push(item),
                Err(Rejected) => all_ok = false,
            }
        }
        (items, all_ok)
    }

    fn required<'e>(&mut self, element: &'e Element, node: NodeKind, attr: &'static str) -> NodeResult<&'e str> {
        match element.attr(attr) {
            Some(raw) => Ok(raw),
            None => Err(self.reject(element, ParseErrorKind::MissingRequiredAttribute { node, attr })),
        }
    }

    fn required_number<T>(
        &mut self,
        element: &Element,
        node: NodeKind,
        attr: &'static str,
        expected: &'static str,
        decode: fn(&str) -> Option<T>,
    ) -> NodeResult<T> {
        let raw = self.required(element, node, attr)?;
        match decode(raw) {
            Some(value) => Ok(value),
            None => Err(self.reject(
                element,
                ParseErrorKind::AttributeTypeMismatch {
                    node,
                    attr,
                    found: raw.to_string(),
                    expected,
                },
            )),
        }
    }

    fn base(&mut self, element: &Element, node: NodeKind) -> NodeResult<Base> {
        let name = self.required(element, node, "name")?;
        if name.is_empty() {
            return Err(self.reject(
                element,
                ParseErrorKind::AttributeTypeMismatch {
                    node,
                    attr: "name",
                    found: String::new(),
                    expected: "non-empty string",
                },
            ));
        }
        Ok(Base {
            name: name.to_string(),
            prefix: element.attr("prefix").map(str::to_string),
            info: element.attr("info").map(str::to_string),
        })
    }

    fn value(&mut self, element: &Element) -> NodeResult<Value> {
        let base = self.base(element, NodeKind::Value)?;
        let value = self.required_number(element, NodeKind::Value, "value", "u64", decode_u64)?;
        Ok(Value { base, value })
    }

    fn field(&mut self, element: &Element) -> NodeResult<Field> {
        let node = NodeKind::Field;
        let base = self.base(element, node)?;
        let start = self.required_number(element, node, "start", "u32", decode_u32)?;
        let end = self.required_number(element, node, "end", "u32", decode_u32)?;
        let ty = self.required(element, node, "type")?.to_string();
        // A malformed optional attribute reads as absent.
        let default_value = element.attr("default").and_then(decode_u64);

        let has_choices = element.children_named(NodeKind::Value.tag()).next().is_some();
        let (choices, all_ok) = self.children(element, NodeKind::Value, Self::value);
        if !all_ok {
            return Err(self.reject(
                element,
                ParseErrorKind::InvalidChild {
                    node,
                    child: NodeKind::Value,
                },
            ));
        }

        Ok(Field {
            base,
            start,
            end,
            ty,
            default_value,
            choices: has_choices.then_some(choices),
        })
    }

    fn enumerate(&mut self, element: &Element) -> NodeResult<Enum> {
        let node = NodeKind::Enum;
        let base = self.base(element, node)?;
        debug!(name = %base.name, line = element.line, "parsing enum");

        let (values, all_ok) = self.children(element, NodeKind::Value, Self::value);
        if !all_ok {
            return Err(self.reject(
                element,
                ParseErrorKind::InvalidChild {
                    node,
                    child: NodeKind::Value,
                },
            ));
        }
        if values.is_empty() {
            return Err(self.reject(
                element,
                ParseErrorKind::EmptyRequiredCollection {
                    node,
                    collection: NodeKind::Value,
                },
            ));
        }

        Ok(Enum { base, values })
    }

    fn structure(&mut self, element: &Element) -> NodeResult<Struct> {
        let node = NodeKind::Struct;
        let base = self.base(element, node)?;
        debug!(name = %base.name, line = element.line, "parsing struct");
        let length = self.required_number(element, node, "length", "u32", decode_u32)?;

        let (fields, all_ok) = self.children(element, NodeKind::Field, Self::field);
        if !all_ok {
            return Err(self.reject(
                element,
                ParseErrorKind::InvalidChild {
                    node,
                    child: NodeKind::Field,
                },
            ));
        }
        if fields.is_empty() {
            return Err(self.reject(
                element,
                ParseErrorKind::EmptyRequiredCollection {
                    node,
                    collection: NodeKind::Field,
                },
            ));
        }

        Ok(Struct {
            base,
            length,
            fields,
        })
    }

    fn document(&mut self, root: &Element) -> Document {
        let base = Base {
            name: root.attr("name").unwrap_or_default().to_string(),
            prefix: root.attr("prefix").map(str::to_string),
            info: root.attr("info").map(str::to_string),
        };
        // Rejected enums and structs are dropped; the document itself survives.
        let (enumerates, _) = self.children(root, NodeKind::Enum, Self::enumerate);
        let (structures, _) = self.children(root, NodeKind::Struct, Self::structure);

        Document {
            base,
            structures,
            enumerates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> ParseOutcome {
        parse(text).expect("document should have a genxml root")
    }

    #[test]
    fn test_header_struct() {
        let outcome = parse_ok(
            r#"<genxml>
                 <struct name="Header" length="32">
                   <field name="Flag" start="0" end="0" type="bit"/>
                 </struct>
               </genxml>"#,
        );
        assert!(outcome.is_clean());
        let expected = Struct::new("Header", 32, vec![Field::new("Flag", 0, 0, "bit")]);
        assert_eq!(outcome.document.structures, vec![expected]);
        assert!(outcome.document.enumerates.is_empty());
    }

    #[test]
    fn test_empty_root() {
        let outcome = parse_ok("<genxml/>");
        assert!(outcome.is_clean());
        assert_eq!(outcome.document, Document::default());
    }

    #[test]
    fn test_missing_root() {
        let err = parse("<schema/>").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingRootNode { found: Some(ref tag), .. } if tag == "schema"
        ));
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(parse("<genxml>"), Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn test_struct_without_fields_dropped() {
        let outcome = parse_ok(
            r#"<genxml>
<struct name="Empty" length="8"/>
<struct name="Kept" length="8"><field name="a" start="0" end="7" type="uint"/></struct>
</genxml>"#,
        );
        assert_eq!(outcome.document.structures.len(), 1);
        assert_eq!(outcome.document.structures[0].base.name, "Kept");
        assert_eq!(
            outcome.errors,
            vec![ParseError::new(
                2,
                ParseErrorKind::EmptyRequiredCollection {
                    node: NodeKind::Struct,
                    collection: NodeKind::Field,
                },
            )
            .with_subject("Empty")]
        );
    }

    #[test]
    fn test_enum_without_values_dropped() {
        let outcome = parse_ok(r#"<genxml><enum name="Nothing"/></genxml>"#);
        assert!(outcome.document.enumerates.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0].kind,
            ParseErrorKind::EmptyRequiredCollection {
                node: NodeKind::Enum,
                collection: NodeKind::Value
            }
        ));
    }

    #[test]
    fn test_bad_choice_drops_field_and_struct() {
        let outcome = parse_ok(
            r#"<genxml>
<struct name="S" length="8">
  <field name="mode" start="0" end="1" type="uint">
    <value name="off" value="0"/>
    <value name="on"/>
  </field>
  <field name="rest" start="2" end="7" type="uint"/>
</struct>
</genxml>"#,
        );
        assert!(outcome.document.structures.is_empty());
        let kinds: Vec<_> = outcome.errors.iter().map(|e| (e.line, e.kind.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (
                    5,
                    ParseErrorKind::MissingRequiredAttribute {
                        node: NodeKind::Value,
                        attr: "value"
                    }
                ),
                (
                    3,
                    ParseErrorKind::InvalidChild {
                        node: NodeKind::Field,
                        child: NodeKind::Value
                    }
                ),
                (
                    2,
                    ParseErrorKind::InvalidChild {
                        node: NodeKind::Struct,
                        child: NodeKind::Field
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_siblings_continue_after_failure() {
        let outcome = parse_ok(
            r#"<genxml>
<enum name="Bad"><value name="x" value="nope"/></enum>
<enum name="Good"><value name="y" value="1"/></enum>
<enum><value name="z" value="2"/></enum>
</genxml>"#,
        );
        let names: Vec<_> = outcome.document.enumerates.iter().map(|e| e.base.name.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
        assert_eq!(outcome.errors.len(), 3);
        assert!(matches!(
            outcome.errors[0].kind,
            ParseErrorKind::AttributeTypeMismatch { attr: "value", .. }
        ));
        assert_eq!(outcome.errors[2].line, 4);
        assert!(outcome.errors[2].subject.is_none());
    }

    #[test]
    fn test_optional_attributes() {
        let outcome = parse_ok(
            r#"<genxml>
<struct name="S" length="16" prefix="" info="status word">
  <field name="a" start="0" end="3" type="uint" default="0x5"/>
  <field name="b" start="4" end="7" type="uint" default="bogus"/>
  <field name="c" start="8" end="15" type="enum">
    <value name="one" value="1" info="first"/>
  </field>
</struct>
</genxml>"#,
        );
        assert!(outcome.is_clean());
        let s = &outcome.document.structures[0];
        assert_eq!(s.base.prefix.as_deref(), Some(""));
        assert_eq!(s.base.info.as_deref(), Some("status word"));
        assert_eq!(s.fields[0].default_value, Some(5));
        assert_eq!(s.fields[1].default_value, None);
        assert_eq!(s.fields[1].choices, None);
        assert_eq!(
            s.fields[2].choices,
            Some(vec![Value::new("one", 1).with_info("first")])
        );
    }

    #[test]
    fn test_width_overflow_is_mismatch() {
        let outcome = parse_ok(
            r#"<genxml><struct name="S" length="4294967296"><field name="a" start="0" end="0" type="bit"/></struct></genxml>"#,
        );
        assert!(outcome.document.structures.is_empty());
        assert!(matches!(
            outcome.errors[0].kind,
            ParseErrorKind::AttributeTypeMismatch { attr: "length", expected: "u32", .. }
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let outcome = parse_ok(r#"<genxml><enum name=""><value name="a" value="1"/></enum></genxml>"#);
        assert!(outcome.document.enumerates.is_empty());
        assert!(matches!(
            outcome.errors[0].kind,
            ParseErrorKind::AttributeTypeMismatch { attr: "name", .. }
        ));
    }

    #[test]
    fn test_into_result() {
        let clean = parse_ok("<genxml/>").into_result();
        assert!(clean.is_ok());

        let dirty = parse_ok(r#"<genxml><enum name="E"/></genxml>"#).into_result();
        assert_eq!(dirty.unwrap_err().len(), 1);
    }

    #[test]
    fn test_root_attributes() {
        let outcome = parse_ok(r#"<genxml name="regs" info="block"/>"#);
        assert_eq!(outcome.document.base.name, "regs");
        assert_eq!(outcome.document.base.info.as_deref(), Some("block"));
        assert_eq!(outcome.document.base.prefix, None);
    }
}
