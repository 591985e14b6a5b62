//! Attributed tree I/O
//!
//! The parser and serializer only see [`Element`]: a tag, its attributes in
//! source order, its element children and the line it started on. Reading
//! goes through `roxmltree`; rendering writes the tree back as indented XML.

use std::borrow::Cow;
use std::fmt;

use quick_xml::escape::escape;

use crate::error::{NodeKind, Result, SchemaError};

/// One element of an attributed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// 1-based source line, 0 for elements built in memory
    pub line: u32,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            line: 0,
        }
    }

    /// Look up an attribute's raw text
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Append an attribute, keeping insertion order
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
        self.attributes.push((name.into(), value.to_string()));
    }

    /// Append an attribute only when a value is present
    pub fn set_opt_attr<T: ToString>(&mut self, name: impl Into<String>, value: Option<T>) {
        if let Some(value) = value {
            self.set_attr(name, value);
        }
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Child elements with the given tag, in document order
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    pub fn render<'a>(&'a self, options: &'a WriteOptions) -> Rendered<'a> {
        Rendered {
            element: self,
            options,
        }
    }
}

/// Parse XML text into an owned tree rooted at the document element
///
/// A `<!DOCTYPE>` is accepted. Text without any element is a missing root,
/// not malformed XML.
pub fn read_tree(text: &str) -> Result<Element> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = match roxmltree::Document::parse_with_options(text, options) {
        Ok(doc) => doc,
        Err(roxmltree::Error::NoRootNode) => {
            return Err(SchemaError::MissingRootNode {
                expected: NodeKind::Root.tag(),
                found: None,
            })
        }
        Err(e) => return Err(e.into()),
    };
    Ok(convert(&doc, doc.root_element()))
}

fn convert(doc: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> Element {
    Element {
        tag: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        children: node
            .children()
            .filter(|child| child.is_element())
            .map(|child| convert(doc, child))
            .collect(),
        line: doc.text_pos_at(node.range().start).row,
    }
}

/// Decode an unsigned integer attribute: decimal or `0x` hex, surrounding
/// whitespace allowed, no sign and no overflow
pub fn decode_u64(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u64::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) => {
            trimmed.parse().ok()
        }
        None => None,
    }
}

pub fn decode_u32(raw: &str) -> Option<u32> {
    decode_u64(raw).and_then(|value| u32::try_from(value).ok())
}

/// Text rendering settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level
    pub indent: usize,
    /// Emit an `<?xml ...?>` declaration first
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            declaration: true,
        }
    }
}

/// A tree paired with its rendering options; format it to get XML text
pub struct Rendered<'a> {
    element: &'a Element,
    options: &'a WriteOptions,
}

impl Rendered<'_> {
    fn write_element(&self, f: &mut fmt::Formatter<'_>, element: &Element, depth: usize) -> fmt::Result {
        let pad = depth * self.options.indent;
        write!(f, "{:pad$}<{}", "", element.tag, pad = pad)?;
        for (name, value) in &element.attributes {
            write!(f, " {}=\"{}\"", name, escape_attr(value))?;
        }
        if element.children.is_empty() {
            return writeln!(f, "/>");
        }
        writeln!(f, ">")?;
        for child in &element.children {
            self.write_element(f, child, depth + 1)?;
        }
        writeln!(f, "{:pad$}</{}>", "", element.tag, pad = pad)
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.declaration {
            writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        }
        self.write_element(f, self.element, 0)
    }
}

// Attribute-value normalization would turn raw whitespace controls into spaces.
fn escape_attr(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if escaped.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            escaped
                .replace('\n', "&#10;")
                .replace('\r', "&#13;")
                .replace('\t', "&#9;"),
        )
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode_u64("42"), Some(42));
        assert_eq!(decode_u64(" 7 "), Some(7));
        assert_eq!(decode_u64("0x1F"), Some(31));
        assert_eq!(decode_u64("0XfF"), Some(255));
        assert_eq!(decode_u64("18446744073709551615"), Some(u64::MAX));
        assert_eq!(decode_u64("18446744073709551616"), None);
        assert_eq!(decode_u64("-1"), None);
        assert_eq!(decode_u64("+1"), None);
        assert_eq!(decode_u64("1.5"), None);
        assert_eq!(decode_u64("0x"), None);
        assert_eq!(decode_u64(""), None);
        assert_eq!(decode_u32("4294967295"), Some(u32::MAX));
        assert_eq!(decode_u32("4294967296"), None);
    }

    #[test]
    fn test_read_tree_lines_and_order() {
        let text = "<genxml>\n  <!-- note -->\n  <enum name=\"E\" info=\"x\">\n    <value name=\"A\" value=\"1\"/>\n  </enum>\n</genxml>\n";
        let root = read_tree(text).unwrap();
        assert_eq!(root.tag, "genxml");
        assert_eq!(root.line, 1);
        assert_eq!(root.children.len(), 1);

        let en = &root.children[0];
        assert_eq!(en.line, 3);
        assert_eq!(en.attributes[0], ("name".to_string(), "E".to_string()));
        assert_eq!(en.attr("info"), Some("x"));
        assert_eq!(en.attr("prefix"), None);
        assert_eq!(en.children_named("value").count(), 1);
        assert_eq!(en.children[0].line, 4);
    }

    #[test]
    fn test_read_tree_malformed() {
        assert!(matches!(
            read_tree("<genxml><enum></genxml>"),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn test_read_tree_accepts_doctype() {
        let root = read_tree("<?xml version=\"1.0\"?>\n<!DOCTYPE genxml>\n<genxml/>").unwrap();
        assert_eq!(root.tag, "genxml");
        assert_eq!(root.line, 3);
    }

    #[test]
    fn test_read_tree_without_element_is_missing_root() {
        for text in ["", "<?xml version=\"1.0\"?>", "<?xml version=\"1.0\"?>\n<!-- nothing -->\n"] {
            assert!(
                matches!(
                    read_tree(text),
                    Err(SchemaError::MissingRootNode { expected: "genxml", found: None })
                ),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_render_indent_and_escape() {
        let mut root = Element::new("genxml");
        let mut en = Element::new("enum");
        en.set_attr("name", "A&B");
        en.set_opt_attr("info", Some("say \"hi\"\nbye"));
        en.set_opt_attr("prefix", None::<&str>);
        let mut value = Element::new("value");
        value.set_attr("name", "X");
        value.set_attr("value", 3u64);
        en.push_child(value);
        root.push_child(en);

        let options = WriteOptions {
            indent: 2,
            declaration: false,
        };
        let text = root.render(&options).to_string();
        assert_eq!(
            text,
            "<genxml>\n  <enum name=\"A&amp;B\" info=\"say &quot;hi&quot;&#10;bye\">\n    <value name=\"X\" value=\"3\"/>\n  </enum>\n</genxml>\n"
        );

        let reread = read_tree(&text).unwrap();
        assert_eq!(reread.children[0].attr("info"), Some("say \"hi\"\nbye"));
    }
}
