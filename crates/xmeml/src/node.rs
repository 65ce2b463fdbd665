//! Immutable XML value tree and its canonical printer.
//!
//! Documents are built bottom-up as [`XmlNode`] values and rendered once by
//! [`render_document`], so structure can be tested without caring about
//! formatting.

use std::fmt::Display;

/// XML declaration emitted at the top of every document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// An element with attributes, optional text, and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf element holding `value` as text.
    pub fn leaf(name: impl Into<String>, value: impl Display) -> Self {
        let mut node = Self::new(name);
        node.text = Some(value.to_string());
        node
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn attrs<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Display,
    {
        self.attributes.extend(
            attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string())),
        );
        self
    }

    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a leaf child: `<name>value</name>`.
    pub fn leaf_child(self, name: impl Into<String>, value: impl Display) -> Self {
        self.child(Self::leaf(name, value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children with the given element name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child with the given element name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follow a path of first-match child names.
    pub fn find_path(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter().try_fold(self, |node, name| node.find(name))
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(XmlNode::text)
    }
}

/// Render `root` as a complete document: declaration, optional doctype,
/// then the tree indented with tabs, one element per line.
pub fn render_document(root: &XmlNode, doctype: Option<&str>) -> String {
    let mut out = String::with_capacity(64 * 1024);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    if let Some(doctype) = doctype {
        out.push_str("<!DOCTYPE ");
        out.push_str(doctype);
        out.push_str(">\n");
    }
    render_node(root, 0, &mut out);
    out
}

fn render_node(node: &XmlNode, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }

    let text = node.text.as_deref().filter(|t| !t.is_empty());
    match (text, node.children.is_empty()) {
        (None, true) => out.push_str("/>\n"),
        (Some(text), true) => {
            out.push('>');
            escape_into(text, false, out);
            out.push_str("</");
            out.push_str(&node.name);
            out.push_str(">\n");
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                for _ in 0..=depth {
                    out.push('\t');
                }
                escape_into(text, false, out);
                out.push('\n');
            }
            for child in &node.children {
                render_node(child, depth + 1, out);
            }
            for _ in 0..depth {
                out.push('\t');
            }
            out.push_str("</");
            out.push_str(&node.name);
            out.push_str(">\n");
        }
    }
}

fn escape_into(value: &str, attribute: bool, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
}
