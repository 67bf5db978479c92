//! A small, lossless XML element tree.
//!
//! Slides are edited in place and written back, so everything the reader
//! sees (declaration, whitespace, comments, raw attribute values) is kept and
//! serialized as it came in. Attribute values are stored still escaped.

use crate::{Error, Result};
use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// A node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data.
    Text(String),
    CData(String),
    Comment(String),
    /// `<?xml ...?>` content between the markers.
    Decl(String),
    /// Processing instruction content between the markers.
    Pi(String),
    DocType(String),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name, e.g. `a:r`.
    pub name: String,
    /// Attributes in document order; values are raw (escaped) XML.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    self_closing: bool,
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Top-level nodes, including the declaration and the root element.
    pub nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut nodes: Vec<XmlNode> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::XmlError(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            let node = match event {
                Event::Start(ref e) => {
                    stack.push(XmlElement::from_start(e, false)?);
                    continue;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::XmlError("unbalanced end tag".to_string()))?;
                    XmlNode::Element(element)
                }
                Event::Empty(ref e) => XmlNode::Element(XmlElement::from_start(e, true)?),
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad text content: {}", e)))?;
                    XmlNode::Text(text.into_owned())
                }
                Event::CData(ref e) => XmlNode::CData(lossy(e)),
                Event::Comment(ref e) => XmlNode::Comment(lossy(e)),
                Event::Decl(ref e) => XmlNode::Decl(lossy(e)),
                Event::PI(ref e) => XmlNode::Pi(lossy(e)),
                Event::DocType(ref e) => XmlNode::DocType(lossy(e)),
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::XmlError(format!("unclosed element <{}>", open.name)));
        }

        Ok(Self { nodes })
    }

    /// The root element.
    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// The root element, mutably.
    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Serialize the document.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node);
        }
        out
    }
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::XmlError(format!("Bad attribute: {}", e)))?;
            attrs.push((lossy(attr.key.as_ref()), lossy(&attr.value)));
        }
        Ok(Self {
            name: lossy(start.name().as_ref()),
            attrs,
            children: Vec::new(),
            self_closing,
        })
    }

    /// Name without the namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Qualified name for a sibling element in the same namespace.
    pub fn sibling_name(&self, local: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Unescaped value of the attribute with the given qualified name.
    pub fn attr(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| unescape(v).unwrap_or(Cow::Borrowed(v.as_str())))
    }

    /// Set an attribute, escaping the value.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = escape(value).into_owned();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = escaped,
            None => self.attrs.push((name.to_string(), escaped)),
        }
    }

    /// Child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements, mutably.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// Child elements with the given local name, mutably.
    pub fn children_named_mut<'a>(
        &'a mut self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |e| e.local_name() == local)
    }

    /// Follow a path of local names through first matching children.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    /// Mutable version of [`descend`](Self::descend).
    pub fn descend_mut(&mut self, path: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// Index in `children` of the first child element with the given local name.
    pub fn position_of(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.local_name() == local))
    }

    /// Remove every child element whose local name is in `locals`, returning
    /// the index of the first removed node.
    pub fn remove_children(&mut self, locals: &[&str]) -> Option<usize> {
        let first = self.children.iter().position(
            |n| matches!(n, XmlNode::Element(e) if locals.contains(&e.local_name())),
        );
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if locals.contains(&e.local_name())));
        first
    }

    /// Insert a child element at `index` (clamped to the end).
    pub fn insert_element(&mut self, index: usize, element: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(element));
    }

    /// The first child element with the given local name, inserted at
    /// `index` (in the parent's namespace) when missing.
    pub fn ensure_child(&mut self, local: &str, index: usize) -> &mut XmlElement {
        let position = match self.position_of(local) {
            Some(position) => position,
            None => {
                let index = index.min(self.children.len());
                let element = XmlElement::new(self.sibling_name(local));
                self.children.insert(index, XmlNode::Element(element));
                index
            }
        };
        match &mut self.children[position] {
            XmlNode::Element(element) => element,
            _ => unreachable!("position_of only returns element positions"),
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![XmlNode::Text(text.to_string())];
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

/// Strip the namespace prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn write_node(out: &mut String, node: &XmlNode) {
    match node {
        XmlNode::Element(e) => write_element(out, e),
        XmlNode::Text(t) => out.push_str(&partial_escape(t.as_str())),
        XmlNode::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        XmlNode::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        XmlNode::Decl(t) | XmlNode::Pi(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        }
        XmlNode::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t);
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, element: &XmlElement) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }

    if element.children.is_empty() && element.self_closing {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
