//! Owned, mutable XML tree for the package parts the engine rewrites.
//!
//! Parts are read with `roxmltree` and converted into `Element`s that keep their
//! original prefixes (`w:p`, `wp:inline`). Namespace declarations are carried as
//! plain `xmlns:*` attributes on the element that introduced them, so a parsed part
//! serializes back with the same bindings.

use std::fmt::Write as FmtWrite;

use crate::error::Error;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(name))
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// `w:val` of the named child, the common shape of WML property elements.
    pub fn child_val(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr("w:val"))
    }

    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(e)) => e,
            _ => unreachable!("element was just pushed"),
        }
    }

    /// Removes every direct child element with this name; returns how many went.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.is(name)));
        before - self.children.len()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Inserts `child` before the first existing sibling that must follow it
    /// according to `order`. Names missing from `order` are appended.
    pub fn insert_ordered(&mut self, child: Element, order: &[&str]) -> &mut Element {
        let idx = self.ordered_position(&child.name, order);
        self.children.insert(idx, Node::Element(child));
        match &mut self.children[idx] {
            Node::Element(e) => e,
            Node::Text(_) => unreachable!("element was just inserted"),
        }
    }

    /// Removes all children named like `child`, then inserts it at its ordered slot.
    pub fn replace_ordered(&mut self, child: Element, order: &[&str]) -> &mut Element {
        self.remove_children(&child.name);
        self.insert_ordered(child, order)
    }

    pub fn get_or_insert_ordered(&mut self, name: &str, order: &[&str]) -> &mut Element {
        let existing = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is(name)));
        let idx = match existing {
            Some(idx) => idx,
            None => {
                let idx = self.ordered_position(name, order);
                self.children.insert(idx, Node::Element(Element::new(name)));
                idx
            }
        };
        match &mut self.children[idx] {
            Node::Element(e) => e,
            Node::Text(_) => unreachable!("position points at an element"),
        }
    }

    fn ordered_position(&self, name: &str, order: &[&str]) -> usize {
        let Some(rank) = order.iter().position(|n| *n == name) else {
            return self.children.len();
        };
        let successors = &order[rank + 1..];
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if successors.contains(&e.name.as_str())))
            .unwrap_or(self.children.len())
    }

    /// Depth-first visit of every descendant element named `name`. Matches are not
    /// searched further.
    pub fn visit_mut(&mut self, name: &str, f: &mut dyn FnMut(&mut Element)) {
        for child in self.elements_mut() {
            if child.is(name) {
                f(child);
            } else {
                child.visit_mut(name, f);
            }
        }
    }

    pub fn descendants_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.is(name) {
                out.push(child);
            }
            child.descendants_named(name, out);
        }
    }

    pub fn parse(xml: &str) -> Result<Element, Error> {
        let doc = roxmltree::Document::parse(xml)?;
        Ok(convert(doc.root_element()))
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape(v, true));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => out.push_str(&escape(t, false)),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn qualify(node: roxmltree::Node, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NS) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

fn convert(node: roxmltree::Node) -> Element {
    let tag = node.tag_name();
    let mut el = Element::new(qualify(node, tag.namespace(), tag.name()));

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let key = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        el.attrs.push((key, ns.uri().to_string()));
    }

    for attr in node.attributes() {
        el.attrs.push((
            qualify(node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    for child in node.children() {
        if child.is_element() {
            el.children.push(Node::Element(convert(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                el.children.push(Node::Text(text.to_string()));
            }
        }
    }
    el
}
