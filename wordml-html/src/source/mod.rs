//! Owned arena representation of a WordprocessingML part
//!
//! Parts are parsed once with `roxmltree` and copied into an arena of nodes
//! addressed by stable [`NodeId`] indices. The pre-passes mutate the arena in
//! place (attribute overrides, relocation of the trailing section descriptor,
//! synthesized runs), while everything the transform needs to know about a
//! node that is not part of the markup itself lives in the side tables of
//! [`Annotations`], keyed by the same indices.
//!
//! A [`Part`] bundles a tree and its annotations; [`Node`] is a cheap copyable
//! handle used for navigation.

mod annotations;

pub use annotations::{Annotations, FieldFrame, TabAnnotation, TabLeader};

use crate::error::ConvertError;
use crate::names::{PT, W, XML};
use std::fmt::Write as _;

/// Stable index of a node inside its [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Namespace-qualified element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub ns: String,
    pub local: String,
}

impl QName {
    pub fn new(ns: &str, local: &str) -> Self {
        Self {
            ns: ns.to_string(),
            local: local.to_string(),
        }
    }

    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.local == local && self.ns == ns
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { name: QName, attrs: Vec<Attribute> },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena of element and text nodes.
#[derive(Debug, Clone)]
pub struct SourceTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

/// Elements whose text content is significant, including whitespace.
const TEXT_BEARING: &[&str] = &["t", "delText", "instrText", "delInstrText"];

impl SourceTree {
    /// Parse a part into an arena. `part_name` only labels errors.
    pub fn parse(xml: &str, part_name: &str) -> Result<Self, ConvertError> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| ConvertError::Xml {
            part: part_name.to_string(),
            message: e.to_string(),
        })?;
        let mut tree = SourceTree {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = tree.copy_from(doc.root_element(), None);
        tree.root = root;
        Ok(tree)
    }

    fn copy_from(&mut self, source: roxmltree::Node<'_, '_>, parent: Option<NodeId>) -> NodeId {
        let name = QName::new(
            source.tag_name().namespace().unwrap_or(""),
            source.tag_name().name(),
        );
        let attrs = source
            .attributes()
            .map(|a| Attribute {
                name: QName::new(a.namespace().unwrap_or(""), a.name()),
                value: a.value().to_string(),
            })
            .collect();
        let keeps_whitespace = name.ns == W && TEXT_BEARING.contains(&name.local.as_str());
        let id = self.push(NodeKind::Element { name, attrs }, parent);

        for child in source.children() {
            if child.is_element() {
                let child_id = self.copy_from(child, Some(id));
                self.nodes[id.0].children.push(child_id);
            } else if child.is_text() {
                let text = child.text().unwrap_or("");
                if keeps_whitespace || !text.trim().is_empty() {
                    let child_id = self.push(NodeKind::Text(text.to_string()), Some(id));
                    self.nodes[id.0].children.push(child_id);
                }
            }
        }
        id
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element.
    pub fn create_element(&mut self, ns: &str, local: &str, attrs: &[(&str, &str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(ns, local, value)| Attribute {
                name: QName::new(ns, local),
                value: value.to_string(),
            })
            .collect();
        self.push(
            NodeKind::Element {
                name: QName::new(ns, local),
                attrs,
            },
            None,
        )
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()), None)
    }

    /// Detach `id` from its parent. The node stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Insert `child` directly after `anchor` under the same parent.
    pub fn insert_after(&mut self, anchor: NodeId, child: NodeId) {
        if let Some(parent) = self.nodes[anchor.0].parent {
            let index = self.nodes[parent.0]
                .children
                .iter()
                .position(|c| *c == anchor)
                .map(|i| i + 1)
                .unwrap_or(0);
            self.insert_child(parent, index, child);
        }
    }

    /// Copy a subtree; the copy is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        let copy = self.push(kind, None);
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Copy an element with its attributes but without children.
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        self.push(kind, None)
    }

    /// Copy a subtree from another part; the copy is detached.
    pub fn import(&mut self, source: Node<'_>) -> NodeId {
        let copy = self.push(source.data().kind.clone(), None);
        for child in source.children() {
            let child_copy = self.import(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    pub fn set_attr(&mut self, id: NodeId, ns: &str, local: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            match attrs.iter_mut().find(|a| a.name.is(ns, local)) {
                Some(existing) => existing.value = value.to_string(),
                None => attrs.push(Attribute {
                    name: QName::new(ns, local),
                    value: value.to_string(),
                }),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, ns: &str, local: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.retain(|a| !a.name.is(ns, local));
        }
    }

    pub fn rename(&mut self, id: NodeId, ns: &str, local: &str) {
        if let NodeKind::Element { name, .. } = &mut self.nodes[id.0].kind {
            *name = QName::new(ns, local);
        }
    }

    /// Replace an element with its children.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == id)
            .unwrap_or(0);
        let children = std::mem::take(&mut self.nodes[id.0].children);
        self.detach(id);
        for (offset, child) in children.into_iter().enumerate() {
            self.nodes[child.0].parent = None;
            self.insert_child(parent, index + offset, child);
        }
    }

    /// Canonical textual form of a subtree, used to compare descriptors.
    pub fn outer_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_xml(id, &mut out);
        out
    }

    fn write_xml(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(&escape_xml(text)),
            NodeKind::Element { name, attrs } => {
                let _ = write!(out, "<{{{}}}{}", name.ns, name.local);
                for attr in attrs {
                    let _ = write!(
                        out,
                        " {{{}}}{}=\"{}\"",
                        attr.name.ns,
                        attr.name.local,
                        escape_xml(&attr.value)
                    );
                }
                out.push('>');
                for child in &self.nodes[id.0].children {
                    self.write_xml(*child, out);
                }
                out.push_str("</>");
            }
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A parsed part plus the side tables computed for it.
#[derive(Debug, Clone)]
pub struct Part {
    pub tree: SourceTree,
    pub annotations: Annotations,
}

impl Part {
    pub fn parse(xml: &str, part_name: &str) -> Result<Self, ConvertError> {
        Ok(Self {
            tree: SourceTree::parse(xml, part_name)?,
            annotations: Annotations::default(),
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.node(self.tree.root)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { part: self, id }
    }
}

/// Navigation handle into a [`Part`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    part: &'a Part,
    id: NodeId,
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Node({:?}, {})", self.id, name.local),
            None => write!(f, "Node({:?}, #text)", self.id),
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.part, other.part) && self.id == other.id
    }
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.part.tree.nodes[self.id.0]
    }

    fn wrap(&self, id: NodeId) -> Node<'a> {
        Node {
            part: self.part,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn part(&self) -> &'a Part {
        self.part
    }

    pub fn annotations(&self) -> &'a Annotations {
        &self.part.annotations
    }

    pub fn name(&self) -> Option<&'a QName> {
        match &self.data().kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.name().is_some()
    }

    pub fn local_name(&self) -> &'a str {
        self.name().map(|n| n.local.as_str()).unwrap_or("")
    }

    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.name().is_some_and(|n| n.is(ns, local))
    }

    /// Shorthand for an element in the WordprocessingML namespace.
    pub fn is_w(&self, local: &str) -> bool {
        self.is(W, local)
    }

    pub fn attr(&self, ns: &str, local: &str) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.is(ns, local))
                .map(|a| a.value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn w_attr(&self, local: &str) -> Option<&'a str> {
        self.attr(W, local)
    }

    pub fn pt_attr(&self, local: &str) -> Option<&'a str> {
        self.attr(PT, local)
    }

    /// Numeric `w:` attribute; malformed values read as absent.
    pub fn w_int(&self, local: &str) -> Option<i64> {
        self.w_attr(local).and_then(|v| v.trim().parse::<i64>().ok())
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        match &self.data().kind {
            NodeKind::Element { attrs, .. } => attrs,
            NodeKind::Text(_) => &[],
        }
    }

    /// Text of a text node.
    pub fn text(&self) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn value(&self) -> String {
        if let Some(text) = self.text() {
            return text.to_string();
        }
        self.descendants().filter_map(|n| n.text()).collect()
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|p| self.wrap(p))
    }

    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let part = self.part;
        std::iter::successors(self.data().parent, move |id| part.tree.nodes[id.0].parent)
            .map(move |id| Node { part, id })
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let part = self.part;
        self.data().children.iter().map(move |id| Node { part, id: *id })
    }

    pub fn elements(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children().filter(|c| c.is_element())
    }

    pub fn child(&self, ns: &str, local: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.is(ns, local))
    }

    pub fn w_child(&self, local: &str) -> Option<Node<'a>> {
        self.child(W, local)
    }

    /// Walk a chain of `w:` children, e.g. `["pPr", "rPr", "rtl"]`.
    pub fn w_path(&self, path: &[&str]) -> Option<Node<'a>> {
        path.iter().try_fold(*self, |node, local| node.w_child(local))
    }

    pub fn w_children(&self, local: &'a str) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children().filter(move |c| c.is_w(local))
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants::new(*self, |_| false)
    }

    /// Descendants in document order; nodes matching `trim` are yielded but
    /// not entered.
    pub fn descendants_trimmed(&self, trim: fn(&Node<'_>) -> bool) -> Descendants<'a> {
        Descendants::new(*self, trim)
    }

    pub fn previous_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let index = self.index_in_parent();
        let siblings: Vec<NodeId> = match self.data().parent {
            Some(parent) => self.part.tree.nodes[parent.0].children[..index].to_vec(),
            None => Vec::new(),
        };
        let part = self.part;
        siblings.into_iter().rev().map(move |id| Node { part, id })
    }

    pub fn next_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let index = self.index_in_parent();
        let siblings: Vec<NodeId> = match self.data().parent {
            Some(parent) => self.part.tree.nodes[parent.0].children[index + 1..].to_vec(),
            None => Vec::new(),
        };
        let part = self.part;
        siblings.into_iter().map(move |id| Node { part, id })
    }

    fn index_in_parent(&self) -> usize {
        match self.data().parent {
            Some(parent) => self.part.tree.nodes[parent.0]
                .children
                .iter()
                .position(|c| *c == self.id)
                .unwrap_or(0),
            None => 0,
        }
    }

    pub fn outer_xml(&self) -> String {
        self.part.tree.outer_xml(self.id)
    }

    /// On/off property semantics: an absent element is off, an element
    /// without `w:val` is on.
    pub fn w_flag(&self, local: &str) -> bool {
        match self.w_child(local) {
            None => false,
            Some(prop) => on_off(prop.w_attr("val")),
        }
    }
}

/// Interpret an optional `w:val` of an on/off property.
pub fn on_off(val: Option<&str>) -> bool {
    match val {
        None => true,
        Some("1") | Some("true") | Some("on") => true,
        Some(_) => false,
    }
}

/// Pre-order iterator over descendants.
pub struct Descendants<'a> {
    part: &'a Part,
    stack: Vec<NodeId>,
    trim: fn(&Node<'_>) -> bool,
}

impl<'a> Descendants<'a> {
    fn new(start: Node<'a>, trim: fn(&Node<'_>) -> bool) -> Self {
        let stack = start.data().children.iter().rev().copied().collect();
        Self {
            part: start.part,
            stack,
            trim,
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = Node {
            part: self.part,
            id,
        };
        if !(self.trim)(&node) {
            self.stack
                .extend(self.part.tree.nodes[id.0].children.iter().rev().copied());
        }
        Some(node)
    }
}

/// True when the attribute is the `xml:space` marker.
pub fn is_xml_space(attr: &Attribute) -> bool {
    attr.name.is(XML, "space")
}
