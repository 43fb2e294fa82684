//! Output markup tree
//!
//! The transform builds this lightweight tree rather than an HTML DOM
//! directly: elements carry a pending [`StyleMap`] and class annotation that
//! the reifier turns into `class`/`style` attributes once the whole document
//! has been produced. Serialization goes through html5ever (see
//! [`crate::serializer`]).

use crate::css::StyleMap;

pub const LRM: char = '\u{200E}';
pub const RLM: char = '\u{200F}';
pub const NBSP: char = '\u{00A0}';

/// Attribute marking whitespace-significant content.
pub const XML_SPACE: &str = "xml:space";

#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element(Element),
    Text(String),
    /// A single character written as a numeric reference in the source
    /// (directional marks, symbols).
    CharRef(char),
}

impl Markup {
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Markup::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Markup::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            Markup::Element(e) => e.text_content(),
            Markup::Text(t) => t.clone(),
            Markup::CharRef(c) => c.to_string(),
        }
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Element(element)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Markup>,
    /// Declarations not yet written as a class or `style` attribute.
    pub style: Option<StyleMap>,
    /// Extra classes appended after reification.
    pub class_annotation: Option<String>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(existing) => existing.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Markup>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::Text(text.into()))
    }

    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class_annotation = Some(class.to_string());
        self
    }

    /// Mark the element as whitespace-preserving.
    pub fn preserve_space(self) -> Self {
        self.attr(XML_SPACE, "preserve")
    }

    pub fn style_mut(&mut self) -> &mut StyleMap {
        self.style.get_or_insert_with(StyleMap::new)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Markup::text_content).collect()
    }

    /// Depth-first search for the first descendant element named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().filter_map(Markup::as_element).find_map(|e| {
            if e.name == name {
                Some(e)
            } else {
                e.find(name)
            }
        })
    }

    /// All descendant elements named `name`, in document order.
    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.children.iter().filter_map(Markup::as_element) {
            if child.name == name {
                out.push(child);
            }
            child.find_all(name, out);
        }
    }
}

/// True when the text starts or ends with whitespace.
pub fn has_edge_whitespace(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_whitespace)
        || text.chars().last().is_some_and(char::is_whitespace)
}
