//! HTML output
//!
//! The [`Element`] tree is copied into an rcdom tree and written with the
//! html5ever serializer, so escaping and void elements follow HTML5 rules.

use crate::error::ConvertError;
use crate::markup::{Element, Markup, XML_SPACE};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const DOCTYPE: &str = "<!DOCTYPE html>";

fn attribute(name: &str, value: &str) -> Attribute {
    let name = if name == XML_SPACE {
        QualName::new(None, ns!(xml), LocalName::from("space"))
    } else {
        QualName::new(None, ns!(), LocalName::from(name))
    };
    Attribute {
        name,
        value: value.to_string().into(),
    }
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

fn build(element: &Element) -> Handle {
    let attrs = element
        .attrs
        .iter()
        .map(|(name, value)| attribute(name, value))
        .collect();
    let node = Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(element.name.as_str())),
            attrs: RefCell::new(attrs),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    });

    // Adjacent text and character references become one text node.
    let mut pending = String::new();
    for child in &element.children {
        match child {
            Markup::Text(text) => pending.push_str(text),
            Markup::CharRef(c) => pending.push(*c),
            Markup::Element(e) => {
                if !pending.is_empty() {
                    append(&node, create_text(&pending));
                    pending.clear();
                }
                append(&node, build(e));
            }
        }
    }
    if !pending.is_empty() {
        append(&node, create_text(&pending));
    }
    node
}

fn append(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Serialize an element tree as an HTML5 document with a doctype.
pub fn serialize_document(root: &Element) -> Result<String, ConvertError> {
    let handle = build(root);
    let mut output = DOCTYPE.as_bytes().to_vec();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    serialize(&mut output, &SerializableHandle::from(handle), opts)
        .map_err(|e| ConvertError::Serialization(format!("HTML serialization failed: {e}")))?;
    String::from_utf8(output)
        .map_err(|e| ConvertError::Serialization(format!("UTF-8 conversion failed: {e}")))
}
