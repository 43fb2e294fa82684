//! Side tables attached to a part's nodes.

use super::NodeId;
use std::collections::{BTreeMap, HashMap};

/// Leader character drawn across a tab gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabLeader {
    Dot,
    Hyphen,
    Underscore,
    /// Any other declared leader (`heavy`, `middleDot`); drawn with dots.
    Other,
}

impl TabLeader {
    /// Parse a `w:leader` value; `none` means no leader.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => None,
            "dot" => Some(TabLeader::Dot),
            "hyphen" => Some(TabLeader::Hyphen),
            "underscore" => Some(TabLeader::Underscore),
            _ => Some(TabLeader::Other),
        }
    }

    pub fn character(self) -> char {
        match self {
            TabLeader::Hyphen => '-',
            TabLeader::Underscore => '_',
            TabLeader::Dot | TabLeader::Other => '.',
        }
    }
}

/// Rendered width of a tab, a line break, or zero-width text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabAnnotation {
    pub width_twips: i64,
    pub leader: Option<TabLeader>,
}

impl TabAnnotation {
    pub fn inches(&self) -> f64 {
        self.width_twips as f64 / 1440.0
    }
}

/// One open complex field as seen from an element inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFrame {
    pub id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Annotations {
    sections: HashMap<NodeId, NodeId>,
    tabs: HashMap<NodeId, TabAnnotation>,
    fields: HashMap<NodeId, Vec<FieldFrame>>,
    instructions: BTreeMap<u32, String>,
}

impl Annotations {
    pub fn set_section(&mut self, node: NodeId, section: NodeId) {
        self.sections.insert(node, section);
    }

    /// Section descriptor the node belongs to.
    pub fn section(&self, node: NodeId) -> Option<NodeId> {
        self.sections.get(&node).copied()
    }

    pub fn set_tab(&mut self, node: NodeId, annotation: TabAnnotation) {
        self.tabs.insert(node, annotation);
    }

    pub fn tab(&self, node: NodeId) -> Option<TabAnnotation> {
        self.tabs.get(&node).copied()
    }

    pub fn set_fields(&mut self, node: NodeId, frames: Vec<FieldFrame>) {
        if frames.is_empty() {
            self.fields.remove(&node);
        } else {
            self.fields.insert(node, frames);
        }
    }

    /// Enclosing complex fields, outermost first.
    pub fn fields(&self, node: NodeId) -> &[FieldFrame] {
        self.fields.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push_instruction(&mut self, field: u32, text: &str) {
        self.instructions.entry(field).or_default().push_str(text);
    }

    pub fn instruction(&self, field: u32) -> Option<&str> {
        self.instructions.get(&field).map(String::as_str)
    }
}
