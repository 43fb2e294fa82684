//! Access to the parts of a WordprocessingML package
//!
//! The converter never touches the archive directly. It asks a
//! [`DocumentPackage`] for the main document, the related parts it knows
//! about, relationship targets (hyperlinks) and embedded binaries (images).
//! [`ZipPackage`] reads a `.docx` file; [`MemoryPackage`] is assembled by hand
//! and backs the test suite.

mod zip;

pub use self::zip::ZipPackage;

use crate::error::ConvertError;
use std::collections::HashMap;

/// Related parts the converter consumes besides the main document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Styles,
    Settings,
    Numbering,
    Footnotes,
    Endnotes,
    Comments,
}

impl PartKind {
    pub fn label(self) -> &'static str {
        match self {
            PartKind::Styles => "styles",
            PartKind::Settings => "settings",
            PartKind::Numbering => "numbering",
            PartKind::Footnotes => "footnotes",
            PartKind::Endnotes => "endnotes",
            PartKind::Comments => "comments",
        }
    }
}

/// Target of a relationship from the main document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub target: String,
    pub external: bool,
}

/// Binary part reached through a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPart {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub trait DocumentPackage {
    /// XML of the main document part.
    fn main_document(&self) -> Result<String, ConvertError>;

    /// XML of a related part, if the package has one.
    fn part_xml(&self, kind: PartKind) -> Result<Option<String>, ConvertError>;

    /// Relationship of the main document part by id.
    fn relationship(&self, id: &str) -> Option<Relationship>;

    /// Binary part behind a relationship id.
    fn embedded_part(&self, id: &str) -> Option<EmbeddedPart>;
}

/// Package assembled in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    main: Option<String>,
    parts: HashMap<PartKind, String>,
    relationships: HashMap<String, Relationship>,
    embedded: HashMap<String, EmbeddedPart>,
}

impl MemoryPackage {
    pub fn new(document_xml: impl Into<String>) -> Self {
        Self {
            main: Some(document_xml.into()),
            ..Default::default()
        }
    }

    /// A package without a main document part.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, kind: PartKind, xml: impl Into<String>) -> Self {
        self.parts.insert(kind, xml.into());
        self
    }

    pub fn with_hyperlink(mut self, id: &str, target: &str) -> Self {
        self.relationships.insert(
            id.to_string(),
            Relationship {
                target: target.to_string(),
                external: true,
            },
        );
        self
    }

    pub fn with_embedded(mut self, id: &str, bytes: Vec<u8>, content_type: &str) -> Self {
        self.relationships.insert(
            id.to_string(),
            Relationship {
                target: format!("media/{id}"),
                external: false,
            },
        );
        self.embedded.insert(
            id.to_string(),
            EmbeddedPart {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        self
    }
}

impl DocumentPackage for MemoryPackage {
    fn main_document(&self) -> Result<String, ConvertError> {
        self.main
            .clone()
            .ok_or_else(|| ConvertError::MissingPart("main document".to_string()))
    }

    fn part_xml(&self, kind: PartKind) -> Result<Option<String>, ConvertError> {
        Ok(self.parts.get(&kind).cloned())
    }

    fn relationship(&self, id: &str) -> Option<Relationship> {
        self.relationships.get(id).cloned()
    }

    fn embedded_part(&self, id: &str) -> Option<EmbeddedPart> {
        self.embedded.get(id).cloned()
    }
}
