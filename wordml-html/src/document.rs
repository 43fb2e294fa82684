//! Parsed parts of one document.

use crate::error::ConvertError;
use crate::package::{DocumentPackage, PartKind};
use crate::source::{on_off, Node, Part};

/// Default tab stop interval, in twips, when settings declare none.
pub const DEFAULT_TAB_STOP: i64 = 720;

/// The main document part and the related parts the converter reads.
#[derive(Debug, Clone)]
pub struct WordDocument {
    pub main: Part,
    pub styles: Option<Part>,
    pub settings: Option<Part>,
    pub numbering: Option<Part>,
    pub footnotes: Option<Part>,
    pub endnotes: Option<Part>,
    pub comments: Option<Part>,
}

impl WordDocument {
    pub fn load(package: &dyn DocumentPackage) -> Result<Self, ConvertError> {
        let main = Part::parse(&package.main_document()?, "main document")?;
        let related = |kind: PartKind| -> Result<Option<Part>, ConvertError> {
            package
                .part_xml(kind)?
                .map(|xml| Part::parse(&xml, kind.label()))
                .transpose()
        };
        Ok(Self {
            main,
            styles: related(PartKind::Styles)?,
            settings: related(PartKind::Settings)?,
            numbering: related(PartKind::Numbering)?,
            footnotes: related(PartKind::Footnotes)?,
            endnotes: related(PartKind::Endnotes)?,
            comments: related(PartKind::Comments)?,
        })
    }

    pub fn body(&self) -> Option<Node<'_>> {
        self.main.root().w_child("body")
    }

    pub fn style(&self, style_id: &str) -> Option<Node<'_>> {
        self.styles
            .as_ref()?
            .root()
            .w_children("style")
            .find(|s| s.w_attr("styleId") == Some(style_id))
    }

    /// Style marked as the default for a style type (`paragraph`, `table`...).
    pub fn default_style(&self, style_type: &str) -> Option<Node<'_>> {
        self.styles
            .as_ref()?
            .root()
            .w_children("style")
            .find(|s| {
                s.w_attr("type") == Some(style_type)
                    && s.w_attr("default").is_some_and(|d| on_off(Some(d)))
            })
    }

    /// `docDefaults/rPrDefault/rPr` of the styles part.
    pub fn default_run_properties(&self) -> Option<Node<'_>> {
        self.styles
            .as_ref()?
            .root()
            .w_path(&["docDefaults", "rPrDefault", "rPr"])
    }

    pub fn default_tab_stop(&self) -> i64 {
        self.settings
            .as_ref()
            .and_then(|s| s.root().w_child("defaultTabStop"))
            .and_then(|d| d.w_int("val"))
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TAB_STOP)
    }

    /// Outline level declared by a paragraph style.
    pub fn outline_level(&self, style_id: &str) -> Option<i64> {
        self.style(style_id)?
            .w_path(&["pPr", "outlineLvl"])?
            .w_int("val")
    }

    pub fn comment(&self, id: &str) -> Option<Node<'_>> {
        find_by_id(self.comments.as_ref()?, "comment", id)
    }

    pub fn footnote(&self, id: &str) -> Option<Node<'_>> {
        find_by_id(self.footnotes.as_ref()?, "footnote", id)
    }

    pub fn endnote(&self, id: &str) -> Option<Node<'_>> {
        find_by_id(self.endnotes.as_ref()?, "endnote", id)
    }
}

fn find_by_id<'a>(part: &'a Part, local: &'a str, id: &str) -> Option<Node<'a>> {
    part.root()
        .w_children(local)
        .find(|n| n.w_attr("id") == Some(id))
}
