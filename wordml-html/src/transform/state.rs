//! Revision mode and per-conversion state.

use crate::css::shading::ShadingResolver;
use crate::markup::Markup;
use crate::measure::Measurer;

/// Class of the hover target around revision-tracked runs and balloons.
pub const TOOLTIP_CLASS: &str = "wml-tooltip";
/// Class of the hidden tooltip text.
pub const TOOLTIP_TEXT_CLASS: &str = "wml-revtrk wml-tooltip-right";
/// Class of comment initials and note reference links.
pub const INITIALS_CLASS: &str = "wml-comment-initials";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Insert,
    Delete,
    MoveFrom,
    MoveTo,
}

impl RevisionKind {
    pub fn from_element(local: &str) -> Option<Self> {
        match local {
            "ins" => Some(RevisionKind::Insert),
            "del" => Some(RevisionKind::Delete),
            "moveFrom" => Some(RevisionKind::MoveFrom),
            "moveTo" => Some(RevisionKind::MoveTo),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RevisionKind::Insert => "Inserted",
            RevisionKind::Delete => "Deleted",
            RevisionKind::MoveFrom => "Move from",
            RevisionKind::MoveTo => "Move to",
        }
    }

    /// Text color and decoration of revised runs.
    pub fn appearance(self) -> (&'static str, &'static str) {
        match self {
            RevisionKind::Delete => ("#C00000", "line-through"),
            RevisionKind::Insert => ("#C00000", "underline"),
            RevisionKind::MoveFrom => ("#00C000", "line-through"),
            RevisionKind::MoveTo => ("#00C000", "underline"),
        }
    }
}

/// Revision context of a subtree. Replaced, never mutated, when entering a
/// revision wrapper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformMode {
    pub revision: Option<RevisionKind>,
    pub tooltip: Option<String>,
    pub additional_class: Option<&'static str>,
}

impl TransformMode {
    pub fn revision(kind: RevisionKind) -> Self {
        Self {
            revision: Some(kind),
            ..Default::default()
        }
    }

    pub fn attributed(kind: RevisionKind, author: &str, date: &str) -> Self {
        Self {
            revision: Some(kind),
            tooltip: Some(format!("{author} - {date} - {}", kind.label())),
            additional_class: Some(TOOLTIP_CLASS),
        }
    }
}

/// Content collected for the end of the document.
#[derive(Debug, Default)]
pub struct Deferred {
    pub comments: Vec<Markup>,
    pub footnotes: Vec<Markup>,
    pub endnotes: Vec<Markup>,
}

/// State shared by the whole recursive walk of one conversion.
#[derive(Debug)]
pub struct TransformState<'m> {
    pub deferred: Deferred,
    next_comment: u32,
    next_footnote: u32,
    next_endnote: u32,
    pub measurer: &'m Measurer,
    pub shading: ShadingResolver,
}

impl<'m> TransformState<'m> {
    pub fn new(measurer: &'m Measurer) -> Self {
        Self {
            deferred: Deferred::default(),
            next_comment: 1,
            next_footnote: 1,
            next_endnote: 1,
            measurer,
            shading: ShadingResolver::new(),
        }
    }

    pub fn take_comment_number(&mut self) -> u32 {
        let n = self.next_comment;
        self.next_comment += 1;
        n
    }

    pub fn take_footnote_number(&mut self) -> u32 {
        let n = self.next_footnote;
        self.next_footnote += 1;
        n
    }

    pub fn take_endnote_number(&mut self) -> u32 {
        let n = self.next_endnote;
        self.next_endnote += 1;
        n
    }
}

/// Format a revision or comment timestamp the way the tooltips show it.
pub fn format_date(raw: &str) -> String {
    const FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_utc().format(FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%MZ"] {
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format(FORMAT).to_string();
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map_or_else(
            || raw.to_string(),
            |d| d.format(FORMAT).to_string(),
        );
    }
    log::debug!("unrecognized timestamp {raw:?}");
    raw.to_string()
}
