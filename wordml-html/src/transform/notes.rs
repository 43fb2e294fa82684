//! Footnote, endnote and comment references
//!
//! A reference produces a numbered link in place. The referenced content is
//! converted right away and deferred, behind a link back to the reference,
//! to the matching collection appended at the end of the body. Comments may
//! instead be shown as hover balloons next to the commenter's initials.

use super::state::{format_date, TransformMode, INITIALS_CLASS, TOOLTIP_CLASS, TOOLTIP_TEXT_CLASS};
use super::{needs_preserve, Transformer};
use crate::markup::{Element, Markup, XML_SPACE};
use crate::source::Node;

/// Forward link placed at the reference and the back link heading the
/// deferred content.
fn link_pair(kind: &str, n: u32, label: &str) -> (Element, Element) {
    let top = format!("_wml_{kind}_link_{n}");
    let bottom = format!("_wml_{kind}_{n}");
    let forward = Element::new("a")
        .attr("class", INITIALS_CLASS)
        .attr("href", format!("#{bottom}"))
        .attr("name", top.clone())
        .text(format!("[{label}]"));
    let back = Element::new("a")
        .attr("class", INITIALS_CLASS)
        .attr("href", format!("#{top}"))
        .attr("name", bottom)
        .text(format!("[{label}]"));
    (forward, back)
}

impl<'a> Transformer<'a> {
    fn deferred_content(
        &mut self,
        back: Element,
        content: Node<'a>,
        suppress_trailing_whitespace: bool,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        let mut out = vec![back.into()];
        for child in content.elements() {
            let converted = self.convert_node(child, suppress_trailing_whitespace, margin_left, mode);
            out.extend(converted);
        }
        out
    }

    pub(super) fn note_reference(
        &mut self,
        node: Node<'a>,
        suppress_trailing_whitespace: bool,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        let Some(id) = node.w_attr("id") else {
            return Vec::new();
        };
        let endnote = node.is_w("endnoteReference");
        let kind = if endnote { "endnote" } else { "footnote" };
        let note = if endnote {
            self.doc.endnote(id)
        } else {
            self.doc.footnote(id)
        };
        let Some(note) = note else {
            log::warn!("{kind} {id} is referenced but not present");
            return Vec::new();
        };

        let n = if endnote {
            self.state.take_endnote_number()
        } else {
            self.state.take_footnote_number()
        };
        let (forward, back) = link_pair(kind, n, &n.to_string());
        let content =
            self.deferred_content(back, note, suppress_trailing_whitespace, margin_left, mode);
        let collection = if endnote {
            &mut self.state.deferred.endnotes
        } else {
            &mut self.state.deferred.footnotes
        };
        collection.extend(content);
        vec![forward.into()]
    }

    pub(super) fn comment_reference(
        &mut self,
        node: Node<'a>,
        suppress_trailing_whitespace: bool,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        let Some(comment) = node.w_attr("id").and_then(|id| self.doc.comment(id)) else {
            return Vec::new();
        };
        let Some(initials) = comment.w_attr("initials") else {
            return Vec::new();
        };

        let n = self.state.take_comment_number();
        let label = format!("{initials}{n}");
        let author = comment.w_attr("author").unwrap_or_default();
        let date = comment.w_attr("date").map(format_date).unwrap_or_default();
        let tooltip = format!("{author} - {date}");

        if self.settings.display_comments_as_balloon {
            let mut balloon = Element::new("span")
                .attr("class", TOOLTIP_TEXT_CLASS)
                .text(tooltip);
            for paragraph in comment.w_children("p") {
                let text: String = paragraph
                    .descendants()
                    .filter(|d| d.is_w("t"))
                    .map(|t| t.value())
                    .collect();
                balloon.children.push(Element::new("br").into());
                balloon.children.push(Markup::Text(text));
            }
            let whole = balloon.text_content();
            if needs_preserve(&whole) {
                balloon.set_attr(XML_SPACE, "preserve");
            }
            let mut span = Element::new("span")
                .attr("class", format!("{INITIALS_CLASS} {TOOLTIP_CLASS}"))
                .text(format!("[{label}]"))
                .child(balloon);
            if needs_preserve(&span.text_content()) {
                span.set_attr(XML_SPACE, "preserve");
            }
            return vec![span.into()];
        }

        let (forward, back) = link_pair("comment", n, &label);
        let content =
            self.deferred_content(back, comment, suppress_trailing_whitespace, margin_left, mode);
        self.state.deferred.comments.extend(content);
        vec![forward.into()]
    }
}
