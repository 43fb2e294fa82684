//! Paragraphs, style separators, leading tabs and complex fields.

use super::state::TransformMode;
use super::{is_bidi, Transformer};
use crate::css::paragraph::{paragraph_style, ParagraphContext};
use crate::css::StyleMap;
use crate::fields::FieldInstruction;
use crate::grouping::group_adjacent;
use crate::markup::{has_edge_whitespace, Element, Markup, RLM, XML_SPACE};
use crate::source::Node;

/// A paragraph whose mark is hidden by `specVanish` runs on into the next
/// paragraph.
fn has_style_separator(paragraph: Node<'_>) -> bool {
    paragraph
        .w_path(&["pPr", "rPr"])
        .is_some_and(|rpr| rpr.w_flag("specVanish"))
}

fn previous_element(node: Node<'_>) -> Option<Node<'_>> {
    node.previous_siblings().find(|n| n.is_element())
}

fn next_element(node: Node<'_>) -> Option<Node<'_>> {
    node.next_siblings().find(|n| n.is_element())
}

/// Whether a HYPERLINK field instruction occurs among `preceding`.
fn hyperlink_field_before(preceding: &[Node<'_>]) -> bool {
    preceding
        .iter()
        .flat_map(|n| n.descendants())
        .filter(|d| d.is_w("instrText"))
        .any(|d| {
            d.value()
                .trim_start()
                .to_uppercase()
                .starts_with("HYPERLINK")
        })
}

/// Direct span children of a paragraph: drop the empty ones, keep edge
/// whitespace of the rest.
fn tidy_spans(element: &mut Element) {
    element
        .children
        .retain(|c| !matches!(c, Markup::Element(e) if e.name == "span" && e.is_empty()));
    for span in element
        .children
        .iter_mut()
        .filter_map(Markup::as_element_mut)
        .filter(|e| e.name == "span")
    {
        if span.get_attr(XML_SPACE).is_none() && has_edge_whitespace(&span.text_content()) {
            span.set_attr(XML_SPACE, "preserve");
        }
    }
}

impl<'a> Transformer<'a> {
    pub(super) fn paragraph(
        &mut self,
        node: Node<'a>,
        suppress_trailing_whitespace: bool,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Vec<Markup> {
        // Merged into the preceding paragraph.
        if previous_element(node).is_some_and(|p| p.is_w("p") && has_style_separator(p)) {
            return Vec::new();
        }

        let name = self.paragraph_element_name(node);
        let mut element =
            self.convert_paragraph(node, &name, suppress_trailing_whitespace, margin_left, mode);
        tidy_spans(&mut element);

        let mut current = node;
        while has_style_separator(current) {
            let Some(next) = next_element(current).filter(|n| n.is_w("p")) else {
                break;
            };
            let mut span =
                self.convert_paragraph(next, "span", suppress_trailing_whitespace, margin_left, mode);
            if has_edge_whitespace(&span.text_content()) {
                span.set_attr(XML_SPACE, "preserve");
            }
            element.children.push(span.into());
            current = next;
        }
        vec![element.into()]
    }

    /// `h1`..`h6` for paragraphs whose style declares an outline level,
    /// `p` otherwise.
    fn paragraph_element_name(&self, node: Node<'_>) -> String {
        node.w_path(&["pPr", "pStyle"])
            .and_then(|s| s.w_attr("val"))
            .and_then(|style| self.doc.outline_level(style))
            .filter(|level| (0..=5).contains(level))
            .map_or_else(|| "p".to_string(), |level| format!("h{}", level + 1))
    }

    fn convert_paragraph(
        &mut self,
        node: Node<'a>,
        name: &str,
        suppress_trailing_whitespace: bool,
        margin_left: f64,
        mode: &TransformMode,
    ) -> Element {
        let bidi = is_bidi(node);
        let context = ParagraphContext {
            element_name: name,
            suppress_trailing_whitespace,
            current_margin_left: margin_left,
            bidi,
        };
        let style = paragraph_style(node, &context, &mut self.state.shading);

        let mut element = Element::new(name).attr("dir", if bidi { "rtl" } else { "ltr" });
        if bidi {
            element.children.push(Markup::CharRef(RLM));
        }

        let content: Vec<Node<'a>> = node.elements().filter(|e| !e.is_w("pPr")).collect();
        let first_tab = content
            .iter()
            .position(|e| e.is_w("r") && e.w_child("tab").is_some());
        let rest = match first_tab {
            Some(i) if !hyperlink_field_before(&content[..i]) => {
                let leading = self.leading_tab(&content[..i], content[i], mode);
                element.children.extend(leading);
                content[i + 1..].to_vec()
            }
            _ => content,
        };

        let converted = self.field_groups(rest, mode);
        element.children.extend(converted);
        element.with_style(style)
    }

    /// Content before the first tab is laid out as one inline block as wide
    /// as the tab stop, and the tab itself is dropped.
    fn leading_tab(&mut self, preceding: &[Node<'a>], tab_run: Node<'a>, mode: &TransformMode) -> Vec<Markup> {
        let annotations = tab_run.annotations();
        let tab_width = tab_run
            .w_child("tab")
            .and_then(|t| annotations.tab(t.id()))
            .map_or(0.0, |a| a.inches());
        let breaks_width: f64 = preceding
            .iter()
            .flat_map(|n| n.descendants())
            .filter(|d| d.is_w("br") || d.is_w("cr"))
            .filter_map(|d| annotations.tab(d.id()))
            .map(|a| a.inches())
            .sum();
        let width = format!("{:.3}in", tab_width + breaks_width);

        let mut produced = self.field_groups(preceding.to_vec(), mode);
        match produced.len() {
            0 => produced,
            1 => {
                if let Markup::Element(e) = &mut produced[0] {
                    let style = e.style_mut();
                    style.add_if_missing("display", "inline-block");
                    style.add_if_missing("text-indent", "0");
                    style.add_if_missing("width", width);
                }
                produced
            }
            _ => {
                let mut style = StyleMap::new();
                style.add_if_missing("display", "inline-block");
                style.add_if_missing("text-indent", "0");
                style.add_if_missing("width", width);
                vec![Element::new("span").children(produced).with_style(style).into()]
            }
        }
    }

    /// Group adjacent content by its outermost complex field; `HYPERLINK`
    /// fields become anchors over their result runs.
    fn field_groups(&mut self, nodes: Vec<Node<'a>>, mode: &TransformMode) -> Vec<Markup> {
        let groups = group_adjacent(nodes, |n| {
            n.annotations().fields(n.id()).iter().map(|f| f.id).min()
        });

        let mut out = Vec::new();
        for (field, members) in groups {
            let instruction = field.and_then(|id| {
                members[0]
                    .annotations()
                    .instruction(id)
                    .map(FieldInstruction::parse)
            });
            let Some(instruction) = instruction.filter(|i| i.field_type == "HYPERLINK") else {
                for node in members {
                    out.extend(self.convert_node(node, false, 0.0, mode));
                }
                continue;
            };

            let mut a = Element::new("a");
            if let Some(href) = instruction.hyperlink_href() {
                a.set_attr("href", href);
            }
            let runs: Vec<Node<'a>> = members
                .iter()
                .flat_map(|m| {
                    let runs: Vec<Node<'a>> = if m.is_w("r") {
                        vec![*m]
                    } else {
                        m.descendants().filter(|d| d.is_w("r")).collect()
                    };
                    runs
                })
                .filter(|r| r.w_child("fldChar").is_none() && r.w_child("instrText").is_none())
                .collect();
            for run in runs {
                let converted = self.convert_run(run, mode);
                a.children.extend(converted);
            }
            out.push(a.into());
        }
        out
    }
}
