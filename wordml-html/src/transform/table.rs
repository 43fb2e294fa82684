//! Tables, rows and cells.

use super::state::TransformMode;
use super::Transformer;
use crate::css::border::{add_border_sides, BorderContext};
use crate::css::{pt, StyleMap};
use crate::markup::Element;
use crate::source::Node;

/// Rows covered by a cell that starts a vertical merge: the cell itself plus
/// every same-index cell below that continues the merge.
fn row_span(cell: Node<'_>) -> usize {
    let Some(row) = cell.parent() else {
        return 1;
    };
    let Some(table) = row.parent() else {
        return 1;
    };
    let column = cell.previous_siblings().filter(|s| s.is_w("tc")).count();
    let row_index = row.previous_siblings().filter(|s| s.is_w("tr")).count();

    let mut span = 1;
    for below in table.w_children("tr").skip(row_index + 1) {
        let Some(merge) = below
            .w_children("tc")
            .nth(column)
            .and_then(|c| c.w_path(&["tcPr", "vMerge"]))
        else {
            break;
        };
        if merge.w_attr("val") == Some("restart") {
            break;
        }
        span += 1;
    }
    span
}

impl<'a> Transformer<'a> {
    /// The table inside a `div` carrying its alignment and direction.
    pub(super) fn table(&mut self, node: Node<'a>, margin_left: f64, mode: &TransformMode) -> Element {
        let tbl_pr = node.w_child("tblPr");
        let bidi = tbl_pr.and_then(|p| p.w_child("bidiVisual")).is_some();

        let mut style = StyleMap::new();
        style.add_if_missing("border-collapse", "collapse");
        style.add_if_missing("border", "none");
        if let Some(width) = tbl_pr.and_then(|p| p.w_child("tblW")) {
            if width.w_attr("type") == Some("pct") {
                let w = width.w_int("w").unwrap_or(0);
                style.add_if_missing("width", format!("{}%", w / 50));
            }
        }
        if let Some(indent) = tbl_pr.and_then(|p| p.w_child("tblInd")) {
            if indent.w_attr("type") == Some("dxa") {
                if let Some(w) = indent.w_int("w") {
                    let value = if w > 0 { pt(w as f64 / 20.0) } else { "0".to_string() };
                    style.add_if_missing("margin-left", value);
                }
            }
        }
        style.add_if_missing("margin-bottom", ".001pt");

        let mut table = Element::new("table").attr("dir", if bidi { "rtl" } else { "ltr" });
        table.children = self.convert_all(node.elements(), margin_left, mode);

        let jc = tbl_pr
            .and_then(|p| p.w_child("jc"))
            .and_then(|j| j.w_attr("val"))
            .unwrap_or("left");
        let mut div = Element::new("div");
        if bidi {
            div.set_attr("dir", "rtl");
            let align = match jc {
                "left" => Some("right"),
                "right" => Some("left"),
                "center" => Some("center"),
                _ => None,
            };
            if let Some(align) = align {
                div.set_attr("align", align);
            }
        } else {
            div.set_attr("align", jc);
        }
        div.child(table.with_style(style))
    }

    pub(super) fn table_row(&mut self, node: Node<'a>, margin_left: f64, mode: &TransformMode) -> Element {
        let mut row = Element::new("tr");
        row.children = self.convert_all(node.elements(), margin_left, mode);
        if let Some(height) = node
            .w_path(&["trPr", "trHeight"])
            .and_then(|h| h.w_int("val"))
        {
            let mut style = StyleMap::new();
            style.add_if_missing("height", format!("{:.2}in", height as f64 / 1440.0));
            row = row.with_style(style);
        }
        row
    }

    /// `None` for cells continuing a vertical merge; the starting cell spans
    /// them.
    pub(super) fn table_cell(&mut self, node: Node<'a>, mode: &TransformMode) -> Option<Element> {
        let mut style = StyleMap::new();
        let mut cell = Element::new("td");

        if let Some(tc_pr) = node.w_child("tcPr") {
            if let Some(merge) = tc_pr.w_child("vMerge") {
                if merge.w_attr("val") != Some("restart") {
                    return None;
                }
                cell.set_attr("rowspan", row_span(node).to_string());
            }

            if let Some(v_align) = tc_pr.w_child("vAlign") {
                let value = match v_align.w_attr("val") {
                    Some("top") => "top",
                    Some("bottom") => "bottom",
                    _ => "middle",
                };
                style.add_if_missing("vertical-align", value);
            }
            style.add_if_missing("vertical-align", "top");

            if let Some(width) = tc_pr.w_child("tcW") {
                let w = width.w_int("w").unwrap_or(0) as f64;
                match width.w_attr("type") {
                    Some("dxa") => style.add_if_missing("width", format!("{}pt", w / 20.0)),
                    Some("pct") => style.add_if_missing("width", format!("{:.1}%", w / 50.0)),
                    _ => {}
                }
            }

            add_border_sides(&mut style, tc_pr.w_child("tcBorders"), BorderContext::Cell);
            self.state.shading.add_background(&mut style, tc_pr.w_child("shd"));

            if let Some(span) = tc_pr.w_child("gridSpan").and_then(|g| g.w_int("val")) {
                cell.set_attr("colspan", span.to_string());
            }
        }
        style.add_if_missing("padding-top", "0");
        style.add_if_missing("padding-bottom", "0");

        cell.children = self.border_divs(node.elements().collect(), mode);
        Some(cell.with_style(style))
    }
}
