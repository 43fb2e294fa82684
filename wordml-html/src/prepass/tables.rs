//! Table border fix-ups.
//!
//! HTML collapses adjacent cell borders with its own precedence rules, so
//! shared edges are settled on the source side first: both cells of an edge
//! end up with the same border (see [`resolve_conflict`]). Right-to-left
//! tables are mirrored by swapping their `left` and `right` borders.

use crate::css::border::{resolve_conflict, BorderAttrs};
use crate::names::W;
use crate::source::{NodeId, Node, Part};

fn rows<'a>(table: Node<'a>) -> impl Iterator<Item = Node<'a>> + 'a {
    table.w_children("tr")
}

fn cells<'a>(row: Node<'a>) -> impl Iterator<Item = Node<'a>> + 'a {
    row.w_children("tc")
}

/// Swap `left` and `right` borders of every visually right-to-left table
/// and of its cells.
pub fn reverse_rtl_table_borders(part: &mut Part) {
    let mut to_right = Vec::new();
    let mut to_left = Vec::new();
    for table in part.root().descendants().filter(|n| n.is_w("tbl")) {
        if table.w_path(&["tblPr", "bidiVisual"]).is_none() {
            continue;
        }
        let table_borders = table.w_path(&["tblPr", "tblBorders"]);
        let cell_borders = rows(table)
            .flat_map(cells)
            .filter_map(|tc| tc.w_path(&["tcPr", "tcBorders"]));
        for borders in table_borders.into_iter().chain(cell_borders) {
            to_right.extend(borders.w_children("left").map(|n| n.id()));
            to_left.extend(borders.w_children("right").map(|n| n.id()));
        }
    }
    for id in to_right {
        part.tree.rename(id, W, "right");
    }
    for id in to_left {
        part.tree.rename(id, W, "left");
    }
}

/// Word tables have at most 63 columns.
const MAX_GRID_COLUMNS: i64 = 63;

/// Cell ids laid out on the table grid, a spanned cell once per column.
fn cell_grid(table: Node<'_>) -> Vec<Vec<NodeId>> {
    rows(table)
        .map(|row| {
            cells(row)
                .flat_map(|tc| {
                    let span = tc
                        .w_path(&["tcPr", "gridSpan"])
                        .and_then(|g| g.w_int("val"))
                        .unwrap_or(1)
                        .clamp(1, MAX_GRID_COLUMNS) as usize;
                    std::iter::repeat(tc.id()).take(span)
                })
                .collect()
        })
        .collect()
}

fn border_side(part: &Part, cell: NodeId, side: &str) -> Option<NodeId> {
    let borders = part.node(cell).w_path(&["tcPr", "tcBorders"])?;
    let logical = match side {
        "left" => "start",
        "right" => "end",
        _ => side,
    };
    borders
        .w_child(side)
        .or_else(|| borders.w_child(logical))
        .map(|n| n.id())
}

fn write_border(part: &mut Part, border: NodeId, attrs: &BorderAttrs) {
    let values = [
        ("val", &attrs.val),
        ("sz", &attrs.sz),
        ("color", &attrs.color),
        ("themeColor", &attrs.theme_color),
        ("themeTint", &attrs.theme_tint),
    ];
    for (local, value) in values {
        match value {
            Some(value) => part.tree.set_attr(border, W, local, value),
            None => part.tree.remove_attr(border, W, local),
        }
    }
}

/// Settle one shared edge between two cells.
fn settle_edge(part: &mut Part, cell: NodeId, side: &str, neighbour: NodeId, opposite: &str) {
    if cell == neighbour {
        return;
    }
    let (Some(own), Some(other)) = (
        border_side(part, cell, side),
        border_side(part, neighbour, opposite),
    ) else {
        return;
    };
    let mut first = BorderAttrs::from_node(part.node(own));
    let mut second = BorderAttrs::from_node(part.node(other));
    if resolve_conflict(&mut first, &mut second) {
        write_border(part, own, &first);
        write_border(part, other, &second);
    }
}

/// Make the borders on either side of every shared cell edge identical.
pub fn adjust_table_borders(part: &mut Part) {
    let grids: Vec<Vec<Vec<NodeId>>> = part
        .root()
        .descendants()
        .filter(|n| n.is_w("tbl"))
        .map(cell_grid)
        .collect();

    for grid in grids {
        for (y, row) in grid.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if y > 0 && x < grid[y - 1].len() {
                    settle_edge(part, cell, "top", grid[y - 1][x], "bottom");
                }
                if x > 0 {
                    settle_edge(part, cell, "left", row[x - 1], "right");
                }
                if x + 1 < row.len() {
                    settle_edge(part, cell, "right", row[x + 1], "left");
                }
                if y + 1 < grid.len() && x < grid[y + 1].len() {
                    settle_edge(part, cell, "bottom", grid[y + 1][x], "top");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &str, bidi: bool) -> Part {
        let bidi = if bidi { "<w:bidiVisual/>" } else { "" };
        let xml = format!(
            r#"<w:body xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:tbl><w:tblPr>{bidi}<w:tblBorders><w:left w:val="single"/></w:tblBorders></w:tblPr>{rows}</w:tbl></w:body>"#
        );
        Part::parse(&xml, "document").unwrap()
    }

    fn cell(borders: &str) -> String {
        format!(r#"<w:tc><w:tcPr><w:tcBorders>{borders}</w:tcBorders></w:tcPr><w:p/></w:tc>"#)
    }

    fn side_size(part: &Part, cell_index: usize, side: &str) -> Option<String> {
        let tc = part
            .root()
            .descendants()
            .filter(|n| n.is_w("tc"))
            .nth(cell_index)
            .unwrap();
        tc.w_path(&["tcPr", "tcBorders", side])
            .and_then(|b| b.w_attr("sz"))
            .map(str::to_string)
    }

    #[test]
    fn wider_border_wins_on_shared_edge() {
        let row = format!(
            "<w:tr>{}{}</w:tr>",
            cell(r#"<w:right w:val="single" w:sz="4" w:color="000000"/>"#),
            cell(r#"<w:left w:val="single" w:sz="8" w:color="000000"/>"#)
        );
        let mut part = table(&row, false);
        adjust_table_borders(&mut part);
        assert_eq!(side_size(&part, 0, "right").as_deref(), Some("8"));
        assert_eq!(side_size(&part, 1, "left").as_deref(), Some("8"));
    }

    #[test]
    fn vertical_neighbours_are_settled() {
        let rows = format!(
            "<w:tr>{}</w:tr><w:tr>{}</w:tr>",
            cell(r#"<w:bottom w:val="double" w:sz="4"/>"#),
            cell(r#"<w:top w:val="single" w:sz="12"/>"#)
        );
        let mut part = table(&rows, false);
        adjust_table_borders(&mut part);
        assert_eq!(side_size(&part, 1, "top").as_deref(), Some("4"));
        let top = part
            .root()
            .descendants()
            .find(|n| n.is_w("top"))
            .unwrap();
        assert_eq!(top.w_attr("val"), Some("double"));
    }

    #[test]
    fn missing_side_is_left_alone() {
        let row = format!(
            "<w:tr>{}{}</w:tr>",
            cell(r#"<w:right w:val="single" w:sz="4"/>"#),
            cell("")
        );
        let mut part = table(&row, false);
        adjust_table_borders(&mut part);
        assert_eq!(side_size(&part, 0, "right").as_deref(), Some("4"));
    }

    #[test]
    fn grid_spans_are_capped() {
        let rows = format!(
            r#"<w:tr><w:tc><w:tcPr><w:gridSpan w:val="9000000000"/><w:tcBorders><w:bottom w:val="single" w:sz="4"/></w:tcBorders></w:tcPr><w:p/></w:tc></w:tr><w:tr>{}</w:tr>"#,
            cell(r#"<w:top w:val="single" w:sz="12"/>"#)
        );
        let mut part = table(&rows, false);
        let tbl = part.root().descendants().find(|n| n.is_w("tbl")).unwrap();
        let grid = cell_grid(tbl);
        assert_eq!(grid[0].len(), MAX_GRID_COLUMNS as usize);
        assert_eq!(grid[1].len(), 1);

        adjust_table_borders(&mut part);
        let bottom = part.root().descendants().find(|n| n.is_w("bottom")).unwrap();
        assert_eq!(bottom.w_attr("sz"), Some("12"));
    }

    #[test]
    fn rtl_tables_swap_sides() {
        let row = format!(
            "<w:tr>{}</w:tr>",
            cell(r#"<w:left w:val="single" w:sz="4"/><w:right w:val="double" w:sz="8"/>"#)
        );
        let mut part = table(&row, true);
        reverse_rtl_table_borders(&mut part);
        assert_eq!(side_size(&part, 0, "left").as_deref(), Some("8"));
        assert_eq!(side_size(&part, 0, "right").as_deref(), Some("4"));
        let table_borders = part
            .root()
            .descendants()
            .find(|n| n.is_w("tblBorders"))
            .unwrap();
        assert!(table_borders.w_child("right").is_some());
        assert!(table_borders.w_child("left").is_none());
    }
}
