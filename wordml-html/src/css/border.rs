//! Border style generation and adjacent-border conflict rules.

use super::color::convert_color;
use super::StyleMap;
use crate::source::Node;

/// Whether a border belongs to a paragraph group or a table cell. Cells
/// keep a minimum horizontal padding so text does not touch the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderContext {
    Paragraph,
    Cell,
}

const CELL_MIN_PADDING: f64 = 5.4;

/// CSS style name and nominal width in points for each border type.
fn border_style_info(val: &str) -> Option<(&'static str, f64)> {
    let info = match val {
        "single" => ("solid", 1.0),
        "dotted" => ("dotted", 1.0),
        "dashSmallGap" | "dashed" | "dotDash" | "dotDotDash" => ("dashed", 1.0),
        "double" | "triple" => ("double", 2.5),
        "thinThickSmallGap" | "thickThinSmallGap" => ("double", 4.5),
        "thinThickThinSmallGap" | "thickThinMediumGap" | "thinThickMediumGap" => ("double", 6.0),
        "thinThickThinMediumGap" | "thinThickThinLargeGap" => ("double", 9.0),
        "thinThickLargeGap" | "thickThinLargeGap" | "doubleWave" => ("double", 5.25),
        "wave" | "dashDotStroked" => ("solid", 3.0),
        "threeDEmboss" => ("ridge", 6.0),
        "threeDEngrave" => ("groove", 6.0),
        "outset" => ("outset", 4.5),
        "inset" => ("inset", 4.5),
        _ => return None,
    };
    Some(info)
}

fn side_element<'a>(group: Node<'a>, side: &str) -> Option<Node<'a>> {
    let logical = match side {
        "left" => "start",
        "right" => "end",
        _ => side,
    };
    group.w_child(side).or_else(|| group.w_child(logical))
}

fn padding_value(space: f64, side: &str, context: BorderContext) -> String {
    let mut space = space;
    if context == BorderContext::Cell && (side == "left" || side == "right") && space < CELL_MIN_PADDING
    {
        space = CELL_MIN_PADDING;
    }
    if space == 0.0 {
        "0".to_string()
    } else {
        format!("{space:.1}pt")
    }
}

/// Emit `border-{side}` and `padding-{side}` for one side of a border group.
pub fn add_border_side(
    style: &mut StyleMap,
    group: Option<Node<'_>>,
    side: &str,
    context: BorderContext,
) {
    let Some(border) = group.and_then(|g| side_element(g, side)) else {
        style.add_if_missing(&format!("border-{side}"), "none");
        if context == BorderContext::Cell && (side == "left" || side == "right") {
            style.add_if_missing(&format!("padding-{side}"), format!("{CELL_MIN_PADDING}pt"));
        }
        return;
    };

    let space = border
        .w_attr("space")
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let val = border.w_attr("val").unwrap_or("nil");
    if val == "nil" || val == "none" {
        style.add_if_missing(&format!("border-{side}-style"), "none");
        style.add_if_missing(&format!("padding-{side}"), padding_value(space, side, context));
        return;
    }

    let sz = border.w_int("sz").unwrap_or(4) as f64;
    let mut color = match border.w_attr("color") {
        None | Some("auto") => "windowtext".to_string(),
        Some(c) => convert_color(c),
    };
    let mut width = (sz.clamp(2.0, 96.0) / 8.0).max(1.0);
    let mut css_style = "solid";
    if let Some((name, nominal)) = border_style_info(val) {
        css_style = name;
        if val == "double" {
            width = if sz <= 8.0 {
                2.5
            } else if sz <= 18.0 {
                6.75
            } else {
                sz / 3.0
            };
        } else if val == "triple" {
            width = if sz <= 8.0 { 8.0 } else { 11.25 };
        } else if val.to_lowercase().contains("dash") {
            width = if sz <= 4.0 {
                1.0
            } else if sz <= 12.0 {
                1.5
            } else {
                2.0
            };
        } else if val != "single" {
            width = nominal;
        }
    }
    if val == "outset" || val == "inset" {
        color.clear();
    }

    let value = if color.is_empty() {
        format!("{css_style} {width:.1}pt")
    } else {
        format!("{css_style} {color} {width:.1}pt")
    };
    style.add_if_missing(&format!("border-{side}"), value);
    style.add_if_missing(&format!("padding-{side}"), padding_value(space, side, context));
}

/// Emit all four sides in top, right, bottom, left order.
pub fn add_border_sides(style: &mut StyleMap, group: Option<Node<'_>>, context: BorderContext) {
    for side in ["top", "right", "bottom", "left"] {
        add_border_side(style, group, side, context);
    }
}

/// The attributes of a cell border that take part in conflict resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderAttrs {
    pub val: Option<String>,
    pub sz: Option<String>,
    pub color: Option<String>,
    pub theme_color: Option<String>,
    pub theme_tint: Option<String>,
}

impl BorderAttrs {
    pub fn from_node(node: Node<'_>) -> Self {
        let get = |name: &str| node.w_attr(name).map(str::to_string);
        Self {
            val: get("val"),
            sz: get("sz"),
            color: get("color"),
            theme_color: get("themeColor"),
            theme_tint: get("themeTint"),
        }
    }

    fn override_with(&mut self, winner: &BorderAttrs) {
        *self = winner.clone();
    }
}

fn border_weight(val: &str) -> u8 {
    match val {
        "single" => 1,
        "thick" => 2,
        "double" => 3,
        "dotted" => 4,
        "dashed" | "dotDash" | "dotDotDash" | "dashSmallGap" | "dashDotStroked" => 5,
        "triple"
        | "thinThickSmallGap"
        | "thickThinSmallGap"
        | "thinThickThinSmallGap"
        | "thinThickMediumGap"
        | "thickThinMediumGap"
        | "thinThickThinMediumGap"
        | "thinThickLargeGap"
        | "thickThinLargeGap"
        | "thinThickThinLargeGap" => 6,
        "wave" | "doubleWave" | "threeDEmboss" | "threeDEngrave" | "outset" | "inset" => 7,
        _ => 1,
    }
}

/// Only these four types take part in the priority step.
fn border_type_priority(val: &str) -> Option<u8> {
    match val {
        "single" => Some(1),
        "thick" => Some(2),
        "double" => Some(3),
        "dotted" => Some(4),
        _ => None,
    }
}

fn color_number(color: &str) -> Option<u32> {
    let hex = if color == "auto" { "000000" } else { color };
    u32::from_str_radix(hex, 16).ok()
}

/// Settle two adjacent cell borders on one shared appearance.
///
/// Heavier weight class wins, then wider size, then border-type priority,
/// then the darker color. Returns true when either border changed.
pub fn resolve_conflict(first: &mut BorderAttrs, second: &mut BorderAttrs) -> bool {
    let (Some(val1), Some(val2)) = (first.val.clone(), second.val.clone()) else {
        return false;
    };
    if val1 == "nil" || val2 == "nil" {
        return false;
    }
    if first.sz.as_deref() == Some("nil") || second.sz.as_deref() == Some("nil") {
        return false;
    }
    if first == second {
        return false;
    }

    let (w1, w2) = (border_weight(&val1), border_weight(&val2));
    if w1 != w2 {
        if w1 > w2 {
            second.override_with(first);
        } else {
            first.override_with(second);
        }
        return true;
    }

    let size = |b: &BorderAttrs| b.sz.as_deref().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);
    let (s1, s2) = (size(first), size(second));
    if s1 != s2 {
        if s1 > s2 {
            second.override_with(first);
        } else {
            first.override_with(second);
        }
        return true;
    }

    if let (Some(p1), Some(p2)) = (border_type_priority(&val1), border_type_priority(&val2)) {
        if p1 != p2 {
            if p1 > p2 {
                second.override_with(first);
            } else {
                first.override_with(second);
            }
            return true;
        }
    }

    if let (Some(c1), Some(c2)) = (first.color.as_deref(), second.color.as_deref()) {
        if c1 != c2 {
            match (color_number(c1), color_number(c2)) {
                (Some(n1), Some(n2)) if n1 < n2 => {
                    second.override_with(first);
                    return true;
                }
                (Some(n1), Some(n2)) if n2 < n1 => {
                    first.override_with(second);
                    return true;
                }
                _ => {}
            }
        }
    }
    false
}
