//! Paragraph property rules.
//!
//! Derivation order: spacing, indentation, justification, shading, font,
//! font size, line height, text alignment, then the margin defaults. Each
//! rule only fills properties that are still missing.

use super::font::{add_font_family, add_font_size, run_size};
use super::shading::ShadingResolver;
use super::{positive_inches, pt, StyleMap};
use crate::names::PT;
use crate::source::Node;

/// Where the paragraph is being rendered.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphContext<'a> {
    /// Output element name: `p`, `h1`..`h6`, or `span` for merged paragraphs.
    pub element_name: &'a str,
    /// Drop the trailing spacing (paragraph is not last in its group).
    pub suppress_trailing_whitespace: bool,
    /// Left margin already applied by an enclosing border container, inches.
    pub current_margin_left: f64,
    pub bidi: bool,
}

pub fn paragraph_style(
    paragraph: Node<'_>,
    context: &ParagraphContext<'_>,
    shading: &mut ShadingResolver,
) -> StyleMap {
    let mut style = StyleMap::new();
    if let Some(name) = paragraph.attr(PT, "StyleName") {
        style.set_style_name(name);
    }
    let Some(ppr) = paragraph.w_child("pPr") else {
        return style;
    };

    add_spacing(&mut style, ppr.w_child("spacing"), context);
    add_indentation(&mut style, ppr.w_child("ind"), context);
    add_justification(&mut style, ppr.w_child("jc"), context.bidi);
    shading.add_background(&mut style, ppr.w_child("shd"));
    add_font_family(&mut style, paragraph.attr(PT, "FontName"));
    add_font_size(&mut style, largest_run_size(paragraph));
    add_line_height(&mut style, paragraph);
    add_text_alignment(&mut style, ppr.w_child("textAlignment"));

    style.add_if_missing("margin-top", "0");
    style.add_if_missing("margin-left", "0");
    style.add_if_missing("margin-right", "0");
    style.add_if_missing("margin-bottom", ".001pt");
    style
}

fn skip_text_boxes(node: &Node<'_>) -> bool {
    node.is_w("txbxContent")
}

fn paragraph_runs<'a>(paragraph: Node<'a>) -> impl Iterator<Item = Node<'a>> {
    paragraph
        .descendants_trimmed(skip_text_boxes)
        .filter(|n| n.is_w("r"))
}

fn largest_run_size(paragraph: Node<'_>) -> Option<i64> {
    paragraph_runs(paragraph)
        .filter_map(|r| run_size(r.attr(PT, "LanguageType"), r.w_child("rPr")))
        .max()
}

fn add_spacing(style: &mut StyleMap, spacing: Option<Node<'_>>, context: &ParagraphContext<'_>) {
    let Some(spacing) = spacing else {
        return;
    };
    if let Some(before) = spacing.w_int("before") {
        if context.element_name != "span" {
            style.add_if_missing("margin-top", pt(before.max(0) as f64 / 20.0));
        }
    }

    if let Some(line) = spacing.w_int("line") {
        let line = line as f64;
        match spacing.w_attr("lineRule").unwrap_or("auto") {
            "auto" => {
                if line != 240.0 {
                    style.add_if_missing("line-height", format!("{:.1}%", line / 240.0 * 100.0));
                }
            }
            "exact" => style.add_if_missing("line-height", format!("{:.1}pt", line / 20.0)),
            "atLeast" => {
                let points = line / 20.0;
                if points >= 14.0 {
                    style.add_if_missing("line-height", format!("{points:.1}pt"));
                }
            }
            _ => {}
        }
    }

    let after = if context.suppress_trailing_whitespace {
        Some(0)
    } else {
        spacing.w_int("after")
    };
    if let Some(after) = after {
        style.add_if_missing("margin-bottom", pt(after.max(0) as f64 / 20.0));
    }
}

fn add_indentation(style: &mut StyleMap, ind: Option<Node<'_>>, context: &ParagraphContext<'_>) {
    let Some(ind) = ind else {
        return;
    };
    let is_span = context.element_name == "span";
    let (leading, trailing) = if context.bidi {
        ("margin-right", "margin-left")
    } else {
        ("margin-left", "margin-right")
    };

    if let Some(left) = ind.w_int("left").or_else(|| ind.w_int("start")) {
        if !is_span {
            let inches = left as f64 / 1440.0 - context.current_margin_left;
            style.add_if_missing(leading, positive_inches(inches));
        }
    }
    if let Some(right) = ind.w_int("right").or_else(|| ind.w_int("end")) {
        style.add_if_missing(trailing, positive_inches(right as f64 / 1440.0));
    }
    if is_span {
        return;
    }
    if let Some(first_line) = ind.w_int("firstLine") {
        style.add_if_missing("text-indent", format!("{:.2}in", first_line as f64 / 1440.0));
    }
    if let Some(hanging) = ind.w_int("hanging") {
        style.add_if_missing("text-indent", format!("{:.2}in", hanging as f64 / -1440.0));
    }
}

fn add_justification(style: &mut StyleMap, jc: Option<Node<'_>>, bidi: bool) {
    let Some(value) = jc.and_then(|jc| jc.w_attr("val")) else {
        return;
    };
    let align = match value {
        "left" | "start" => {
            if bidi {
                "right"
            } else {
                "left"
            }
        }
        "right" | "end" => {
            if bidi {
                "left"
            } else {
                "right"
            }
        }
        "center" => "center",
        "both" | "distribute" => "justify",
        _ => return,
    };
    style.add_if_missing("text-align", align);
}

fn add_line_height(style: &mut StyleMap, paragraph: Node<'_>) {
    let has_bidi_run =
        paragraph_runs(paragraph).any(|r| r.attr(PT, "LanguageType") == Some("bidi"));
    if !has_bidi_run {
        style.add_if_missing("line-height", "108%");
    }
}

fn add_text_alignment(style: &mut StyleMap, alignment: Option<Node<'_>>) {
    let Some(value) = alignment.and_then(|a| a.w_attr("val")) else {
        return;
    };
    let css = match value {
        "top" => "top",
        "center" => "middle",
        "baseline" => "baseline",
        "bottom" => "bottom",
        _ => return,
    };
    style.add_if_missing("vertical-align", css);
}
