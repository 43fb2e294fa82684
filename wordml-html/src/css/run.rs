//! Run property rules.

use super::color::color_property;
use super::font::{add_font_family, add_font_size, run_size};
use super::shading::ShadingResolver;
use super::StyleMap;
use crate::names::PT;
use crate::source::Node;

/// Derive the run's declarations in a fixed order: border, color,
/// highlight, shading, font, size, caps, small caps, letter spacing,
/// position, visibility, underline, italics, bold, strikethrough.
pub fn run_style(run: Node<'_>, shading: &mut ShadingResolver) -> StyleMap {
    let mut style = StyleMap::new();
    if let Some(name) = run.attr(PT, "StyleName") {
        style.set_style_name(name);
    }
    let rpr = run.w_child("rPr");

    if let Some(bdr) = rpr.and_then(|r| r.w_child("bdr")) {
        if bdr.w_attr("val") != Some("none") {
            style.add_if_missing("border", "solid windowtext 1.0pt");
            style.add_if_missing("padding", "0");
        }
    }

    if let Some(color) = rpr.and_then(|r| r.w_child("color")).and_then(|c| c.w_attr("val")) {
        if let Some(css) = color_property("color", color) {
            style.add_if_missing("color", css);
        }
    }

    if let Some(highlight) = rpr
        .and_then(|r| r.w_child("highlight"))
        .and_then(|h| h.w_attr("val"))
    {
        if let Some(css) = color_property("background", highlight) {
            style.add_if_missing("background", css);
        }
    }

    shading.add_background(&mut style, rpr.and_then(|r| r.w_child("shd")));

    let font = match run.w_child("sym") {
        Some(sym) => sym.w_attr("font"),
        None => run.attr(PT, "FontName"),
    };
    add_font_family(&mut style, font);

    add_font_size(&mut style, run_size(run.attr(PT, "LanguageType"), rpr));

    let flag = |name: &str| rpr.is_some_and(|r| r.w_flag(name));

    if flag("caps") {
        style.add_if_missing("text-transform", "uppercase");
    }
    if flag("smallCaps") {
        style.add_if_missing("font-variant", "small-caps");
    }

    if let Some(spacing) = rpr.and_then(|r| r.w_child("spacing")).and_then(|s| s.w_int("val")) {
        let value = if spacing > 0 {
            format!("{}pt", spacing as f64 / 20.0)
        } else {
            "0".to_string()
        };
        style.add_if_missing("letter-spacing", value);
    }

    if let Some(position) = rpr.and_then(|r| r.w_child("position")).and_then(|p| p.w_int("val")) {
        style.add_if_missing("position", "relative");
        let offset = if position == 0 {
            0.0
        } else {
            -(position as f64) / 2.0
        };
        style.add_if_missing("top", format!("{offset}pt"));
    }

    if flag("vanish") && !flag("specVanish") {
        style.add_if_missing("display", "none");
    }

    if let Some(u) = rpr.and_then(|r| r.w_child("u")) {
        if u.w_attr("val") != Some("none") {
            style.add_if_missing("text-decoration", "underline");
        }
    }

    style.add_if_missing("font-style", if flag("i") { "italic" } else { "normal" });
    style.add_if_missing("font-weight", if flag("b") { "bold" } else { "normal" });

    if flag("strike") || flag("dstrike") {
        style.add_if_missing("text-decoration", "line-through");
    }

    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Part;

    fn run(inner: &str) -> Part {
        let xml = format!(
            r#"<w:r xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:pt="http://powertools.codeplex.com/2011" pt:FontName="Arial">{inner}</w:r>"#
        );
        Part::parse(&xml, "test").unwrap()
    }

    #[test]
    fn bold_italic_and_defaults() {
        let part = run(r#"<w:rPr><w:b/><w:i w:val="0"/><w:sz w:val="24"/></w:rPr><w:t>x</w:t>"#);
        let style = run_style(part.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("font-weight"), Some("bold"));
        assert_eq!(style.get("font-style"), Some("normal"));
        assert_eq!(style.get("font-size"), Some("12pt"));
        assert_eq!(style.get("font-family"), Some("'Arial', 'sans-serif'"));
    }

    #[test]
    fn underline_wins_over_strike() {
        let part = run(r#"<w:rPr><w:u w:val="single"/><w:strike/></w:rPr>"#);
        let style = run_style(part.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("text-decoration"), Some("underline"));
    }

    #[test]
    fn color_then_highlight_then_shading() {
        let part = run(
            r#"<w:rPr><w:color w:val="FF0000"/><w:highlight w:val="yellow"/><w:shd w:val="clear" w:fill="00FF00"/></w:rPr>"#,
        );
        let style = run_style(part.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("color"), Some("#FF0000"));
        assert_eq!(style.get("background"), Some("yellow"));
    }

    #[test]
    fn position_and_spacing() {
        let part = run(r#"<w:rPr><w:position w:val="6"/><w:spacing w:val="-10"/></w:rPr>"#);
        let style = run_style(part.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("position"), Some("relative"));
        assert_eq!(style.get("top"), Some("-3pt"));
        assert_eq!(style.get("letter-spacing"), Some("0"));
    }

    #[test]
    fn hidden_unless_special_vanish() {
        let hidden = run(r#"<w:rPr><w:vanish/></w:rPr>"#);
        let style = run_style(hidden.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("display"), Some("none"));

        let separator = run(r#"<w:rPr><w:vanish/><w:specVanish/></w:rPr>"#);
        let style = run_style(separator.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("display"), None);
    }

    #[test]
    fn symbol_font_comes_from_sym() {
        let part = run(r#"<w:rPr/><w:sym w:font="Wingdings" w:char="F0E0"/>"#);
        let style = run_style(part.root(), &mut ShadingResolver::new());
        assert_eq!(style.get("font-family"), Some("Wingdings"));
    }
}
