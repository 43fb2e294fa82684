//! Runs and tabs.

use super::state::{TransformMode, TOOLTIP_TEXT_CLASS};
use super::{needs_preserve, paragraph_is_bidi, Transformer};
use crate::css::run::run_style;
use crate::css::StyleMap;
use crate::markup::{Element, Markup, LRM, NBSP, RLM, XML_SPACE};
use crate::names::PT;
use crate::prepass::{measuring_font, DEFAULT_GAP};
use crate::source::{Node, TabLeader};

const DEFAULT_LANGUAGE: &str = "en-US";

/// `lang` of the run when it differs from the default language.
fn run_language(run: Node<'_>) -> Option<String> {
    let lang = run.w_path(&["rPr", "lang"]);
    let attribute = match run.attr(PT, "LanguageType") {
        Some("western") => "val",
        Some("bidi") => "bidi",
        Some("eastAsia") => "eastAsia",
        _ => return None,
    };
    lang.and_then(|l| l.w_attr(attribute))
        .filter(|l| *l != DEFAULT_LANGUAGE)
        .map(str::to_string)
}

/// Directional mark placed around the text of a run.
fn run_mark(run: Node<'_>, style: &StyleMap) -> Option<char> {
    run.w_child("t")?;
    if style
        .get("font-family")
        .is_some_and(|f| f.to_lowercase() == "symbol")
    {
        return None;
    }
    if run.w_path(&["rPr", "rtl"]).is_some() {
        Some(RLM)
    } else if paragraph_is_bidi(run) {
        Some(LRM)
    } else {
        None
    }
}

impl<'a> Transformer<'a> {
    pub(crate) fn convert_run(&mut self, run: Node<'a>, mode: &TransformMode) -> Vec<Markup> {
        let rpr = run.w_child("rPr");
        let content_nodes = run.elements().filter(|e| !e.is_w("rPr"));
        if rpr.is_none() && mode.revision.is_none() {
            return self.convert_all(content_nodes, 0.0, mode);
        }
        if rpr.is_some_and(|r| r.w_child("webHidden").is_some()) {
            return Vec::new();
        }

        let mut style = run_style(run, &mut self.state.shading);
        let mut content = self.convert_all(content_nodes, 0.0, mode);

        let wrapper = match rpr
            .and_then(|r| r.w_child("vertAlign"))
            .and_then(|v| v.w_attr("val"))
        {
            Some("superscript") => Some("sup"),
            Some("subscript") => Some("sub"),
            _ => None,
        };
        if let Some(wrapper) = wrapper {
            if !content.is_empty() {
                content = vec![Element::new(wrapper).children(content).into()];
            }
        }

        let lang = run_language(run);
        let mark = run_mark(run, &style);

        if let Some(kind) = mode.revision {
            style.remove("color");
            style.remove("text-decoration");
            let (color, decoration) = kind.appearance();
            style.set("color", color);
            style.set("text-decoration", decoration);
        }

        let tooltip = mode.tooltip.as_ref().map(|text| {
            let mut span = Element::new("span")
                .attr("class", TOOLTIP_TEXT_CLASS)
                .text(text.clone());
            if needs_preserve(text) {
                span.set_attr(XML_SPACE, "preserve");
            }
            span
        });

        if style.is_empty() && lang.is_none() && mark.is_none() && mode.additional_class.is_none() {
            return content;
        }

        style.add_if_missing("margin", "0");
        style.add_if_missing("padding", "0");
        let mut span = Element::new("span");
        if let Some(lang) = lang {
            span.set_attr("lang", lang);
        }
        if let Some(mark) = mark {
            span.children.push(Markup::CharRef(mark));
        }
        span.children.extend(content);
        if let Some(mark) = mark {
            span.children.push(Markup::CharRef(mark));
        }
        if needs_preserve(&run.value()) {
            span.set_attr(XML_SPACE, "preserve");
        }
        if let Some(tooltip) = tooltip {
            span.children.push(tooltip.into());
        }
        span.style = Some(style);
        span.class_annotation = mode.additional_class.map(str::to_string);
        vec![span.into()]
    }

    /// A tab as a span as wide as its measured gap, filled with its leader.
    pub(super) fn tab(&mut self, node: Node<'a>) -> Element {
        let mut style = StyleMap::new();
        let Some(annotation) = node.annotations().tab(node.id()) else {
            let mark = if paragraph_is_bidi(node) { RLM } else { LRM };
            style.add_if_missing(
                "margin",
                format!("0 0 0 {:.2}in", DEFAULT_GAP as f64 / 1440.0),
            );
            style.add_if_missing("padding", "0 0 0 0");
            return Element::new("span").child(Markup::CharRef(mark)).with_style(style);
        };

        let Some(leader) = annotation.leader else {
            style.add_if_missing("margin", format!("0 0 0 {:.2}in", annotation.inches()));
            style.add_if_missing("padding", "0 0 0 0");
            return Element::new("span").child(Markup::CharRef(NBSP)).with_style(style);
        };

        let paragraph = node.ancestors().find(|a| a.is_w("p")).unwrap_or(node);
        let font = measuring_font(node, paragraph);
        let fill = leader.character();
        let measured = self.state.measurer.measure(&fill.to_string(), &font);

        style.add_if_missing("margin", "0 0 0 0");
        style.add_if_missing("padding", "0 0 0 0");
        style.add_if_missing("width", format!("{:.2}in", annotation.inches()));
        style.add_if_missing("text-align", "center");

        let text = if measured.width_twips > 0 {
            if measured.used_fallback {
                style.add_if_missing("font-family", "Arial");
            }
            let count = (annotation.width_twips / measured.width_twips).max(0) as usize;
            format!(" {} ", fill.to_string().repeat(count))
        } else {
            if leader == TabLeader::Underscore {
                style.add_if_missing("text-decoration", "underline");
            }
            " ".to_string()
        };
        Element::new("span")
            .text(text)
            .preserve_space()
            .with_style(style)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body, convert};
    use crate::markup::Element;

    fn spans(html: &Element) -> Vec<&Element> {
        let mut out = Vec::new();
        body(html).find_all("span", &mut out);
        out
    }

    #[test]
    fn run_without_properties_is_bare_text() {
        let html = convert("<w:p><w:r><w:t>plain</w:t></w:r></w:p>");
        assert!(spans(&html).is_empty());
        assert_eq!(body(&html).text_content(), "plain");
    }

    #[test]
    fn styled_run_becomes_span() {
        let html = convert(
            r#"<w:p><w:r><w:rPr><w:b/><w:vertAlign w:val="superscript"/><w:lang w:val="fr-FR"/></w:rPr><w:t xml:space="preserve">x </w:t></w:r></w:p>"#,
        );
        let html_body = body(&html);
        let span = spans(&html)[0];
        let style = span.style.as_ref().unwrap();
        assert_eq!(style.get("font-weight"), Some("bold"));
        assert_eq!(style.get("margin"), Some("0"));
        assert_eq!(style.get("padding"), Some("0"));
        assert_eq!(span.get_attr("lang"), None);
        assert_eq!(span.get_attr("xml:space"), Some("preserve"));
        assert_eq!(html_body.find("sup").unwrap().text_content(), "x ");
    }

    #[test]
    fn language_is_emitted_when_not_default() {
        let html = convert(
            r#"<w:p><w:r pt:LanguageType="western"><w:rPr><w:lang w:val="fr-FR"/></w:rPr><w:t>oui</w:t></w:r>
               <w:r pt:LanguageType="western"><w:rPr><w:lang w:val="en-US"/></w:rPr><w:t>yes</w:t></w:r></w:p>"#,
        );
        let spans = spans(&html);
        assert_eq!(spans[0].get_attr("lang"), Some("fr-FR"));
        assert_eq!(spans[1].get_attr("lang"), None);
    }

    #[test]
    fn hidden_web_run_is_dropped() {
        let html = convert(
            r#"<w:p><w:r><w:rPr><w:webHidden/></w:rPr><w:t>gone</w:t></w:r><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        assert_eq!(body(&html).text_content(), "kept");
    }

    #[test]
    fn directional_marks() {
        let html = convert(
            r#"<w:p><w:r><w:rPr><w:rtl/></w:rPr><w:t>abc</w:t></w:r></w:p>
               <w:p><w:pPr><w:bidi/></w:pPr><w:r><w:rPr><w:i/></w:rPr><w:t>def</w:t></w:r></w:p>
               <w:p><w:pPr><w:bidi/></w:pPr><w:r pt:FontName="Symbol"><w:rPr/><w:t>g</w:t></w:r></w:p>"#,
        );
        let spans = spans(&html);
        assert_eq!(spans[0].text_content(), "\u{200F}abc\u{200F}");
        assert_eq!(spans[1].text_content(), "\u{200E}def\u{200E}");
        assert_eq!(spans[2].text_content(), "g");
    }

    #[test]
    fn revision_appearance_replaces_run_colors() {
        let html = convert(
            r#"<w:p><w:del><w:r><w:rPr><w:color w:val="0000FF"/><w:u w:val="single"/></w:rPr><w:delText>old</w:delText></w:r></w:del>
               <w:moveTo><w:r><w:t>moved</w:t></w:r></w:moveTo></w:p>"#,
        );
        let spans = spans(&html);
        let deleted = spans[0].style.as_ref().unwrap();
        assert_eq!(deleted.get("color"), Some("#C00000"));
        assert_eq!(deleted.get("text-decoration"), Some("line-through"));
        let moved = spans[1].style.as_ref().unwrap();
        assert_eq!(moved.get("color"), Some("#00C000"));
        assert_eq!(moved.get("text-decoration"), Some("underline"));
        assert_eq!(spans[1].class_annotation, None);
    }

    #[test]
    fn attributed_revision_gets_tooltip() {
        let html = convert(
            r#"<w:p><w:ins w:author="A. Author" w:date="2020-01-01T00:00:00Z"><w:r><w:t>new</w:t></w:r></w:ins></w:p>"#,
        );
        let span = spans(&html)[0];
        assert_eq!(span.class_annotation.as_deref(), Some("wml-tooltip"));
        let tooltip = span.find("span").unwrap();
        assert_eq!(tooltip.get_attr("class"), Some("wml-revtrk wml-tooltip-right"));
        assert_eq!(tooltip.text_content(), "A. Author - 1/1/2020 12:00:00 AM - Inserted");
    }

    #[test]
    fn tabs_render_as_sized_spans() {
        let html = convert(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="1440"/><w:tab w:val="left" w:pos="4320" w:leader="dot"/></w:tabs></w:pPr>
               <w:r><w:t>a</w:t></w:r><w:r><w:tab/></w:r><w:r><w:t>b</w:t></w:r><w:r><w:tab/></w:r><w:r><w:t>c</w:t></w:r></w:p>"#,
        );
        // The leading tab is absorbed; the second one is drawn.
        let leader = spans(&html)
            .into_iter()
            .find(|s| s.get_attr("xml:space") == Some("preserve"))
            .unwrap();
        let style = leader.style.as_ref().unwrap();
        assert_eq!(style.get("text-align"), Some("center"));
        assert_eq!(style.get("width"), Some("2.00in"));
        let text = leader.text_content();
        assert!(text.starts_with(' ') && text.ends_with(' '));
        assert!(text.trim().chars().all(|c| c == '.'));
    }
}
