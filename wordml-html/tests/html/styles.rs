use crate::common::{all, package, settings, to_tree};
use insta::assert_snapshot;
use wordml_html::Element;

const BODY: &str = r#"<w:p>
    <w:r><w:rPr><w:b/></w:rPr><w:t>one</w:t></w:r>
    <w:r><w:rPr><w:b/></w:rPr><w:t>two</w:t></w:r>
    <w:r><w:rPr><w:i/></w:rPr><w:t>three</w:t></w:r>
</w:p>"#;

fn span_classes(html: &Element) -> Vec<String> {
    all(html, "span")
        .iter()
        .map(|s| s.get_attr("class").unwrap_or_default().to_string())
        .collect()
}

fn stylesheet(html: &Element) -> String {
    html.find("style").unwrap().text_content()
}

#[test]
fn identical_styles_share_one_class() {
    let html = to_tree(&package(BODY), &settings());
    let classes = span_classes(&html);
    assert_eq!(classes.len(), 3);
    assert_eq!(classes[0], classes[1]);
    assert_ne!(classes[0], classes[2]);
    assert!(classes.iter().all(|c| c.starts_with("pt-")));

    let css = stylesheet(&html);
    assert_eq!(css.matches(&format!("span.{} {{", classes[0])).count(), 1);
    assert_eq!(css.matches(&format!("span.{} {{", classes[2])).count(), 1);
}

#[test]
fn class_prefix_and_additional_css_are_honoured() {
    let mut settings = settings();
    settings.css_class_prefix = "doc-".to_string();
    settings.additional_css = "\nbody { margin: 0; }\n".to_string();
    let html = to_tree(&package(BODY), &settings);
    assert!(span_classes(&html).iter().all(|c| c.starts_with("doc-")));

    let css = stylesheet(&html);
    let additional = css.find("body { margin: 0; }").unwrap();
    let last_rule = css.rfind("span.doc-").unwrap();
    let tooltip = css.find(".wml-tooltip {").unwrap();
    assert!(last_rule < additional && additional < tooltip);
}

#[test]
fn inline_mode_writes_style_attributes() {
    let mut settings = settings();
    settings.fabricate_css_classes = false;
    let html = to_tree(&package(BODY), &settings);
    let spans = all(&html, "span");
    assert!(spans.iter().all(|s| s.get_attr("class").is_none()));
    assert!(spans[0].get_attr("style").unwrap().contains("font-weight: bold;"));
    assert!(spans[2].get_attr("style").unwrap().contains("font-style: italic;"));

    let css = stylesheet(&html);
    assert!(!css.contains("span.pt-"));
    assert_snapshot!(&css[..css.find('\n').unwrap()], @"span { white-space: pre-wrap; }");
}
