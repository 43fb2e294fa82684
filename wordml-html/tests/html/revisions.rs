use crate::common::{all, package, settings, to_html, to_tree};

const BODY: &str = r#"<w:p>
    <w:r><w:t xml:space="preserve">kept </w:t></w:r>
    <w:del w:id="1" w:author="A. Author" w:date="2020-01-01T00:00:00Z"><w:r><w:delText>gone</w:delText></w:r></w:del>
    <w:ins w:id="2"><w:r><w:t>added</w:t></w:r></w:ins>
</w:p>"#;

#[test]
fn deletion_carries_strikethrough_and_tooltip() {
    let html = to_tree(&package(BODY), &settings());
    let spans = all(&html, "span");
    let deleted = spans
        .iter()
        .find(|s| s.get_attr("class").is_some_and(|c| c.ends_with(" wml-tooltip")))
        .unwrap();
    let tooltip = deleted.find("span").unwrap();
    assert_eq!(tooltip.get_attr("class"), Some("wml-revtrk wml-tooltip-right"));
    assert_eq!(
        tooltip.text_content(),
        "A. Author - 1/1/2020 12:00:00 AM - Deleted"
    );
    assert!(deleted.text_content().starts_with("gone"));

    let css = html.find("style").unwrap().text_content();
    assert!(css.contains("text-decoration: line-through;"));
    assert!(css.contains("color: #C00000;"));
}

#[test]
fn anonymous_insertion_is_styled_without_tooltip() {
    let mut settings = settings();
    settings.fabricate_css_classes = false;
    let html = to_tree(&package(BODY), &settings);
    let inserted = all(&html, "span")
        .into_iter()
        .find(|s| s.text_content() == "added")
        .unwrap();
    let style = inserted.get_attr("style").unwrap();
    assert!(style.contains("text-decoration: underline;"));
    assert!(style.contains("color: #C00000;"));
    assert_eq!(inserted.get_attr("class"), None);
}

#[test]
fn accepted_revisions_render_as_plain_text() {
    let mut settings = settings();
    settings.display_revision_tracking = false;
    let html = to_html(&package(BODY), &settings);
    assert!(html.contains("added"));
    assert!(!html.contains("gone"));
    assert!(!html.contains("Deleted"));
    assert!(!html.contains("class=\"wml-revtrk"));
}
