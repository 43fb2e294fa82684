use crate::common::{all, package, settings, to_tree, W};
use wordml_html::{Element, PartKind};

fn comments() -> String {
    format!(
        r#"<w:comments xmlns:w="{W}">
            <w:comment w:id="10" w:author="Ann Berg" w:initials="AB" w:date="2021-03-04T05:06:07Z"><w:p><w:r><w:t>One</w:t></w:r></w:p></w:comment>
            <w:comment w:id="11" w:author="Ann Berg" w:initials="AB"><w:p><w:r><w:t>Two</w:t></w:r></w:p></w:comment>
            <w:comment w:id="12" w:author="Cy Dee" w:initials="CD"><w:p><w:r><w:t>Three</w:t></w:r></w:p></w:comment>
        </w:comments>"#
    )
}

fn notes(kind: &str) -> String {
    format!(
        r#"<w:{kind}s xmlns:w="{W}"><w:{kind} w:id="3"><w:p><w:r><w:t>{kind} text</w:t></w:r></w:p></w:{kind}></w:{kind}s>"#
    )
}

const BODY: &str = r#"<w:p>
    <w:r><w:t>a</w:t></w:r><w:r><w:commentReference w:id="10"/></w:r>
    <w:r><w:t>b</w:t></w:r><w:r><w:commentReference w:id="11"/></w:r>
    <w:r><w:t>c</w:t></w:r><w:r><w:commentReference w:id="12"/></w:r>
    <w:r><w:endnoteReference w:id="3"/></w:r>
    <w:r><w:footnoteReference w:id="3"/></w:r>
</w:p>"#;

fn convert(settings: &wordml_html::ConvertSettings) -> Element {
    let package = package(BODY)
        .with_part(PartKind::Comments, comments())
        .with_part(PartKind::Footnotes, notes("footnote"))
        .with_part(PartKind::Endnotes, notes("endnote"));
    to_tree(&package, settings)
}

#[test]
fn comment_references_are_numbered_in_encounter_order() {
    let html = convert(&settings());
    let forward: Vec<&Element> = all(&html, "a")
        .into_iter()
        .filter(|a| a.get_attr("name").is_some_and(|n| n.starts_with("_wml_comment_link_")))
        .collect();
    let labels: Vec<String> = forward.iter().map(|a| a.text_content()).collect();
    assert_eq!(labels, vec!["[AB1]", "[AB2]", "[CD3]"]);

    for (i, a) in forward.iter().enumerate() {
        let n = i + 1;
        assert_eq!(a.get_attr("href"), Some(format!("#_wml_comment_{n}").as_str()));
        let back = all(&html, "a")
            .into_iter()
            .find(|b| b.get_attr("name") == Some(format!("_wml_comment_{n}").as_str()))
            .unwrap();
        assert_eq!(back.get_attr("href"), Some(format!("#_wml_comment_link_{n}").as_str()));
    }
}

#[test]
fn deferred_content_is_grouped_by_kind() {
    let html = convert(&settings());
    let body = html.find("body").unwrap();
    let groups: Vec<String> = body
        .children
        .iter()
        .rev()
        .take(3)
        .map(|m| m.text_content())
        .collect();
    assert_eq!(groups[0], "[1]endnote text");
    assert_eq!(groups[1], "[1]footnote text");
    assert_eq!(groups[2], "[AB1]One[AB2]Two[CD3]Three");
}

#[test]
fn hidden_comments_leave_no_trace() {
    let mut settings = settings();
    settings.display_comments = false;
    let html = convert(&settings);
    let text = html.find("body").unwrap().text_content();
    assert!(!text.contains("[AB1]"));
    assert!(!text.contains("One"));
    assert!(text.starts_with("abc"));
}
