use crate::common::{all, package, settings, to_html, to_tree, W};
use wordml_html::{convert_to_html, ConvertError, MemoryPackage, PartKind};

const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
    <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style>
</w:styles>"#;

#[test]
fn heading_and_plain_paragraph() {
    let package = package(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
           <w:p><w:r><w:t>Body text</w:t></w:r></w:p>"#,
    )
    .with_part(PartKind::Styles, STYLES);
    let html = to_tree(&package, &settings());

    let headings = all(&html, "h1");
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].text_content(), "Title");
    let paragraphs = all(&html, "p");
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].text_content(), "Body text");
}

#[test]
fn output_is_a_complete_html_document() {
    let mut settings = settings();
    settings.page_title = "Minutes".to_string();
    let html = to_html(&package("<w:p><w:r><w:t>Hi</w:t></w:r></w:p>"), &settings);
    assert!(html.starts_with("<!DOCTYPE html><html><head><meta charset=\"UTF-8\">"));
    assert!(html.contains("<title>Minutes</title>"));
    assert!(html.contains("<meta name=\"Generator\" content=\"wordml-html "));
    assert!(html.contains("<style>span { white-space: pre-wrap; }"));
    assert!(html.ends_with("</body></html>"));
}

#[test]
fn missing_or_foreign_main_part_is_reported() {
    let err = convert_to_html(&MemoryPackage::empty(), &settings()).unwrap_err();
    assert!(matches!(err, ConvertError::MissingPart(_)));

    let styles_as_main = MemoryPackage::new(format!(r#"<w:styles xmlns:w="{W}"/>"#));
    let err = convert_to_html(&styles_as_main, &settings()).unwrap_err();
    assert!(matches!(err, ConvertError::MissingPart(_)));

    let malformed = MemoryPackage::new("<w:document>");
    let err = convert_to_html(&malformed, &settings()).unwrap_err();
    assert!(matches!(err, ConvertError::Xml { .. }));
}

#[test]
fn relationship_hyperlink_resolves_target() {
    let package = package(
        r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#,
    )
    .with_hyperlink("rId5", "https://example.com/docs?a=1&b=2");
    let html = to_html(&package, &settings());
    assert!(html.contains(r#"href="https://example.com/docs?a=1&amp;b=2""#));
    assert!(html.contains(">site</a>"));
}

#[test]
fn sections_and_text_survive_in_order() {
    let package = package(
        r#"<w:p><w:pPr><w:sectPr><w:pgSz w:w="12240"/></w:sectPr></w:pPr><w:r><w:t>first</w:t></w:r></w:p>
           <w:p><w:r><w:t>second</w:t></w:r></w:p>
           <w:sectPr><w:pgSz w:w="15840"/></w:sectPr>"#,
    );
    let html = to_tree(&package, &settings());
    let body = html.find("body").unwrap();
    assert_eq!(body.children.len(), 2);
    assert_eq!(body.text_content(), "firstsecond");
}

#[test]
fn out_of_range_values_degrade_instead_of_failing() {
    let numbering = format!(
        r#"<w:numbering xmlns:w="{W}">
            <w:abstractNum w:abstractNumId="1"><w:lvl w:ilvl="0"><w:start w:val="4294967295"/><w:numFmt w:val="upperLetter"/><w:lvlText w:val="%1."/></w:lvl></w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="1"/></w:num>
          </w:numbering>"#
    );
    let item = r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>item</w:t></w:r></w:p>"#;
    let body = format!(
        r#"{item}{item}
           <w:p><w:pPr><w:shd w:val="pct50" w:color="auto" w:fill="aé123"/></w:pPr><w:r><w:tab/><w:t>tabbed</w:t></w:r></w:p>
           <w:tbl><w:tr><w:tc><w:tcPr><w:gridSpan w:val="9000000000"/></w:tcPr><w:p><w:r><w:t>wide</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
    );
    let package = package(&body)
        .with_part(PartKind::Numbering, numbering)
        .with_part(
            PartKind::Settings,
            format!(r#"<w:settings xmlns:w="{W}"><w:defaultTabStop w:val="9000000000000000000"/></w:settings>"#),
        );
    let html = to_html(&package, &settings());
    assert_eq!(html.matches("4294967295.").count(), 2);
    assert!(html.contains("tabbed"));
    assert!(html.contains("wide"));
}
