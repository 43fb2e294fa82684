use crate::common::{all, package, settings, to_tree};

fn cell(borders: &str, text: &str) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:tcBorders>{borders}</w:tcBorders></w:tcPr><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>"#
    )
}

#[test]
fn adjacent_cell_borders_resolve_to_the_wider_one() {
    let body = format!(
        "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
        cell(r#"<w:bottom w:val="single" w:sz="4" w:color="FF0000"/>"#, "a"),
        cell("", "b"),
        cell(r#"<w:top w:val="single" w:sz="8" w:color="0000FF"/>"#, "c"),
        cell("", "d"),
    );
    let html = to_tree(&package(&body), &settings());
    let cells = all(&html, "td");
    assert_eq!(cells.len(), 4);

    assert!(cells.iter().all(|c| c.style.is_none()));
    let css = html.find("style").unwrap().text_content();
    assert!(css.contains("border-bottom: solid #0000FF 1.0pt;"));
    assert!(css.contains("border-top: solid #0000FF 1.0pt;"));
    assert!(!css.contains("#FF0000"));
}

#[test]
fn table_is_wrapped_in_aligned_division() {
    let body = r#"<w:tbl><w:tblPr><w:jc w:val="center"/><w:tblW w:w="5000" w:type="pct"/></w:tblPr>
        <w:tr><w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
    let mut settings = settings();
    settings.fabricate_css_classes = false;
    let html = to_tree(&package(body), &settings);
    let wrapper = all(&html, "div")
        .into_iter()
        .find(|d| d.get_attr("align").is_some())
        .unwrap();
    assert_eq!(wrapper.get_attr("align"), Some("center"));
    let table = wrapper.find("table").unwrap();
    let style = table.get_attr("style").unwrap();
    assert!(style.contains("border-collapse: collapse;"));
    assert!(style.contains("width: 100%;"));
}
