//! Whole `.docx` archives written with the zip crate and read back through `ZipPackage`.

use crate::common::{settings, W};
use std::io::{Cursor, Write};
use wordml_html::{convert_to_html_string, inline_image_handler, ConvertError, ZipPackage};
use zip::write::SimpleFileOptions;

const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn content_types() -> String {
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
        <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
        <Default Extension="xml" ContentType="application/xml"/>
        <Default Extension="png" ContentType="image/png"/>
    </Types>"#
        .to_string()
}

fn package_rels() -> String {
    format!(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="{REL}/officeDocument" Target="word/document.xml"/>
        </Relationships>"#
    )
}

fn document_rels() -> String {
    format!(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="{REL}/styles" Target="styles.xml"/>
            <Relationship Id="rId5" Type="{REL}/hyperlink" Target="https://example.org/" TargetMode="External"/>
            <Relationship Id="rId7" Type="{REL}/image" Target="media/image1.png"/>
        </Relationships>"#
    )
}

fn styles() -> String {
    format!(
        r#"<w:styles xmlns:w="{W}"><w:style w:type="paragraph" w:styleId="Title"><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style></w:styles>"#
    )
}

fn document() -> String {
    format!(
        r#"<w:document xmlns:w="{W}" xmlns:r="{REL}"><w:body>
            <w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Archive</w:t></w:r></w:p>
            <w:p><w:hyperlink r:id="rId5"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>
            <w:p><w:r><w:drawing>
                <wp:inline xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
                           xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
                           xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">
                    <wp:extent cx="914400" cy="914400"/>
                    <wp:docPr id="1" name="Logo"/>
                    <a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId7"/></pic:blipFill></pic:pic></a:graphicData></a:graphic>
                </wp:inline>
            </w:drawing></w:r></w:p>
        </w:body></w:document>"#
    )
}

fn png() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(1, 1)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn archive() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let entries: Vec<(&str, Vec<u8>)> = vec![
        ("[Content_Types].xml", content_types().into_bytes()),
        ("_rels/.rels", package_rels().into_bytes()),
        ("word/_rels/document.xml.rels", document_rels().into_bytes()),
        ("word/document.xml", document().into_bytes()),
        ("word/styles.xml", styles().into_bytes()),
        ("word/media/image1.png", png()),
    ];
    for (name, bytes) in entries {
        zip.start_file(name, options).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn converts_a_docx_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&archive()).unwrap();
    let package = ZipPackage::open(file.path()).unwrap();

    let settings = settings().with_image_handler(inline_image_handler);
    let html = convert_to_html_string(&package, &settings).unwrap();
    assert!(html.contains("<h1"));
    assert!(html.contains("Archive</"));
    assert!(html.contains(r#"href="https://example.org/""#));
    assert!(html.contains(r#"src="data:image/png;base64,"#));
    assert!(html.contains(r#"alt="Logo""#));
    assert!(html.contains("width: 1in; height: 1in"));
}

#[test]
fn images_are_dropped_without_handler() {
    let package = ZipPackage::from_reader(Cursor::new(archive())).unwrap();
    let html = convert_to_html_string(&package, &settings()).unwrap();
    assert!(!html.contains("<img"));
}

#[test]
fn non_zip_input_is_a_package_error() {
    let err = ZipPackage::from_reader(Cursor::new(b"plain text".to_vec())).unwrap_err();
    assert!(matches!(err, ConvertError::Package(_)));
}
