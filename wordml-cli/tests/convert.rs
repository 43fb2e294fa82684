use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Hello docx</w:t></w:r></w:p>
    <w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Bold words</w:t></w:r></w:p>
    <w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>
  </w:body>
</w:document>"#;

fn write_docx(path: &Path) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", DOCUMENT),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn converts_to_stdout_without_subcommand() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    write_docx(&input);

    let output = cargo_bin_cmd!("wordml")
        .arg(input.as_os_str())
        .arg("--extra-title")
        .arg("Report")
        .arg("--extra-approximate")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let html = String::from_utf8(output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html><html>"));
    assert!(html.contains("<title>Report</title>"));
    assert!(html.contains("Hello docx"));
    assert!(html.contains("class=\"pt-"));
    assert!(html.contains(".wml-tooltip"));
}

#[test]
fn convert_writes_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    let output = dir.path().join("doc.html");
    write_docx(&input);

    cargo_bin_cmd!("wordml")
        .arg("convert")
        .arg(input.as_os_str())
        .arg("-o")
        .arg(output.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("Bold words"));
    assert!(html.contains("font-weight: bold;"));
}

#[test]
fn config_file_switches_to_inline_styles() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.docx");
    write_docx(&input);
    let config_path = dir.path().join("custom.toml");
    fs::write(
        &config_path,
        "[html]\nfabricate_css_classes = false\n\n[measurement]\nmode = \"approximate\"\n",
    )
    .unwrap();

    let output = cargo_bin_cmd!("wordml")
        .arg(input.as_os_str())
        .arg("--config")
        .arg(config_path.as_os_str())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let html = String::from_utf8(output).unwrap();
    assert!(html.contains("style=\""));
    assert!(!html.contains("class=\"pt-"));
}

#[test]
fn generate_css_prints_base_stylesheet() {
    cargo_bin_cmd!("wordml")
        .arg("generate-css")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("span { white-space: pre-wrap; }"))
        .stdout(predicate::str::contains(".wml-comment-initials"));
}

#[test]
fn missing_input_fails() {
    let dir = tempdir().unwrap();
    cargo_bin_cmd!("wordml")
        .arg(dir.path().join("absent.docx").as_os_str())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error reading package"));
}

#[test]
fn invalid_archive_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.docx");
    fs::write(&input, b"not a zip").unwrap();
    cargo_bin_cmd!("wordml")
        .arg(input.as_os_str())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package error"));
}
