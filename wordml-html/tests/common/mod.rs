//! Shared builders for converting in-memory documents.

use wordml_html::{
    convert_to_html, convert_to_html_string, ConvertSettings, Element, MemoryPackage,
    MetricsSource, MonospaceMetrics,
};

pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A package whose main document has the given body content.
pub fn package(body: &str) -> MemoryPackage {
    MemoryPackage::new(format!(
        r#"<w:document xmlns:w="{W}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}</w:body></w:document>"#
    ))
}

/// Default settings measuring with a fixed advance, independent of installed fonts.
pub fn settings() -> ConvertSettings {
    ConvertSettings {
        metrics: MetricsSource::Monospace(MonospaceMetrics::default()),
        ..ConvertSettings::default()
    }
}

pub fn to_html(package: &MemoryPackage, settings: &ConvertSettings) -> String {
    convert_to_html_string(package, settings).unwrap()
}

pub fn to_tree(package: &MemoryPackage, settings: &ConvertSettings) -> Element {
    convert_to_html(package, settings).unwrap()
}

pub fn all<'a>(root: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut out = Vec::new();
    root.find_all(name, &mut out);
    out
}
