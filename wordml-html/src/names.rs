//! Namespace URIs of the WordprocessingML vocabularies the converter reads.

/// WordprocessingML main namespace.
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office relationships (`r:id`, `r:embed`).
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// DrawingML positioning (`wp:inline`, `wp:anchor`).
pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main (`a:blip`, `a:hlinkClick`).
pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// DrawingML pictures (`pic:pic`, `pic:blipFill`).
pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// Legacy VML (`v:shape`, `v:imagedata`).
pub const V: &str = "urn:schemas-microsoft-com:vml";
/// Attributes stamped by the simplification/assembly passes
/// (`StyleName`, `FontName`, `LanguageType`, `AbstractNumId`).
pub const PT: &str = "http://powertools.codeplex.com/2011";
/// Reserved `xml:` prefix.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Package-level namespaces.
pub mod package {
    pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
    pub const RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    pub const REL_OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const REL_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const REL_SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const REL_NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const REL_FOOTNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const REL_ENDNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
    pub const REL_COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
}
