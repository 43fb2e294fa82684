//! WordprocessingML to styled HTML
//!
//!     This crate converts the XML of a word-processing package (a `.docx` archive, or parts
//!     handed over in memory) into a single-flow HTML document with a generated stylesheet.
//!     It is a pure lib: it never prints, reads environment variables or touches the terminal.
//!     Diagnostics go through the `log` facade.
//!
//! Pipeline
//!
//!     package → source parts → normalize → pre-passes → transform → reify → serialize
//!
//!     - package: [`package::DocumentPackage`] exposes the main part, related parts
//!       (styles, numbering, notes, comments), relationships and embedded images.
//!     - source: every part is parsed with roxmltree into an arena tree with stable node ids.
//!       Computed side data (sections, tab widths, field frames) lives in annotation tables
//!       keyed by id, never in the tree itself.
//!     - normalize: resolves style, font and language names onto the nodes, materializes list
//!       markers, and drops what the settings hide (revisions, comments, proofing marks).
//!     - pre-passes: fill empty paragraphs, isolate tabs in their own runs, resolve table
//!       border conflicts, annotate sections, fields and tab widths.
//!     - transform: the recursive dispatcher producing a [`markup::Element`] tree whose
//!       elements carry pending [`css::StyleMap`]s.
//!     - reify: pending styles become fabricated classes or inline `style` attributes.
//!     - serialize: html5ever writes the tree.
//!
//!     The file structure :
//!     .
//!     ├── css                 # formatting properties → CSS declarations
//!     ├── normalize           # attribute resolution, list markers, revision acceptance
//!     ├── package             # zip and in-memory packages
//!     ├── prepass             # tree annotations computed before the transform
//!     ├── source              # arena tree and annotation tables
//!     ├── transform           # node dispatch, runs, paragraphs, tables, notes, images
//!     ├── document.rs         # the parsed parts of one document
//!     ├── fields.rs           # complex field tracking and instruction parsing
//!     ├── grouping.rs         # adjacency grouping keys
//!     ├── measure.rs          # text width measurement
//!     ├── reify.rs
//!     └── serializer.rs
//!
//! Testing
//!
//!     Unit tests sit next to the code. Integration tests live under tests/<area>/ and are
//!     included from tests/lib.rs, since cargo does not discover tests in subdirectories.

pub mod css;
pub mod document;
pub mod error;
pub mod fields;
pub mod grouping;
pub mod markup;
pub mod measure;
pub mod names;
pub mod normalize;
pub mod package;
pub mod prepass;
pub mod reify;
pub mod serializer;
pub mod settings;
pub mod source;
pub mod transform;

pub use document::WordDocument;
pub use error::ConvertError;
pub use markup::{Element, Markup};
pub use measure::{MetricsSource, MonospaceMetrics};
pub use package::{DocumentPackage, MemoryPackage, PartKind, ZipPackage};
pub use reify::TOOLTIP_CSS;
pub use settings::{ConvertSettings, DEFAULT_GENERAL_CSS};
pub use transform::image::{inline_image_handler, ImageInfo};

use measure::Measurer;
use transform::Transformer;

/// Convert a package into the final markup tree, styles reified.
pub fn convert_to_html(
    package: &dyn DocumentPackage,
    settings: &ConvertSettings,
) -> Result<Element, ConvertError> {
    let mut doc = WordDocument::load(package)?;
    if !doc.main.root().is_w("document") {
        return Err(ConvertError::MissingPart(
            "main document has no w:document root".to_string(),
        ));
    }

    normalize::normalize(&mut doc, settings)?;
    log::debug!("normalized document");

    let measurer = Measurer::new(settings.metrics.clone());
    prepass::run(&mut doc, &measurer);
    log::debug!("pre-passes done");

    let mut html = Transformer::new(&doc, package, settings, &measurer)
        .run()
        .ok_or_else(|| ConvertError::MissingPart("document body".to_string()))?;
    reify::reify(&mut html, settings);
    Ok(html)
}

/// Convert a package and serialize the result as an HTML5 document.
pub fn convert_to_html_string(
    package: &dyn DocumentPackage,
    settings: &ConvertSettings,
) -> Result<String, ConvertError> {
    let html = convert_to_html(package, settings)?;
    serializer::serialize_document(&html)
}

/// The stylesheet every converted document starts from: the general rules
/// followed by the tooltip rules.
pub fn base_stylesheet(settings: &ConvertSettings) -> String {
    format!(
        "{}{}{TOOLTIP_CSS}",
        settings.general_css, settings.additional_css
    )
}
