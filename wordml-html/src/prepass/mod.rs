//! Source-side passes run between normalization and the transform
//!
//! Each pass either rewrites the source tree in a way the transform relies
//! on, or records facts in the part's annotations. Order matters: tab
//! isolation precedes measurement, and border adjustment works on the
//! already mirrored right-to-left tables.
//!
//! | Pass                          | Parts          |
//! |-------------------------------|----------------|
//! | [`fill_empty_paragraphs`]     | all            |
//! | [`isolate_tabs`]              | all            |
//! | [`annotate_tab_widths`]       | all            |
//! | [`reverse_rtl_table_borders`] | all            |
//! | [`adjust_table_borders`]      | all            |
//! | [`annotate_fields`]           | all            |
//! | [`annotate_sections`]         | main document  |

mod paragraphs;
mod sections;
mod tables;
mod tabs;

pub use paragraphs::{fill_empty_paragraphs, isolate_tabs};
pub use sections::annotate_sections;
pub use tables::{adjust_table_borders, reverse_rtl_table_borders};
pub use tabs::{annotate_tab_widths, tab_stops, TabStop, DEFAULT_GAP};
pub(crate) use tabs::measuring_font;

use crate::document::WordDocument;
use crate::fields::annotate_fields;
use crate::measure::Measurer;
use crate::source::Part;

fn prepare_part(part: &mut Part, default_tab_stop: i64, measurer: &Measurer) {
    fill_empty_paragraphs(part);
    isolate_tabs(part);
    annotate_tab_widths(part, default_tab_stop, measurer);
    reverse_rtl_table_borders(part);
    adjust_table_borders(part);
    annotate_fields(part);
}

/// Run every pass over the document's content parts.
pub fn run(doc: &mut WordDocument, measurer: &Measurer) {
    let default_tab_stop = doc.default_tab_stop();
    prepare_part(&mut doc.main, default_tab_stop, measurer);
    for part in [&mut doc.footnotes, &mut doc.endnotes, &mut doc.comments]
        .into_iter()
        .flatten()
    {
        prepare_part(part, default_tab_stop, measurer);
    }
    annotate_sections(&mut doc.main);
}
