//! Font family and size rules.

use super::StyleMap;
use crate::source::Node;

const SANS_SERIF: &[&str] = &[
    "Arial",
    "Arial Narrow",
    "Arial Rounded MT Bold",
    "Arial Unicode MS",
    "Berlin Sans FB",
    "Berlin Sans FB Demi",
    "Calibri Light",
    "Gill Sans MT",
    "Gill Sans MT Condensed",
    "Lucida Sans",
    "Lucida Sans Unicode",
    "Segoe UI",
    "Segoe UI Light",
    "Segoe UI Semibold",
    "Tahoma",
    "Trebuchet MS",
    "Verdana",
];

const SERIF: &[&str] = &[
    "Baskerville Old Face",
    "Book Antiqua",
    "Bookman Old Style",
    "Californian FB",
    "Cambria",
    "Constantia",
    "Garamond",
    "Lucida Bright",
    "Lucida Fax",
    "Palatino Linotype",
    "Times New Roman",
    "Wide Latin",
];

const QUOTED_ONLY: &[&str] = &["Courier New", "Lucida Console"];

/// `font-family` value with a generic fallback for well-known faces.
pub fn font_family_value(font: &str) -> String {
    if SANS_SERIF.contains(&font) {
        format!("'{font}', 'sans-serif'")
    } else if SERIF.contains(&font) {
        format!("'{font}', 'serif'")
    } else if QUOTED_ONLY.contains(&font) {
        format!("'{font}'")
    } else {
        font.to_string()
    }
}

pub fn add_font_family(style: &mut StyleMap, font: Option<&str>) {
    if let Some(font) = font.filter(|f| !f.is_empty()) {
        style.add_if_missing("font-family", font_family_value(font));
    }
}

/// Run size in half-points; complex-script size for bidi runs.
pub fn run_size(language_type: Option<&str>, rpr: Option<Node<'_>>) -> Option<i64> {
    let rpr = rpr?;
    let element = if language_type == Some("bidi") {
        "szCs"
    } else {
        "sz"
    };
    rpr.w_child(element)?.w_int("val")
}

pub fn add_font_size(style: &mut StyleMap, half_points: Option<i64>) {
    if let Some(sz) = half_points {
        style.add_if_missing("font-size", format!("{}pt", sz as f64 / 2.0));
    }
}
