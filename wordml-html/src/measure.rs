//! Text width measurement for tab stop alignment
//!
//! Right, center and decimal tab stops need the rendered width of the text
//! that follows them. [`SystemFontMetrics`] resolves the run's font through
//! the system font database and sums glyph advances; [`MonospaceMetrics`]
//! approximates every character with a fixed fraction of the em and is fully
//! deterministic.
//!
//! A [`Measurer`] owns the measurement backend for one conversion. The
//! backend is created on first use, so documents without measured tab stops
//! never scan the system fonts.

use crate::css::font::run_size;
use crate::names::PT;
use crate::source::Node;
use once_cell::unsync::OnceCell;
use std::fmt;
use std::rc::Rc;

/// Face used when a run's own font yields no width.
pub const FALLBACK_FACE: &str = "Arial";

/// Run size when none is declared, in half-points.
const DEFAULT_HALF_POINTS: i64 = 22;

/// Font attributes that influence glyph advances.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFont {
    pub family: String,
    pub half_points: i64,
    pub bold: bool,
    pub italic: bool,
}

impl RunFont {
    pub fn new(family: &str, half_points: i64) -> Self {
        Self {
            family: family.to_string(),
            half_points,
            bold: false,
            italic: false,
        }
    }

    /// Font of a run, as stamped by the assembly pass or declared in `rPr`.
    pub fn from_run(run: Node<'_>) -> Self {
        let rpr = run.w_child("rPr");
        let family = run
            .attr(PT, "FontName")
            .or_else(|| rpr.and_then(|r| r.w_child("rFonts")).and_then(|f| f.w_attr("ascii")))
            .unwrap_or(FALLBACK_FACE);
        Self {
            family: family.to_string(),
            half_points: run_size(run.attr(PT, "LanguageType"), rpr).unwrap_or(DEFAULT_HALF_POINTS),
            bold: rpr.is_some_and(|r| r.w_flag("b")),
            italic: rpr.is_some_and(|r| r.w_flag("i")),
        }
    }

    pub fn with_family(&self, family: &str) -> Self {
        Self {
            family: family.to_string(),
            ..self.clone()
        }
    }

    fn points(&self) -> f64 {
        self.half_points as f64 / 2.0
    }
}

pub trait TextMeasure {
    /// Width of `text` in twips; zero when the font cannot be resolved.
    fn width_twips(&self, text: &str, font: &RunFont) -> i64;
}

/// Glyph advances from installed fonts.
pub struct SystemFontMetrics {
    db: fontdb::Database,
}

impl SystemFontMetrics {
    pub fn load() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("loaded {} system font faces", db.len());
        Self { db }
    }

    pub fn from_database(db: fontdb::Database) -> Self {
        Self { db }
    }
}

impl TextMeasure for SystemFontMetrics {
    fn width_twips(&self, text: &str, font: &RunFont) -> i64 {
        let families = [fontdb::Family::Name(&font.family)];
        let query = fontdb::Query {
            families: &families,
            weight: if font.bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: if font.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        let Some(id) = self.db.query(&query) else {
            return 0;
        };
        self.db
            .with_face_data(id, |data, index| {
                let Ok(face) = ttf_parser::Face::parse(data, index) else {
                    return 0;
                };
                let units_per_em = face.units_per_em() as f64;
                if units_per_em == 0.0 {
                    return 0;
                }
                let advance: f64 = text
                    .chars()
                    .map(|c| {
                        let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                        f64::from(face.glyph_hor_advance(glyph).unwrap_or(0))
                    })
                    .sum();
                (advance / units_per_em * font.points() * 20.0).round() as i64
            })
            .unwrap_or(0)
    }
}

/// Every character is `em_fraction` of the font size wide.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub em_fraction: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { em_fraction: 0.5 }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn width_twips(&self, text: &str, font: &RunFont) -> i64 {
        let chars = text.chars().count() as f64;
        (chars * font.points() * self.em_fraction * 20.0).round() as i64
    }
}

/// Which backend a conversion measures with.
#[derive(Clone, Default)]
pub enum MetricsSource {
    #[default]
    System,
    Monospace(MonospaceMetrics),
    Custom(Rc<dyn TextMeasure>),
}

impl fmt::Debug for MetricsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsSource::System => write!(f, "System"),
            MetricsSource::Monospace(m) => write!(f, "Monospace({})", m.em_fraction),
            MetricsSource::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Result of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measured {
    pub width_twips: i64,
    /// The run's font gave no width and [`FALLBACK_FACE`] was used.
    pub used_fallback: bool,
}

/// Lazily created measurement backend for one conversion.
pub struct Measurer {
    source: MetricsSource,
    backend: OnceCell<Rc<dyn TextMeasure>>,
}

impl Measurer {
    pub fn new(source: MetricsSource) -> Self {
        Self {
            source,
            backend: OnceCell::new(),
        }
    }

    fn backend(&self) -> &Rc<dyn TextMeasure> {
        self.backend.get_or_init(|| {
            let backend: Rc<dyn TextMeasure> = match &self.source {
                MetricsSource::System => Rc::new(SystemFontMetrics::load()),
                MetricsSource::Monospace(m) => Rc::new(*m),
                MetricsSource::Custom(custom) => Rc::clone(custom),
            };
            backend
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.get().is_some()
    }

    /// Measure with the run's font, retrying once with the fallback face.
    pub fn measure(&self, text: &str, font: &RunFont) -> Measured {
        if text.is_empty() {
            return Measured {
                width_twips: 0,
                used_fallback: false,
            };
        }
        let backend = self.backend();
        let width = backend.width_twips(text, font);
        if width > 0 {
            return Measured {
                width_twips: width,
                used_fallback: false,
            };
        }
        log::debug!(
            "no width for {:?} in '{}', retrying with '{FALLBACK_FACE}'",
            text,
            font.family
        );
        Measured {
            width_twips: backend.width_twips(text, &font.with_family(FALLBACK_FACE)),
            used_fallback: true,
        }
    }
}

impl fmt::Debug for Measurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measurer")
            .field("source", &self.source)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct OnlyArial;

    impl TextMeasure for OnlyArial {
        fn width_twips(&self, text: &str, font: &RunFont) -> i64 {
            if font.family == "Arial" {
                text.len() as i64 * 100
            } else {
                0
            }
        }
    }

    #[test]
    fn monospace_width() {
        let metrics = MonospaceMetrics::default();
        assert_eq!(metrics.width_twips("abcd", &RunFont::new("Any", 24)), 480);
    }

    #[test]
    fn backend_is_created_lazily() {
        let measurer = Measurer::new(MetricsSource::Monospace(MonospaceMetrics::default()));
        assert!(!measurer.is_initialized());
        measurer.measure("", &RunFont::new("Any", 24));
        assert!(!measurer.is_initialized());
        measurer.measure("x", &RunFont::new("Any", 24));
        assert!(measurer.is_initialized());
    }

    #[test]
    fn zero_width_retries_with_fallback_face() {
        let measurer = Measurer::new(MetricsSource::Custom(Rc::new(OnlyArial)));
        let measured = measurer.measure("abc", &RunFont::new("Missing Font", 24));
        assert_eq!(
            measured,
            Measured {
                width_twips: 300,
                used_fallback: true
            }
        );
    }

    #[test]
    fn custom_backend_is_shared() {
        struct Counting(RefCell<usize>);
        impl TextMeasure for Counting {
            fn width_twips(&self, _: &str, _: &RunFont) -> i64 {
                *self.0.borrow_mut() += 1;
                10
            }
        }
        let counter = Rc::new(Counting(RefCell::new(0)));
        let measurer = Measurer::new(MetricsSource::Custom(counter.clone()));
        measurer.measure("a", &RunFont::new("X", 20));
        measurer.measure("b", &RunFont::new("X", 20));
        assert_eq!(*counter.0.borrow(), 2);
    }
}
