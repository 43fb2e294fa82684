//! Tab stop widths
//!
//! HTML has no tab stops, so every tab is rendered as a span of fixed width.
//! For each paragraph that contains tabs this pass rebuilds the effective
//! tab stop list, walks the paragraph content with a running horizontal
//! position (in twips) and records, per `w:tab`, the gap that brings the
//! following text to its stop:
//!
//! | Stop alignment          | Lands on the stop                  |
//! |-------------------------|------------------------------------|
//! | `left`, `start`, `num`  | start of the following text        |
//! | `right`, `end`          | end of the following text          |
//! | `center`                | middle of the following text       |
//! | `decimal`               | first decimal point of the text    |
//!
//! Line breaks reset the position to the left indent and are annotated with
//! the first-line position. Text itself does not advance the position.

use crate::measure::{Measurer, RunFont};
use crate::names::PT;
use crate::source::{NodeId, Node, Part, TabAnnotation, TabLeader};

/// Gap used when no stop lies past the current position or the text after
/// a tab cannot be measured.
pub const DEFAULT_GAP: i64 = 720;

/// Number of default stops generated past the last explicit stop.
const DEFAULT_STOP_COUNT: i64 = 100;

/// Widest page Word accepts (22in); positions and indents are clamped to it.
const MAX_TWIPS: i64 = 31_680;

fn clamp_twips(value: i64) -> i64 {
    value.clamp(-MAX_TWIPS, MAX_TWIPS)
}

/// Default stop interval, falling back to half an inch when unusable.
fn ladder_interval(interval: i64) -> i64 {
    if interval > 0 {
        interval.min(MAX_TWIPS)
    } else {
        DEFAULT_GAP
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStop {
    pub position: i64,
    pub alignment: String,
    pub leader: Option<TabLeader>,
}

impl TabStop {
    fn left(position: i64) -> Self {
        Self {
            position,
            alignment: "left".to_string(),
            leader: None,
        }
    }
}

fn default_ladder(interval: i64, from: i64) -> impl Iterator<Item = TabStop> {
    (from..from + DEFAULT_STOP_COUNT).map(move |i| TabStop::left(i * interval))
}

/// Drop cleared and bar stops, append default stops past the last one and
/// order by position.
fn with_default_stops(mut stops: Vec<TabStop>, interval: i64) -> Vec<TabStop> {
    stops.retain(|s| s.alignment != "clear" && s.alignment != "bar");
    match stops.iter().map(|s| s.position).max() {
        Some(last) => {
            stops.extend(default_ladder(interval, last / interval + 1));
            stops.sort_by_key(|s| s.position);
            stops
        }
        None => default_ladder(interval, 1).collect(),
    }
}

/// Effective tab stops of a paragraph with the given left indent.
pub fn tab_stops(paragraph: Node<'_>, left: i64, interval: i64) -> Vec<TabStop> {
    let interval = ladder_interval(interval);
    match paragraph.w_path(&["pPr", "tabs"]) {
        None if left == 0 => default_ladder(interval, 1).collect(),
        None => with_default_stops(vec![TabStop::left(left)], interval),
        Some(tabs) => {
            let mut stops: Vec<TabStop> = tabs
                .w_children("tab")
                .map(|t| TabStop {
                    position: clamp_twips(t.w_int("pos").unwrap_or(0)),
                    alignment: t.w_attr("val").unwrap_or("left").to_string(),
                    leader: t.w_attr("leader").and_then(TabLeader::parse),
                })
                .collect();
            if left != 0 {
                stops.push(TabStop::left(left));
            }
            with_default_stops(stops, interval)
        }
    }
}

/// Left and first-line indents in twips.
fn indents(paragraph: Node<'_>) -> (i64, i64) {
    let Some(ind) = paragraph.w_path(&["pPr", "ind"]) else {
        return (0, 0);
    };
    let left = clamp_twips(ind.w_int("left").or_else(|| ind.w_int("start")).unwrap_or(0));
    let first_line = match ind.w_int("hanging") {
        Some(hanging) => -clamp_twips(hanging),
        None => clamp_twips(ind.w_int("firstLine").unwrap_or(0)),
    };
    (left, left + first_line)
}

fn skip_text_boxes(node: &Node<'_>) -> bool {
    node.is_w("txbxContent")
}

fn skip_properties(node: &Node<'_>) -> bool {
    node.is_w("txbxContent") || node.is_w("pPr") || node.is_w("rPr")
}

fn has_tabs(paragraph: Node<'_>) -> bool {
    paragraph
        .descendants_trimmed(skip_text_boxes)
        .any(|n| n.is_w("r") && n.w_child("tab").is_some())
}

fn is_line_end(node: &Node<'_>) -> bool {
    node.is_w("br") || node.is_w("cr")
}

/// Font the text following a tab is measured with.
pub(crate) fn measuring_font(tab: Node<'_>, paragraph: Node<'_>) -> RunFont {
    match tab.parent() {
        Some(run) => {
            let font = RunFont::from_run(run);
            match (run.attr(PT, "FontName"), paragraph.attr(PT, "FontName")) {
                (None, Some(family)) => font.with_family(family),
                _ => font,
            }
        }
        None => RunFont::new(crate::measure::FALLBACK_FACE, 22),
    }
}

/// Measure text, treating an unmeasurable non-empty string as `None`.
/// Widths are capped so the running position cannot overflow.
fn width_of(measurer: &Measurer, text: &str, font: &RunFont) -> Option<i64> {
    let measured = measurer.measure(text, font);
    if measured.width_twips == 0 && !text.is_empty() {
        log::debug!("could not measure {text:?}, using the default tab gap");
        return None;
    }
    Some(measured.width_twips.clamp(0, i64::from(i32::MAX)))
}

/// Compute the annotations of one paragraph.
pub fn paragraph_tab_widths(
    paragraph: Node<'_>,
    default_tab_stop: i64,
    measurer: &Measurer,
) -> Vec<(NodeId, TabAnnotation)> {
    let mut out = Vec::new();
    let (left, first) = indents(paragraph);
    let stops = tab_stops(paragraph, left, default_tab_stop);
    let content: Vec<Node<'_>> = paragraph.descendants_trimmed(skip_properties).collect();

    let mut position = first;
    let mut index = 0;
    while index < content.len() {
        let node = content[index];
        if is_line_end(&node) {
            position = left;
            out.push((
                node.id(),
                TabAnnotation {
                    width_twips: first,
                    leader: None,
                },
            ));
            index += 1;
            continue;
        }
        if !node.is_w("tab") {
            index += 1;
            continue;
        }

        let Some(stop) = stops.iter().find(|s| s.position > position) else {
            out.push((
                node.id(),
                TabAnnotation {
                    width_twips: DEFAULT_GAP,
                    leader: None,
                },
            ));
            break;
        };

        let segment_end = content[index + 1..]
            .iter()
            .position(|n| n.is_w("tab") || is_line_end(n))
            .map(|offset| index + 1 + offset)
            .unwrap_or(content.len());
        let text: String = content[index + 1..segment_end]
            .iter()
            .filter(|n| n.is_w("t"))
            .map(|t| t.value())
            .collect();
        let font = measuring_font(node, paragraph);

        let gap = match stop.alignment.as_str() {
            "right" | "end" => match width_of(measurer, &text, &font) {
                Some(width) => {
                    let gap = (stop.position - width - position).max(0);
                    position = stop.position.max(position + width);
                    gap
                }
                None => {
                    position += DEFAULT_GAP;
                    DEFAULT_GAP
                }
            },
            "center" => match width_of(measurer, &text, &font) {
                Some(width) => {
                    let gap = (stop.position - width / 2 - position).max(0);
                    position = (stop.position + width / 2).max(position + width);
                    gap
                }
                None => {
                    position += DEFAULT_GAP;
                    DEFAULT_GAP
                }
            },
            "decimal" => {
                let (mantissa, fraction) = match text.find('.') {
                    Some(dot) => text.split_at(dot),
                    None => (text.as_str(), ""),
                };
                match (
                    width_of(measurer, mantissa, &font),
                    width_of(measurer, fraction, &font),
                ) {
                    (Some(mantissa_width), Some(fraction_width)) => {
                        let gap = (stop.position - mantissa_width - position).max(0);
                        position = (stop.position + fraction_width)
                            .max(position + mantissa_width + fraction_width);
                        gap
                    }
                    _ => {
                        position += DEFAULT_GAP;
                        DEFAULT_GAP
                    }
                }
            }
            _ => {
                let gap = stop.position - position;
                position = stop.position;
                out.push((
                    node.id(),
                    TabAnnotation {
                        width_twips: gap,
                        leader: stop.leader,
                    },
                ));
                index += 1;
                continue;
            }
        };
        out.push((
            node.id(),
            TabAnnotation {
                width_twips: gap,
                leader: stop.leader,
            },
        ));
        index = segment_end.max(index + 1);
    }
    out
}

/// Annotate every tab and line break of every paragraph containing tabs.
pub fn annotate_tab_widths(part: &mut Part, default_tab_stop: i64, measurer: &Measurer) {
    let annotations: Vec<(NodeId, TabAnnotation)> = part
        .root()
        .descendants()
        .filter(|n| n.is_w("p") && has_tabs(*n))
        .flat_map(|p| paragraph_tab_widths(p, default_tab_stop, measurer))
        .collect();
    log::trace!("annotated {} tab positions", annotations.len());
    for (node, annotation) in annotations {
        part.annotations.set_tab(node, annotation);
    }
}
