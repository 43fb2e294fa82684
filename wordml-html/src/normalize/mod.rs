//! Preparation of raw parts for the transform
//!
//! The transform expects runs and paragraphs that already carry their
//! effective formatting and a few resolved attributes in the `pt:`
//! namespace (`StyleName`, `FontName`, `LanguageType`, `AbstractNumId`).
//! Documents coming out of a full formatting assembler have these already;
//! for raw packages this pass provides them:
//!
//! 1. Revision acceptance (when revisions are not displayed), removal of
//!    comment markers (when comments are not displayed) and of proofing
//!    noise.
//! 2. List numbering: marker runs with text from the configured
//!    [`ListItemImplementations`](numbering::ListItemImplementations).
//! 3. Style inheritance: paragraph and run properties from the style chain
//!    and document defaults are copied into `pPr`/`rPr` where missing.
//! 4. Attribute stamping.
//!
//! Attributes that are already present are never overwritten.

pub mod numbering;

use crate::document::WordDocument;
use crate::error::ConvertError;
use crate::names::{PT, W, XML};
use crate::settings::ConvertSettings;
use crate::source::{NodeId, Node, Part};
use std::collections::HashMap;

pub fn normalize(doc: &mut WordDocument, settings: &ConvertSettings) -> Result<(), ConvertError> {
    let mut parts: Vec<&mut Part> = vec![&mut doc.main];
    parts.extend(doc.footnotes.as_mut());
    parts.extend(doc.endnotes.as_mut());
    parts.extend(doc.comments.as_mut());
    for part in parts {
        if !settings.display_revision_tracking {
            accept_revisions(part);
        }
        remove_noise(part);
    }
    if !settings.display_comments {
        remove_comment_markers(&mut doc.main);
    }

    let styles = StyleSheet {
        part: doc.styles.as_ref(),
    };
    if let Some(numbering) = doc.numbering.as_ref() {
        let definitions = NumberingDefinitions::read(numbering);
        number_paragraphs(&mut doc.main, &styles, &definitions, settings)?;
    }

    let mut parts: Vec<&mut Part> = vec![&mut doc.main];
    parts.extend(doc.footnotes.as_mut());
    parts.extend(doc.endnotes.as_mut());
    parts.extend(doc.comments.as_mut());
    for part in parts {
        inherit_styles(part, &styles);
        stamp_attributes(part, &styles);
    }
    Ok(())
}

fn collect(part: &Part, keep: impl Fn(&Node<'_>) -> bool) -> Vec<NodeId> {
    part.root()
        .descendants()
        .filter(|n| keep(n))
        .map(|n| n.id())
        .collect()
}

const PROPERTY_CHANGES: &[&str] = &[
    "pPrChange",
    "rPrChange",
    "sectPrChange",
    "tblPrChange",
    "tblPrExChange",
    "trPrChange",
    "tcPrChange",
    "tblGridChange",
    "numberingChange",
];

const MOVE_RANGES: &[&str] = &[
    "moveFromRangeStart",
    "moveFromRangeEnd",
    "moveToRangeStart",
    "moveToRangeEnd",
];

/// Keep inserted and moved-to content, drop deleted and moved-from content.
fn accept_revisions(part: &mut Part) {
    let removed = collect(part, |n| {
        n.is_w("del")
            || n.is_w("moveFrom")
            || PROPERTY_CHANGES.iter().any(|c| n.is_w(c))
            || MOVE_RANGES.iter().any(|c| n.is_w(c))
            || ((n.is_w("ins") || n.is_w("moveTo"))
                && n.parent().is_some_and(|p| p.is_w("rPr")))
    });
    let unwrapped = collect(part, |n| {
        (n.is_w("ins") || n.is_w("moveTo")) && !n.parent().is_some_and(|p| p.is_w("rPr"))
    });
    log::debug!(
        "accepting revisions: {} removed, {} unwrapped",
        removed.len(),
        unwrapped.len()
    );
    for id in removed {
        part.tree.detach(id);
    }
    for id in unwrapped {
        part.tree.unwrap(id);
    }
}

fn remove_comment_markers(part: &mut Part) {
    let markers = collect(part, |n| {
        n.is_w("commentRangeStart") || n.is_w("commentRangeEnd") || n.is_w("commentReference")
    });
    let emptied_runs = collect(part, |n| {
        n.is_w("r")
            && n.w_child("commentReference").is_some()
            && n.elements().all(|c| c.is_w("rPr") || c.is_w("commentReference"))
    });
    for id in markers.into_iter().chain(emptied_runs) {
        part.tree.detach(id);
    }
}

fn remove_noise(part: &mut Part) {
    let go_back_ids: Vec<String> = part
        .root()
        .descendants()
        .filter(|n| n.is_w("bookmarkStart") && n.w_attr("name") == Some("_GoBack"))
        .filter_map(|n| n.w_attr("id").map(str::to_string))
        .collect();
    let noise = collect(part, |n| {
        n.is_w("proofErr")
            || n.is_w("lastRenderedPageBreak")
            || n.is_w("softHyphen")
            || n.is_w("permStart")
            || n.is_w("permEnd")
            || ((n.is_w("bookmarkStart") || n.is_w("bookmarkEnd"))
                && n.w_attr("id").is_some_and(|id| go_back_ids.iter().any(|g| g == id)))
    });
    for id in noise {
        part.tree.detach(id);
    }
}

/// Read access to the styles part.
struct StyleSheet<'a> {
    part: Option<&'a Part>,
}

impl<'a> StyleSheet<'a> {
    fn style(&self, id: &str) -> Option<Node<'a>> {
        self.part?
            .root()
            .w_children("style")
            .find(|s| s.w_attr("styleId") == Some(id))
    }

    fn default_style(&self, style_type: &str) -> Option<Node<'a>> {
        self.part?.root().w_children("style").find(|s| {
            s.w_attr("type") == Some(style_type)
                && s.w_attr("default").is_some_and(|d| crate::source::on_off(Some(d)))
        })
    }

    /// The style and its `basedOn` ancestors, nearest first.
    fn chain(&self, id: &str) -> Vec<Node<'a>> {
        let mut chain = Vec::new();
        let mut next = self.style(id);
        while let Some(style) = next {
            if chain.len() >= 16 || chain.contains(&style) {
                break;
            }
            chain.push(style);
            next = style
                .w_child("basedOn")
                .and_then(|b| b.w_attr("val"))
                .and_then(|id| self.style(id));
        }
        chain
    }

    fn paragraph_style_id(&self, paragraph: Node<'_>) -> Option<String> {
        paragraph
            .w_path(&["pPr", "pStyle"])
            .and_then(|s| s.w_attr("val"))
            .map(str::to_string)
            .or_else(|| {
                self.default_style("paragraph")
                    .and_then(|s| s.w_attr("styleId"))
                    .map(str::to_string)
            })
    }

    fn default_run_properties(&self) -> Option<Node<'a>> {
        self.part?.root().w_path(&["docDefaults", "rPrDefault", "rPr"])
    }

    fn default_paragraph_properties(&self) -> Option<Node<'a>> {
        self.part?.root().w_path(&["docDefaults", "pPrDefault", "pPr"])
    }
}

/// Find or create a `w:` child; created children are inserted first.
fn ensure_child(part: &mut Part, parent: NodeId, local: &str) -> NodeId {
    if let Some(existing) = part.node(parent).w_child(local) {
        return existing.id();
    }
    let id = part.tree.create_element(W, local, &[]);
    part.tree.insert_child(parent, 0, id);
    id
}

/// Copy every property of `sources` (nearest first) missing from `container`.
fn merge_properties(part: &mut Part, container: NodeId, sources: &[Node<'_>], skip: &[&str]) {
    for source in sources {
        for property in source.elements() {
            let local = property.local_name();
            if skip.contains(&local) || part.node(container).w_child(local).is_some() {
                continue;
            }
            let copy = part.tree.import(property);
            part.tree.append_child(container, copy);
        }
    }
}

const PARAGRAPH_SKIP: &[&str] = &["rPr", "sectPr", "pPrChange", "pStyle"];
const RUN_SKIP: &[&str] = &["rStyle", "rPrChange", "ins", "del", "moveFrom", "moveTo"];

fn skip_text_boxes(node: &Node<'_>) -> bool {
    node.is_w("txbxContent")
}

fn inherit_styles(part: &mut Part, styles: &StyleSheet<'_>) {
    if styles.part.is_none() {
        return;
    }
    let paragraphs = collect(part, |n| n.is_w("p"));
    for paragraph in paragraphs {
        let chain = styles
            .paragraph_style_id(part.node(paragraph))
            .map(|id| styles.chain(&id))
            .unwrap_or_default();

        let mut sources: Vec<Node<'_>> = chain.iter().filter_map(|s| s.w_child("pPr")).collect();
        sources.extend(styles.default_paragraph_properties());
        if !sources.is_empty() {
            let ppr = ensure_child(part, paragraph, "pPr");
            merge_properties(part, ppr, &sources, PARAGRAPH_SKIP);
        }

        let paragraph_run_sources: Vec<Node<'_>> =
            chain.iter().filter_map(|s| s.w_child("rPr")).collect();
        let runs: Vec<NodeId> = part
            .node(paragraph)
            .descendants_trimmed(skip_text_boxes)
            .filter(|n| n.is_w("r"))
            .map(|n| n.id())
            .collect();
        for run in runs {
            let run_style = part
                .node(run)
                .w_path(&["rPr", "rStyle"])
                .and_then(|s| s.w_attr("val"))
                .map(str::to_string);
            let mut sources: Vec<Node<'_>> = run_style
                .map(|id| styles.chain(&id))
                .unwrap_or_default()
                .iter()
                .filter_map(|s| s.w_child("rPr"))
                .collect();
            sources.extend(paragraph_run_sources.iter().copied());
            sources.extend(styles.default_run_properties());
            if sources.is_empty() {
                continue;
            }
            let rpr = ensure_child(part, run, "rPr");
            merge_properties(part, rpr, &sources, RUN_SKIP);
        }
    }
}

fn language_type(run: Node<'_>) -> &'static str {
    let rpr = run.w_child("rPr");
    if rpr.is_some_and(|r| r.w_flag("rtl") || r.w_flag("cs")) {
        "bidi"
    } else if rpr
        .and_then(|r| r.w_child("rFonts"))
        .and_then(|f| f.w_attr("hint"))
        == Some("eastAsia")
    {
        "eastAsia"
    } else {
        "western"
    }
}

fn declared_font(rpr: Option<Node<'_>>) -> Option<String> {
    let fonts = rpr?.w_child("rFonts")?;
    fonts
        .w_attr("ascii")
        .or_else(|| fonts.w_attr("hAnsi"))
        .map(str::to_string)
}

fn stamp_attributes(part: &mut Part, styles: &StyleSheet<'_>) {
    let mut stamps: Vec<(NodeId, &'static str, String)> = Vec::new();
    let root = part.root();
    for node in root.descendants() {
        if node.is_w("p") {
            if node.attr(PT, "StyleName").is_none() {
                if let Some(id) = styles.paragraph_style_id(node) {
                    stamps.push((node.id(), "StyleName", id));
                }
            }
            if node.attr(PT, "FontName").is_none() {
                let font = declared_font(node.w_path(&["pPr", "rPr"]))
                    .or_else(|| {
                        styles
                            .paragraph_style_id(node)
                            .and_then(|id| {
                                styles
                                    .chain(&id)
                                    .iter()
                                    .find_map(|s| declared_font(s.w_child("rPr")))
                            })
                    })
                    .or_else(|| declared_font(styles.default_run_properties()));
                if let Some(font) = font {
                    stamps.push((node.id(), "FontName", font));
                }
            }
        } else if node.is_w("r") {
            if node.attr(PT, "StyleName").is_none() {
                if let Some(style) = node.w_path(&["rPr", "rStyle"]).and_then(|s| s.w_attr("val")) {
                    stamps.push((node.id(), "StyleName", style.to_string()));
                }
            }
            if node.attr(PT, "FontName").is_none() {
                if let Some(font) = declared_font(node.w_child("rPr")) {
                    stamps.push((node.id(), "FontName", font));
                }
            }
            if node.attr(PT, "LanguageType").is_none() {
                stamps.push((node.id(), "LanguageType", language_type(node).to_string()));
            }
        }
    }
    for (id, name, value) in stamps {
        part.tree.set_attr(id, PT, name, &value);
    }
}

#[derive(Debug, Clone)]
struct LevelDefinition {
    start: u32,
    num_fmt: String,
    lvl_text: String,
    suffix: String,
    ppr: Option<NodeId>,
    rpr: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct NumberingInstance {
    abstract_id: String,
    start_overrides: HashMap<usize, u32>,
}

/// List counter value of a declared start; out-of-range values saturate.
fn list_counter(declared: i64) -> u32 {
    u32::try_from(declared.max(0)).unwrap_or(u32::MAX)
}

struct NumberingDefinitions<'a> {
    part: &'a Part,
    instances: HashMap<String, NumberingInstance>,
    abstracts: HashMap<String, HashMap<usize, LevelDefinition>>,
}

impl<'a> NumberingDefinitions<'a> {
    fn read(part: &'a Part) -> Self {
        let root = part.root();
        let mut abstracts = HashMap::new();
        for abstract_num in root.w_children("abstractNum") {
            let Some(id) = abstract_num.w_attr("abstractNumId") else {
                continue;
            };
            let mut levels = HashMap::new();
            for lvl in abstract_num.w_children("lvl") {
                let ilvl = lvl.w_int("ilvl").unwrap_or(0).max(0) as usize;
                let attr_of = |child: &str| {
                    lvl.w_child(child)
                        .and_then(|c| c.w_attr("val"))
                        .map(str::to_string)
                };
                levels.insert(
                    ilvl,
                    LevelDefinition {
                        start: lvl
                            .w_child("start")
                            .and_then(|s| s.w_int("val"))
                            .map(list_counter)
                            .unwrap_or(1),
                        num_fmt: attr_of("numFmt").unwrap_or_else(|| "decimal".to_string()),
                        lvl_text: attr_of("lvlText").unwrap_or_default(),
                        suffix: attr_of("suff").unwrap_or_else(|| "tab".to_string()),
                        ppr: lvl.w_child("pPr").map(|n| n.id()),
                        rpr: lvl.w_child("rPr").map(|n| n.id()),
                    },
                );
            }
            abstracts.insert(id.to_string(), levels);
        }

        let mut instances = HashMap::new();
        for num in root.w_children("num") {
            let (Some(id), Some(abstract_id)) = (
                num.w_attr("numId"),
                num.w_child("abstractNumId").and_then(|a| a.w_attr("val")),
            ) else {
                continue;
            };
            let start_overrides = num
                .w_children("lvlOverride")
                .filter_map(|o| {
                    let ilvl = o.w_int("ilvl")?.max(0) as usize;
                    let start = list_counter(o.w_child("startOverride")?.w_int("val")?);
                    Some((ilvl, start))
                })
                .collect();
            instances.insert(
                id.to_string(),
                NumberingInstance {
                    abstract_id: abstract_id.to_string(),
                    start_overrides,
                },
            );
        }

        Self {
            part,
            instances,
            abstracts,
        }
    }
}

/// Effective `numPr` of a paragraph: direct, else from its style chain.
fn numbering_reference(paragraph: Node<'_>, styles: &StyleSheet<'_>) -> Option<(String, usize)> {
    let direct = paragraph.w_path(&["pPr", "numPr"]);
    let from_style = || {
        styles
            .paragraph_style_id(paragraph)
            .and_then(|id| styles.chain(&id).iter().find_map(|s| s.w_path(&["pPr", "numPr"])))
    };
    let num_pr_id = direct
        .and_then(|n| n.w_child("numId"))
        .and_then(|n| n.w_attr("val"))
        .map(str::to_string)
        .or_else(|| {
            from_style()
                .and_then(|n| n.w_child("numId"))
                .and_then(|n| n.w_attr("val"))
                .map(str::to_string)
        })?;
    let ilvl = direct
        .and_then(|n| n.w_child("ilvl"))
        .and_then(|n| n.w_int("val"))
        .or_else(|| from_style().and_then(|n| n.w_child("ilvl")).and_then(|n| n.w_int("val")))
        .unwrap_or(0)
        .clamp(0, 8) as usize;
    (num_pr_id != "0").then_some((num_pr_id, ilvl))
}

fn paragraph_language(paragraph: Node<'_>, styles: &StyleSheet<'_>) -> String {
    paragraph
        .descendants()
        .find(|n| n.is_w("lang") && n.parent().is_some_and(|p| p.is_w("rPr")))
        .and_then(|l| l.w_attr("val"))
        .or_else(|| {
            styles
                .default_run_properties()
                .and_then(|r| r.w_child("lang"))
                .and_then(|l| l.w_attr("val"))
        })
        .unwrap_or("en-US")
        .to_string()
}

struct PlannedMarker {
    paragraph: NodeId,
    abstract_id: String,
    text: String,
    tab: bool,
    ppr: Option<NodeId>,
    rpr: Option<NodeId>,
}

fn number_paragraphs(
    part: &mut Part,
    styles: &StyleSheet<'_>,
    definitions: &NumberingDefinitions<'_>,
    settings: &ConvertSettings,
) -> Result<(), ConvertError> {
    let mut counters: HashMap<String, [Option<u32>; 9]> = HashMap::new();
    let mut planned = Vec::new();

    for paragraph in part.root().descendants().filter(|n| n.is_w("p")) {
        let Some((num_id, ilvl)) = numbering_reference(paragraph, styles) else {
            continue;
        };
        let Some(instance) = definitions.instances.get(&num_id) else {
            log::warn!("paragraph references unknown numbering instance {num_id}");
            continue;
        };
        let Some(levels) = definitions.abstracts.get(&instance.abstract_id) else {
            log::warn!("numbering instance {num_id} has no abstract definition");
            continue;
        };
        let Some(level) = levels.get(&ilvl) else {
            continue;
        };
        let start_of = |l: usize| {
            instance
                .start_overrides
                .get(&l)
                .copied()
                .or_else(|| levels.get(&l).map(|d| d.start))
                .unwrap_or(1)
        };

        let counter = counters
            .entry(instance.abstract_id.clone())
            .or_insert([None; 9]);
        for (l, slot) in counter.iter_mut().enumerate().take(ilvl) {
            slot.get_or_insert(start_of(l));
        }
        counter[ilvl] = Some(match counter[ilvl] {
            Some(previous) => previous.saturating_add(1),
            None => start_of(ilvl),
        });
        for slot in counter.iter_mut().skip(ilvl + 1) {
            *slot = None;
        }

        let language = paragraph_language(paragraph, styles);
        let formatter = match settings.list_items.for_language(&language) {
            Some(f) => f,
            None if settings.restrict_to_supported_languages => {
                return Err(ConvertError::UnsupportedLanguage(language));
            }
            None => match settings.list_items.fallback() {
                Some(f) => f,
                None => continue,
            },
        };

        let mut text = level.lvl_text.clone();
        if level.num_fmt != "bullet" {
            for l in (0..=ilvl).rev() {
                let placeholder = format!("%{}", l + 1);
                if !text.contains(&placeholder) {
                    continue;
                }
                let value = counter[l].unwrap_or(1);
                let num_fmt = levels
                    .get(&l)
                    .map(|d| d.num_fmt.as_str())
                    .unwrap_or("decimal");
                let formatted = match formatter(value, num_fmt) {
                    Some(s) => s,
                    None if settings.restrict_to_supported_numbering_formats => {
                        return Err(ConvertError::UnsupportedNumberingFormat(num_fmt.to_string()));
                    }
                    None => value.to_string(),
                };
                text = text.replace(&placeholder, &formatted);
            }
        }
        let tab = match level.suffix.as_str() {
            "space" => {
                text.push(' ');
                false
            }
            "nothing" => false,
            _ => true,
        };

        planned.push(PlannedMarker {
            paragraph: paragraph.id(),
            abstract_id: instance.abstract_id.clone(),
            text,
            tab,
            ppr: level.ppr,
            rpr: level.rpr,
        });
    }

    log::debug!("inserting {} list markers", planned.len());
    for marker in planned {
        insert_marker(part, definitions.part, marker);
    }
    Ok(())
}

fn insert_marker(part: &mut Part, numbering: &Part, marker: PlannedMarker) {
    let paragraph = marker.paragraph;
    part.tree
        .set_attr(paragraph, PT, "AbstractNumId", &marker.abstract_id);

    let ppr = ensure_child(part, paragraph, "pPr");
    if let Some(level_ppr) = marker.ppr {
        let sources = [numbering.node(level_ppr)];
        merge_properties(part, ppr, &sources, &["rPr"]);
    }

    let make_run = |part: &mut Part| {
        let run = part.tree.create_element(W, "r", &[]);
        if let Some(level_rpr) = marker.rpr {
            let rpr = part.tree.import(numbering.node(level_rpr));
            part.tree.append_child(run, rpr);
        }
        run
    };

    let text_run = make_run(part);
    let t = part.tree.create_element(W, "t", &[(XML, "space", "preserve")]);
    let text = part.tree.create_text(&marker.text);
    part.tree.append_child(t, text);
    part.tree.append_child(text_run, t);
    part.tree.insert_after(ppr, text_run);

    if marker.tab {
        let tab_run = make_run(part);
        let tab = part.tree.create_element(W, "tab", &[]);
        part.tree.append_child(tab_run, tab);
        part.tree.insert_after(text_run, tab_run);
    }
}
